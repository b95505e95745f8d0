//! Actions: named operations written to a session.

pub mod action;
pub mod generate;

pub use action::Action;
pub use generate::{debug_format_text, Generate, GENERATE};
