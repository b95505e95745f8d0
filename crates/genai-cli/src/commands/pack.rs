//! `genai pack`: file → encoded SessionMessage.

use std::path::Path;

use genai_common::Result;
use genai_content::{mimetype, Chunk, Content, MetadataExt};
use genai_proto::{encode, SessionMessage};
use tracing::info;

pub struct PackOptions<'a> {
    pub input: &'a Path,
    pub mimetype: &'a str,
    pub role: Option<&'a str>,
    pub max_fragment_bytes: usize,
}

/// Build the session message for `options.input`.
pub fn pack_file(options: &PackOptions<'_>) -> Result<SessionMessage> {
    let data = std::fs::read(options.input)?;
    let mut metadata = mimetype(options.mimetype);
    if let Some(name) = options.input.file_name().and_then(|n| n.to_str()) {
        metadata = metadata.with_file_name(name);
    }
    if let Some(role) = options.role {
        metadata = metadata.with_role(role);
    }

    let content = Content::from(Chunk::bytes(data, metadata)?);
    Ok(SessionMessage::from_fragments(
        content.node_fragments_split(options.max_fragment_bytes),
    ))
}

pub fn run(options: &PackOptions<'_>, out: &Path) -> Result<()> {
    let message = pack_file(options)?;
    let bytes = encode(&message);
    std::fs::write(out, &bytes)?;
    info!(
        input = %options.input.display(),
        out = %out.display(),
        fragments = message.node_fragments.len(),
        bytes = bytes.len(),
        "Packed session message"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_splits_and_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "0123456789").unwrap();

        let message = pack_file(&PackOptions {
            input: &input,
            mimetype: "text/plain",
            role: Some("USER"),
            max_fragment_bytes: 4,
        })
        .unwrap();

        // three data fragments plus the root
        assert_eq!(message.node_fragments.len(), 4);
        let first = message.node_fragments[0].chunk_fragment.as_ref().unwrap();
        let metadata = first.metadata.as_ref().unwrap();
        assert_eq!(metadata.original_file_name, "notes.txt");
        assert_eq!(metadata.role, "USER");
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = pack_file(&PackOptions {
            input: &dir.path().join("missing.bin"),
            mimetype: "application/octet-stream",
            role: None,
            max_fragment_bytes: 0,
        });
        assert!(matches!(result, Err(genai_common::GenaiError::Io(_))));
    }
}
