//! Build script for genai-proto

use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/genai/v1/session.proto");

    // Messages only. The session call is driven through a custom codec.
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    tonic_build::configure()
        .build_server(false)
        .build_client(false)
        .file_descriptor_set_path(out_dir.join("genai_descriptor.bin"))
        .compile_protos(&["proto/genai/v1/session.proto"], &["proto"])?;
    Ok(())
}
