//! # Hash Subcommand
//!
//! Prints the fingerprint of one or more files, one per line, followed by
//! the file path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rix_core::{ContentFingerprint, FingerprintFormat};

use crate::Workspace;

/// Arguments for `rix hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Files to fingerprint.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Encoding to print (`legacy`, `v0` or `v1`). Defaults to the
    /// configured format.
    #[arg(long)]
    pub format: Option<FingerprintFormat>,
}

/// Execute `rix hash`.
pub fn run_hash(args: &HashArgs, ws: &Workspace) -> Result<u8> {
    let format = args.format.unwrap_or(ws.config.fingerprint_format);
    for file in &args.files {
        let hash = fingerprint_file(file, format)?;
        println!("{hash}  {}", file.display());
    }
    Ok(0)
}

/// Fingerprint the file at `path`.
pub fn fingerprint_file(path: &std::path::Path, format: FingerprintFormat) -> Result<ContentFingerprint> {
    ContentFingerprint::from_path(path, format)
        .with_context(|| format!("failed to fingerprint {}", path.display()))
}
