//! # Record Subcommand
//!
//! Fingerprints a file found in a registered source, works out where the
//! configured layout places it in a registered destination, and merges the
//! resulting observation into the index.
//!
//! Recording only updates the index; copying the bytes to the destination
//! is left to whatever transport the destination uses. Re-recording an
//! unchanged file leaves the index untouched and prints `unchanged`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use rix_core::{DestinationId, Location, SourceId, Timestamp};
use rix_index::{DestinationPlacement, Layout, MetaDocument, Reference, SourceSighting};

use crate::endpoint::parse_location;
use crate::hash::fingerprint_file;
use crate::Workspace;

/// Arguments for `rix record`.
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// File to fingerprint.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Source the file was found in.
    #[arg(long = "source", value_name = "ID")]
    pub src_id: SourceId,

    /// Where the file lives inside the source. Defaults to FILE itself.
    #[arg(long, value_name = "URI", value_parser = parse_location)]
    pub source_path: Option<Location>,

    /// Metadata sidecar inside the source. Defaults to the source path.
    #[arg(long, value_name = "URI", value_parser = parse_location)]
    pub source_meta: Option<Location>,

    /// Destination the content is stored to.
    #[arg(long = "dest", value_name = "ID")]
    pub dst_id: DestinationId,

    /// Last modification time in the source (RFC 3339). Defaults to the
    /// file's modification time.
    #[arg(long, value_name = "TIME")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Execute `rix record`.
pub fn run_record(args: &RecordArgs, ws: &Workspace) -> Result<u8> {
    let mut index = ws.load_index()?;
    let Some(dst) = index.get_destination(&args.dst_id).cloned() else {
        bail!("unknown destination {}", args.dst_id);
    };
    if index.get_source(&args.src_id).is_none() {
        bail!("unknown source {}", args.src_id);
    }

    let file_meta = std::fs::metadata(&args.file)
        .with_context(|| format!("failed to stat {}", args.file.display()))?;
    if !file_meta.is_file() {
        bail!("not a regular file: {}", args.file.display());
    }
    let hash = fingerprint_file(&args.file, ws.config.fingerprint_format)?;

    let mut meta = MetaDocument::new(hash.clone(), file_meta.len());
    if let Some(ext) = args.file.extension().and_then(|e| e.to_str()) {
        meta = meta.with_extension(ext.to_ascii_lowercase());
    }
    let (data_uri, meta_uri) = ws.config.layout.sharded().locate(&dst, &hash, &meta)?;

    let source_path = match &args.source_path {
        Some(loc) => loc.clone(),
        None => parse_location(&args.file.to_string_lossy()).map_err(anyhow::Error::msg)?,
    };
    let modified_at = match args.modified_at {
        Some(dt) => Some(Timestamp::from_datetime(dt)),
        None => file_meta.modified().ok().map(Timestamp::from),
    };

    let reference = Reference::new(
        hash,
        SourceSighting {
            src_id: args.src_id,
            meta_uri: args.source_meta.clone().unwrap_or_else(|| source_path.clone()),
            data_uri: source_path,
            modified_at,
        },
        DestinationPlacement {
            dst_id: dst.dst_id,
            data_uri,
            meta_uri,
            data_size: file_meta.len(),
            meta_size: meta.to_bytes()?.len() as u64,
            stored_at: Some(Timestamp::now()),
            updated_at: None,
        },
    );

    if index.add_reference(&reference) {
        ws.save_index(&index)?;
        tracing::info!(hash = %reference.hash, "reference recorded");
        println!("changed\t{}", reference.hash);
    } else {
        println!("unchanged\t{}", reference.hash);
    }
    Ok(0)
}
