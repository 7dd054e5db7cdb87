//! # Read-Only Subcommands
//!
//! `show`, `export` and `stats` inspect the index without modifying it.
//! Output goes to stdout as JSON (or plain `key: value` lines for `stats`),
//! keeping stderr free for logs.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use rix_core::ContentFingerprint;
use rix_index::{DestinationPlacement, Reference, SourceSighting};

use crate::Workspace;

/// Arguments for `rix show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Fingerprint in any supported encoding.
    #[arg(value_name = "FINGERPRINT")]
    pub hash: ContentFingerprint,
}

/// Arguments for `rix export`.
#[derive(Args, Debug)]
pub struct ExportArgs {}

/// Arguments for `rix stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Print counts as a JSON object.
    #[arg(long)]
    pub json: bool,
}

/// One line of `rix export` output.
#[derive(Debug, Serialize)]
pub struct ExportLine<'a> {
    pub hash: &'a ContentFingerprint,
    pub src: &'a SourceSighting,
    pub dst: &'a DestinationPlacement,
}

impl<'a> From<&'a Reference> for ExportLine<'a> {
    fn from(r: &'a Reference) -> Self {
        Self {
            hash: &r.hash,
            src: &r.src,
            dst: &r.dst,
        }
    }
}

/// Execute `rix show`.
pub fn run_show(args: &ShowArgs, ws: &Workspace) -> Result<u8> {
    let index = ws.load_index()?;
    match index.get_reference(&args.hash) {
        Some(uref) => {
            println!("{}", serde_json::to_string_pretty(uref)?);
            Ok(0)
        }
        None => {
            println!("NOT FOUND: {}", args.hash);
            Ok(1)
        }
    }
}

/// Execute `rix export`.
pub fn run_export(_args: &ExportArgs, ws: &Workspace) -> Result<u8> {
    let index = ws.load_index()?;
    for line in export_lines(&index.references().collect::<Vec<_>>())? {
        println!("{line}");
    }
    Ok(0)
}

/// Serialise each reference as a single-line JSON object.
pub fn export_lines(references: &[Reference]) -> Result<Vec<String>> {
    references
        .iter()
        .map(|r| Ok(serde_json::to_string(&ExportLine::from(r))?))
        .collect()
}

/// Execute `rix stats`.
pub fn run_stats(args: &StatsArgs, ws: &Workspace) -> Result<u8> {
    let stats = ws.load_index()?.stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("sources: {}", stats.sources);
        println!("destinations: {}", stats.destinations);
        println!("fingerprints: {}", stats.fingerprints);
        println!("sightings: {}", stats.sightings);
        println!("placements: {}", stats.placements);
    }
    Ok(0)
}
