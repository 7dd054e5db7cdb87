//! # Init Subcommand
//!
//! Creates an empty, current-version index file. An existing file is left
//! untouched.

use anyhow::Result;
use clap::Args;

use rix_index::ReferenceIndex;

use crate::Workspace;

/// Arguments for `rix init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Execute `rix init`.
pub fn run_init(_args: &InitArgs, ws: &Workspace) -> Result<u8> {
    if ws.store().exists() {
        println!("OK: index already exists at {}", ws.index_path().display());
        return Ok(0);
    }
    ws.save_index(&ReferenceIndex::new())?;
    tracing::info!(path = %ws.index_path().display(), "created index");
    println!("OK: created index at {}", ws.index_path().display());
    Ok(0)
}
