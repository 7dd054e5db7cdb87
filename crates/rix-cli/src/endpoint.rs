//! # Source and Destination Subcommands
//!
//! Register, list and remove endpoints. Endpoint IDs are derived from their
//! locations, so adding the same location twice is a no-op. Removing an
//! endpoint also drops every sighting or placement recorded against it.
//!
//! Locations may be given as absolute URIs (`s3://bucket/data/`) or as
//! filesystem paths, which are converted to `file://` URIs.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use rix_core::{DestinationId, Location, SourceId};
use rix_index::{Destination, Source};

use crate::Workspace;

/// Arguments for `rix source`.
#[derive(Args, Debug)]
pub struct SourceArgs {
    #[command(subcommand)]
    pub command: SourceCommand,
}

/// Source subcommands.
#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Register a location that is searched for content.
    Add {
        /// Root URI or directory of the source.
        #[arg(value_name = "URI", value_parser = parse_location)]
        uri: Location,
    },
    /// List registered sources.
    List,
    /// Remove a source and its sightings.
    Remove {
        /// Source ID, as printed by `source add`.
        #[arg(value_name = "ID")]
        id: SourceId,
    },
}

/// Arguments for `rix dest`.
#[derive(Args, Debug)]
pub struct DestArgs {
    #[command(subcommand)]
    pub command: DestCommand,
}

/// Destination subcommands.
#[derive(Subcommand, Debug)]
pub enum DestCommand {
    /// Register a location that content is stored to.
    Add {
        /// Where the destination keeps its own index.
        #[arg(value_name = "INDEX_URI", value_parser = parse_location)]
        index_uri: Location,
        /// Base location for content.
        #[arg(value_name = "DATA_URI", value_parser = parse_location)]
        data_uri: Location,
        /// Base location for metadata documents.
        #[arg(value_name = "META_URI", value_parser = parse_location)]
        meta_uri: Location,
    },
    /// List registered destinations.
    List,
    /// Remove a destination and its placements.
    Remove {
        /// Destination ID, as printed by `dest add`.
        #[arg(value_name = "ID")]
        id: DestinationId,
    },
}

/// Execute `rix source`.
pub fn run_source(args: &SourceArgs, ws: &Workspace) -> Result<u8> {
    match &args.command {
        SourceCommand::Add { uri } => {
            let mut index = ws.load_index()?;
            let src = Source::new(uri.clone());
            let id = src.src_id;
            if index.add_source(src) {
                ws.save_index(&index)?;
                tracing::info!(src_id = %id, uri = %uri, "source added");
                println!("{id}\tadded");
            } else {
                println!("{id}\talready registered");
            }
            Ok(0)
        }
        SourceCommand::List => {
            let index = ws.load_index()?;
            for src in index.sources() {
                println!("{}\t{}", src.src_id, src.src_uri);
            }
            Ok(0)
        }
        SourceCommand::Remove { id } => {
            let mut index = ws.load_index()?;
            if index.get_source(id).is_none() {
                println!("NOT FOUND: source {id}");
                return Ok(1);
            }
            index.remove_source(id);
            ws.save_index(&index)?;
            tracing::info!(src_id = %id, "source removed");
            println!("{id}\tremoved");
            Ok(0)
        }
    }
}

/// Execute `rix dest`.
pub fn run_dest(args: &DestArgs, ws: &Workspace) -> Result<u8> {
    match &args.command {
        DestCommand::Add {
            index_uri,
            data_uri,
            meta_uri,
        } => {
            let mut index = ws.load_index()?;
            let dst = Destination::new(index_uri.clone(), data_uri.clone(), meta_uri.clone());
            let id = dst.dst_id;
            if index.add_destination(dst) {
                ws.save_index(&index)?;
                tracing::info!(dst_id = %id, "destination added");
                println!("{id}\tadded");
            } else {
                println!("{id}\talready registered");
            }
            Ok(0)
        }
        DestCommand::List => {
            let index = ws.load_index()?;
            for dst in index.destinations() {
                println!("{}\t{}\t{}\t{}", dst.dst_id, dst.index_uri, dst.data_uri, dst.meta_uri);
            }
            Ok(0)
        }
        DestCommand::Remove { id } => {
            let mut index = ws.load_index()?;
            if index.get_destination(id).is_none() {
                println!("NOT FOUND: destination {id}");
                return Ok(1);
            }
            index.remove_destination(id);
            ws.save_index(&index)?;
            tracing::info!(dst_id = %id, "destination removed");
            println!("{id}\tremoved");
            Ok(0)
        }
    }
}

/// Accept an absolute URI, or a filesystem path converted to `file://`.
///
/// Existing directories get a trailing `/` so that relative references
/// resolve beneath them.
pub fn parse_location(value: &str) -> Result<Location, String> {
    if let Ok(loc) = Location::parse(value) {
        return Ok(loc);
    }
    let path = Path::new(value);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(|e| e.to_string())?.join(path)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);
    let loc = if absolute.is_dir() {
        Location::from_directory_path(&absolute)
    } else {
        Location::from_file_path(&absolute)
    };
    loc.map_err(|e| e.to_string())
}
