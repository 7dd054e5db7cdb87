//! # Migrate Subcommand
//!
//! Upgrades an index or metadata document on disk to the current schema.
//! The migrated document is decoded before it is written back, so a file
//! that would not load afterwards is never replaced. Fields the schema
//! does not know about are carried over unchanged.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use rix_index::migration::{migrate_index_value, migrate_meta_value};
use rix_index::{MetaDocument, MigrationOutcome, ReferenceIndex, CURRENT_VERSION};

use crate::write_atomic;

/// Arguments for `rix migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Document to upgrade in place.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Treat FILE as a metadata document instead of an index.
    #[arg(long)]
    pub meta: bool,

    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute `rix migrate`.
pub fn run_migrate(args: &MigrateArgs) -> Result<u8> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let (outcome, document) = migrate_text(&text, args.meta)
        .with_context(|| format!("cannot migrate {}", args.file.display()))?;

    match outcome {
        MigrationOutcome::Current => {
            println!("OK: {} is already {CURRENT_VERSION}", args.file.display());
        }
        MigrationOutcome::Upgraded if args.dry_run => {
            println!("WOULD MIGRATE: {} to {CURRENT_VERSION}", args.file.display());
        }
        MigrationOutcome::Upgraded => {
            let mut out = serde_json::to_string_pretty(&document)?;
            out.push('\n');
            write_atomic(&args.file, out.as_bytes())?;
            println!("OK: migrated {} to {CURRENT_VERSION}", args.file.display());
        }
    }
    Ok(0)
}

/// Migrate a document and check that the result decodes.
pub fn migrate_text(text: &str, meta: bool) -> Result<(MigrationOutcome, Value)> {
    let mut document: Value = serde_json::from_str(text).context("not a JSON document")?;
    let outcome = if meta {
        let outcome = migrate_meta_value(&mut document)?;
        serde_json::from_value::<MetaDocument>(document.clone()).context("migrated meta document is invalid")?;
        outcome
    } else {
        let outcome = migrate_index_value(&mut document)?;
        serde_json::from_value::<ReferenceIndex>(document.clone()).context("migrated index is invalid")?;
        outcome
    };
    Ok((outcome, document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_index_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.json");
        std::fs::write(&file, r#"{"srcs": [{"src_id": "3f6c2a8e-0d1b-5c4e-9a7f-1b2c3d4e5f60", "uri": "file:///p/"}]}"#)
            .unwrap();

        let args = MigrateArgs {
            file: file.clone(),
            meta: false,
            dry_run: false,
        };
        assert_eq!(run_migrate(&args).unwrap(), 0);
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(doc["version"], "v1");
        assert_eq!(doc["srcs"][0]["src_uri"], "file:///p/");
    }

    #[test]
    fn dry_run_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("meta.json");
        let original = r#"{"sha1": "b8dfb080bc33fb564249e34252bf143d88fc018f", "size": 11}"#;
        std::fs::write(&file, original).unwrap();

        let args = MigrateArgs {
            file: file.clone(),
            meta: true,
            dry_run: true,
        };
        run_migrate(&args).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn unsupported_version_fails() {
        let err = migrate_text(r#"{"version": "v2"}"#, false).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported document version"));
    }

    #[test]
    fn undecodable_result_fails() {
        let err = migrate_text(r#"{"srcs": [{"src_id": "not-a-uuid", "uri": "file:///p/"}]}"#, false).unwrap_err();
        assert!(format!("{err:#}").contains("migrated index is invalid"));
    }

    #[test]
    fn current_meta_untouched() {
        let text = r#"{"version": "v1", "hash": "b8dfb080bc33fb564249e34252bf143d88fc018f", "size": 11}"#;
        let (outcome, _) = migrate_text(text, true).unwrap();
        assert_eq!(outcome, MigrationOutcome::Current);
    }
}
