//! CLI argument surface.
//!
//! Offline only: one local scenario file in, one JSON report out. The seed
//! and round count can be overridden without editing the scenario.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "adm",
    disable_help_subcommand = true,
    about = "Offline, deterministic CLI for the admission/migration engine"
)]
pub struct Args {
    /// Scenario JSON path (admission section, migration section, or both).
    #[arg(long)]
    pub scenario: PathBuf,

    /// Draw-RNG seed override. Accepts decimal u64 or 0x-hex (≤16 digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Migration round-count override.
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Validate the scenario (parse + setup builders) without running.
    #[arg(long)]
    pub validate_only: bool,

    /// Pretty-print the report instead of canonical compact JSON.
    #[arg(long)]
    pub pretty: bool,

    /// Suppress non-essential stderr notes.
    #[arg(long)]
    pub quiet: bool,
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>()
            .map_err(|_| "decimal seed must be a valid u64".into())
    }
}
