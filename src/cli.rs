/*
 * This file is part of dmimatch.
 *
 * Copyright (C) 2025 dmimatch contributors
 *
 * dmimatch is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * dmimatch is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with dmimatch. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command Line Interface
//!
//! Thin front end over dm-core: acquire the identity strings once, then
//! print them or test patterns against them.

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use dm_core::{IdentityStore, ProviderKind, Settings};
use tracing::debug;

use crate::report;

/// Exit status when every pattern matched
pub const EXIT_MATCH: i32 = 0;
/// Exit status when at least one pattern did not match
pub const EXIT_NO_MATCH: i32 = 1;
/// Exit status when the identity data could not be acquired
pub const EXIT_UNAVAILABLE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "dmimatch")]
#[command(version)]
#[command(about = "dmimatch - match the platform's DMI identity strings")]
#[command(long_about = "dmimatch - match the platform's DMI identity strings

Queries system and baseboard manufacturer, product and version strings
and tests them against simple patterns. A pattern is matched literally;
a leading ^ anchors it to the start and a trailing $ to the end.

EXAMPLES:
    dmimatch keys                       List identity keys and short ids
    dmimatch show                       Print every identity string
    dmimatch show --json                Same, as JSON
    dmimatch match '^ASUSTeK' 'P8Z77'   Exit 0 if every pattern matches
    dmimatch test 'HelloWorld' 'World$' Evaluate a pattern offline
    dmimatch --provider sysfs show      Read /sys/class/dmi/id instead of dmidecode

ENVIRONMENT VARIABLES:
    DMIMATCH_LOG=debug     Log filter directive (overrides -v)
    DMIMATCH_CONFIG=path   Settings file location

FILES:
    ~/.config/dmimatch/settings.json    Provider settings")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Identity source to query
    #[arg(long, global = true, value_parser = ["dmidecode", "sysfs"])]
    pub provider: Option<String>,

    /// dmidecode command line to run (e.g. "sudo dmidecode")
    #[arg(long, global = true, value_name = "CMD")]
    pub dmidecode: Option<String>,

    /// Per-key provider timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Directory holding DMI sysfs attributes
    #[arg(long, global = true, value_name = "DIR")]
    pub sysfs_root: Option<PathBuf>,

    /// Settings file to load instead of the default
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List identity keys with their short ids
    Keys,

    /// Acquire and print every identity string
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test patterns against the identity strings
    Match {
        /// Patterns; each must match at least one identity string
        #[arg(required = true, allow_hyphen_values = true)]
        patterns: Vec<String>,
    },

    /// Test one pattern against a literal value
    Test {
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(allow_hyphen_values = true)]
        pattern: String,
    },
}

/// Load settings and apply command line overrides
pub fn resolve_settings(cli: &Cli) -> dm_core::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => dm_core::load_settings_from(path)?,
        None => dm_core::load_settings()?,
    };

    if let Some(provider) = &cli.provider {
        settings.provider = provider.parse::<ProviderKind>()?;
    }
    if let Some(cmd) = &cli.dmidecode {
        settings.dmidecode_command = cmd.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        settings.timeout_ms = ms;
    }
    if let Some(root) = &cli.sysfs_root {
        settings.sysfs_root = root.clone();
    }

    settings.validate()?;
    Ok(settings)
}

fn acquire(cli: &Cli) -> anyhow::Result<IdentityStore> {
    let settings = resolve_settings(cli)?;
    debug!("Using {:?} provider", settings.provider);
    let provider = settings.build_provider()?;
    Ok(IdentityStore::initialize(&*provider))
}

/// Run a parsed command, writing results to `out`. Returns the exit status.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Keys => {
            write!(out, "{}", report::render_keys())?;
            Ok(EXIT_MATCH)
        }
        Commands::Show { json } => {
            let store = acquire(cli)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report::identity_json(&store))?)?;
            } else if store.is_available() {
                write!(out, "{}", report::render_identity(&store))?;
            }
            if !store.is_available() {
                eprintln!("DMI identity unavailable (run with -v for details)");
                return Ok(EXIT_UNAVAILABLE);
            }
            Ok(EXIT_MATCH)
        }
        Commands::Match { patterns } => {
            let store = acquire(cli)?;
            if !store.is_available() {
                eprintln!("DMI identity unavailable (run with -v for details)");
                return Ok(EXIT_UNAVAILABLE);
            }
            Ok(run_match(&store, patterns, out)?)
        }
        Commands::Test { value, pattern } => {
            let hit = dm_core::matches(value, pattern);
            writeln!(out, "{}", if hit { "match" } else { "no match" })?;
            Ok(if hit { EXIT_MATCH } else { EXIT_NO_MATCH })
        }
    }
}

/// Report each pattern; succeeds only if all of them matched some key
pub fn run_match<W: Write>(store: &IdentityStore, patterns: &[String], out: &mut W) -> std::io::Result<i32> {
    let mut all = true;
    for pattern in patterns {
        let hit = store.first_match(pattern);
        all &= hit.is_some();
        writeln!(out, "{}", report::render_match(pattern, hit, store))?;
    }
    Ok(if all { EXIT_MATCH } else { EXIT_NO_MATCH })
}
