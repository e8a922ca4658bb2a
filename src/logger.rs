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

//! Diagnostic logging setup
//!
//! Logs go to stderr through `tracing_subscriber`, so stdout carries only
//! command output. `DMIMATCH_LOG` takes precedence over `-v` flags.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "DMIMATCH_LOG";

/// Filter directive for the given verbosity when `DMIMATCH_LOG` is unset
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Resolve the directive: explicit env value wins, otherwise verbosity
pub fn filter_directive(verbosity: u8, env_value: Option<&str>) -> String {
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => default_directive(verbosity).to_string(),
    }
}

pub fn init_logging(verbosity: u8) {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = filter_directive(verbosity, env_value.as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Invalid {} directive {:?}: {}, falling back to warn", LOG_ENV, directive, e);
        EnvFilter::new("warn")
    });

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
