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

use std::io::Write;

use clap::Parser;

use dmimatch::cli::{self, Cli};
use dmimatch::logger;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);

    let code = {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let code = cli::run(&cli, &mut out)?;
        out.flush()?;
        code
    };
    std::process::exit(code);
}
