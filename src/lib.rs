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

//! dmimatch - platform identification from DMI strings
//!
//! The binary wraps dm-core: it acquires the system and baseboard identity
//! strings once and prints them or tests anchored patterns against them.

pub mod cli;
pub mod logger;
pub mod report;
