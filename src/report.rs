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

//! Output formatting for the CLI

use dm_core::{IdentityKey, IdentityStore};
use serde::Serialize;
use serde_json::{json, Value};

/// One identity string as printed by `show`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct IdentityRow<'a> {
    pub key: &'static str,
    pub short_id: &'static str,
    pub value: &'a str,
}

pub fn identity_rows(store: &IdentityStore) -> Vec<IdentityRow<'_>> {
    store
        .iter()
        .map(|(key, value)| IdentityRow {
            key: key.provider_name(),
            short_id: key.short_id(),
            value,
        })
        .collect()
}

/// Table of every identity key with its short id and provider name
pub fn render_keys() -> String {
    let mut out = String::new();
    for key in IdentityKey::ALL {
        out.push_str(&format!("{}  {}\n", key.short_id(), key.provider_name()));
    }
    out
}

/// Human readable listing of the acquired strings
pub fn render_identity(store: &IdentityStore) -> String {
    let rows = identity_rows(store);
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{}  {:<width$}  {}\n",
            row.short_id,
            row.key,
            row.value,
            width = width
        ));
    }
    out
}

pub fn identity_json(store: &IdentityStore) -> Value {
    json!({
        "available": store.is_available(),
        "strings": identity_rows(store),
    })
}

/// One line describing the outcome of a pattern query
pub fn render_match(pattern: &str, hit: Option<IdentityKey>, store: &IdentityStore) -> String {
    match hit {
        Some(key) => format!(
            "{:?}: matched {} ({:?})",
            pattern,
            key,
            store.string_for(key).unwrap_or_default()
        ),
        None => format!("{:?}: no match", pattern),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> IdentityStore {
        IdentityStore::from_strings([
            "LENOVO".into(),
            "2325AR2".into(),
            "ThinkPad X230".into(),
            "LENOVO".into(),
            "2325AR2".into(),
            "Not Defined".into(),
        ])
    }

    #[test]
    fn test_render_keys_lists_every_key() {
        let keys = render_keys();
        assert_eq!(keys.lines().count(), IdentityKey::COUNT);
        assert!(keys.starts_with("sm  system-manufacturer\n"));
        assert!(keys.contains("mv  baseboard-version"));
    }

    #[test]
    fn test_render_identity_aligns_values() {
        let out = render_identity(&store());
        let first = out.lines().next().unwrap();
        assert_eq!(first, "sm  system-manufacturer     LENOVO");
        assert!(out.contains("sv  system-version          ThinkPad X230"));
        assert_eq!(render_identity(&IdentityStore::unavailable()), "");
    }

    #[test]
    fn test_identity_json_shape() {
        let value = identity_json(&store());
        assert_eq!(value["available"], true);
        assert_eq!(value["strings"][2]["short_id"], "sv");
        assert_eq!(value["strings"][2]["value"], "ThinkPad X230");

        let empty = identity_json(&IdentityStore::unavailable());
        assert_eq!(empty["available"], false);
        assert_eq!(empty["strings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_render_match() {
        let s = store();
        assert_eq!(
            render_match("X230$", Some(IdentityKey::SystemVersion), &s),
            "\"X230$\": matched system-version (\"ThinkPad X230\")"
        );
        assert_eq!(render_match("T480", None, &s), "\"T480\": no match");
    }
}
