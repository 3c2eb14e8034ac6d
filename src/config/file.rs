// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat, Source, ValueKind};
use tracing::{debug, warn};

use crate::error::KitError;

use super::field::{Field, RawValue};

/// The section kit settings are read from.
pub const SECTION: &str = "drumgizmo_kit_generator";

/// The prefix accepted on keys, and required on keys outside of the section.
pub const KEY_PREFIX: &str = "kit_";

/// The config file looked up in the source directory when none is given.
pub const DEFAULT_FILE_NAME: &str = "drumgizmo-kit.ini";

/// Recognized values read from a config file.
#[derive(Debug, Default)]
pub struct FileValues {
    path: PathBuf,
    values: BTreeMap<Field, RawValue>,
}

impl FileValues {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Gets the config file to use: the given one, or the default file in the source directory if
/// it exists.
pub fn locate(source_dir: &Path, given: Option<&Path>) -> Option<PathBuf> {
    match given {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = source_dir.join(DEFAULT_FILE_NAME);
            if default.is_file() {
                debug!(path = %default.display(), "Using config file from source directory");
                Some(default)
            } else {
                None
            }
        }
    }
}

/// Strips the optional key prefix and looks the field up.
fn field_for_key(key: &str) -> Option<Field> {
    let lowercase = key.to_lowercase();
    Field::from_key(lowercase.strip_prefix(KEY_PREFIX).unwrap_or(&lowercase))
}

fn raw_value(value: config::Value) -> Option<RawValue> {
    let nested = matches!(value.kind, ValueKind::Table(_) | ValueKind::Nil);
    let list = matches!(value.kind, ValueKind::Array(_));

    if nested {
        None
    } else if list {
        value.into_array().ok().map(|items| {
            RawValue::List(
                items
                    .into_iter()
                    .filter_map(|item| item.into_string().ok())
                    .collect(),
            )
        })
    } else {
        value.into_string().ok().map(RawValue::Text)
    }
}

/// Reads kit settings from an INI file. Keys in the kit section may be bare or prefixed, keys at
/// the top level must carry the prefix. Keys in the section take precedence. Unrecognized keys
/// are ignored.
pub fn read(path: &Path) -> Result<FileValues, KitError> {
    if !path.is_file() {
        return Err(KitError::configuration("config file not found").with("path", path.display()));
    }

    let table = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .and_then(|config| config.collect())
        .map_err(|e| KitError::from(e).with("path", path.display()))?;

    let mut top_level = BTreeMap::new();
    let mut section = BTreeMap::new();
    let mut found_section = false;

    for (key, value) in table.into_iter() {
        if key.eq_ignore_ascii_case(SECTION) {
            found_section = true;
            let entries = value
                .into_table()
                .map_err(|e| KitError::from(e).with("path", path.display()))?;
            for (key, value) in entries.into_iter() {
                match (field_for_key(&key), raw_value(value)) {
                    (Some(field), Some(raw)) => {
                        section.insert(field, raw);
                    }
                    _ => debug!(key = %key, "Ignoring unrecognized config key"),
                }
            }
        } else if key.to_lowercase().starts_with(KEY_PREFIX) {
            match (field_for_key(&key), raw_value(value)) {
                (Some(field), Some(raw)) => {
                    top_level.insert(field, raw);
                }
                _ => debug!(key = %key, "Ignoring unrecognized config key"),
            }
        } else {
            debug!(key = %key, "Ignoring unrecognized config key");
        }
    }

    if !found_section && top_level.is_empty() {
        warn!(
            path = %path.display(),
            section = SECTION,
            "Config file has no kit section and no prefixed keys"
        );
    }

    let mut values = top_level;
    values.extend(section);
    debug!(path = %path.display(), count = values.len(), "Read config file");

    Ok(FileValues {
        path: path.to_path_buf(),
        values,
    })
}
