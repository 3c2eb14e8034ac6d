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
use std::path::Path;

use tracing::{info, warn};

use crate::error::KitError;

pub use self::field::Field;
pub use self::kit::KitConfig;
pub use self::resolver::{Origin, Overrides};

mod field;
mod file;
mod kit;
mod resolver;
mod transform;
mod validate;

/// Resolves, transforms and validates the kit configuration. The config file is the given one,
/// or `drumgizmo-kit.ini` in the source directory if present.
pub fn load(
    source_dir: &Path,
    config_file: Option<&Path>,
    cli: &Overrides,
) -> Result<KitConfig, KitError> {
    let file = match file::locate(source_dir, config_file) {
        Some(path) => {
            let values = file::read(&path)?;
            info!(path = %values.path().display(), fields = values.len(), "Loaded config file");
            Some(values)
        }
        None => None,
    };

    let mut transformed = BTreeMap::new();
    for resolved in resolver::resolve_all(cli, file.as_ref()) {
        let result = resolved.field.spec().transform(resolved.raw.as_ref());
        if result.used_default && resolved.origin != Origin::Default {
            warn!(
                key = resolved.field.key(),
                origin = %resolved.origin,
                default = %result.value,
                "Invalid value, using default"
            );
        }
        transformed.insert(resolved.field, result.value);
    }

    let (values, midi_notes) = validate::validate_all(source_dir, transformed)?;
    KitConfig::from_values(values, midi_notes)
}
