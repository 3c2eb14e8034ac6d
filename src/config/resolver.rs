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
use std::fmt;

use tracing::debug;

use super::field::{Field, RawValue};
use super::file::FileValues;

/// Where a resolved value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Cli,
    File,
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Cli => "command line",
            Origin::File => "config file",
            Origin::Default => "default",
        })
    }
}

/// A field's raw value after precedence has been applied. Defaults carry no raw value; the
/// transformer fills them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub field: Field,
    pub origin: Origin,
    pub raw: Option<RawValue>,
}

/// Values explicitly given on the command line. Only fields that were actually passed are set.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    values: BTreeMap<Field, RawValue>,
}

impl Overrides {
    pub fn new() -> Overrides {
        Overrides::default()
    }

    /// Sets a field if a value was given.
    pub fn set(&mut self, field: Field, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.values.insert(field, RawValue::Text(value));
        }
        self
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(&field)
    }
}

/// Applies precedence for a single field: command line, then file, then default.
pub fn resolve(field: Field, cli: &Overrides, file: Option<&FileValues>) -> Resolved {
    let (origin, raw) = match (cli.get(field), file.and_then(|file| file.get(field))) {
        (Some(raw), _) => (Origin::Cli, Some(raw.clone())),
        (None, Some(raw)) => (Origin::File, Some(raw.clone())),
        (None, None) => (Origin::Default, None),
    };

    debug!(field = field.key(), origin = %origin, "Resolved field");
    Resolved { field, origin, raw }
}

/// Resolves every field in registry order.
pub fn resolve_all(cli: &Overrides, file: Option<&FileValues>) -> Vec<Resolved> {
    Field::ALL
        .iter()
        .map(|field| resolve(*field, cli, file))
        .collect()
}
