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

use midly::num::u7;
use tracing::debug;

use crate::error::KitError;
use crate::midimap::NoteRange;
use crate::velocity::VariationsMethod;

use super::field::{Field, FieldSpec, Value};

/// What a field is validated against: the source directory and every field validated so far.
pub struct ValidationScope<'a> {
    source_dir: &'a Path,
    values: BTreeMap<Field, Value>,
}

impl<'a> ValidationScope<'a> {
    pub fn new(source_dir: &'a Path) -> ValidationScope<'a> {
        ValidationScope {
            source_dir,
            values: BTreeMap::new(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        self.source_dir
    }

    /// Gets an already validated value.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    fn insert(&mut self, field: Field, value: Value) {
        self.values.insert(field, value);
    }
}

fn invalid(spec: &FieldSpec, value: &Value, message: String) -> KitError {
    KitError::validation(message)
        .with("key", spec.key)
        .with("value", value)
}

/// Accepts any value.
pub fn accept(_: &FieldSpec, value: Value, _: &ValidationScope) -> Result<Value, KitError> {
    Ok(value)
}

pub fn positive(spec: &FieldSpec, value: Value, _: &ValidationScope) -> Result<Value, KitError> {
    match value.as_integer() {
        Some(number) if number > 0 => Ok(value),
        _ => Err(invalid(
            spec,
            &value,
            format!("{} must be a positive integer", spec.key),
        )),
    }
}

pub fn midi_note(spec: &FieldSpec, value: Value, _: &ValidationScope) -> Result<Value, KitError> {
    match value.as_integer() {
        Some(note) if (0..=127).contains(&note) => Ok(value),
        _ => Err(invalid(
            spec,
            &value,
            format!("{} must be between 0 and 127", spec.key),
        )
        .with("min", 0)
        .with("max", 127)),
    }
}

pub fn non_empty_list(
    spec: &FieldSpec,
    value: Value,
    _: &ValidationScope,
) -> Result<Value, KitError> {
    match value.as_list() {
        Some(items) if !items.is_empty() => Ok(value),
        _ => Err(invalid(
            spec,
            &value,
            format!("{} must contain at least one entry", spec.key),
        )),
    }
}

/// Every main channel must be one of the configured channels.
pub fn main_channels(
    spec: &FieldSpec,
    value: Value,
    scope: &ValidationScope,
) -> Result<Value, KitError> {
    let channels = scope
        .get(Field::Channels)
        .and_then(Value::as_list)
        .unwrap_or_default();

    if let Some(items) = value.as_list() {
        if let Some(unknown) = items.iter().find(|item| !channels.contains(item)) {
            return Err(invalid(
                spec,
                &value,
                format!("main channel '{}' is not one of the configured channels", unknown),
            )
            .with("channel", unknown)
            .with("channels", channels.join(", ")));
        }
    }

    Ok(value)
}

fn check_source_file(
    spec: &FieldSpec,
    value: &Value,
    scope: &ValidationScope,
    file: &str,
) -> Result<(), KitError> {
    let path = scope.source_dir().join(file);
    if path.is_file() {
        debug!(key = spec.key, path = %path.display(), "Found source file");
        Ok(())
    } else {
        Err(invalid(
            spec,
            value,
            format!("{} file '{}' does not exist in the source directory", spec.key, file),
        )
        .with("path", path.display()))
    }
}

/// An optional single file relative to the source directory.
pub fn source_file(
    spec: &FieldSpec,
    value: Value,
    scope: &ValidationScope,
) -> Result<Value, KitError> {
    if let Some(file) = value.as_text().filter(|file| !file.is_empty()) {
        check_source_file(spec, &value, scope, file)?;
    }
    Ok(value)
}

/// A list of files relative to the source directory.
pub fn source_files(
    spec: &FieldSpec,
    value: Value,
    scope: &ValidationScope,
) -> Result<Value, KitError> {
    for file in value.as_list().unwrap_or_default() {
        check_source_file(spec, &value, scope, file)?;
    }
    Ok(value)
}

/// Turns the method text into a [`VariationsMethod`].
pub fn method(spec: &FieldSpec, value: Value, _: &ValidationScope) -> Result<Value, KitError> {
    let parsed = match &value {
        Value::Method(method) => Ok(*method),
        Value::Text(text) => text.parse::<VariationsMethod>(),
        _ => Err(format!("{} must be 'linear' or 'logarithmic'", spec.key)),
    };
    parsed
        .map(Value::Method)
        .map_err(|e| invalid(spec, &value, e))
}

/// Checks the three MIDI fields together.
pub fn midi_range(min: i64, median: i64, max: i64) -> Result<NoteRange, KitError> {
    let range_error = |field: Field, value: i64, message: String| {
        KitError::validation(message)
            .with("key", field.key())
            .with("value", value)
            .with(Field::MidiNoteMin.key(), min)
            .with(Field::MidiNoteMedian.key(), median)
            .with(Field::MidiNoteMax.key(), max)
    };

    if min >= max {
        return Err(range_error(
            Field::MidiNoteMin,
            min,
            format!(
                "midi_note_min ({}) must be less than midi_note_max ({})",
                min, max
            ),
        ));
    }
    if median < min || median > max {
        return Err(range_error(
            Field::MidiNoteMedian,
            median,
            format!(
                "midi_note_median ({}) must be between midi_note_min ({}) and midi_note_max ({})",
                median, min, max
            ),
        ));
    }

    let note = |value: i64| u8::try_from(value).ok().and_then(u7::try_from);
    let range = match (note(min), note(median), note(max)) {
        (Some(min), Some(median), Some(max)) => NoteRange::new(min, median, max),
        _ => None,
    };
    range.ok_or_else(|| {
        range_error(
            Field::MidiNoteMin,
            min,
            "MIDI notes must be between 0 and 127".to_string(),
        )
    })
}

/// Validates transformed values in order: independent fields, relational fields, then the
/// MIDI range. Stops at the first error.
pub fn validate_all(
    source_dir: &Path,
    transformed: BTreeMap<Field, Value>,
) -> Result<(BTreeMap<Field, Value>, NoteRange), KitError> {
    let mut scope = ValidationScope::new(source_dir);
    let mut transformed = transformed;

    let independent = Field::ALL.iter().filter(|field| !field.is_relational());
    let relational = Field::ALL.iter().filter(|field| field.is_relational());
    for field in independent.chain(relational) {
        let spec = field.spec();
        let value = transformed
            .remove(field)
            .unwrap_or_else(|| spec.default_value());
        let value = spec.validate(value, &scope)?;
        scope.insert(*field, value);
    }

    let integer = |field: Field| {
        scope
            .get(field)
            .and_then(Value::as_integer)
            .unwrap_or_default()
    };
    let range = midi_range(
        integer(Field::MidiNoteMin),
        integer(Field::MidiNoteMedian),
        integer(Field::MidiNoteMax),
    )?;

    Ok((scope.values, range))
}
