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

use crate::error::KitError;
use crate::midimap::NoteRange;
use crate::velocity::{VariationsMethod, VelocityCurve};

use super::field::{Field, Value};

/// The fully resolved, transformed and validated kit configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct KitConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    pub notes: String,
    pub author: String,
    pub license: String,
    pub website: String,
    pub logo: String,
    pub samplerate: u32,
    pub velocity_levels: u32,
    pub midi_notes: NoteRange,
    pub extensions: Vec<String>,
    pub channels: Vec<String>,
    pub main_channels: Vec<String>,
    pub extra_files: Vec<String>,
    pub variations_method: VariationsMethod,
}

/// Pulls typed values out of the validated map.
struct Extractor {
    values: BTreeMap<Field, Value>,
}

impl Extractor {
    fn take(&mut self, field: Field) -> Value {
        self.values
            .remove(&field)
            .unwrap_or_else(|| field.spec().default_value())
    }

    fn text(&mut self, field: Field) -> String {
        match self.take(field) {
            Value::Text(value) => value,
            other => other.to_string(),
        }
    }

    fn list(&mut self, field: Field) -> Vec<String> {
        match self.take(field) {
            Value::List(values) => values,
            _ => Vec::new(),
        }
    }

    fn unsigned(&mut self, field: Field) -> Result<u32, KitError> {
        let value = self.take(field);
        value
            .as_integer()
            .and_then(|number| u32::try_from(number).ok())
            .ok_or_else(|| {
                KitError::validation(format!("{} is out of range", field.key()))
                    .with("key", field.key())
                    .with("value", &value)
            })
    }
}

impl KitConfig {
    /// Builds the typed configuration from validated values.
    pub fn from_values(
        values: BTreeMap<Field, Value>,
        midi_notes: NoteRange,
    ) -> Result<KitConfig, KitError> {
        let mut values = Extractor { values };
        let variations_method = values
            .take(Field::VariationsMethod)
            .as_method()
            .unwrap_or_default();

        Ok(KitConfig {
            name: values.text(Field::Name),
            version: values.text(Field::Version),
            description: values.text(Field::Description),
            notes: values.text(Field::Notes),
            author: values.text(Field::Author),
            license: values.text(Field::License),
            website: values.text(Field::Website),
            logo: values.text(Field::Logo),
            samplerate: values.unsigned(Field::Samplerate)?,
            velocity_levels: values.unsigned(Field::VelocityLevels)?,
            midi_notes,
            extensions: values.list(Field::Extensions),
            channels: values.list(Field::Channels),
            main_channels: values.list(Field::MainChannels),
            extra_files: values.list(Field::ExtraFiles),
            variations_method,
        })
    }

    /// The velocity curve for this kit.
    pub fn curve(&self) -> VelocityCurve {
        VelocityCurve::new(self.velocity_levels, self.variations_method)
    }

    pub fn is_main_channel(&self, channel: &str) -> bool {
        self.main_channels.iter().any(|main| main == channel)
    }

    /// Files copied from the source directory into the kit: the logo, then the extra files.
    pub fn additional_files(&self) -> Vec<&str> {
        std::iter::once(self.logo.as_str())
            .filter(|logo| !logo.is_empty())
            .chain(self.extra_files.iter().map(String::as_str))
            .collect()
    }

    /// Display rows for the metadata report, in field order.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Version", self.version.clone()),
            ("Description", self.description.clone()),
            ("Notes", self.notes.clone()),
            ("Author", self.author.clone()),
            ("License", self.license.clone()),
            ("Website", self.website.clone()),
            ("Logo", self.logo.clone()),
            ("Samplerate", format!("{} Hz", self.samplerate)),
            ("Velocity levels", self.velocity_levels.to_string()),
            (
                "MIDI note range",
                format!(
                    "{} - {} (median {})",
                    self.midi_notes.min().as_int(),
                    self.midi_notes.max().as_int(),
                    self.midi_notes.median().as_int()
                ),
            ),
            ("Extensions", self.extensions.join(", ")),
            ("Channels", self.channels.join(", ")),
            ("Main channels", self.main_channels.join(", ")),
            ("Extra files", self.extra_files.join(", ")),
            ("Variations method", self.variations_method.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::validate::validate_all;

    fn defaults() -> KitConfig {
        let dir = tempfile::tempdir().unwrap();
        let (values, range) = validate_all(dir.path(), BTreeMap::new()).unwrap();
        KitConfig::from_values(values, range).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = defaults();
        assert_eq!(config.name, "DrumGizmo Kit");
        assert_eq!(config.version, "1.0");
        assert_eq!(config.license, "Private license");
        assert_eq!(config.samplerate, 44100);
        assert_eq!(config.velocity_levels, 10);
        assert_eq!(config.channels.len(), 11);
        assert!(config.main_channels.is_empty());
        assert!(config.additional_files().is_empty());
        assert_eq!(config.variations_method, VariationsMethod::Linear);
        assert_eq!(config.curve().levels(), 10);
    }

    #[test]
    fn test_additional_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), b"png").unwrap();
        fs::write(dir.path().join("README.md"), b"readme").unwrap();

        let values: BTreeMap<Field, Value> = [
            (Field::Logo, Value::Text("logo.png".to_string())),
            (Field::ExtraFiles, Value::List(vec!["README.md".to_string()])),
            (Field::MainChannels, Value::List(vec!["Kick".to_string()])),
        ]
        .into_iter()
        .collect();
        let (values, range) = validate_all(dir.path(), values).unwrap();
        let config = KitConfig::from_values(values, range).unwrap();

        assert_eq!(config.additional_files(), vec!["logo.png", "README.md"]);
        assert!(config.is_main_channel("Kick"));
        assert!(!config.is_main_channel("Snare"));
    }

    #[test]
    fn test_summary_rows() {
        let config = defaults();
        let summary = config.summary();
        assert_eq!(summary[0], ("Name", "DrumGizmo Kit".to_string()));
        assert!(summary
            .iter()
            .any(|(label, value)| *label == "MIDI note range" && value == "0 - 127 (median 60)"));
    }
}
