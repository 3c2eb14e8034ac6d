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
use std::fmt;

use crate::error::KitError;
use crate::velocity::VariationsMethod;

use super::transform::{self, Transformed};
use super::validate::{self, ValidationScope};

/// Every configurable kit field. The declaration order is the order fields are resolved,
/// transformed and validated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Version,
    Description,
    Notes,
    Author,
    License,
    Website,
    Logo,
    Samplerate,
    VelocityLevels,
    MidiNoteMin,
    MidiNoteMax,
    MidiNoteMedian,
    Extensions,
    Channels,
    MainChannels,
    ExtraFiles,
    VariationsMethod,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Name,
        Field::Version,
        Field::Description,
        Field::Notes,
        Field::Author,
        Field::License,
        Field::Website,
        Field::Logo,
        Field::Samplerate,
        Field::VelocityLevels,
        Field::MidiNoteMin,
        Field::MidiNoteMax,
        Field::MidiNoteMedian,
        Field::Extensions,
        Field::Channels,
        Field::MainChannels,
        Field::ExtraFiles,
        Field::VariationsMethod,
    ];

    /// The registry entry for this field.
    pub fn spec(self) -> &'static FieldSpec {
        &REGISTRY[self as usize]
    }

    /// The key used in config files, without any prefix.
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Looks up a field by its key. Matching is case-insensitive.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }

    /// Fields that are checked against other fields and must be validated after the rest.
    pub fn is_relational(self) -> bool {
        matches!(self, Field::MainChannels)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value as it comes out of the CLI or a config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// A typed field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    List(Vec<String>),
    Method(VariationsMethod),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<VariationsMethod> {
        match self {
            Value::Method(method) => Some(*method),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Text(value) => f.write_str(value),
            Value::List(values) => f.write_str(&values.join(", ")),
            Value::Method(method) => write!(f, "{}", method),
        }
    }
}

/// The shape a field's value takes after transformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    List,
    Method,
}

pub type TransformFn = fn(&FieldSpec, Option<&RawValue>) -> Transformed<Value>;
pub type ValidateFn = fn(&FieldSpec, Value, &ValidationScope) -> Result<Value, KitError>;

/// One registry entry: how a field is named, defaulted, coerced and checked.
pub struct FieldSpec {
    pub field: Field,
    pub key: &'static str,
    pub kind: FieldKind,
    /// The default in its raw textual form. Lists are comma separated.
    pub default: &'static str,
    pub transform: TransformFn,
    pub validate: ValidateFn,
}

impl FieldSpec {
    /// The typed default value.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Text => Value::Text(self.default.to_string()),
            FieldKind::Integer => Value::Integer(self.default.parse().unwrap_or_default()),
            FieldKind::List => Value::List(crate::util::split_comma_separated(self.default)),
            FieldKind::Method => Value::Text(self.default.to_string()),
        }
    }

    pub fn transform(&self, raw: Option<&RawValue>) -> Transformed<Value> {
        (self.transform)(self, raw)
    }

    pub fn validate(&self, value: Value, scope: &ValidationScope) -> Result<Value, KitError> {
        (self.validate)(self, value, scope)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field", &self.field)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .finish()
    }
}

pub const DEFAULT_NAME: &str = "DrumGizmo Kit";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_LICENSE: &str = "Private license";
pub const DEFAULT_SAMPLERATE: &str = "44100";
pub const DEFAULT_VELOCITY_LEVELS: &str = "10";
pub const DEFAULT_MIDI_NOTE_MIN: &str = "0";
pub const DEFAULT_MIDI_NOTE_MAX: &str = "127";
pub const DEFAULT_MIDI_NOTE_MEDIAN: &str = "60";
pub const DEFAULT_EXTENSIONS: &str = "wav,WAV,flac,FLAC,ogg,OGG";
pub const DEFAULT_CHANNELS: &str = "AmbL,AmbR,Hihat,Kick,OHL,OHR,Ride,Snare,Tom1,Tom2,Tom3";
pub const DEFAULT_VARIATIONS_METHOD: &str = "linear";

const fn text(field: Field, key: &'static str, default: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        key,
        kind: FieldKind::Text,
        default,
        transform: transform::text,
        validate: validate::accept,
    }
}

/// The registry, indexed by `Field as usize`.
static REGISTRY: [FieldSpec; 18] = [
    text(Field::Name, "name", DEFAULT_NAME),
    text(Field::Version, "version", DEFAULT_VERSION),
    text(Field::Description, "description", ""),
    text(Field::Notes, "notes", ""),
    text(Field::Author, "author", ""),
    text(Field::License, "license", DEFAULT_LICENSE),
    text(Field::Website, "website", ""),
    FieldSpec {
        field: Field::Logo,
        key: "logo",
        kind: FieldKind::Text,
        default: "",
        transform: transform::text,
        validate: validate::source_file,
    },
    FieldSpec {
        field: Field::Samplerate,
        key: "samplerate",
        kind: FieldKind::Integer,
        default: DEFAULT_SAMPLERATE,
        transform: transform::integer,
        validate: validate::positive,
    },
    FieldSpec {
        field: Field::VelocityLevels,
        key: "velocity_levels",
        kind: FieldKind::Integer,
        default: DEFAULT_VELOCITY_LEVELS,
        transform: transform::integer,
        validate: validate::positive,
    },
    FieldSpec {
        field: Field::MidiNoteMin,
        key: "midi_note_min",
        kind: FieldKind::Integer,
        default: DEFAULT_MIDI_NOTE_MIN,
        transform: transform::integer,
        validate: validate::midi_note,
    },
    FieldSpec {
        field: Field::MidiNoteMax,
        key: "midi_note_max",
        kind: FieldKind::Integer,
        default: DEFAULT_MIDI_NOTE_MAX,
        transform: transform::integer,
        validate: validate::midi_note,
    },
    FieldSpec {
        field: Field::MidiNoteMedian,
        key: "midi_note_median",
        kind: FieldKind::Integer,
        default: DEFAULT_MIDI_NOTE_MEDIAN,
        transform: transform::integer,
        validate: validate::midi_note,
    },
    FieldSpec {
        field: Field::Extensions,
        key: "extensions",
        kind: FieldKind::List,
        default: DEFAULT_EXTENSIONS,
        transform: transform::list,
        validate: validate::non_empty_list,
    },
    FieldSpec {
        field: Field::Channels,
        key: "channels",
        kind: FieldKind::List,
        default: DEFAULT_CHANNELS,
        transform: transform::list,
        validate: validate::non_empty_list,
    },
    FieldSpec {
        field: Field::MainChannels,
        key: "main_channels",
        kind: FieldKind::List,
        default: "",
        transform: transform::list,
        validate: validate::main_channels,
    },
    FieldSpec {
        field: Field::ExtraFiles,
        key: "extra_files",
        kind: FieldKind::List,
        default: "",
        transform: transform::list,
        validate: validate::source_files,
    },
    FieldSpec {
        field: Field::VariationsMethod,
        key: "variations_method",
        kind: FieldKind::Method,
        default: DEFAULT_VARIATIONS_METHOD,
        transform: transform::method,
        validate: validate::method,
    },
];
