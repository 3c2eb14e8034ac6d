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

/// Structured key/value details attached to a [`KitError`], kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    entries: Vec<(&'static str, String)>,
}

impl ErrorContext {
    /// Sets a context entry, replacing an existing entry with the same key.
    pub fn insert(&mut self, key: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Gets the value stored under the given key.
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        write!(f, " (")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, ")")
    }
}

/// Every failure the kit generator can surface. Each kind carries a message and
/// structured context; stages enrich the context and re-raise the same kind.
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    /// The configuration file is missing, unreadable or unparsable.
    #[error("Configuration error: {message}{context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// A field or whole-config invariant is violated.
    #[error("Validation error: {message}{context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// An external tool is not available.
    #[error("Dependency error: {message}{context}")]
    Dependency {
        message: String,
        context: ErrorContext,
    },

    /// The external audio tool failed for a file.
    #[error("Audio processing error: {message}{context}")]
    AudioProcessing {
        message: String,
        context: ErrorContext,
    },

    /// A filesystem operation failed.
    #[error("Directory error: {message}{context}")]
    Directory {
        message: String,
        context: ErrorContext,
    },

    /// An XML descriptor could not be produced.
    #[error("XML generation error: {message}{context}")]
    XmlGeneration {
        message: String,
        context: ErrorContext,
    },
}

impl KitError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn audio_processing(message: impl Into<String>) -> Self {
        Self::AudioProcessing {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn xml_generation(message: impl Into<String>) -> Self {
        Self::XmlGeneration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Adds a context entry and returns the same kind of error.
    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context_mut().insert(key, value);
        self
    }

    /// The message without its context.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::Validation { message, .. }
            | Self::Dependency { message, .. }
            | Self::AudioProcessing { message, .. }
            | Self::Directory { message, .. }
            | Self::XmlGeneration { message, .. } => message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::Validation { context, .. }
            | Self::Dependency { context, .. }
            | Self::AudioProcessing { context, .. }
            | Self::Directory { context, .. }
            | Self::XmlGeneration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::Validation { context, .. }
            | Self::Dependency { context, .. }
            | Self::AudioProcessing { context, .. }
            | Self::Directory { context, .. }
            | Self::XmlGeneration { context, .. } => context,
        }
    }
}

impl From<config::ConfigError> for KitError {
    fn from(err: config::ConfigError) -> Self {
        KitError::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_in_display() {
        let err = KitError::validation("midi_note_min must be <= midi_note_max")
            .with("key", "midi_note_min")
            .with("value", 90);

        assert_eq!(
            err.to_string(),
            "Validation error: midi_note_min must be <= midi_note_max (key=midi_note_min, value=90)"
        );
        assert_eq!(err.context().get("value"), Some("90"));
    }

    #[test]
    fn test_with_keeps_kind_and_replaces_entries() {
        let err = KitError::audio_processing("sox failed")
            .with("instrument", "Kick")
            .with("instrument", "Snare");

        assert!(matches!(err, KitError::AudioProcessing { .. }));
        assert_eq!(err.context().get("instrument"), Some("Snare"));
        assert_eq!(err.context().iter().count(), 1);
    }

    #[test]
    fn test_display_without_context() {
        let err = KitError::dependency("sox not found");
        assert_eq!(err.to_string(), "Dependency error: sox not found");
        assert!(err.context().is_empty());
        assert_eq!(err.message(), "sox not found");
    }
}
