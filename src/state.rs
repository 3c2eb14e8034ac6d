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
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::audio::AudioInfo;
use crate::config::KitConfig;
use crate::midimap::MidiMapping;

/// A source recording and its header information.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSource {
    pub instrument: String,
    pub path: PathBuf,
    pub info: AudioInfo,
}

/// One rendered velocity variant.
#[derive(Clone, Debug, PartialEq)]
pub struct Variation {
    pub level: u32,
    pub path: PathBuf,
    /// The volume the variant was rendered with, also written as its power.
    pub volume: f64,
}

/// The rendered variants of an instrument, loudest first.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedInstrument {
    pub instrument: String,
    pub channels: u16,
    pub variations: Vec<Variation>,
}

/// Everything a single generator run knows. Created once per invocation and filled in by the
/// pipeline stages in order.
#[derive(Debug)]
pub struct RunData {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub config: KitConfig,
    /// Populated by the scan stage, sorted by instrument.
    pub audio_sources: Vec<AudioSource>,
    /// Populated by the mapping stage.
    pub midi_mapping: MidiMapping,
    /// Populated by the audio stage, in the same order as the sources.
    pub audio_processed: Vec<ProcessedInstrument>,
    started: Instant,
    generation_time: Option<Duration>,
}

impl RunData {
    pub fn new(source_dir: &Path, target_dir: &Path, config: KitConfig) -> RunData {
        RunData {
            source_dir: source_dir.to_path_buf(),
            target_dir: target_dir.to_path_buf(),
            config,
            audio_sources: Vec::new(),
            midi_mapping: MidiMapping::default(),
            audio_processed: Vec::new(),
            started: Instant::now(),
            generation_time: None,
        }
    }

    /// Instrument names in scan order.
    pub fn instruments(&self) -> Vec<&str> {
        self.audio_sources
            .iter()
            .map(|source| source.instrument.as_str())
            .collect()
    }

    /// Records how long the run took. Later calls keep the first measurement.
    pub fn finish(&mut self) -> Duration {
        *self
            .generation_time
            .get_or_insert_with(|| self.started.elapsed())
    }

    pub fn generation_time(&self) -> Option<Duration> {
        self.generation_time
    }
}
