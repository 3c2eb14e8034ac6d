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
use std::path::Path;
use std::time::Duration;

use crate::error::KitError;

#[cfg(test)]
pub mod mock;
pub mod probe;
pub mod sox;

pub use sox::SoxTool;

/// Header information of a source recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioInfo {
    pub channels: u16,
    pub samplerate: u32,
    pub duration: Duration,
}

impl fmt::Display for AudioInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} channel(s), {} Hz, {:.3}s",
            self.channels,
            self.samplerate,
            self.duration.as_secs_f64()
        )
    }
}

/// One velocity variant to produce from a source recording.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub samplerate: u32,
    pub volume: f64,
}

/// The external audio tool the kit is built with.
pub trait AudioTool {
    /// A display name for the tool.
    fn name(&self) -> &str;

    /// Verifies the tool is available.
    fn check(&self) -> Result<(), KitError>;

    /// Reads the header information of a recording.
    fn probe(&self, path: &Path) -> Result<AudioInfo, KitError>;

    /// Resamples the source and scales its volume into the output file.
    fn render(&self, request: &RenderRequest) -> Result<(), KitError>;
}

/// The file name of a velocity variant: `<level>-<instrument><.ext>`, with the source extension
/// lowercased.
pub fn variant_file_name(level: u32, instrument: &str, source: &Path) -> String {
    match source.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}-{}.{}", level, instrument, ext.to_lowercase()),
        None => format!("{}-{}", level, instrument),
    }
}
