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
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::error::KitError;

use super::{AudioInfo, AudioTool, RenderRequest};

/// A render the mock tool was asked to perform.
#[derive(Clone, Debug, PartialEq)]
pub struct Render {
    pub source: PathBuf,
    pub output: PathBuf,
    pub samplerate: u32,
    pub volume: f64,
}

/// A mock audio tool. Doesn't process audio, but records renders and creates empty output
/// files.
pub struct Tool {
    info: AudioInfo,
    available: bool,
    fail_on: Option<String>,
    renders: RefCell<Vec<Render>>,
}

impl Tool {
    pub fn new() -> Tool {
        Tool {
            info: AudioInfo {
                channels: 1,
                samplerate: 44100,
                duration: Duration::from_millis(10),
            },
            available: true,
            fail_on: None,
            renders: RefCell::new(Vec::new()),
        }
    }

    /// Reports the given header information for every probed file.
    pub fn with_info(mut self, info: AudioInfo) -> Tool {
        self.info = info;
        self
    }

    /// Makes the availability check fail.
    pub fn unavailable(mut self) -> Tool {
        self.available = false;
        self
    }

    /// Fails every render whose source path contains the given text.
    pub fn fail_on(mut self, pattern: &str) -> Tool {
        self.fail_on = Some(pattern.to_string());
        self
    }

    pub fn renders(&self) -> Vec<Render> {
        self.renders.borrow().clone()
    }
}

impl AudioTool for Tool {
    fn name(&self) -> &str {
        "mock"
    }

    fn check(&self) -> Result<(), KitError> {
        if self.available {
            Ok(())
        } else {
            Err(KitError::dependency("mock tool unavailable").with("program", "mock"))
        }
    }

    fn probe(&self, path: &Path) -> Result<AudioInfo, KitError> {
        if !path.is_file() {
            return Err(
                KitError::audio_processing("unable to open audio file").with("file", path.display())
            );
        }
        Ok(self.info)
    }

    fn render(&self, request: &RenderRequest) -> Result<(), KitError> {
        let source = request.source.to_string_lossy();
        if let Some(pattern) = &self.fail_on {
            if source.contains(pattern.as_str()) {
                return Err(KitError::audio_processing("mock render failed")
                    .with("source", request.source.display())
                    .with("exit_code", 2));
            }
        }

        info!(
            source = %request.source.display(),
            output = %request.output.display(),
            volume = request.volume,
            "Rendering (mock)"
        );
        fs::write(request.output, b"").map_err(|e| {
            KitError::directory(format!("unable to write output: {}", e))
                .with("path", request.output.display())
        })?;
        self.renders.borrow_mut().push(Render {
            source: request.source.to_path_buf(),
            output: request.output.to_path_buf(),
            samplerate: request.samplerate,
            volume: request.volume,
        });
        Ok(())
    }
}
