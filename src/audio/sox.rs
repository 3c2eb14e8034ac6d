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
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::KitError;

use super::{probe, AudioInfo, AudioTool, RenderRequest};

const SOX: &str = "sox";

/// Renders velocity variants with the `sox` command line tool. Headers are probed in-process.
#[derive(Clone, Debug)]
pub struct SoxTool {
    program: OsString,
}

impl Default for SoxTool {
    fn default() -> Self {
        SoxTool::new(SOX)
    }
}

impl SoxTool {
    /// Uses the given program instead of the `sox` found on the path.
    pub fn new(program: impl Into<OsString>) -> SoxTool {
        SoxTool {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn spawn_error(&self, e: io::Error) -> KitError {
        let err = if e.kind() == io::ErrorKind::NotFound {
            KitError::dependency("SoX not found in the system, cannot generate samples")
        } else {
            KitError::dependency(format!("unable to run SoX: {}", e))
        };
        err.with("program", self.program_name())
    }

    fn run(&self, args: &[OsString]) -> Result<Output, KitError> {
        debug!(program = %self.program_name(), ?args, "Running SoX");
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| self.spawn_error(e))
    }
}

/// Formats the volume multiplier for the `vol` effect.
fn volume_arg(volume: f64) -> String {
    format!("{:.6}", volume)
}

impl AudioTool for SoxTool {
    fn name(&self) -> &str {
        SOX
    }

    fn check(&self) -> Result<(), KitError> {
        let output = self.run(&[OsString::from("--version")])?;
        debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "Found SoX"
        );
        Ok(())
    }

    fn probe(&self, path: &Path) -> Result<AudioInfo, KitError> {
        probe::probe_file(path)
    }

    fn render(&self, request: &RenderRequest) -> Result<(), KitError> {
        let args = vec![
            request.source.as_os_str().to_os_string(),
            OsString::from("-r"),
            OsString::from(request.samplerate.to_string()),
            request.output.as_os_str().to_os_string(),
            OsString::from("vol"),
            OsString::from(volume_arg(request.volume)),
        ];

        let output = self.run(&args)?;
        if output.status.success() {
            return Ok(());
        }

        let mut err = KitError::audio_processing("SoX failed to render velocity variant")
            .with("source", request.source.display())
            .with("output", request.output.display())
            .with(
                "stderr",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            );
        if let Some(code) = output.status.code() {
            err = err.with("exit_code", code);
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_arg() {
        assert_eq!(volume_arg(1.0), "1.000000");
        assert_eq!(volume_arg(0.1), "0.100000");
        assert_eq!(volume_arg(2.0 / 3.0), "0.666667");
    }

    #[test]
    fn test_missing_program_is_dependency_error() {
        let tool = SoxTool::new("kitgen-test-program-that-does-not-exist");
        let err = tool.check().unwrap_err();
        assert!(matches!(err, KitError::Dependency { .. }));
        assert_eq!(
            err.context().get("program"),
            Some("kitgen-test-program-that-does-not-exist")
        );

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Kick.wav");
        let output = dir.path().join("1-Kick.wav");
        let err = tool
            .render(&RenderRequest {
                source: &source,
                output: &output,
                samplerate: 44100,
                volume: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, KitError::Dependency { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_render_is_audio_processing_error() {
        // `false` ignores its arguments and exits with status 1.
        let tool = SoxTool::new("false");
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Kick.wav");
        let output = dir.path().join("1-Kick.wav");

        let err = tool
            .render(&RenderRequest {
                source: &source,
                output: &output,
                samplerate: 44100,
                volume: 0.5,
            })
            .unwrap_err();
        assert!(matches!(err, KitError::AudioProcessing { .. }));
        assert_eq!(err.context().get("exit_code"), Some("1"));
        assert_eq!(
            err.context().get("source"),
            Some(source.display().to_string().as_str())
        );
    }
}
