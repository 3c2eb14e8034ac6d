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
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;
use tracing::debug;

use crate::error::KitError;

use super::AudioInfo;

fn probe_error(path: &Path, message: impl Into<String>) -> KitError {
    KitError::audio_processing(message).with("file", path.display())
}

/// Reads channel count, sample rate and duration from the file headers. Nothing is decoded.
pub fn probe_file(path: &Path) -> Result<AudioInfo, KitError> {
    let file = File::open(path)
        .map_err(|e| probe_error(path, format!("unable to open audio file: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| probe_error(path, format!("unsupported audio file: {}", e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| probe_error(path, "no audio track found"))?;
    let params = &track.codec_params;

    let samplerate = params
        .sample_rate
        .ok_or_else(|| probe_error(path, "sample rate not specified"))?;
    let channels = params
        .channels
        .map(|c| u16::try_from(c.count()).unwrap_or(u16::MAX))
        .unwrap_or(1);
    let duration = match params.n_frames {
        Some(n_frames) if samplerate > 0 => {
            Duration::from_secs_f64(n_frames as f64 / f64::from(samplerate))
        }
        _ => Duration::ZERO,
    };

    let info = AudioInfo {
        channels,
        samplerate,
        duration,
    };
    debug!(file = %path.display(), info = %info, "Probed audio file");
    Ok(info)
}
