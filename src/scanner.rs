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
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::KitError;
use crate::util::{compare_names, filename_display};

const CONVERTED_MARKER: &str = "_converted";

/// A single-hit recording found in the source directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSample {
    pub instrument: String,
    pub path: PathBuf,
}

/// Derives the instrument name from a file stem: a leading velocity prefix (`1-` to `9-`) and
/// any `_converted` marker are removed.
pub fn instrument_name(stem: &str) -> String {
    let mut chars = stem.chars();
    let without_prefix = match (chars.next(), chars.next()) {
        (Some('1'..='9'), Some('-')) => chars.as_str(),
        _ => stem,
    };
    without_prefix.replace(CONVERTED_MARKER, "")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

fn collect_files(
    dir: &Path,
    extensions: &[String],
    files: &mut Vec<PathBuf>,
) -> Result<(), KitError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        KitError::directory(format!("unable to read directory: {}", e)).with("path", dir.display())
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| {
                KitError::directory(format!("unable to read directory entry: {}", e))
                    .with("path", dir.display())
            })?
            .path();

        if path.is_dir() {
            collect_files(&path, extensions, files)?;
        } else if has_extension(&path, extensions) {
            debug!(file = filename_display(&path), "Found audio file");
            files.push(path);
        }
    }

    Ok(())
}

/// Recurses into the source directory and returns one sample per instrument, sorted by
/// instrument name. When several files map to the same instrument, the first file in
/// file-name order is kept.
pub fn scan(source_dir: &Path, extensions: &[String]) -> Result<Vec<SourceSample>, KitError> {
    let mut files = Vec::new();
    collect_files(source_dir, extensions, &mut files)?;
    files.sort_by(|a, b| {
        compare_names(filename_display(a), filename_display(b)).then_with(|| a.cmp(b))
    });

    let mut samples: Vec<SourceSample> = Vec::new();
    for path in files {
        let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");
        let instrument = instrument_name(stem);
        if instrument.is_empty() {
            warn!(file = %path.display(), "Skipping file without an instrument name");
            continue;
        }

        match samples.iter().find(|sample| sample.instrument == instrument) {
            Some(existing) => warn!(
                instrument = %instrument,
                kept = %existing.path.display(),
                skipped = %path.display(),
                "Duplicate instrument, skipping file"
            ),
            None => samples.push(SourceSample { instrument, path }),
        }
    }

    samples.sort_by(|a, b| compare_names(&a.instrument, &b.instrument));
    debug!(count = samples.len(), "Scanned source directory");
    Ok(samples)
}
