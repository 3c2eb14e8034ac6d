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

//! Instrument to MIDI note assignment.
//!
//! Instruments are laid out in alphabetical order on consecutive notes centered on the median
//! note. The block never starts below the minimum note; instruments that would land above the
//! maximum note are left out of the note map.

use midly::num::u7;
use tracing::{debug, warn};

use crate::util::compare_names;

/// The validated note range instruments are mapped into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteRange {
    min: u7,
    median: u7,
    max: u7,
}

impl NoteRange {
    /// Creates a new note range. Returns None unless min <= median <= max and min < max.
    pub fn new(min: u7, median: u7, max: u7) -> Option<NoteRange> {
        if min <= median && median <= max && min < max {
            Some(NoteRange { min, median, max })
        } else {
            None
        }
    }

    pub fn min(&self) -> u7 {
        self.min
    }

    pub fn median(&self) -> u7 {
        self.median
    }

    pub fn max(&self) -> u7 {
        self.max
    }

    /// The number of notes available in the range.
    pub fn capacity(&self) -> usize {
        usize::from(self.max.as_int() - self.min.as_int()) + 1
    }
}

/// The result of mapping instruments to notes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MidiMapping {
    /// Mapped instruments in alphabetical order, with strictly increasing notes.
    entries: Vec<(String, u7)>,
    /// Instruments that did not fit in the note range, in alphabetical order.
    dropped: Vec<String>,
}

impl MidiMapping {
    pub fn entries(&self) -> &[(String, u7)] {
        &self.entries
    }

    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Gets the note mapped to the given instrument.
    pub fn note(&self, instrument: &str) -> Option<u7> {
        self.entries
            .iter()
            .find(|(name, _)| name == instrument)
            .map(|(_, note)| *note)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Assigns notes to the given instruments. The instruments are sorted and de-duplicated first,
/// so callers may pass them in any order.
pub fn map_instruments<S: AsRef<str>>(instruments: &[S], range: &NoteRange) -> MidiMapping {
    let mut names: Vec<&str> = instruments.iter().map(|name| name.as_ref()).collect();
    names.sort_by(|a, b| compare_names(a, b));
    names.dedup();

    let mut mapping = MidiMapping::default();
    if names.is_empty() {
        warn!("No instruments found for MIDI mapping");
        return mapping;
    }

    let min = i32::from(range.min.as_int());
    let max = i32::from(range.max.as_int());
    let median = i32::from(range.median.as_int());

    // Integer division puts the extra instrument above the median for even counts.
    let half = i32::try_from(names.len() / 2).unwrap_or(i32::MAX);
    let start = median.saturating_sub(half).max(min);

    for (offset, name) in names.into_iter().enumerate() {
        let note = i32::try_from(offset)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .filter(|note| *note <= max)
            .and_then(|note| u8::try_from(note).ok())
            .and_then(u7::try_from);

        match note {
            Some(note) => {
                debug!(instrument = %name, note = note.as_int(), "Mapped instrument");
                mapping.entries.push((name.to_string(), note));
            }
            None => {
                warn!(
                    instrument = %name,
                    max_note = max,
                    "Instrument does not fit in the MIDI note range and will not be mapped"
                );
                mapping.dropped.push(name.to_string());
            }
        }
    }

    mapping
}
