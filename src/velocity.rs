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

//! Velocity level to power/volume curves.
//!
//! Level 1 is always the loudest variant (power 1.0) and level N the quietest (power 1/N).
//! The same value is used as the volume multiplier handed to the audio tool and as the
//! `power` attribute of the instrument descriptor.

use std::fmt;
use std::str::FromStr;

/// How volume decreases across velocity levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VariationsMethod {
    /// Constant steps of 1/N.
    #[default]
    Linear,
    /// Constant ratio between consecutive levels (equal steps in dB).
    Logarithmic,
}

impl VariationsMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariationsMethod::Linear => "linear",
            VariationsMethod::Logarithmic => "logarithmic",
        }
    }
}

impl fmt::Display for VariationsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariationsMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(VariationsMethod::Linear),
            "logarithmic" => Ok(VariationsMethod::Logarithmic),
            other => Err(format!(
                "unknown variations method '{}', expected 'linear' or 'logarithmic'",
                other
            )),
        }
    }
}

/// One velocity level and its normalized power.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityStep {
    pub level: u32,
    pub power: f64,
}

/// Maps a velocity level index in `1..=levels` to a power factor in `(0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VelocityCurve {
    levels: u32,
    method: VariationsMethod,
}

impl VelocityCurve {
    /// Creates a new curve. A curve always has at least one level.
    pub fn new(levels: u32, method: VariationsMethod) -> VelocityCurve {
        VelocityCurve {
            levels: levels.max(1),
            method,
        }
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    pub fn method(&self) -> VariationsMethod {
        self.method
    }

    /// Gets the power for the given level, or None if the level is outside `1..=levels`.
    pub fn power(&self, level: u32) -> Option<f64> {
        if level == 0 || level > self.levels {
            return None;
        }

        let n = f64::from(self.levels);
        let i = f64::from(level);
        Some(match self.method {
            VariationsMethod::Linear => (n - i + 1.0) / n,
            VariationsMethod::Logarithmic => {
                if self.levels == 1 {
                    1.0
                } else {
                    (1.0 / n).powf((i - 1.0) / (n - 1.0))
                }
            }
        })
    }

    /// Iterates over every level from loudest to quietest.
    pub fn steps(&self) -> impl Iterator<Item = VelocityStep> + '_ {
        (1..=self.levels).filter_map(move |level| {
            self.power(level)
                .map(|power| VelocityStep { level, power })
        })
    }
}
