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
mod audio;
mod config;
mod error;
mod kit;
mod midimap;
mod report;
mod scanner;
mod state;
#[cfg(test)]
mod testutil;
mod util;
mod velocity;
mod xml;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::audio::SoxTool;
use crate::config::{Field, Overrides};
use crate::error::KitError;
use crate::report::Reporter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    about = "Generates DrumGizmo drum kits from a directory of samples."
)]
struct Cli {
    /// The directory containing the source samples.
    #[arg(short, long, required_unless_present = "app_version")]
    source: Option<PathBuf>,
    /// The directory the kit is generated into.
    #[arg(short, long, required_unless_present = "app_version")]
    target: Option<PathBuf>,
    /// The configuration file. Defaults to drumgizmo-kit.ini in the source directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Shows detailed progress and debug logging.
    #[arg(short, long)]
    verbose: bool,
    /// Previews the MIDI mapping and velocity levels without writing anything.
    #[arg(short = 'x', long)]
    dry_run: bool,
    /// Disables colored output.
    #[arg(short, long)]
    raw_output: bool,
    /// Prints the generator's version and exits.
    #[arg(short = 'V', long)]
    app_version: bool,

    /// The kit name.
    #[arg(long)]
    name: Option<String>,
    /// The kit version.
    #[arg(long)]
    version: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    license: Option<String>,
    #[arg(long)]
    website: Option<String>,
    /// A logo file, relative to the source directory.
    #[arg(long)]
    logo: Option<String>,
    /// The sample rate of the generated samples.
    #[arg(long)]
    samplerate: Option<String>,
    /// Comma separated files to copy into the kit, relative to the source directory.
    #[arg(long)]
    extra_files: Option<String>,
    /// The number of velocity levels to generate per instrument.
    #[arg(long)]
    velocity_levels: Option<String>,
    #[arg(long)]
    midi_note_min: Option<String>,
    #[arg(long)]
    midi_note_max: Option<String>,
    #[arg(long)]
    midi_note_median: Option<String>,
    /// Comma separated audio file extensions to scan for.
    #[arg(long)]
    extensions: Option<String>,
    /// Comma separated kit channels.
    #[arg(long)]
    channels: Option<String>,
    /// Comma separated main channels, a subset of the kit channels.
    #[arg(long)]
    main_channels: Option<String>,
    /// How volumes decrease across velocity levels: linear or logarithmic.
    #[arg(long)]
    variations_method: Option<String>,
}

impl Cli {
    /// The kit values given on the command line.
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        overrides
            .set(Field::Name, self.name.clone())
            .set(Field::Version, self.version.clone())
            .set(Field::Description, self.description.clone())
            .set(Field::Notes, self.notes.clone())
            .set(Field::Author, self.author.clone())
            .set(Field::License, self.license.clone())
            .set(Field::Website, self.website.clone())
            .set(Field::Logo, self.logo.clone())
            .set(Field::Samplerate, self.samplerate.clone())
            .set(Field::VelocityLevels, self.velocity_levels.clone())
            .set(Field::MidiNoteMin, self.midi_note_min.clone())
            .set(Field::MidiNoteMax, self.midi_note_max.clone())
            .set(Field::MidiNoteMedian, self.midi_note_median.clone())
            .set(Field::Extensions, self.extensions.clone())
            .set(Field::Channels, self.channels.clone())
            .set(Field::MainChannels, self.main_channels.clone())
            .set(Field::ExtraFiles, self.extra_files.clone())
            .set(Field::VariationsMethod, self.variations_method.clone());
        overrides
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!cli.raw_output)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), KitError> {
    let (Some(source), Some(target)) = (cli.source.as_deref(), cli.target.as_deref()) else {
        return Err(KitError::validation(
            "both a source and a target directory are required",
        ));
    };

    let reporter = Reporter::new(cli.raw_output, cli.verbose);
    let overrides = cli.overrides();
    let options = kit::Options {
        source_dir: source,
        target_dir: target,
        config_file: cli.config.as_deref(),
        overrides: &overrides,
        dry_run: cli.dry_run,
    };

    kit::generate(&options, &SoxTool::default(), &reporter)?;
    Ok(())
}

/// Formats a failure for stderr. Verbose output lists the context one entry per line.
fn error_report(e: &KitError, verbose: bool) -> String {
    if !verbose || e.context().is_empty() {
        return format!("Error: {}", e);
    }

    let mut report = format!("Error: {}", e.message());
    for (key, value) in e.context().iter() {
        report.push_str(&format!("\n  {}: {}", key, value));
    }
    report
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.app_version {
        println!("{} {}", xml::APP_NAME, xml::APP_VERSION);
        return ExitCode::SUCCESS;
    }

    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_report(&e, cli.verbose));
            ExitCode::FAILURE
        }
    }
}
