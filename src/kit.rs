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

//! The kit generation pipeline. Each stage works on the run's [`RunData`] and reports
//! progress through the [`Reporter`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, span, warn, Level};

use crate::audio::{self, AudioTool, RenderRequest};
use crate::config::{self, Overrides};
use crate::error::KitError;
use crate::midimap;
use crate::report::Reporter;
use crate::scanner;
use crate::state::{AudioSource, ProcessedInstrument, RunData, Variation};
use crate::util::filename_display;
use crate::xml;

const SAMPLES_DIR: &str = "samples";

/// How a run was invoked.
pub struct Options<'a> {
    pub source_dir: &'a Path,
    pub target_dir: &'a Path,
    pub config_file: Option<&'a Path>,
    pub overrides: &'a Overrides,
    pub dry_run: bool,
}

fn directory_error(message: &str, path: &Path, e: std::io::Error) -> KitError {
    KitError::directory(format!("{}: {}", message, e)).with("path", path.display())
}

/// Runs every stage in order. In dry run mode nothing is written and the MIDI mapping and
/// velocity curve are previewed instead.
pub fn generate(
    options: &Options,
    tool: &dyn AudioTool,
    reporter: &Reporter,
) -> Result<RunData, KitError> {
    let span = span!(Level::INFO, "generate kit");
    let _enter = span.enter();

    validate_directories(options.source_dir, options.target_dir)?;

    reporter.section("Loading Configuration");
    let config = config::load(options.source_dir, options.config_file, options.overrides)?;
    let mut run = RunData::new(options.source_dir, options.target_dir, config);
    print_metadata(&run, reporter);

    scan_audio_sources(&mut run, tool, reporter)?;
    evaluate_midi_mapping(&mut run);

    if options.dry_run {
        reporter.message("Dry run mode enabled, no files will be created");
        print_midi_mapping(&run, reporter);
        print_velocity_curve(&run, reporter);
        run.finish();
        return Ok(run);
    }

    info!(tool = tool.name(), "Checking audio tool");
    tool.check()?;
    prepare_target_directory(&run, reporter)?;
    process_audio_files(&mut run, tool, reporter)?;
    generate_xml_files(&run, reporter)?;
    copy_additional_files(&run, reporter)?;
    run.finish();
    print_summary(&run, reporter);

    Ok(run)
}

/// The source must be an existing directory. The target may not exist yet, but its parent must,
/// and it must not be the source itself.
pub fn validate_directories(source_dir: &Path, target_dir: &Path) -> Result<(), KitError> {
    if !source_dir.is_dir() {
        return Err(KitError::validation(format!(
            "source directory '{}' does not exist",
            source_dir.display()
        ))
        .with("path", source_dir.display()));
    }

    if target_dir.exists() {
        if !target_dir.is_dir() {
            return Err(KitError::validation(format!(
                "target '{}' is not a directory",
                target_dir.display()
            ))
            .with("path", target_dir.display()));
        }

        let same = match (source_dir.canonicalize(), target_dir.canonicalize()) {
            (Ok(source), Ok(target)) => source == target,
            _ => false,
        };
        if same {
            return Err(KitError::validation(
                "target directory must be different from the source directory",
            )
            .with("path", target_dir.display()));
        }
    } else {
        let parent = target_dir
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !parent.is_dir() {
            return Err(KitError::validation(format!(
                "parent directory of target '{}' does not exist",
                parent.display()
            ))
            .with("path", parent.display()));
        }
    }

    Ok(())
}

/// Lists the resolved configuration.
pub fn print_metadata(run: &RunData, reporter: &Reporter) {
    reporter.section("Kit Metadata");
    for (label, value) in run.config.summary() {
        if !value.is_empty() {
            reporter.item(label, &value);
        }
    }
}

/// Finds the source recordings and reads their headers.
pub fn scan_audio_sources(
    run: &mut RunData,
    tool: &dyn AudioTool,
    reporter: &Reporter,
) -> Result<(), KitError> {
    reporter.section("Scanning Source Directory");

    let samples = scanner::scan(&run.source_dir, &run.config.extensions)?;
    if samples.is_empty() {
        warn!(path = %run.source_dir.display(), "No audio files found");
    }

    reporter.line(&format!("Found {} audio files:", samples.len()));
    for sample in samples {
        let info = tool
            .probe(&sample.path)
            .map_err(|e| e.with("instrument", &sample.instrument).with("stage", "scan"))?;
        reporter.item(&sample.instrument, filename_display(&sample.path));
        reporter.detail(&format!("    {}", info));
        run.audio_sources.push(AudioSource {
            instrument: sample.instrument,
            path: sample.path,
            info,
        });
    }

    Ok(())
}

/// Assigns MIDI notes to the scanned instruments.
pub fn evaluate_midi_mapping(run: &mut RunData) {
    let instruments = run.instruments();
    let mapping = midimap::map_instruments(&instruments, &run.config.midi_notes);
    info!(
        mapped = mapping.len(),
        capacity = run.config.midi_notes.capacity(),
        "Evaluated MIDI mapping"
    );
    run.midi_mapping = mapping;
}

pub fn print_midi_mapping(run: &RunData, reporter: &Reporter) {
    reporter.section("MIDI Mapping Preview");
    if run.midi_mapping.is_empty() {
        reporter.line("No instruments found for MIDI mapping");
        return;
    }

    reporter.line("MIDI mapping preview (alphabetical order):");
    for (instrument, note) in run.midi_mapping.entries() {
        reporter.line(&format!("- MIDI Note {}: {}", note.as_int(), instrument));
    }
    for instrument in run.midi_mapping.dropped() {
        reporter.line(&format!("- Not mapped (outside the note range): {}", instrument));
    }
}

pub fn print_velocity_curve(run: &RunData, reporter: &Reporter) {
    let curve = run.config.curve();
    reporter.section("Velocity Levels Preview");
    reporter.line(&format!(
        "{} levels, {} volume variations:",
        curve.levels(),
        curve.method()
    ));
    for step in curve.steps() {
        reporter.line(&format!("- Level {}: power {:.6}", step.level, step.power));
    }
}

/// Creates the target directory, or empties it if it already exists.
pub fn prepare_target_directory(run: &RunData, reporter: &Reporter) -> Result<(), KitError> {
    reporter.section("Preparing Target Directory");
    let target = run.target_dir.as_path();

    if !target.exists() {
        reporter.line(&format!("Creating target directory '{}'", target.display()));
        return fs::create_dir_all(target)
            .map_err(|e| directory_error("unable to create target directory", target, e));
    }

    reporter.line(&format!("Cleaning target directory '{}'", target.display()));
    let entries = fs::read_dir(target)
        .map_err(|e| directory_error("unable to read target directory", target, e))?;
    for entry in entries {
        let path = entry
            .map_err(|e| directory_error("unable to read target directory", target, e))?
            .path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| directory_error("unable to clean target directory", &path, e))?;
    }

    Ok(())
}

/// Renders every velocity level of every instrument. The first failure aborts the stage.
pub fn process_audio_files(
    run: &mut RunData,
    tool: &dyn AudioTool,
    reporter: &Reporter,
) -> Result<(), KitError> {
    reporter.section("Processing Audio Files");
    let curve = run.config.curve();
    let samplerate = run.config.samplerate;

    let mut processed = Vec::with_capacity(run.audio_sources.len());
    for (index, source) in run.audio_sources.iter().enumerate() {
        reporter.line(&format!(
            "[{}/{}] Processing {}",
            index + 1,
            run.audio_sources.len(),
            filename_display(&source.path)
        ));

        let samples_dir = run.target_dir.join(&source.instrument).join(SAMPLES_DIR);
        fs::create_dir_all(&samples_dir)
            .map_err(|e| {
                directory_error("unable to create instrument directory", &samples_dir, e)
            })
            .map_err(|e| e.with("instrument", &source.instrument))?;

        let mut variations = Vec::new();
        for step in curve.steps() {
            let output = samples_dir.join(audio::variant_file_name(
                step.level,
                &source.instrument,
                &source.path,
            ));
            tool.render(&RenderRequest {
                source: &source.path,
                output: &output,
                samplerate,
                volume: step.power,
            })
            .map_err(|e| {
                e.with("instrument", &source.instrument)
                    .with("level", step.level)
                    .with("stage", "audio")
            })?;
            debug!(
                instrument = source.instrument.as_str(),
                level = step.level,
                volume = step.power,
                "Rendered velocity variant"
            );
            variations.push(Variation {
                level: step.level,
                path: output,
                volume: step.power,
            });
        }

        reporter.detail(&format!(
            "    {} velocity variations created",
            variations.len()
        ));
        processed.push(ProcessedInstrument {
            instrument: source.instrument.clone(),
            channels: source.info.channels,
            variations,
        });
    }

    run.audio_processed = processed;
    info!(instruments = run.audio_processed.len(), "Processed audio files");
    Ok(())
}

/// Writes the kit, instrument and MIDI map descriptors. The MIDI map is skipped when no
/// instrument could be mapped.
pub fn generate_xml_files(run: &RunData, reporter: &Reporter) -> Result<(), KitError> {
    reporter.section("Generating XML Files");
    let generated_at = Local::now().naive_local();
    let with_stage = |e: KitError| e.with("stage", "xml");

    let drumkit = xml::render_drumkit(&run.config, &run.instruments(), &generated_at)
        .map_err(with_stage)?;
    let drumkit_path = run.target_dir.join(xml::DRUMKIT_FILE);
    xml::write_document(&drumkit_path, &drumkit).map_err(with_stage)?;
    reporter.line(&format!("Created {}", drumkit_path.display()));

    for processed in run.audio_processed.iter() {
        let path = instrument_xml_path(&run.target_dir, &processed.instrument);
        xml::render_instrument(&run.config, processed)
            .and_then(|contents| xml::write_document(&path, &contents))
            .map_err(|e| with_stage(e).with("instrument", &processed.instrument))?;
        reporter.detail(&format!("Created {}", path.display()));
    }

    if run.midi_mapping.is_empty() {
        warn!("No instruments mapped, skipping MIDI map generation");
        return Ok(());
    }
    let midimap_path = run.target_dir.join(xml::MIDIMAP_FILE);
    let midimap = xml::render_midimap(&run.midi_mapping).map_err(with_stage)?;
    xml::write_document(&midimap_path, &midimap).map_err(with_stage)?;
    reporter.line(&format!("Created {}", midimap_path.display()));

    Ok(())
}

fn instrument_xml_path(target_dir: &Path, instrument: &str) -> PathBuf {
    target_dir
        .join(instrument)
        .join(format!("{}.xml", instrument))
}

/// Copies the logo and extra files into the kit, keeping their paths relative to the source
/// directory.
pub fn copy_additional_files(run: &RunData, reporter: &Reporter) -> Result<(), KitError> {
    let files = run.config.additional_files();
    if files.is_empty() {
        return Ok(());
    }

    reporter.section("Copying Additional Files");
    for file in files {
        let source = run.source_dir.join(file);
        let destination = run.target_dir.join(file);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| directory_error("unable to create directory", parent, e))?;
        }
        fs::copy(&source, &destination)
            .map_err(|e| directory_error("unable to copy file", &source, e))?;
        reporter.line(&format!("Copied '{}'", file));
    }

    Ok(())
}

pub fn print_summary(run: &RunData, reporter: &Reporter) {
    reporter.section("Summary");
    match run.generation_time() {
        Some(elapsed) => reporter.line(&format!(
            "Processing complete in {:.2} seconds.",
            elapsed.as_secs_f64()
        )),
        None => reporter.line("Processing complete."),
    }
    reporter.message(&format!(
        "DrumGizmo kit successfully created in {}",
        run.target_dir.display()
    ));

    reporter.line("\nMain files:");
    reporter.line(&format!(
        "  - {}",
        run.target_dir.join(xml::DRUMKIT_FILE).display()
    ));
    if !run.midi_mapping.is_empty() {
        reporter.line(&format!(
            "  - {}",
            run.target_dir.join(xml::MIDIMAP_FILE).display()
        ));
    }

    reporter.line(&format!(
        "\nNumber of instruments created: {}",
        run.audio_processed.len()
    ));
    reporter.line("\nInstrument samples MIDI mapping:");
    for processed in run.audio_processed.iter() {
        let note = run
            .midi_mapping
            .note(&processed.instrument)
            .map(|note| note.as_int().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        reporter.line(&format!("  - MIDI note {}: {}", note, processed.instrument));
    }

    let files = run.config.additional_files();
    if !files.is_empty() {
        reporter.line("\nExtra files copied:");
        for file in files {
            reporter.line(&format!("  - {}", file));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;
    use crate::audio::{mock, AudioInfo};
    use crate::config::Field;
    use crate::report::capture::Buffer;
    use crate::testutil::write_source_kit;

    fn reporter() -> (Reporter, Buffer) {
        let buffer = Buffer::default();
        (Reporter::with_writer(true, false, buffer.clone()), buffer)
    }

    fn overrides(values: &[(Field, &str)]) -> Overrides {
        let mut cli = Overrides::new();
        for (field, value) in values {
            cli.set(*field, Some(value.to_string()));
        }
        cli
    }

    fn options<'a>(
        source: &'a Path,
        target: &'a Path,
        overrides: &'a Overrides,
        dry_run: bool,
    ) -> Options<'a> {
        Options {
            source_dir: source,
            target_dir: target,
            config_file: None,
            overrides,
            dry_run,
        }
    }

    #[test]
    fn test_generate_kit() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_source_kit(source.path(), &["Kick", "HiHat", "Snare"]).unwrap();
        fs::write(source.path().join("README.md"), b"readme").unwrap();

        let cli = overrides(&[
            (Field::VelocityLevels, "3"),
            (Field::MidiNoteMin, "35"),
            (Field::MidiNoteMax, "81"),
            (Field::MidiNoteMedian, "60"),
            (Field::Channels, "Kick,Snare,OH"),
            (Field::MainChannels, "OH"),
            (Field::ExtraFiles, "README.md"),
        ]);
        let tool = mock::Tool::new();
        let (reporter, output) = reporter();
        let run = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap();

        let notes: Vec<(&str, u8)> = run
            .midi_mapping
            .entries()
            .iter()
            .map(|(name, note)| (name.as_str(), note.as_int()))
            .collect();
        assert_eq!(notes, vec![("HiHat", 59), ("Kick", 60), ("Snare", 61)]);

        let renders = tool.renders();
        assert_eq!(renders.len(), 9);
        assert_eq!(renders[0].output, target.path().join("HiHat/samples/1-HiHat.wav"));
        assert_eq!(renders[0].volume, 1.0);
        assert_eq!(renders[0].samplerate, 44100);
        assert!((renders[2].volume - 1.0 / 3.0).abs() < 1e-9);

        for instrument in ["HiHat", "Kick", "Snare"] {
            for level in 1..=3 {
                assert!(target
                    .path()
                    .join(format!("{}/samples/{}-{}.wav", instrument, level, instrument))
                    .is_file());
            }
            assert!(target
                .path()
                .join(format!("{}/{}.xml", instrument, instrument))
                .is_file());
        }
        assert!(target.path().join("drumkit.xml").is_file());
        assert!(target.path().join("README.md").is_file());

        let midimap = fs::read_to_string(target.path().join("midimap.xml")).unwrap();
        assert!(midimap.contains("note=\"59\" instr=\"HiHat\""));

        let kick = fs::read_to_string(target.path().join("Kick/Kick.xml")).unwrap();
        assert!(kick.contains("power=\"0.666667\""));

        assert!(run.generation_time().is_some());
        assert!(output.contents().contains("Number of instruments created: 3"));
    }

    #[test]
    fn test_stereo_sources_alternate_file_channels() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_source_kit(source.path(), &["Kick"]).unwrap();

        let cli = overrides(&[
            (Field::VelocityLevels, "1"),
            (Field::Channels, "AmbL,AmbR,Kick"),
        ]);
        let tool = mock::Tool::new().with_info(AudioInfo {
            channels: 2,
            samplerate: 48000,
            duration: Duration::from_millis(250),
        });
        let (reporter, _) = reporter();
        let run = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap();

        assert_eq!(run.audio_sources[0].info.channels, 2);
        assert_eq!(run.audio_processed[0].channels, 2);

        let kick = fs::read_to_string(target.path().join("Kick/Kick.xml")).unwrap();
        assert!(kick.contains("channel=\"AmbL\" file=\"samples/1-Kick.wav\" filechannel=\"1\""));
        assert!(kick.contains("channel=\"AmbR\" file=\"samples/1-Kick.wav\" filechannel=\"2\""));
        assert!(kick.contains("channel=\"Kick\" file=\"samples/1-Kick.wav\" filechannel=\"1\""));
    }

    #[test]
    fn test_dry_run_leaves_filesystem_untouched() {
        let source = tempfile::tempdir().unwrap();
        let parent = tempfile::tempdir().unwrap();
        let target = parent.path().join("kit");
        write_source_kit(source.path(), &["Kick", "Snare"]).unwrap();

        let cli = Overrides::new();
        let tool = mock::Tool::new();
        let (reporter, output) = reporter();
        let run = generate(&options(source.path(), &target, &cli, true), &tool, &reporter).unwrap();

        assert!(!target.exists());
        assert!(tool.renders().is_empty());
        assert_eq!(run.midi_mapping.len(), 2);
        assert!(run.audio_processed.is_empty());

        let output = output.contents();
        assert!(output.contains("- MIDI Note 59: Kick"));
        assert!(output.contains("- MIDI Note 60: Snare"));
        assert!(output.contains("- Level 10: power 0.100000"));
    }

    #[test]
    fn test_audio_failure_aborts_remaining_instruments() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_source_kit(source.path(), &["Crash", "Kick", "Snare"]).unwrap();

        let cli = overrides(&[(Field::VelocityLevels, "2")]);
        let tool = mock::Tool::new().fail_on("Kick");
        let (reporter, _) = reporter();
        let err = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap_err();

        assert!(matches!(err, KitError::AudioProcessing { .. }));
        assert_eq!(err.context().get("instrument"), Some("Kick"));
        assert_eq!(err.context().get("stage"), Some("audio"));

        let rendered: Vec<PathBuf> = tool.renders().into_iter().map(|r| r.source).collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|path| path.ends_with("Crash.wav")));
        assert!(!target.path().join("Snare").exists());
        assert!(!target.path().join("drumkit.xml").exists());
    }

    #[test]
    fn test_missing_tool_is_dependency_error() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_source_kit(source.path(), &["Kick"]).unwrap();

        let cli = Overrides::new();
        let tool = mock::Tool::new().unavailable();
        let (reporter, _) = reporter();
        let err = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap_err();
        assert!(matches!(err, KitError::Dependency { .. }));
    }

    #[test]
    fn test_empty_source_skips_midimap() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        let cli = Overrides::new();
        let tool = mock::Tool::new();
        let (reporter, _) = reporter();
        let run = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap();

        assert!(run.midi_mapping.is_empty());
        assert!(target.path().join("drumkit.xml").is_file());
        assert!(!target.path().join("midimap.xml").exists());
    }

    #[test]
    fn test_overflowing_instruments_stay_in_kit() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        write_source_kit(source.path(), &["A", "B", "C", "D"]).unwrap();

        let cli = overrides(&[
            (Field::VelocityLevels, "1"),
            (Field::MidiNoteMin, "40"),
            (Field::MidiNoteMedian, "41"),
            (Field::MidiNoteMax, "42"),
        ]);
        let tool = mock::Tool::new();
        let (reporter, _) = reporter();
        let run = generate(
            &options(source.path(), target.path(), &cli, false),
            &tool,
            &reporter,
        )
        .unwrap();

        assert_eq!(run.midi_mapping.len(), 3);
        assert_eq!(run.midi_mapping.dropped(), &["D".to_string()]);
        assert_eq!(run.audio_processed.len(), 4);

        let drumkit = fs::read_to_string(target.path().join("drumkit.xml")).unwrap();
        assert!(drumkit.contains("<instrument name=\"D\" file=\"D/D.xml\">"));
        let midimap = fs::read_to_string(target.path().join("midimap.xml")).unwrap();
        assert!(!midimap.contains("instr=\"D\""));
    }

    #[test]
    fn test_prepare_target_cleans_existing_directory() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::create_dir(target.path().join("old")).unwrap();
        fs::write(target.path().join("old/file.wav"), b"").unwrap();
        fs::write(target.path().join("stale.xml"), b"").unwrap();

        let config = config::load(source.path(), None, &Overrides::new()).unwrap();
        let run = RunData::new(source.path(), target.path(), config);
        let (reporter, _) = reporter();
        prepare_target_directory(&run, &reporter).unwrap();

        assert!(target.path().is_dir());
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_validate_directories() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        assert!(validate_directories(source.path(), target.path()).is_ok());
        assert!(validate_directories(source.path(), &target.path().join("new")).is_ok());

        let err = validate_directories(&source.path().join("missing"), target.path()).unwrap_err();
        assert!(matches!(err, KitError::Validation { .. }));

        let err = validate_directories(source.path(), &target.path().join("a/b")).unwrap_err();
        assert!(err.message().contains("parent directory"));

        assert!(validate_directories(source.path(), source.path()).is_err());

        let file = target.path().join("file");
        fs::write(&file, b"").unwrap();
        assert!(validate_directories(source.path(), &file).is_err());
    }
}
