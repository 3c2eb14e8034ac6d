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

//! DrumGizmo descriptor documents: the kit (`drumkit.xml`), one per instrument, and the MIDI
//! note map (`midimap.xml`).

use std::fmt::Display;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::config::KitConfig;
use crate::error::KitError;
use crate::midimap::MidiMapping;
use crate::state::ProcessedInstrument;
use crate::util::filename_display;

pub const DRUMKIT_FILE: &str = "drumkit.xml";
pub const MIDIMAP_FILE: &str = "midimap.xml";

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn xml_error(e: impl Display) -> KitError {
    KitError::xml_generation(format!("unable to write XML: {}", e))
}

/// A small indenting document builder.
struct Document {
    writer: Writer<Vec<u8>>,
}

impl Document {
    fn new() -> Result<Document, KitError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        Ok(Document { writer })
    }

    fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        element
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), KitError> {
        self.writer
            .write_event(Event::Start(Self::element(name, attributes)))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<(), KitError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), KitError> {
        self.writer
            .write_event(Event::Empty(Self::element(name, attributes)))
            .map_err(xml_error)
    }

    fn text(&mut self, name: &str, text: &str) -> Result<(), KitError> {
        self.start(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end(name)
    }

    fn finish(self) -> Result<String, KitError> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(xml_error)
    }
}

fn write_metadata(
    doc: &mut Document,
    config: &KitConfig,
    generated_at: &NaiveDateTime,
) -> Result<(), KitError> {
    doc.start("metadata", &[])?;
    doc.text("title", &config.name)?;
    doc.text("version", &config.version)?;
    if !config.description.is_empty() {
        doc.text("description", &config.description)?;
    }

    let notes = if config.notes.is_empty() {
        format!(
            "DrumGizmo kit generated with {} - Generated at {}",
            APP_NAME,
            generated_at.format("%Y-%m-%d %H:%M")
        )
    } else {
        config.notes.clone()
    };
    doc.text("notes", &notes)?;

    if !config.author.is_empty() {
        doc.text("author", &config.author)?;
    }
    doc.text("license", &config.license)?;
    doc.text("samplerate", &config.samplerate.to_string())?;
    if !config.website.is_empty() {
        doc.text("website", &config.website)?;
    }
    if !config.logo.is_empty() {
        doc.empty("logo", &[("src", config.logo.as_str())])?;
    }
    doc.text(
        "created",
        &format!(
            "Generated on {} with {} v{}",
            generated_at.format("%Y-%m-%d %H:%M:%S"),
            APP_NAME,
            APP_VERSION
        ),
    )?;
    doc.end("metadata")
}

/// Renders the kit descriptor listing every instrument, with a channel map per channel.
pub fn render_drumkit(
    config: &KitConfig,
    instruments: &[&str],
    generated_at: &NaiveDateTime,
) -> Result<String, KitError> {
    let samplerate = config.samplerate.to_string();
    let mut doc = Document::new()?;
    doc.start(
        "drumkit",
        &[
            ("version", "1.0"),
            ("name", config.name.as_str()),
            ("samplerate", samplerate.as_str()),
        ],
    )?;
    write_metadata(&mut doc, config, generated_at)?;

    doc.start("channels", &[])?;
    for channel in config.channels.iter() {
        doc.empty("channel", &[("name", channel.as_str())])?;
    }
    doc.end("channels")?;

    doc.start("instruments", &[])?;
    for instrument in instruments.iter().copied() {
        let file = format!("{}/{}.xml", instrument, instrument);
        doc.start("instrument", &[("name", instrument), ("file", file.as_str())])?;
        for channel in config.channels.iter().map(String::as_str) {
            if config.is_main_channel(channel) {
                doc.empty(
                    "channelmap",
                    &[("in", channel), ("out", channel), ("main", "true")],
                )?;
            } else {
                doc.empty("channelmap", &[("in", channel), ("out", channel)])?;
            }
        }
        doc.end("instrument")?;
    }
    doc.end("instruments")?;

    doc.end("drumkit")?;
    doc.finish()
}

/// Renders an instrument descriptor: one sample per velocity level, powered by the volume the
/// variant was rendered with, and one audio file reference per kit channel.
pub fn render_instrument(
    config: &KitConfig,
    processed: &ProcessedInstrument,
) -> Result<String, KitError> {
    let instrument = processed.instrument.as_str();
    let source_channels = usize::from(processed.channels.max(1));

    let mut doc = Document::new()?;
    doc.start("instrument", &[("version", "2.0"), ("name", instrument)])?;
    doc.start("samples", &[])?;
    for variation in processed.variations.iter() {
        let name = format!("{}-{}", instrument, variation.level);
        let power = format!("{:.6}", variation.volume);
        doc.start(
            "sample",
            &[("name", name.as_str()), ("power", power.as_str())],
        )?;

        let file = format!("samples/{}", filename_display(&variation.path));
        for (index, channel) in config.channels.iter().enumerate() {
            let filechannel = ((index % source_channels) + 1).to_string();
            doc.empty(
                "audiofile",
                &[
                    ("channel", channel.as_str()),
                    ("file", file.as_str()),
                    ("filechannel", filechannel.as_str()),
                ],
            )?;
        }
        doc.end("sample")?;
    }
    doc.end("samples")?;
    doc.end("instrument")?;
    doc.finish()
}

/// Renders the note map. Only mapped instruments are listed.
pub fn render_midimap(mapping: &MidiMapping) -> Result<String, KitError> {
    let mut doc = Document::new()?;
    doc.start("midimap", &[])?;
    for (instrument, note) in mapping.entries() {
        let note = note.as_int().to_string();
        doc.empty(
            "map",
            &[
                ("note", note.as_str()),
                ("instr", instrument.as_str()),
                ("velmin", "0"),
                ("velmax", "127"),
            ],
        )?;
    }
    doc.end("midimap")?;
    doc.finish()
}

/// Writes a rendered document to disk.
pub fn write_document(path: &Path, contents: &str) -> Result<(), KitError> {
    fs::write(path, contents).map_err(|e| {
        KitError::xml_generation(format!("unable to write file: {}", e))
            .with("path", path.display())
    })?;
    debug!(path = %path.display(), "Wrote XML file");
    Ok(())
}
