//! Presentation sink: labelled lines written into named output slots.

use std::collections::BTreeMap;

use async_trait::async_trait;
use colored::Colorize;

use super::digest::DigestSet;
use super::record::{format_number, FingerprintRecord};
use crate::error::Result;

/// Text shown for a value the host did not provide.
pub const UNAVAILABLE: &str = "Unavailable";

/// Named output locations, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Timezone,
    Language,
    Resolution,
    Platform,
    Canvas,
    GlHash,
    GlVendor,
    GlRenderer,
    FontsHash,
    CpuCores,
    MemoryInfo,
    Audio,
    DeviceHash,
    AllHashes,
}

impl Slot {
    pub const ALL: [Slot; 14] = [
        Slot::Timezone,
        Slot::Language,
        Slot::Resolution,
        Slot::Platform,
        Slot::Canvas,
        Slot::GlHash,
        Slot::GlVendor,
        Slot::GlRenderer,
        Slot::FontsHash,
        Slot::CpuCores,
        Slot::MemoryInfo,
        Slot::Audio,
        Slot::DeviceHash,
        Slot::AllHashes,
    ];

    /// Element id of the slot.
    pub fn id(&self) -> &'static str {
        match self {
            Slot::Timezone => "timezone",
            Slot::Language => "language",
            Slot::Resolution => "resolution",
            Slot::Platform => "platform",
            Slot::Canvas => "canvas",
            Slot::GlHash => "glhash",
            Slot::GlVendor => "glvendor",
            Slot::GlRenderer => "glrenderer",
            Slot::FontsHash => "fontshash",
            Slot::CpuCores => "cpucores",
            Slot::MemoryInfo => "memoryinfo",
            Slot::Audio => "audio",
            Slot::DeviceHash => "devicehash",
            Slot::AllHashes => "allhashes",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Slot::Timezone => "Timezone",
            Slot::Language => "Language",
            Slot::Resolution => "Screen Resolution",
            Slot::Platform => "Platform",
            Slot::Canvas => "Canvas",
            Slot::GlHash => "WebGL Hash",
            Slot::GlVendor => "WebGL Vendor",
            Slot::GlRenderer => "WebGL Renderer",
            Slot::FontsHash => "Fonts",
            Slot::CpuCores => "CPU Cores",
            Slot::MemoryInfo => "Device Memory",
            Slot::Audio => "Audio",
            Slot::DeviceHash => "Device Hash",
            Slot::AllHashes => "All Hashes",
        }
    }
}

/// Destination for presentation lines.
#[async_trait]
pub trait PresentationSink: Send {
    async fn write(&mut self, slot: Slot, text: &str) -> Result<()>;
}

/// `"{Label}: {raw}"` plus `" ({digest})"` when a digest exists.
pub fn format_line(slot: Slot, raw: Option<&str>, digest: Option<&str>) -> String {
    let raw = raw.unwrap_or(UNAVAILABLE);
    match digest {
        Some(digest) => format!("{}: {} ({})", slot.label(), raw, digest),
        None => format!("{}: {}", slot.label(), raw),
    }
}

/// Every presentation line for one fingerprint, in slot order.
pub fn render_lines(
    record: &FingerprintRecord,
    digests: &DigestSet,
) -> Result<Vec<(Slot, String)>> {
    let fonts = if record.fonts.is_empty() {
        "None detected".to_string()
    } else {
        record.fonts.join(", ")
    };
    let cores = record.cpu.logical_cores.map(|c| c.to_string());
    let memory = record.memory.device_memory.map(format_number);
    let all = digests.all_json()?;

    let lines = vec![
        (
            Slot::Timezone,
            format_line(Slot::Timezone, Some(record.timezone.as_str()), Some(digests.timezone.as_str())),
        ),
        (
            Slot::Language,
            format_line(Slot::Language, Some(record.language.as_str()), Some(digests.language.as_str())),
        ),
        (
            Slot::Resolution,
            format_line(
                Slot::Resolution,
                Some(record.screen_resolution.as_str()),
                Some(digests.resolution.as_str()),
            ),
        ),
        (
            Slot::Platform,
            format_line(Slot::Platform, Some(record.platform.as_str()), Some(digests.platform.as_str())),
        ),
        (
            Slot::Canvas,
            format_line(Slot::Canvas, Some(record.canvas.as_str()), Some(digests.canvas.as_str())),
        ),
        (
            Slot::GlHash,
            format_line(
                Slot::GlHash,
                record.webgl.hash.as_deref(),
                digests.webgl_hash.as_deref(),
            ),
        ),
        (
            Slot::GlVendor,
            format_line(
                Slot::GlVendor,
                record.webgl.vendor.as_deref(),
                digests.webgl_vendor.as_deref(),
            ),
        ),
        (
            Slot::GlRenderer,
            format_line(
                Slot::GlRenderer,
                record.webgl.renderer.as_deref(),
                digests.webgl_renderer.as_deref(),
            ),
        ),
        (
            Slot::FontsHash,
            format_line(Slot::FontsHash, Some(fonts.as_str()), Some(digests.fonts.as_str())),
        ),
        (
            Slot::CpuCores,
            format_line(Slot::CpuCores, cores.as_deref(), digests.cpu.as_deref()),
        ),
        (
            Slot::MemoryInfo,
            format_line(Slot::MemoryInfo, memory.as_deref(), digests.memory.as_deref()),
        ),
        (
            Slot::Audio,
            format_line(Slot::Audio, Some(record.audio.as_str()), None),
        ),
        (
            Slot::DeviceHash,
            format_line(Slot::DeviceHash, Some(digests.device.as_str()), None),
        ),
        (
            Slot::AllHashes,
            format_line(Slot::AllHashes, Some(all.as_str()), None),
        ),
    ];

    Ok(lines)
}

/// Write every line of a fingerprint into `sink`.
pub async fn present(
    record: &FingerprintRecord,
    digests: &DigestSet,
    sink: &mut dyn PresentationSink,
) -> Result<()> {
    for (slot, line) in render_lines(record, digests)? {
        sink.write(slot, &line).await?;
    }
    Ok(())
}

/// Collects lines by slot. Useful for tests and for building JSON output.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: BTreeMap<Slot, String>,
}

#[async_trait]
impl PresentationSink for MemorySink {
    async fn write(&mut self, slot: Slot, text: &str) -> Result<()> {
        self.lines.insert(slot, text.to_string());
        Ok(())
    }
}

/// Prints lines to stdout, label highlighted.
pub struct TerminalSink {
    /// Truncate raw values longer than this many characters (0 = never).
    pub max_width: usize,
}

impl TerminalSink {
    pub fn new(max_width: usize) -> Self {
        Self { max_width }
    }

    /// Shorten the raw value, keeping a trailing `" (digest)"` intact.
    fn shorten(&self, value: &str) -> String {
        let (raw, digest) = match value.rfind(" (") {
            Some(idx) if value.ends_with(')') => value.split_at(idx),
            _ => (value, ""),
        };
        if self.max_width == 0 || raw.chars().count() <= self.max_width {
            return value.to_string();
        }
        let head: String = raw.chars().take(self.max_width).collect();
        format!("{}…{}", head, digest)
    }
}

#[async_trait]
impl PresentationSink for TerminalSink {
    async fn write(&mut self, slot: Slot, text: &str) -> Result<()> {
        let (label, rest) = text.split_once(": ").unwrap_or((slot.label(), text));
        let rest = self.shorten(rest);
        if matches!(slot, Slot::DeviceHash) {
            println!("{}: {}", label.bold(), rest.green());
        } else {
            println!("{}: {}", label.bold(), rest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::{CpuInfo, MemoryInfo, WebGlSignal};

    fn record() -> FingerprintRecord {
        FingerprintRecord {
            timezone: "UTC".to_string(),
            language: "en-US".to_string(),
            screen_resolution: "1920x1080".to_string(),
            platform: "Win32".to_string(),
            canvas: "CANVASDATA".to_string(),
            webgl: WebGlSignal::unavailable(),
            audio: "35.73833402246237".to_string(),
            fonts: vec!["Arial".to_string(), "Verdana".to_string()],
            cpu: CpuInfo {
                logical_cores: Some(4),
            },
            memory: MemoryInfo {
                device_memory: Some(0.5),
            },
        }
    }

    #[test]
    fn slot_ids_match_output_locations() {
        let ids: Vec<&str> = Slot::ALL.iter().map(Slot::id).collect();
        assert_eq!(
            ids,
            vec![
                "timezone",
                "language",
                "resolution",
                "platform",
                "canvas",
                "glhash",
                "glvendor",
                "glrenderer",
                "fontshash",
                "cpucores",
                "memoryinfo",
                "audio",
                "devicehash",
                "allhashes",
            ]
        );
    }

    #[test]
    fn line_with_digest() {
        assert_eq!(
            format_line(Slot::Platform, Some("Win32"), Some("abc")),
            "Platform: Win32 (abc)"
        );
    }

    #[test]
    fn missing_value_renders_unavailable_without_digest() {
        assert_eq!(
            format_line(Slot::GlVendor, None, None),
            "WebGL Vendor: Unavailable"
        );
    }

    #[tokio::test]
    async fn present_writes_one_line_per_slot() {
        let record = record();
        let digests = DigestSet::compute(&record).unwrap();
        let mut sink = MemorySink::default();

        present(&record, &digests, &mut sink).await.unwrap();

        assert_eq!(sink.lines.len(), Slot::ALL.len());
        assert_eq!(
            sink.lines[&Slot::Resolution],
            format!("Screen Resolution: 1920x1080 ({})", digests.resolution)
        );
        assert_eq!(
            sink.lines[&Slot::FontsHash],
            format!("Fonts: Arial, Verdana ({})", digests.fonts)
        );
        assert_eq!(
            sink.lines[&Slot::MemoryInfo],
            format!("Device Memory: 0.5 ({})", digests.memory.clone().unwrap())
        );
        assert_eq!(sink.lines[&Slot::GlRenderer], "WebGL Renderer: Unavailable");
        assert_eq!(sink.lines[&Slot::Audio], "Audio: 35.73833402246237");
        assert_eq!(
            sink.lines[&Slot::DeviceHash],
            format!("Device Hash: {}", digests.device)
        );
    }

    #[tokio::test]
    async fn all_hashes_line_is_json_array() {
        let record = record();
        let digests = DigestSet::compute(&record).unwrap();
        let lines = render_lines(&record, &digests).unwrap();

        let (_, all) = lines
            .iter()
            .find(|(slot, _)| *slot == Slot::AllHashes)
            .unwrap();
        let json = all.strip_prefix("All Hashes: ").unwrap();
        let parsed: Vec<Option<String>> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, digests.all);
    }

    #[tokio::test]
    async fn no_fonts_detected() {
        let mut record = record();
        record.fonts.clear();
        let digests = DigestSet::compute(&record).unwrap();
        let mut sink = MemorySink::default();

        present(&record, &digests, &mut sink).await.unwrap();
        assert!(sink.lines[&Slot::FontsHash].starts_with("Fonts: None detected ("));
    }

    #[test]
    fn terminal_sink_truncates_long_values() {
        let sink = TerminalSink::new(8);
        assert_eq!(sink.shorten("data:image/png;base64"), "data:ima…");
        assert_eq!(sink.shorten("data:image/png;base64 (abc)"), "data:ima… (abc)");
        assert_eq!(sink.shorten("short"), "short");
        assert_eq!(TerminalSink::new(0).shorten("unbounded"), "unbounded");
    }
}
