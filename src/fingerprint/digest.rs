//! SHA-256 digest pass over a collected fingerprint.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::record::{format_number, FingerprintRecord};
use crate::error::Result;

/// Number of entries in [`DigestSet::all`].
pub const DIGEST_COUNT: usize = 11;

/// Field order of [`DigestSet::all`].
pub const DIGEST_ORDER: [&str; DIGEST_COUNT] = [
    "resolution",
    "platform",
    "canvas",
    "timezone",
    "language",
    "webglHash",
    "webglVendor",
    "webglRenderer",
    "fonts",
    "cpu",
    "memory",
];

/// Lowercase hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn digest_opt(input: Option<&str>) -> Option<String> {
    input.map(sha256_hex)
}

/// `sha256(d(resolution) + d(platform) + d(canvas))`, over digests, not raw values.
pub fn device_digest(resolution: &str, platform: &str, canvas: &str) -> String {
    let concatenated = [resolution, platform, canvas]
        .iter()
        .map(|value| sha256_hex(value))
        .collect::<String>();
    sha256_hex(&concatenated)
}

/// Sort font names lexicographically and serialize them as a JSON array.
pub fn canonical_fonts(fonts: &[String]) -> Result<String> {
    let mut sorted: Vec<&str> = fonts.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    Ok(serde_json::to_string(&sorted)?)
}

/// Digests derived from one [`FingerprintRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestSet {
    pub resolution: String,
    pub platform: String,
    pub canvas: String,
    pub timezone: String,
    pub language: String,
    pub webgl_hash: Option<String>,
    pub webgl_vendor: Option<String>,
    pub webgl_renderer: Option<String>,
    pub fonts: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub device: String,
    pub all: Vec<Option<String>>,
}

impl DigestSet {
    pub fn compute(record: &FingerprintRecord) -> Result<Self> {
        let resolution = sha256_hex(&record.screen_resolution);
        let platform = sha256_hex(&record.platform);
        let canvas = sha256_hex(&record.canvas);
        let device = sha256_hex(&format!("{}{}{}", resolution, platform, canvas));

        let timezone = sha256_hex(&record.timezone);
        let language = sha256_hex(&record.language);
        let webgl_hash = digest_opt(record.webgl.hash.as_deref());
        let webgl_vendor = digest_opt(record.webgl.vendor.as_deref());
        let webgl_renderer = digest_opt(record.webgl.renderer.as_deref());
        let fonts = sha256_hex(&canonical_fonts(&record.fonts)?);
        let cpu = record
            .cpu
            .logical_cores
            .map(|cores| sha256_hex(&cores.to_string()));
        let memory = record
            .memory
            .device_memory
            .map(|gib| sha256_hex(&format_number(gib)));

        let all = vec![
            Some(resolution.clone()),
            Some(platform.clone()),
            Some(canvas.clone()),
            Some(timezone.clone()),
            Some(language.clone()),
            webgl_hash.clone(),
            webgl_vendor.clone(),
            webgl_renderer.clone(),
            Some(fonts.clone()),
            cpu.clone(),
            memory.clone(),
        ];

        Ok(Self {
            resolution,
            platform,
            canvas,
            timezone,
            language,
            webgl_hash,
            webgl_vendor,
            webgl_renderer,
            fonts,
            cpu,
            memory,
            device,
            all,
        })
    }

    /// The summary array as JSON text, nulls kept.
    pub fn all_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.all)?)
    }
}
