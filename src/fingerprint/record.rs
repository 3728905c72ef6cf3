use serde::Serialize;

/// WebGL signal: shader-compile hash input plus unmasked vendor/renderer.
///
/// All three are `None` when the host has no WebGL context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebGlSignal {
    #[serde(rename = "webglHash")]
    pub hash: Option<String>,
    #[serde(rename = "webglVendor")]
    pub vendor: Option<String>,
    #[serde(rename = "webglRenderer")]
    pub renderer: Option<String>,
}

impl WebGlSignal {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_unavailable(&self) -> bool {
        self.hash.is_none() && self.vendor.is_none() && self.renderer.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub logical_cores: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    /// Device memory hint in GiB.
    pub device_memory: Option<f64>,
}

/// One collected fingerprint. Built once by the aggregator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRecord {
    pub timezone: String,
    pub language: String,
    pub screen_resolution: String,
    pub platform: String,
    pub canvas: String,
    #[serde(flatten)]
    pub webgl: WebGlSignal,
    pub audio: String,
    pub fonts: Vec<String>,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
}

/// Format a number the way JS `Number.prototype.toString` does.
///
/// Integral values drop the fractional part; magnitudes below 1e-6 or at
/// least 1e21 switch to exponent form (`5e-7`, `1e+21`).
pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // -0 prints as 0
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", value);
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
