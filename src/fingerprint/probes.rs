//! Single-signal probes. Each one reads one host subsystem and shares no
//! state with the others.

use super::host::{AudioGraph, BrowserHost, TextSurfaceRequest};
use super::record::{format_number, CpuInfo, MemoryInfo, WebGlSignal};
use crate::error::Result;

pub const CANVAS_TEXT: &str = "Hello 👽 🌍 123";
pub const CANVAS_FONT: &str = "14px Arial";
pub const CANVAS_BASELINE: &str = "top";

pub const VERTEX_SHADER: &str = "void main() { gl_Position = vec4(0.0); }";

pub const AUDIO_CHANNELS: u32 = 1;
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;
pub const AUDIO_LENGTH: u32 = 44_100;
pub const AUDIO_OSCILLATOR: &str = "triangle";
pub const AUDIO_FREQUENCY_HZ: f64 = 10_000.0;

/// Environment reads the host always supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSignal {
    pub timezone: String,
    pub language: String,
    pub screen_resolution: String,
    pub platform: String,
}

pub fn canvas_request() -> TextSurfaceRequest {
    TextSurfaceRequest {
        text: CANVAS_TEXT.to_string(),
        font: CANVAS_FONT.to_string(),
        text_baseline: CANVAS_BASELINE.to_string(),
        x: 2.0,
        y: 2.0,
    }
}

pub fn audio_graph() -> AudioGraph {
    AudioGraph {
        channels: AUDIO_CHANNELS,
        sample_rate: AUDIO_SAMPLE_RATE,
        length: AUDIO_LENGTH,
        oscillator_type: AUDIO_OSCILLATOR.to_string(),
        frequency: AUDIO_FREQUENCY_HZ,
    }
}

/// Render fixed text and return the surface's encoded image untouched.
pub async fn canvas_probe(host: &dyn BrowserHost) -> Result<String> {
    host.render_text_surface(&canvas_request()).await
}

/// Read WebGL vendor/renderer and the shader-compile result.
///
/// A missing context is data, not an error.
pub async fn webgl_probe(host: &dyn BrowserHost) -> Result<WebGlSignal> {
    let Some(report) = host.webgl_context(VERTEX_SHADER).await? else {
        tracing::debug!("WebGL context unavailable");
        return Ok(WebGlSignal::unavailable());
    };

    let hash = serde_json::to_string(&(report.compile_status, report.info_log))?;

    Ok(WebGlSignal {
        hash: Some(hash),
        vendor: report.vendor,
        renderer: report.renderer,
    })
}

/// Render the fixed oscillator graph offline and sum `|sample|` in index order.
pub async fn audio_probe(host: &dyn BrowserHost) -> Result<String> {
    let samples = host.render_offline_audio(&audio_graph()).await?;
    tracing::debug!("Offline audio rendered {} samples", samples.len());
    Ok(format_number(accumulate_samples(&samples)))
}

pub(crate) fn accumulate_samples(samples: &[f32]) -> f64 {
    samples
        .iter()
        .fold(0.0_f64, |acc, sample| acc + f64::from(sample.abs()))
}

pub async fn cpu_probe(host: &dyn BrowserHost) -> Result<CpuInfo> {
    Ok(CpuInfo {
        logical_cores: host.hardware_concurrency().await?,
    })
}

pub async fn memory_probe(host: &dyn BrowserHost) -> Result<MemoryInfo> {
    Ok(MemoryInfo {
        device_memory: host.device_memory().await?,
    })
}

pub async fn environment_probe(host: &dyn BrowserHost) -> Result<EnvironmentSignal> {
    let env = host.environment().await?;
    Ok(EnvironmentSignal {
        timezone: env.timezone,
        language: env.language,
        screen_resolution: format!("{}x{}", env.screen_width, env.screen_height),
        platform: env.platform,
    })
}
