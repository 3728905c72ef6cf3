//! Host capability seam.
//!
//! Every browser subsystem a probe reads goes through [`BrowserHost`]. The
//! CDP-backed implementation lives in `crate::browser::cdp_host`; tests use
//! an in-memory host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters for drawing text onto a fresh offscreen 2D surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSurfaceRequest {
    pub text: String,
    pub font: String,
    pub text_baseline: String,
    pub x: f64,
    pub y: f64,
}

/// Fixed offline audio graph: oscillator -> dynamics compressor -> destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioGraph {
    pub channels: u32,
    pub sample_rate: u32,
    pub length: u32,
    pub oscillator_type: String,
    pub frequency: f64,
}

/// What the host reports back from a WebGL context.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebGlContextReport {
    /// Unmasked vendor; `None` when `WEBGL_debug_renderer_info` is missing.
    pub vendor: Option<String>,
    /// Unmasked renderer; `None` when `WEBGL_debug_renderer_info` is missing.
    pub renderer: Option<String>,
    /// `COMPILE_STATUS` as reported; `None` when the context was lost.
    pub compile_status: Option<bool>,
    pub info_log: Option<String>,
}

/// Locale, screen and platform reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    pub timezone: String,
    pub language: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub platform: String,
}

/// Browser capabilities consumed by the signal probes.
///
/// Implementations call the underlying API with exactly the parameters they
/// are given and never retry. A failure is returned as-is.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Draw onto a new 2D surface and return its encoded image (data URL).
    async fn render_text_surface(&self, request: &TextSurfaceRequest) -> Result<String>;

    /// Create a WebGL context and compile `vertex_shader` in it.
    ///
    /// Returns `Ok(None)` when no context can be created.
    async fn webgl_context(&self, vertex_shader: &str) -> Result<Option<WebGlContextReport>>;

    /// Render `graph` offline to completion and return channel 0.
    async fn render_offline_audio(&self, graph: &AudioGraph) -> Result<Vec<f32>>;

    /// Insert the off-screen text measurement element into the document.
    async fn insert_measurement_element(&self, glyphs: &str, font_size_px: u32) -> Result<()>;

    /// Set the measurement element's `font-family` and read its width.
    async fn measure_width(&self, font_family: &str) -> Result<f64>;

    /// Remove the measurement element from the document.
    async fn remove_measurement_element(&self) -> Result<()>;

    async fn hardware_concurrency(&self) -> Result<Option<u32>>;

    async fn device_memory(&self) -> Result<Option<f64>>;

    async fn environment(&self) -> Result<EnvironmentReport>;
}
