//! [`BrowserHost`] and [`PresentationSink`] over a live CDP page.
//!
//! Each capability is a small self-invoking script evaluated in the page.
//! Arguments are spliced in as JSON literals, so no user text is ever
//! concatenated into script source.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::page::CdpPage;
use crate::error::{FingyError, Result};
use crate::fingerprint::{
    AudioGraph, BrowserHost, EnvironmentReport, PresentationSink, Slot, TextSurfaceRequest,
    WebGlContextReport,
};

const MEASURE_ELEMENT_ID: &str = "__fingy_measure";

const CANVAS_JS: &str = r#"((r) => {
  const canvas = document.createElement('canvas');
  const ctx = canvas.getContext('2d');
  ctx.textBaseline = r.textBaseline;
  ctx.font = r.font;
  ctx.fillText(r.text, r.x, r.y);
  return canvas.toDataURL();
})(__ARGS__)"#;

const WEBGL_JS: &str = r#"((source) => {
  const canvas = document.createElement('canvas');
  const gl = canvas.getContext('webgl') || canvas.getContext('experimental-webgl');
  if (!gl) return null;
  const debugInfo = gl.getExtension('WEBGL_debug_renderer_info');
  const shader = gl.createShader(gl.VERTEX_SHADER);
  gl.shaderSource(shader, source);
  gl.compileShader(shader);
  return {
    vendor: debugInfo ? gl.getParameter(debugInfo.UNMASKED_VENDOR_WEBGL) : null,
    renderer: debugInfo ? gl.getParameter(debugInfo.UNMASKED_RENDERER_WEBGL) : null,
    compileStatus: gl.getShaderParameter(shader, gl.COMPILE_STATUS),
    infoLog: gl.getShaderInfoLog(shader),
  };
})(__ARGS__)"#;

const AUDIO_JS: &str = r#"(async (g) => {
  const Ctx = window.OfflineAudioContext || window.webkitOfflineAudioContext;
  const ctx = new Ctx(g.channels, g.length, g.sampleRate);
  const oscillator = ctx.createOscillator();
  const compressor = ctx.createDynamicsCompressor();
  oscillator.type = g.oscillatorType;
  oscillator.frequency.value = g.frequency;
  oscillator.connect(compressor);
  compressor.connect(ctx.destination);
  oscillator.start(0);
  const buffer = await ctx.startRendering();
  return Array.from(buffer.getChannelData(0));
})(__ARGS__)"#;

const INSERT_MEASURE_JS: &str = r#"((a) => {
  const old = document.getElementById(a.id);
  if (old) old.remove();
  const span = document.createElement('span');
  span.id = a.id;
  span.textContent = a.glyphs;
  span.style.fontSize = a.size + 'px';
  span.style.position = 'absolute';
  span.style.left = '-9999px';
  (document.body || document.documentElement).appendChild(span);
  return true;
})(__ARGS__)"#;

const MEASURE_JS: &str = r#"((a) => {
  const span = document.getElementById(a.id);
  if (!span) throw new Error('measurement element is not attached');
  span.style.fontFamily = a.family;
  return span.offsetWidth;
})(__ARGS__)"#;

const REMOVE_MEASURE_JS: &str = r#"((id) => {
  const span = document.getElementById(id);
  if (span) span.remove();
  return true;
})(__ARGS__)"#;

const CORES_JS: &str = "navigator.hardwareConcurrency || null";

const MEMORY_JS: &str = "navigator.deviceMemory || null";

const ENVIRONMENT_JS: &str = r#"({
  timezone: Intl.DateTimeFormat().resolvedOptions().timeZone,
  language: navigator.language,
  screenWidth: screen.width,
  screenHeight: screen.height,
  platform: navigator.platform,
})"#;

const DOM_WRITE_JS: &str = r#"((a) => {
  let el = document.getElementById(a.id);
  if (!el) {
    el = document.createElement('div');
    el.id = a.id;
    (document.body || document.documentElement).appendChild(el);
  }
  el.textContent = a.text;
  return true;
})(__ARGS__)"#;

/// Splice `args` into `template` as a JSON literal
fn script<A: Serialize + ?Sized>(template: &str, args: &A) -> Result<String> {
    Ok(template.replace("__ARGS__", &serde_json::to_string(args)?))
}

/// Browser capabilities read from a CDP page
pub struct CdpHost<'a> {
    page: &'a CdpPage,
}

impl<'a> CdpHost<'a> {
    pub fn new(page: &'a CdpPage) -> Self {
        Self { page }
    }

    async fn eval_as<T: DeserializeOwned>(&self, probe: &'static str, js: &str) -> Result<T> {
        let value = self.page.evaluate(js).await.map_err(|e| match e {
            FingyError::JavaScriptError(msg) => FingyError::probe(probe, msg),
            other => other,
        })?;
        serde_json::from_value(value)
            .map_err(|e| FingyError::probe(probe, format!("unexpected result: {}", e)))
    }
}

#[async_trait]
impl BrowserHost for CdpHost<'_> {
    async fn render_text_surface(&self, request: &TextSurfaceRequest) -> Result<String> {
        self.eval_as("canvas", &script(CANVAS_JS, request)?).await
    }

    async fn webgl_context(&self, vertex_shader: &str) -> Result<Option<WebGlContextReport>> {
        self.eval_as("webgl", &script(WEBGL_JS, vertex_shader)?).await
    }

    async fn render_offline_audio(&self, graph: &AudioGraph) -> Result<Vec<f32>> {
        self.eval_as("audio", &script(AUDIO_JS, graph)?).await
    }

    async fn insert_measurement_element(&self, glyphs: &str, font_size_px: u32) -> Result<()> {
        let args = serde_json::json!({
            "id": MEASURE_ELEMENT_ID,
            "glyphs": glyphs,
            "size": font_size_px,
        });
        let _: bool = self.eval_as("fonts", &script(INSERT_MEASURE_JS, &args)?).await?;
        Ok(())
    }

    async fn measure_width(&self, font_family: &str) -> Result<f64> {
        let args = serde_json::json!({ "id": MEASURE_ELEMENT_ID, "family": font_family });
        self.eval_as("fonts", &script(MEASURE_JS, &args)?).await
    }

    async fn remove_measurement_element(&self) -> Result<()> {
        let _: bool = self
            .eval_as("fonts", &script(REMOVE_MEASURE_JS, MEASURE_ELEMENT_ID)?)
            .await?;
        Ok(())
    }

    async fn hardware_concurrency(&self) -> Result<Option<u32>> {
        self.eval_as("cpu", CORES_JS).await
    }

    async fn device_memory(&self) -> Result<Option<f64>> {
        self.eval_as("memory", MEMORY_JS).await
    }

    async fn environment(&self) -> Result<EnvironmentReport> {
        self.eval_as("environment", ENVIRONMENT_JS).await
    }
}

/// Writes each line into the page element whose id is the slot id
pub struct DomSink<'a> {
    page: &'a CdpPage,
}

impl<'a> DomSink<'a> {
    pub fn new(page: &'a CdpPage) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PresentationSink for DomSink<'_> {
    async fn write(&mut self, slot: Slot, text: &str) -> Result<()> {
        let args = serde_json::json!({ "id": slot.id(), "text": text });
        self.page.evaluate(&script(DOM_WRITE_JS, &args)?).await?;
        Ok(())
    }
}
