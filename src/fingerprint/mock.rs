//! In-memory [`BrowserHost`] for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::host::{AudioGraph, BrowserHost, EnvironmentReport, TextSurfaceRequest, WebGlContextReport};
use crate::error::{FingyError, Result};

pub struct MockHost {
    pub canvas: String,
    pub webgl: Option<WebGlContextReport>,
    pub audio: Vec<f32>,
    pub installed_fonts: Vec<String>,
    pub serif_only_fonts: Vec<String>,
    pub failing_family: Option<String>,
    /// Attach the element but report the insert as failed.
    pub fail_insert: bool,
    pub cores: Option<u32>,
    pub memory: Option<f64>,
    pub environment: EnvironmentReport,

    pub canvas_requests: Mutex<Vec<TextSurfaceRequest>>,
    pub shaders: Mutex<Vec<String>>,
    pub audio_graphs: Mutex<Vec<AudioGraph>>,
    pub measured: Mutex<Vec<String>>,
    pub attached: AtomicBool,
    pub inserts: AtomicUsize,
    pub removals: AtomicUsize,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            canvas: "CANVASDATA".to_string(),
            webgl: Some(WebGlContextReport {
                vendor: Some("Google Inc. (Intel)".to_string()),
                renderer: Some("ANGLE (Intel UHD 630)".to_string()),
                compile_status: Some(true),
                info_log: Some(String::new()),
            }),
            audio: vec![0.25; 8],
            installed_fonts: Vec::new(),
            serif_only_fonts: Vec::new(),
            failing_family: None,
            fail_insert: false,
            cores: Some(8),
            memory: Some(8.0),
            environment: EnvironmentReport {
                timezone: "UTC".to_string(),
                language: "en-US".to_string(),
                screen_width: 1920,
                screen_height: 1080,
                platform: "Win32".to_string(),
            },
            canvas_requests: Mutex::new(Vec::new()),
            shaders: Mutex::new(Vec::new()),
            audio_graphs: Mutex::new(Vec::new()),
            measured: Mutex::new(Vec::new()),
            attached: AtomicBool::new(false),
            inserts: AtomicUsize::new(0),
            removals: AtomicUsize::new(0),
        }
    }
}

impl MockHost {
    pub fn with_fonts(fonts: &[&str]) -> Self {
        Self {
            installed_fonts: fonts.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn last_canvas_request(&self) -> Option<TextSurfaceRequest> {
        self.canvas_requests.lock().unwrap().last().cloned()
    }

    pub fn last_shader(&self) -> Option<String> {
        self.shaders.lock().unwrap().last().cloned()
    }

    pub fn last_audio_graph(&self) -> Option<AudioGraph> {
        self.audio_graphs.lock().unwrap().last().cloned()
    }

    pub fn measured_families(&self) -> Vec<String> {
        self.measured.lock().unwrap().clone()
    }

    pub fn element_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn element_inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn element_removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }

    fn baseline_width(baseline: &str) -> f64 {
        match baseline {
            "monospace" => 780.0,
            "sans-serif" => 650.0,
            _ => 640.0,
        }
    }

    fn width_for(&self, family: &str) -> f64 {
        let Some(rest) = family.strip_prefix('\'') else {
            return Self::baseline_width(family);
        };
        let (candidate, baseline) = rest.split_once("', ").unwrap_or((rest, "serif"));
        let base = Self::baseline_width(baseline);

        if self.installed_fonts.iter().any(|f| f == candidate) {
            base + 13.0
        } else if baseline == "serif" && self.serif_only_fonts.iter().any(|f| f == candidate) {
            base - 4.0
        } else {
            base
        }
    }
}

#[async_trait]
impl BrowserHost for MockHost {
    async fn render_text_surface(&self, request: &TextSurfaceRequest) -> Result<String> {
        self.canvas_requests.lock().unwrap().push(request.clone());
        Ok(self.canvas.clone())
    }

    async fn webgl_context(&self, vertex_shader: &str) -> Result<Option<WebGlContextReport>> {
        self.shaders.lock().unwrap().push(vertex_shader.to_string());
        Ok(self.webgl.clone())
    }

    async fn render_offline_audio(&self, graph: &AudioGraph) -> Result<Vec<f32>> {
        self.audio_graphs.lock().unwrap().push(graph.clone());
        Ok(self.audio.clone())
    }

    async fn insert_measurement_element(&self, _glyphs: &str, _font_size_px: u32) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.attached.store(true, Ordering::SeqCst);
        if self.fail_insert {
            return Err(FingyError::JavaScriptError(
                "no reply to element insert".to_string(),
            ));
        }
        Ok(())
    }

    async fn measure_width(&self, font_family: &str) -> Result<f64> {
        if !self.element_attached() {
            return Err(FingyError::JavaScriptError(
                "measurement element is not attached".to_string(),
            ));
        }
        self.measured.lock().unwrap().push(font_family.to_string());
        if self.failing_family.as_deref() == Some(font_family) {
            return Err(FingyError::JavaScriptError(format!(
                "layout failed for {}",
                font_family
            )));
        }
        Ok(self.width_for(font_family))
    }

    async fn remove_measurement_element(&self) -> Result<()> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.attached.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn hardware_concurrency(&self) -> Result<Option<u32>> {
        Ok(self.cores)
    }

    async fn device_memory(&self) -> Result<Option<f64>> {
        Ok(self.memory)
    }

    async fn environment(&self) -> Result<EnvironmentReport> {
        Ok(self.environment.clone())
    }
}
