//! End-to-end pipeline tests against a scripted host

use async_trait::async_trait;

use fingy::fingerprint::sink::{MemorySink, UNAVAILABLE};
use fingy::fingerprint::{
    fingerprint, present, AudioGraph, BrowserHost, EnvironmentReport, Slot, TextSurfaceRequest,
    WebGlContextReport,
};
use fingy::{FingyError, Result};

const DEVICE_HASH: &str = "33c46fcc4ce19e802779e76f5a5f97eb1a65026cbcf72077f3151916dda9d282";

/// Host with fixed answers. Installed fonts widen every layered stack by 10px.
struct ScriptedHost {
    webgl: Option<WebGlContextReport>,
    installed: Vec<&'static str>,
    cores: Option<u32>,
    memory: Option<f64>,
    fail_audio: bool,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self {
            webgl: Some(WebGlContextReport {
                vendor: Some("Mesa".to_string()),
                renderer: Some("llvmpipe".to_string()),
                compile_status: Some(true),
                info_log: Some(String::new()),
            }),
            installed: vec!["Verdana", "Arial"],
            cores: Some(4),
            memory: Some(0.5),
            fail_audio: false,
        }
    }
}

#[async_trait]
impl BrowserHost for ScriptedHost {
    async fn render_text_surface(&self, _request: &TextSurfaceRequest) -> Result<String> {
        Ok("CANVASDATA".to_string())
    }

    async fn webgl_context(&self, _vertex_shader: &str) -> Result<Option<WebGlContextReport>> {
        Ok(self.webgl.clone())
    }

    async fn render_offline_audio(&self, _graph: &AudioGraph) -> Result<Vec<f32>> {
        if self.fail_audio {
            return Err(FingyError::probe("audio", "OfflineAudioContext is not defined"));
        }
        Ok(vec![0.5, -0.25, 0.0, 1.0])
    }

    async fn insert_measurement_element(&self, _glyphs: &str, _font_size_px: u32) -> Result<()> {
        Ok(())
    }

    async fn measure_width(&self, font_family: &str) -> Result<f64> {
        let installed = self
            .installed
            .iter()
            .any(|f| font_family.starts_with(&format!("'{}',", f)));
        Ok(if installed { 610.0 } else { 600.0 })
    }

    async fn remove_measurement_element(&self) -> Result<()> {
        Ok(())
    }

    async fn hardware_concurrency(&self) -> Result<Option<u32>> {
        Ok(self.cores)
    }

    async fn device_memory(&self) -> Result<Option<f64>> {
        Ok(self.memory)
    }

    async fn environment(&self) -> Result<EnvironmentReport> {
        Ok(EnvironmentReport {
            timezone: "UTC".to_string(),
            language: "en-US".to_string(),
            screen_width: 1920,
            screen_height: 1080,
            platform: "Win32".to_string(),
        })
    }
}

#[tokio::test]
async fn collects_and_digests() {
    let host = ScriptedHost::default();
    let (record, digests) = fingerprint(&host, &[]).await.unwrap();

    assert_eq!(record.screen_resolution, "1920x1080");
    assert_eq!(record.audio, "1.75");
    // Candidate order, not host order
    assert_eq!(record.fonts, vec!["Arial", "Verdana"]);
    assert_eq!(record.webgl.hash.as_deref(), Some("[true,\"\"]"));

    assert_eq!(digests.device, DEVICE_HASH);
    assert_eq!(
        digests.fonts,
        "de11137ff352f296b7996dd98a098fa3d6d2fa9ed477b757a59b5ffeed6ce2f2"
    );
    assert_eq!(digests.all.len(), 11);
    assert!(digests.all.iter().all(Option::is_some));
    assert_eq!(digests.all[0].as_deref(), Some(digests.resolution.as_str()));
    assert_eq!(digests.all[8].as_deref(), Some(digests.fonts.as_str()));
}

#[tokio::test]
async fn missing_webgl_and_hints_keep_nulls() {
    let host = ScriptedHost {
        webgl: None,
        cores: None,
        memory: None,
        ..Default::default()
    };
    let (record, digests) = fingerprint(&host, &[]).await.unwrap();

    assert!(record.webgl.is_unavailable());
    assert_eq!(digests.device, DEVICE_HASH);
    assert_eq!(digests.all.len(), 11);
    assert!(digests.all[5..8].iter().all(Option::is_none));
    assert!(digests.all[9..].iter().all(Option::is_none));

    let json = serde_json::to_value(&record).unwrap();
    assert!(json["webglHash"].is_null());
    assert!(json["cpu"]["logicalCores"].is_null());
}

#[tokio::test]
async fn probe_failure_aborts_collection() {
    let host = ScriptedHost {
        fail_audio: true,
        ..Default::default()
    };

    match fingerprint(&host, &[]).await {
        Err(FingyError::ProbeFailed { probe, .. }) => assert_eq!(probe, "audio"),
        other => panic!("expected audio probe failure, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn extra_fonts_are_probed_after_builtins() {
    let host = ScriptedHost {
        installed: vec!["Fira Code", "Arial"],
        ..Default::default()
    };
    let extra = vec!["Fira Code".to_string()];
    let (record, _) = fingerprint(&host, &fingy::fingerprint::fonts::candidate_list(&extra))
        .await
        .unwrap();

    assert_eq!(record.fonts, vec!["Arial", "Fira Code"]);
}

#[tokio::test]
async fn presents_every_slot() {
    let host = ScriptedHost {
        webgl: None,
        ..Default::default()
    };
    let (record, digests) = fingerprint(&host, &[]).await.unwrap();

    let mut sink = MemorySink::default();
    present(&record, &digests, &mut sink).await.unwrap();

    assert_eq!(sink.lines.len(), Slot::ALL.len());
    assert_eq!(
        sink.lines[&Slot::DeviceHash],
        format!("Device Hash: {}", DEVICE_HASH)
    );
    assert_eq!(
        sink.lines[&Slot::GlVendor],
        format!("WebGL Vendor: {}", UNAVAILABLE)
    );
    assert!(sink.lines[&Slot::AllHashes].starts_with("All Hashes: [\""));
    assert!(sink.lines[&Slot::AllHashes].contains("null,null,null"));
}
