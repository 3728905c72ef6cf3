use std::future::Future;
use std::time::Instant;

use super::fonts::detect_fonts;
use super::host::BrowserHost;
use super::probes::{
    audio_probe, canvas_probe, cpu_probe, environment_probe, memory_probe, webgl_probe,
};
use super::record::FingerprintRecord;
use crate::error::Result;

/// Run every probe once, in sequence, and merge the results.
///
/// Any probe failure aborts the collection. WebGL unavailability is not a
/// failure; it shows up as a null triple in the record.
pub async fn collect_fingerprint(
    host: &dyn BrowserHost,
    font_candidates: &[String],
) -> Result<FingerprintRecord> {
    let env = timed("environment", environment_probe(host)).await?;
    let canvas = timed("canvas", canvas_probe(host)).await?;
    let webgl = timed("webgl", webgl_probe(host)).await?;
    let audio = timed("audio", audio_probe(host)).await?;
    let fonts = timed("fonts", detect_fonts(host, font_candidates)).await?;
    let cpu = timed("cpu", cpu_probe(host)).await?;
    let memory = timed("memory", memory_probe(host)).await?;

    Ok(FingerprintRecord {
        timezone: env.timezone,
        language: env.language,
        screen_resolution: env.screen_resolution,
        platform: env.platform,
        canvas,
        webgl,
        audio,
        fonts,
        cpu,
        memory,
    })
}

async fn timed<T>(probe: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    let started = Instant::now();
    let result = fut.await;
    match &result {
        Ok(_) => tracing::debug!(
            "{} probe finished in {}ms",
            probe,
            started.elapsed().as_millis()
        ),
        Err(e) => tracing::debug!("{} probe failed: {}", probe, e),
    }
    result
}
