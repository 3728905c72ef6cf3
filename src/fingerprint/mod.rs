//! Device fingerprint pipeline: probes, aggregation, digests, presentation.

mod aggregator;
pub mod digest;
pub mod fonts;
mod host;
pub mod probes;
mod record;
pub mod sink;

#[cfg(test)]
pub(crate) mod mock;

pub use aggregator::collect_fingerprint;
pub use digest::{sha256_hex, DigestSet};
pub use host::{AudioGraph, BrowserHost, EnvironmentReport, TextSurfaceRequest, WebGlContextReport};
pub use record::{CpuInfo, FingerprintRecord, MemoryInfo, WebGlSignal};
pub use sink::{present, PresentationSink, Slot};

use crate::error::Result;

/// Collect a fingerprint from `host` and digest it.
pub async fn fingerprint(
    host: &dyn BrowserHost,
    font_candidates: &[String],
) -> Result<(FingerprintRecord, DigestSet)> {
    let record = collect_fingerprint(host, font_candidates).await?;
    let digests = DigestSet::compute(&record)?;
    Ok((record, digests))
}
