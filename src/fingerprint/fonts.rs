//! Installed-font detection by text-width comparison.
//!
//! A candidate font is present when rendering the probe glyphs with
//! `'{candidate}', {baseline}` yields a width different from the baseline
//! family alone, for any baseline.

use std::collections::HashMap;

use super::host::BrowserHost;
use crate::error::Result;

pub const BASELINE_FAMILIES: [&str; 3] = ["monospace", "sans-serif", "serif"];

pub const PROBE_GLYPHS: &str = "mmmmmmmmmmlli";

pub const PROBE_FONT_SIZE_PX: u32 = 72;

pub const CANDIDATE_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Calibri",
    "Cambria",
    "Candara",
    "Comic Sans MS",
    "Consolas",
    "Courier New",
    "Georgia",
    "Impact",
    "Lucida Console",
    "Lucida Sans Unicode",
    "Palatino Linotype",
    "Segoe UI",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
    "Webdings",
    "Wingdings",
    "Menlo",
    "Monaco",
    "Helvetica",
    "Helvetica Neue",
    "Futura",
    "Gill Sans",
    "Optima",
    "Copperplate",
    "Didot",
    "Hoefler Text",
    "American Typewriter",
    "Arial Unicode MS",
    "Brush Script MT",
    "Century Gothic",
    "Book Antiqua",
    "Franklin Gothic Medium",
    "Constantia",
    "Corbel",
    "Ebrima",
    "Perpetua",
    "Rockwell",
    "Segoe Print",
    "Segoe Script",
    "Sylfaen",
    "Times",
    "Courier",
    "Symbol",
];

/// Built-in candidates followed by `extra` names not already listed.
pub fn candidate_list(extra: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = CANDIDATE_FONTS.iter().map(|f| f.to_string()).collect();
    for name in extra {
        let name = name.trim();
        if !name.is_empty() && !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }
    candidates
}

/// Font stack that layers `candidate` over a generic `baseline`.
pub fn layered_family(candidate: &str, baseline: &str) -> String {
    format!("'{}', {}", candidate, baseline)
}

/// Detect which `candidates` are installed, in declaration order.
///
/// The measurement element is removed before returning on every path,
/// including a failed insert or a failed measurement.
pub async fn detect_fonts(host: &dyn BrowserHost, candidates: &[String]) -> Result<Vec<String>> {
    if let Err(e) = host
        .insert_measurement_element(PROBE_GLYPHS, PROBE_FONT_SIZE_PX)
        .await
    {
        // The element may be attached even though the insert reported failure
        if let Err(cleanup) = host.remove_measurement_element().await {
            tracing::debug!("Removing measurement element failed: {}", cleanup);
        }
        return Err(e);
    }

    let measured = measure_candidates(host, candidates).await;
    let removed = host.remove_measurement_element().await;

    let detected = measured?;
    removed?;

    tracing::debug!(
        "Detected {} of {} candidate fonts",
        detected.len(),
        candidates.len()
    );
    Ok(detected)
}

async fn measure_candidates(host: &dyn BrowserHost, candidates: &[String]) -> Result<Vec<String>> {
    let mut baseline_widths = HashMap::with_capacity(BASELINE_FAMILIES.len());
    for baseline in BASELINE_FAMILIES {
        let width = host.measure_width(baseline).await?;
        baseline_widths.insert(baseline, width);
    }

    let mut detected = Vec::new();
    for candidate in candidates {
        for baseline in BASELINE_FAMILIES {
            let width = host
                .measure_width(&layered_family(candidate, baseline))
                .await?;
            if width != baseline_widths[baseline] {
                detected.push(candidate.clone());
                break;
            }
        }
    }

    Ok(detected)
}
