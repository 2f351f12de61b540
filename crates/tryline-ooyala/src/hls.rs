//! Variant-manifest parsing and quality selection.
//!
//! Master manifests arrive as alternating metadata/URI line pairs. Live
//! manifests carry bare filenames instead of full paths, so the selected
//! URI is rebuilt from the manifest URL's `index-root` segment.

use std::collections::HashMap;

use tracing::warn;
use tryline_core::{Error, QualitySelection, Result};

use crate::OoyalaSession;

const STREAM_INF_PREFIX: &str = "#EXT-X-STREAM-INF:";

/// Version tag some manifests carry; dropped before the pair walk.
const VERSION_TAG: &str = "#EXT-X-VERSION:3";

/// Path segment marking the base of a live manifest URL.
const LIVE_PATH_MARKER: &str = "index-root";

/// One stream entry from a master manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub bandwidth: u64,
    pub url: String,
    pub attributes: HashMap<String, String>,
}

impl OoyalaSession {
    /// GET a manifest URL and return its lines.
    pub async fn fetch_manifest_lines(&self, url: &str) -> Result<Vec<String>> {
        let body = self.get_text(url).await?;
        Ok(body.lines().map(str::to_string).collect())
    }
}

/// Parse manifest lines into variants sorted ascending by bandwidth.
///
/// For live manifests the variant URIs are prefixed with the portion of
/// `manifest_url` up to and including the `index-root` marker. A manifest
/// URL without the marker leaves the URIs untouched.
pub fn parse_variants(lines: &[String], live: bool, manifest_url: &str) -> Result<Vec<Variant>> {
    let lines: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| line.trim() != VERSION_TAG)
        .collect();

    let live_prefix = manifest_url
        .find(LIVE_PATH_MARKER)
        .map(|pos| &manifest_url[..pos + LIVE_PATH_MARKER.len()]);

    let mut variants = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let meta = lines[index];
        let Some(attrs) = meta.strip_prefix(STREAM_INF_PREFIX) else {
            // Header and unrelated tag lines sit between stream entries.
            index += 1;
            continue;
        };

        let uri = *lines.get(index + 1).ok_or_else(|| {
            Error::ManifestParse("stream metadata line has no following URI line".to_string())
        })?;

        let mut attributes = HashMap::new();
        for token in split_outside_quotes(attrs) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if let Some((key, value)) = token.split_once('=') {
                attributes.insert(key.to_string(), unquote(value).to_string());
            }
        }

        let bandwidth = attributes
            .get("BANDWIDTH")
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                Error::ManifestParse(format!("stream entry has no integer BANDWIDTH: {meta:?}"))
            })?;

        let url = if live {
            live_prefix.map_or_else(|| uri.to_string(), |prefix| format!("{prefix}{uri}"))
        } else {
            uri.to_string()
        };

        variants.push(Variant {
            bandwidth,
            url,
            attributes,
        });
        index += 2;
    }

    variants.sort_by_key(|v| v.bandwidth);
    Ok(variants)
}

/// Pick the variant at the configured quality position.
pub fn select_variant(variants: &[Variant], quality: QualitySelection) -> Result<&Variant> {
    quality
        .resolve(variants.len())
        .and_then(|i| variants.get(i))
        .ok_or_else(|| {
            warn!("Quality setting: {}", quality.as_requested());
            warn!("Sorted variant list: {variants:?}");
            Error::QualityUnavailable {
                requested: quality.as_requested(),
                available: variants.len(),
            }
        })
}

/// Split on commas that sit outside double-quoted segments, so quoted
/// attribute values with embedded commas survive intact.
fn split_outside_quotes(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (pos, ch) in input.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&input[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
