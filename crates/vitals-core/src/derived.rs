//! Values computed from already-collected signals

/// Round `value` to `decimals` fractional digits
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Approximate speed index from paint timings, in milliseconds.
///
/// This is the midpoint of first-contentful-paint and the latest
/// largest-contentful-paint, offset by navigation start. It is an
/// approximation only; a real speed index integrates visual completeness
/// over captured frames.
///
/// Returns `None` until all three inputs are known, so a browser that does
/// not report `largest-contentful-paint` never gets a speed index.
pub fn speed_index(
    fcp_start: Option<f64>,
    lcp_start: Option<f64>,
    navigation_start: Option<f64>,
) -> Option<f64> {
    let (fcp, lcp, start) = (fcp_start?, lcp_start?, navigation_start?);
    Some(round_to((fcp + lcp) / 2.0 - start, 1))
}

/// Seconds between script attachment and the `load` event, one decimal place
pub fn page_load_seconds(attached_at_ms: f64, load_at_ms: f64) -> f64 {
    round_to((load_at_ms - attached_at_ms) / 1000.0, 1)
}
