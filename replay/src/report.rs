//! Plain-text rendering of a scored signal

use confluence_scoring::SignalResult;

/// Render a signal as a short multi-line report
pub fn render(symbol: &str, signal: &SignalResult) -> String {
    let mut out = format!(
        "{symbol}: {} (score {:+.3}, confidence {:.1}%)\n",
        signal.overall_bucket, signal.composite_score, signal.confidence_percent
    );
    for line in &signal.explanation {
        out.push_str(&format!("  - {line}\n"));
    }
    out
}
