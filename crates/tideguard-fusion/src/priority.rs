//! Review priority and the human-readable cluster explanation.

use tideguard_core::models::ClusterStatus;

/// Relative danger of a hazard type. Unlisted types score 0.3.
pub fn hazard_priority(hazard_type: &str) -> f64 {
    match hazard_type {
        "emergency" => 1.0,
        "tsunami" => 0.95,
        "earthquake" => 0.9,
        "landslide" => 0.85,
        "flood" => 0.8,
        "tides" => 0.7,
        _ => 0.3,
    }
}

/// `hazard_priority · fused · severity / 5`, clamped to [0, 1].
pub fn priority_score(hazard_type: &str, fused_confidence: f64, severity: u8) -> f64 {
    let severity_factor = f64::from(severity) / 5.0;
    (hazard_priority(hazard_type) * fused_confidence * severity_factor).clamp(0.0, 1.0)
}

fn confidence_band(fused: f64) -> &'static str {
    if fused >= 0.8 {
        "high confidence"
    } else if fused >= 0.6 {
        "medium confidence"
    } else {
        "low confidence"
    }
}

fn severity_band(severity: u8) -> &'static str {
    match severity {
        1 => "low",
        2 => "low-medium",
        3 => "medium",
        4 => "high",
        5 => "critical",
        _ => "unknown",
    }
}

/// One-line summary, e.g. `Fused from 3 report(s); medium confidence; classified as flood; high severity; requires review`.
pub fn explanation(
    report_count: usize,
    fused_confidence: f64,
    hazard_type: &str,
    severity: u8,
    status: ClusterStatus,
    unknown_hazard_type: &str,
) -> String {
    let mut parts = vec![
        format!("Fused from {report_count} report(s)"),
        confidence_band(fused_confidence).to_string(),
    ];
    if hazard_type != unknown_hazard_type {
        parts.push(format!("classified as {hazard_type}"));
    }
    parts.push(format!("{} severity", severity_band(severity)));
    parts.push(
        match status {
            ClusterStatus::Pending => "requires review",
            ClusterStatus::NeedsMoreInfo => "awaiting more information",
            ClusterStatus::Approved => "approved",
            ClusterStatus::Rejected => "rejected",
        }
        .to_string(),
    );
    parts.join("; ")
}
