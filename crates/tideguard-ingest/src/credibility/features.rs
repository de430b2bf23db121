use chrono::{DateTime, Utc};
use tideguard_core::models::SourceType;

pub fn source_reliability(source: SourceType) -> f64 {
    match source {
        SourceType::Official => 1.0,
        SourceType::Beacon => 0.95,
        SourceType::Citizen => 0.6,
        SourceType::Social => 0.4,
    }
}

pub fn media_presence(has_media: bool) -> f64 {
    if has_media {
        0.8
    } else {
        0.2
    }
}

/// Score reported GPS accuracy in meters. Unknown accuracy is neutral-good.
pub fn gps_accuracy(accuracy_m: Option<f64>) -> f64 {
    match accuracy_m {
        None => 0.7,
        Some(m) if !m.is_finite() || m < 0.0 => 0.3,
        Some(m) if m <= 20.0 => 1.0,
        Some(m) if m <= 50.0 => 0.8,
        Some(m) if m <= 100.0 => 0.6,
        Some(_) => 0.3,
    }
}

/// Fresh reports are trusted most; future timestamps are suspicious.
pub fn temporal_consistency(submitted_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    if submitted_at > now {
        return 0.1;
    }
    let age = (now - submitted_at).num_seconds();
    match age {
        a if a <= 3_600 => 1.0,
        a if a <= 86_400 => 0.9,
        a if a <= 604_800 => 0.7,
        a if a <= 2_592_000 => 0.4,
        _ => 0.2,
    }
}

/// Reporter track record. No history is kept yet, so every reporter is neutral.
pub fn past_accuracy() -> f64 {
    0.5
}
