//! Input checks run before any decision touches the store.

use tideguard_core::config::LifecycleConfig;
use tideguard_core::errors::{TideguardError, TideguardResult};

pub fn validate_reviewer(reviewer_id: &str) -> TideguardResult<()> {
    if reviewer_id.trim().is_empty() {
        return Err(TideguardError::validation("reviewer_id must not be empty"));
    }
    Ok(())
}

pub fn validate_notes(notes: Option<&str>, config: &LifecycleConfig) -> TideguardResult<()> {
    match notes {
        Some(text) if text.chars().count() > config.max_notes_len => {
            Err(TideguardError::validation(format!(
                "notes exceed {} characters",
                config.max_notes_len
            )))
        }
        _ => Ok(()),
    }
}

pub fn validate_severity(severity: u8) -> TideguardResult<()> {
    if !(1..=5).contains(&severity) {
        return Err(TideguardError::validation(format!(
            "severity must be within 1..=5, got {severity}"
        )));
    }
    Ok(())
}
