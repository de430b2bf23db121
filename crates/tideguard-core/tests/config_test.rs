use tideguard_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = TideguardConfig::from_toml("").unwrap();

    // Dedup defaults
    assert_eq!(config.dedup.grid_precision_decimals, 3);
    assert_eq!(config.dedup.cluster_priority, 10);
    assert_eq!(config.dedup.self_override_priority, 9);
    assert_eq!(config.dedup.self_report_priority, 8);
    assert_eq!(config.dedup.report_priority, 5);
    assert_eq!(config.dedup.self_override_window_secs, 1_800);
    assert_eq!(config.dedup.marker_cap, 50);
    assert_eq!(config.dedup.join_window_secs, 21_600);

    // Fusion defaults
    assert_eq!(config.fusion.boost_step, 0.1);
    assert_eq!(config.fusion.boost_cap, 0.4);
    assert_eq!(config.fusion.credibility_weight, 0.2);
    assert_eq!(config.fusion.diversity_cap, 1.2);
    assert_eq!(config.fusion.confidence_ceiling, 0.95);
    assert_eq!(config.fusion.source_weights.official, 0.9);

    // Lifecycle defaults
    assert_eq!(config.lifecycle.reopen_delta, 0.1);
    assert_eq!(config.lifecycle.urgent_severity, 4);
    assert_eq!(config.lifecycle.max_notes_len, 4_000);
    assert_eq!(config.lifecycle.default_severity, 3);

    // Ingest defaults
    assert_eq!(config.ingest.unclassified_base_confidence, 0.15);
    assert_eq!(config.ingest.beacon_hazard_type, "emergency");
    assert!(config.ingest.beacon_override);

    // Storage defaults
    assert_eq!(config.storage.db_path, "tideguard.db");
    assert!(config.storage.wal_mode);

    // Engine defaults
    assert_eq!(config.engine.snapshot_refresh_ms, 2_000);
    assert_eq!(config.engine.event_channel_capacity, 1_024);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.log_json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[dedup]
grid_precision_decimals = 4
marker_cap = 10

[fusion.source_weights]
social = 0.25
"#;
    let config = TideguardConfig::from_toml(toml).unwrap();
    assert_eq!(config.dedup.grid_precision_decimals, 4);
    assert_eq!(config.dedup.marker_cap, 10);
    // Non-overridden fields keep defaults
    assert_eq!(config.dedup.cluster_priority, 10);
    assert_eq!(config.fusion.source_weights.social, 0.25);
    assert_eq!(config.fusion.source_weights.citizen, 0.6);
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = TideguardConfig::from_toml("[dedup\nmarker_cap = ").unwrap_err();
    assert!(matches!(err, tideguard_core::TideguardError::ConfigError(_)));
}

#[test]
fn out_of_range_values_are_rejected() {
    for toml in [
        "[dedup]\nmarker_cap = 0\n",
        "[dedup]\ngrid_precision_decimals = 9\n",
        "[fusion]\nconfidence_ceiling = 1.5\n",
        "[fusion]\nboost_step = -0.1\n",
        "[lifecycle]\ndefault_severity = 0\n",
        "[lifecycle]\nreopen_delta = 2.0\n",
        "[ingest]\nfallback_credibility = 1.3\n",
        "[engine]\nevent_channel_capacity = 0\n",
        "[engine]\nkeepalive_interval_secs = 0\n",
        "[engine]\nreconcile_max_attempts = 0\n",
    ] {
        assert!(
            TideguardConfig::from_toml(toml).is_err(),
            "expected rejection for {toml:?}"
        );
    }
}

#[test]
fn engine_durations_follow_config() {
    let config = TideguardConfig::from_toml(
        "[engine]\nsnapshot_refresh_ms = 250\nkeepalive_interval_secs = 7\n",
    )
    .unwrap();
    assert_eq!(config.engine.snapshot_refresh().as_millis(), 250);
    assert_eq!(config.engine.keepalive_interval().as_secs(), 7);
}

#[test]
fn default_config_validates() {
    TideguardConfig::default().validate().unwrap();
}

#[test]
fn alert_thresholds_are_configurable_and_checked() {
    let config = TideguardConfig::from_toml(
        "[observability]\nalert_window_secs = 120\nalert_warning_fallbacks = 2\n",
    )
    .unwrap();
    assert_eq!(config.observability.alert_window_secs, 120);
    assert_eq!(config.observability.alert_warning_fallbacks, 2);
    assert_eq!(config.observability.alert_critical_secs, 1_800);

    let mut bad = TideguardConfig::default();
    bad.observability.alert_critical_secs = 0;
    assert!(bad.validate().is_err());
}
