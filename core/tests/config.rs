//! Config loading and validation.

use activity_sim_core::{
    config::{GeneratorConfig, SimConfig},
    engine::ActivityEngine,
    error::SimError,
    generator::ActivityGenerator,
    store::SimStore,
};

#[test]
fn defaults_are_valid() {
    SimConfig::default().validate().unwrap();
}

#[test]
fn partial_file_keeps_defaults() {
    let path = std::env::temp_dir().join(format!("sim-config-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{ "trend": { "keyword": "Khan Academy" }, "generator": { "duplication_rate": 0.1 } }"#,
    )
    .unwrap();
    let config = SimConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.trend.keyword, "Khan Academy");
    assert_eq!(config.trend.geo, "US");
    assert_eq!(config.trend.window_days, 90);
    assert_eq!(config.generator.duplication_rate, 0.1);
    assert_eq!(config.generator.quiz_id_range, (50, 100));
    assert_eq!(config.target_table, "stg_student_activities");
}

#[test]
fn out_of_range_probability_is_rejected() {
    let config = SimConfig {
        generator: GeneratorConfig {
            movie_probability: 1.5,
            ..GeneratorConfig::default()
        },
        ..SimConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(
        matches!(&err, SimError::InvalidConfig { field, .. } if field == "generator.movie_probability"),
        "got {err:?}"
    );
}

#[test]
fn empty_shift_range_is_rejected() {
    let config = SimConfig {
        generator: GeneratorConfig {
            duplicate_shift_seconds: (0, 10),
            ..GeneratorConfig::default()
        },
        ..SimConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn engine_refuses_invalid_config() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = SimConfig {
        target_table: "   ".into(),
        ..SimConfig::default()
    };
    assert!(ActivityEngine::build("bad-config".into(), 1, config, store).is_err());
}

#[test]
fn missing_file_is_an_error() {
    assert!(SimConfig::load("/no/such/config.json").is_err());
}

#[test]
fn generator_refuses_inverted_ranges() {
    let inverted = [
        GeneratorConfig {
            record_id_range: (11_000_000, 10_000_000),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            quiz_id_range: (100, 50),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            duplicate_shift_seconds: (10, 1),
            ..GeneratorConfig::default()
        },
    ];
    for config in inverted {
        let err = ActivityGenerator::new(config, 1).err().expect("inverted range accepted");
        assert!(matches!(err, SimError::InvalidConfig { .. }), "got {err:?}");
    }
}
