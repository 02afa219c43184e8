use sandpile_core::{Sandpile, SandpileConfig, SandpileError, Seed, ToppleStrategy};

#[test]
fn test_config_from_json_builds_pile() {
    let json = r#"{
        "width": 24,
        "height": 24,
        "seed": { "kind": "center", "height": 400 },
        "strategy": "frontier",
        "steps_per_frame": 50
    }"#;
    let config: SandpileConfig = serde_json::from_str(json).unwrap();
    let mut pile = Sandpile::from_config(&config).unwrap();

    assert_eq!(pile.strategy_name(), "frontier");
    assert_eq!(pile.height_at(12, 12), Ok(400));
    while pile.compute_steps(config.steps_per_frame) {}
    assert!(pile.is_stable());
}

#[test]
fn test_config_round_trip() {
    let config = SandpileConfig {
        width: 8,
        height: 4,
        seed: Seed::Random {
            seed: 11,
            max_height: 5,
        },
        strategy: ToppleStrategy::FullScan,
        steps_per_frame: 10,
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: SandpileConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SandpileConfig {
        width: 10,
        height: 0,
        ..Default::default()
    };
    assert!(matches!(
        Sandpile::from_config(&config),
        Err(SandpileError::InvalidDimensions {
            width: 10,
            height: 0
        })
    ));
}

#[test]
fn test_stats_serialize() {
    let pile = Sandpile::with_seed(4, 4, &Seed::Uniform { height: 1 }, ToppleStrategy::Auto).unwrap();
    let value = serde_json::to_value(pile.stats()).unwrap();
    assert_eq!(value["total_mass"], 16);
    assert_eq!(value["histogram"][1], 16);
}
