//! Loading models and configs from disk and exporting induced chains

use std::fs;

use tempfile::tempdir;
use uct_mdp::analysis::analyze;
use uct_mdp::model::explicit::ModelFile;
use uct_mdp::{BiasPolicy, UctConfig, UctError};

const RETRY_CHANNEL: &str = include_str!("../models/retry_channel.json");

#[test]
fn analyze_model_loaded_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("channel.json");
    fs::write(&path, RETRY_CHANNEL).unwrap();

    let file = ModelFile::from_json_file(&path).unwrap();
    let rewards = file.reward_structure();
    let config = UctConfig::default().with_depth(4).with_iterations(4000).with_seed(12);
    let report = analyze(file.model, rewards, config).unwrap();

    // sending beats waiting; delivery is worth 10 against a cost of 1 or 3
    assert!(report.estimate > 0.0);
    assert!(report.chain_value > 0.0);
    assert!(report.best_actions[0].starts_with("send"));
    assert_eq!(report.stats.rollouts, 4000);
    assert!(report.chain.check_stochastic(1e-9).is_ok());
}

#[test]
fn export_induced_chain() {
    let file = ModelFile::from_json_str(RETRY_CHANNEL).unwrap();
    let rewards = file.reward_structure();
    let config = UctConfig::default().with_depth(3).with_iterations(1000).with_seed(5);
    let report = analyze(file.model, rewards, config).unwrap();

    let dir = tempdir().unwrap();
    let tra_path = dir.path().join("chain.tra");
    report
        .chain
        .export_tra(fs::File::create(&tra_path).unwrap())
        .unwrap();

    let text = fs::read_to_string(&tra_path).unwrap();
    let mut lines = text.lines();
    let header: Vec<usize> = lines
        .next()
        .unwrap()
        .split(' ')
        .map(|f| f.parse().unwrap())
        .collect();
    assert_eq!(header, vec![report.chain.num_states(), report.chain.num_transitions()]);

    let mut rows = 0;
    for line in lines {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields.len(), 3);
        let source: usize = fields[0].parse().unwrap();
        let target: usize = fields[1].parse().unwrap();
        let p: f64 = fields[2].parse().unwrap();
        assert!(report.chain.successors(source).contains(&(target, p)));
        rows += 1;
    }
    assert_eq!(rows, report.chain.num_transitions());

    let json: serde_json::Value = serde_json::from_str(&report.chain.to_json().unwrap()).unwrap();
    assert_eq!(
        json["states"].as_array().map(Vec::len),
        Some(report.chain.num_states())
    );
}

#[test]
fn config_from_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("uct.json");
    fs::write(&path, r#"{ "depth": 7, "iterations": 250, "bias": { "fixed": 1.5 }, "seed": 3 }"#)
        .unwrap();

    let config = UctConfig::from_json_file(&path).unwrap();

    assert_eq!(config.depth, 7);
    assert_eq!(config.iterations, 250);
    assert_eq!(config.bias, BiasPolicy::Fixed(1.5));
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.probability_tolerance, 1e-5);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("uct.json");
    fs::write(&path, r#"{ "depth": 0 }"#).unwrap();

    assert!(matches!(
        UctConfig::from_json_file(&path),
        Err(UctError::InvalidConfig(_))
    ));
}

#[test]
fn missing_and_broken_model_files() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        ModelFile::from_json_file(dir.path().join("absent.json")),
        Err(UctError::Io(_))
    ));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ \"model\": ").unwrap();
    assert!(matches!(
        ModelFile::from_json_file(&broken),
        Err(UctError::Json(_))
    ));

    let dangling = dir.path().join("dangling.json");
    fs::write(
        &dangling,
        r#"{ "model": { "initial_states": [0], "states": [
            { "choices": [ { "action": "go", "outcomes": [ { "probability": 1.0, "target": 4 } ] } ] }
        ] } }"#,
    )
    .unwrap();
    assert!(matches!(
        ModelFile::from_json_file(&dangling),
        Err(UctError::Exploration(_))
    ));
}
