use std::{fs, path::PathBuf};

use approx::assert_relative_eq;
use blackout::{
    analysis::Analyzer,
    config::Config,
    gml::{self, Network},
    plot, report,
    sabotage::{Removal, Strategy},
};

fn ladder() -> Network {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/ladder.gml");
    gml::read(path).unwrap()
}

#[test]
fn load_fixture() {
    let mut network = ladder();

    assert_eq!(network.creator.as_deref(), Some("blackout test fixture"));
    assert_eq!(network.graph.vertex_count(), 10);
    assert_eq!(network.graph.edge_count(), 13);
    assert_eq!(network.name(7), "south-2");
    assert!(network.graph.is_connected());
}

#[test]
fn default_analysis() {
    let mut config = Config::default();
    config.analysis.threads = 2;

    let report = Analyzer::new(ladder(), config).run().unwrap();

    assert_eq!(report.vertex_count, 10);
    assert_eq!(report.edge_count, 13);
    assert!(report.connected);
    assert_relative_eq!(report.mean_degree, 2.6);
    assert_eq!(report.degree_distribution.len(), 2);
    assert_relative_eq!(report.degree_distribution[&2], 0.4);
    assert_relative_eq!(report.degree_distribution[&3], 0.6);
    // A ladder has no triangles.
    assert_eq!(report.average_clustering, 0.0);

    // Two fractions times three strategies.
    assert_eq!(report.attacks.len(), 6);
    assert!(report.attacks[..3].iter().all(|a| a.removed.is_empty()));
    assert!(report.attacks[3..].iter().all(|a| a.removed.len() == 1));

    let text = report.to_string();
    assert!(text.contains("Mean degree: 2.60"));
    assert!(text.contains("Results for 0.05 vertices removed:"));
    assert!(text.contains("Results for 0.10 vertices removed:"));
    assert!(text.contains("Eigenvalue centrality:"));
}

#[test]
fn degree_attack_splits_the_ladder() {
    let mut analyzer = Analyzer::new(ladder(), Config::default());
    let attack = analyzer
        .attack(Strategy::Degree, Removal::Count(4))
        .unwrap();

    // All inner substations have degree 3, the lowest ids go first.
    assert_eq!(attack.removed, vec![1, 2, 3, 6]);
    assert_eq!(attack.fragmentation.component_sizes, vec![4, 2]);
    assert_eq!(attack.fragmentation.average_fragment_size, Some(2.0));

    // The loaded network itself is untouched.
    assert_eq!(analyzer.network().graph.vertex_count(), 10);
}

#[test]
fn every_strategy_attacks() {
    let mut config = Config::default();
    config.analysis.fractions = vec![0.3];
    config.analysis.strategies = Strategy::ALL.to_vec();
    config.analysis.threads = 3;

    let report = Analyzer::new(ladder(), config).run().unwrap();

    assert_eq!(report.rankings.len(), 5);
    assert_eq!(report.distributions.len(), 6);
    for attack in &report.attacks {
        assert_eq!(attack.removed.len(), 3, "{}", attack.strategy);
        assert_eq!(attack.fragmentation.vertex_count, 7);
    }
}

#[test]
fn config_file_and_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("blackout.toml");
    fs::write(
        &config_path,
        r#"
        [analysis]
        fractions = [0.2]
        strategies = ["betweenness"]
        threads = 2
        top = 2
        "#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let report = Analyzer::new(ladder(), config).run().unwrap();

    assert_eq!(report.rankings[0].top.len(), 2);
    assert_eq!(report.attacks.len(), 1);
    assert_eq!(report.attacks[0].removed.len(), 2);

    let json = report::to_json(&report, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["attacks"][0]["strategy"], "betweenness");
    assert_eq!(value["rankings"][0]["top"].as_array().unwrap().len(), 2);

    let plots = plot::render(&report, dir.path().join("plots")).unwrap();
    assert_eq!(plots.len(), 3);
    assert!(plots.iter().all(|path| path.exists()));
}

#[test]
fn walks_along_the_ladder() {
    let mut analyzer = Analyzer::new(ladder(), Config::default());
    let walks = analyzer.walks(0, 2, 3).unwrap();

    // 0 has two neighbours, so two walks return to it.
    assert_eq!(walks[0].id, 0);
    assert_eq!(walks[0].walks, 2.0);
    assert_eq!(walks.len(), 3);
}

#[test]
fn missing_file() {
    assert!(gml::read("testdata/does-not-exist.gml").is_err());
}
