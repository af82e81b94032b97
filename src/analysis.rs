//! Runs the full set of measurements and attacks on a network.

use std::{
    collections::{BTreeMap, HashMap},
    time::Instant,
};

use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::{
    config::Config,
    error::Result,
    gml::{Network, NodeId},
    histogram::Histogram,
    sabotage::{Fragmentation, Removal, Sabotage, Strategy},
};

/// A histogram of one per-vertex measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    /// Short identifier, also used for plot file names.
    pub name: String,
    pub title: String,
    /// What the measurement is, for the value axis.
    pub label: String,
    pub histogram: Histogram,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedVertex {
    pub id: NodeId,
    pub label: String,
    pub score: f64,
}

/// The highest scoring vertices for one strategy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ranking {
    pub strategy: Strategy,
    pub top: Vec<RankedVertex>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttackReport {
    pub strategy: Strategy,
    pub removal: Removal,
    /// Removed vertices, most important first.
    pub removed: Vec<NodeId>,
    pub fragmentation: Fragmentation,
}

/// Number of walks of a given length ending at a vertex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WalkCount {
    pub id: NodeId,
    pub label: String,
    pub walks: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub creator: Option<String>,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub connected: bool,
    pub component_count: usize,
    pub mean_degree: f64,
    /// Fraction of vertices with each degree.
    pub degree_distribution: BTreeMap<usize, f64>,
    pub average_clustering: f64,
    pub distributions: Vec<Distribution>,
    pub rankings: Vec<Ranking>,
    pub attacks: Vec<AttackReport>,
    pub duration_secs: f64,
}

/// Analyses a network's structure and its robustness to targeted attacks.
pub struct Analyzer {
    network: Network,
    config: Config,
}

impl Analyzer {
    pub fn new(network: Network, config: Config) -> Self {
        Self { network, config }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The configured strategies, without repeats.
    fn strategies(&self) -> Vec<Strategy> {
        self.config.analysis.strategies.iter().copied().unique().collect()
    }

    /// Runs every measurement, then one attack per configured fraction and strategy.
    pub fn run(&mut self) -> Result<Report> {
        self.config.validate()?;

        let start = Instant::now();
        let bins = self.config.analysis.histogram_bins;
        let params = self.config.score_params();
        let strategies = self.strategies();

        let graph = &mut self.network.graph;
        info!(
            "analysing {} vertices and {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        let mean_degree = graph.mean_degree();
        let degree_distribution = graph.degree_distribution();
        let component_count = graph.number_connected_components();
        let connected = graph.is_connected();

        let clustering = graph.clustering();
        let average_clustering = graph.average_clustering();

        let mut distributions = vec![Distribution {
            name: "clustering".into(),
            title: "Clustering coefficients".into(),
            label: "Coefficient".into(),
            histogram: Histogram::new(clustering.values().copied(), bins),
        }];

        let mut scores: HashMap<Strategy, HashMap<NodeId, f64>> = HashMap::new();
        for &strategy in &strategies {
            let started = Instant::now();
            let strategy_scores = strategy.scores(graph, &params)?;
            info!("computed {strategy} in {:?}", started.elapsed());

            distributions.push(Distribution {
                name: strategy.name().into(),
                title: format!("{strategy} distribution"),
                label: "Centrality".into(),
                histogram: Histogram::new(strategy_scores.values().copied(), bins),
            });
            scores.insert(strategy, strategy_scores);
        }

        let mut attacks = Vec::new();
        for removal in self.config.removals() {
            for &strategy in &strategies {
                let attack = self.attack_with(strategy, removal, &scores[&strategy])?;
                attacks.push(attack);
            }
        }

        let rankings = strategies
            .iter()
            .map(|&strategy| self.ranking(strategy, &scores[&strategy]))
            .collect();

        let graph = &self.network.graph;
        let report = Report {
            creator: self.network.creator.clone(),
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
            density: graph.density(),
            connected,
            component_count,
            mean_degree,
            degree_distribution,
            average_clustering,
            distributions,
            rankings,
            attacks,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        info!("analysis done in {:.3}s", report.duration_secs);

        Ok(report)
    }

    /// Runs a single attack.
    pub fn attack(&mut self, strategy: Strategy, removal: Removal) -> Result<AttackReport> {
        let params = self.config.score_params();
        let scores = strategy.scores(&mut self.network.graph, &params)?;

        self.attack_with(strategy, removal, &scores)
    }

    /// Counts the walks of `length` steps from `source`, returning the `top` most reachable
    /// vertices. Vertices no walk reaches are left out.
    pub fn walks(&mut self, source: NodeId, length: u32, top: usize) -> Result<Vec<WalkCount>> {
        let walks = self.network.graph.walks_from(&source, length)?;

        let mut counts: Vec<(NodeId, f64)> = walks.into_iter().filter(|&(_, w)| w > 0.0).collect();
        counts.sort_by(|(a, x), (b, y)| y.total_cmp(x).then(a.cmp(b)));

        Ok(counts
            .into_iter()
            .take(top)
            .map(|(id, walks)| WalkCount {
                id,
                label: self.network.name(id),
                walks,
            })
            .collect())
    }

    fn attack_with(
        &self,
        strategy: Strategy,
        removal: Removal,
        scores: &HashMap<NodeId, f64>,
    ) -> Result<AttackReport> {
        let sabotage = Sabotage::new(&self.network.graph, scores);
        let mut attack = sabotage.destroy_vertices(removal)?;
        let fragmentation = attack.fragmentation();

        info!(
            "{strategy}, {removal} removed: {} components, largest {}",
            fragmentation.component_count, fragmentation.largest_component
        );

        Ok(AttackReport {
            strategy,
            removal,
            removed: attack.removed,
            fragmentation,
        })
    }

    fn ranking(&self, strategy: Strategy, scores: &HashMap<NodeId, f64>) -> Ranking {
        let sabotage = Sabotage::new(&self.network.graph, scores);
        let top = sabotage
            .ranking()
            .iter()
            .take(self.config.analysis.top)
            .map(|&id| RankedVertex {
                id,
                label: self.network.name(id),
                score: scores[&id],
            })
            .collect();

        Ranking { strategy, top }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gml;

    /// Two triangles joined through a bridge vertex, plus a pendant.
    const BOWTIE: &str = r#"
        graph [
            node [ id 0 label "a" ] node [ id 1 label "b" ] node [ id 2 label "c" ]
            node [ id 3 label "bridge" ]
            node [ id 4 label "d" ] node [ id 5 label "e" ] node [ id 6 label "f" ]
            node [ id 7 label "tail" ]
            edge [ source 0 target 1 ] edge [ source 1 target 2 ] edge [ source 2 target 0 ]
            edge [ source 2 target 3 ] edge [ source 3 target 4 ]
            edge [ source 4 target 5 ] edge [ source 5 target 6 ] edge [ source 6 target 4 ]
            edge [ source 6 target 7 ]
        ]
    "#;

    fn analyzer(config: Config) -> Analyzer {
        Analyzer::new(gml::parse(BOWTIE).unwrap(), config)
    }

    fn config(fractions: Vec<f64>, strategies: Vec<Strategy>) -> Config {
        let mut config = Config::default();
        config.analysis.fractions = fractions;
        config.analysis.strategies = strategies;
        config.analysis.threads = 2;
        config.analysis.top = 3;
        config
    }

    #[test]
    fn structure() {
        let strategies = vec![Strategy::Degree, Strategy::Katz, Strategy::Closeness];
        let report = analyzer(config(vec![0.25], strategies)).run().unwrap();

        assert_eq!(report.vertex_count, 8);
        assert_eq!(report.edge_count, 9);
        assert!(report.connected);
        assert_eq!(report.component_count, 1);
        assert_eq!(report.mean_degree, 2.25);
        assert_eq!(report.degree_distribution[&1], 0.125);

        // One histogram for clustering, one per strategy.
        assert_eq!(report.distributions.len(), 4);
        assert_eq!(report.distributions[0].histogram.total(), 8);
    }

    #[test]
    fn attack_grid() {
        let strategies = vec![Strategy::Degree, Strategy::Betweenness];
        let report = analyzer(config(vec![0.15, 0.3], strategies)).run().unwrap();

        // Fractions outermost, strategies inner.
        let grid: Vec<(Removal, Strategy, usize)> = report
            .attacks
            .iter()
            .map(|a| (a.removal, a.strategy, a.removed.len()))
            .collect();
        assert_eq!(
            grid,
            vec![
                (Removal::Fraction(0.15), Strategy::Degree, 1),
                (Removal::Fraction(0.15), Strategy::Betweenness, 1),
                (Removal::Fraction(0.3), Strategy::Degree, 2),
                (Removal::Fraction(0.3), Strategy::Betweenness, 2),
            ]
        );

        // The bridge carries every path between the halves.
        let betweenness = &report.attacks[1];
        assert_eq!(betweenness.removed, vec![3]);
        assert_eq!(betweenness.fragmentation.component_count, 2);
        assert_eq!(betweenness.fragmentation.average_fragment_size, Some(3.0));
    }

    #[test]
    fn repeated_strategies_run_once() {
        let strategies = vec![Strategy::Katz, Strategy::Katz];
        let report = analyzer(config(vec![0.2], strategies)).run().unwrap();

        assert_eq!(report.rankings.len(), 1);
        assert_eq!(report.attacks.len(), 1);
    }

    #[test]
    fn rankings_carry_labels() {
        let report = analyzer(config(vec![0.2], vec![Strategy::Betweenness]))
            .run()
            .unwrap();

        let top = &report.rankings[0].top;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].id, 3);
        assert_eq!(top[0].label, "bridge");
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn single_attack() {
        let mut analyzer = analyzer(Config::default());
        let attack = analyzer
            .attack(Strategy::Degree, Removal::Count(2))
            .unwrap();

        // Vertices 2, 4 and 6 all have degree 3; ties go to the smallest ids.
        assert_eq!(attack.removed, vec![2, 4]);
        assert_eq!(attack.fragmentation.component_sizes, vec![3, 2, 1]);

        assert!(analyzer
            .attack(Strategy::Degree, Removal::Count(8))
            .is_err());
    }

    #[test]
    fn walks() {
        let mut analyzer = analyzer(Config::default());

        let walks = analyzer.walks(7, 2, 10).unwrap();
        let ids: Vec<NodeId> = walks.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![4, 5, 7]);
        assert_eq!(walks[2].label, "tail");
        assert!(walks.iter().all(|w| w.walks == 1.0));

        // Three walks 6-x-6, the most of any length-2 walk from 6.
        let walks = analyzer.walks(6, 2, 1).unwrap();
        assert_eq!(walks.len(), 1);
        assert_eq!((walks[0].id, walks[0].walks), (6, 3.0));

        assert!(analyzer.walks(42, 2, 10).is_err());
    }

    #[test]
    fn invalid_config() {
        let mut config = Config::default();
        config.analysis.fractions = vec![1.5];

        assert!(analyzer(config).run().is_err());
    }
}
