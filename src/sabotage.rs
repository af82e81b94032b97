//! Targeted attacks: remove the most important vertices and measure what's left.

use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::{self, Debug, Display},
    hash::Hash,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    centrality::{EigenvectorParams, KatzParams},
    edge::Edge,
    error::{Error, Result},
    graph::Graph,
};

/// The centrality measure used to pick which vertices to remove.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Degree,
    Katz,
    Eigenvector,
    Betweenness,
    Closeness,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Degree,
        Strategy::Katz,
        Strategy::Eigenvector,
        Strategy::Betweenness,
        Strategy::Closeness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Degree => "degree",
            Strategy::Katz => "katz",
            Strategy::Eigenvector => "eigenvector",
            Strategy::Betweenness => "betweenness",
            Strategy::Closeness => "closeness",
        }
    }

    /// Computes this strategy's centrality for every vertex of `graph`.
    pub fn scores<T>(&self, graph: &mut Graph<T>, params: &ScoreParams) -> Result<HashMap<T, f64>>
    where
        Edge<T>: Eq + Hash,
        T: Copy + Eq + Hash + Ord + Debug,
    {
        let scores = match self {
            Strategy::Degree => graph.degree_centrality(),
            Strategy::Katz => graph.katz_centrality(params.katz)?,
            Strategy::Eigenvector => graph.eigenvector_centrality(params.eigenvector)?,
            Strategy::Betweenness => graph.betweenness_centrality(params.threads, true),
            Strategy::Closeness => graph.closeness_centrality(params.threads),
        };

        Ok(scores)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Strategy::Degree => "Degree",
            Strategy::Katz => "Katz",
            Strategy::Eigenvector => "Eigenvalue",
            Strategy::Betweenness => "Betweenness",
            Strategy::Closeness => "Closeness",
        };

        write!(f, "{title} centrality")
    }
}

/// Everything needed to compute any strategy's scores.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreParams {
    pub eigenvector: EigenvectorParams,
    pub katz: KatzParams,
    pub threads: usize,
}

/// How many vertices an attack removes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Removal {
    /// A share of the vertices, strictly between 0 and 1. The count is rounded down.
    Fraction(f64),
    /// An absolute number of vertices, strictly between 0 and the vertex count.
    Count(usize),
}

impl Removal {
    /// Validates the removal against a graph of `vertex_count` vertices and returns how many
    /// vertices it amounts to.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::sabotage::Removal;
    ///
    /// assert_eq!(Removal::Fraction(0.05).resolve(4941).unwrap(), 247);
    /// assert_eq!(Removal::Count(10).resolve(4941).unwrap(), 10);
    /// assert!(Removal::Fraction(1.0).resolve(4941).is_err());
    /// assert!(Removal::Count(4941).resolve(4941).is_err());
    /// ```
    pub fn resolve(&self, vertex_count: usize) -> Result<usize> {
        match *self {
            Removal::Fraction(fraction) => {
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(Error::InvalidFraction(fraction));
                }

                Ok((vertex_count as f64 * fraction).floor() as usize)
            }
            Removal::Count(count) => {
                if count == 0 || count >= vertex_count {
                    return Err(Error::InvalidCount {
                        count,
                        max: vertex_count.saturating_sub(1),
                    });
                }

                Ok(count)
            }
        }
    }
}

impl Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removal::Fraction(fraction) => write!(f, "{fraction:.2}"),
            Removal::Count(count) => write!(f, "{count}"),
        }
    }
}

/// How badly a graph is broken up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fragmentation {
    pub vertex_count: usize,
    pub component_count: usize,
    /// Component sizes, largest first.
    pub component_sizes: Vec<usize>,
    pub largest_component: usize,
    /// Mean size of every component but the largest, `None` if there's at most one component.
    pub average_fragment_size: Option<f64>,
}

impl Fragmentation {
    pub fn measure<T>(graph: &mut Graph<T>) -> Self
    where
        Edge<T>: Eq + Hash,
        T: Copy + Eq + Hash + Ord + Debug,
    {
        let component_sizes = graph.component_sizes();
        let fragments = component_sizes.get(1..).unwrap_or_default();

        let average_fragment_size = if fragments.is_empty() {
            None
        } else {
            Some(fragments.iter().sum::<usize>() as f64 / fragments.len() as f64)
        };

        Self {
            vertex_count: graph.vertex_count(),
            component_count: component_sizes.len(),
            largest_component: component_sizes.first().copied().unwrap_or(0),
            average_fragment_size,
            component_sizes,
        }
    }

    /// Share of the vertices still in the largest component.
    pub fn largest_share(&self) -> f64 {
        if self.vertex_count == 0 {
            return 0.0;
        }

        self.largest_component as f64 / self.vertex_count as f64
    }
}

/// The outcome of an attack.
#[derive(Clone, Debug)]
pub struct Attack<T> {
    /// Removed vertices, most important first.
    pub removed: Vec<T>,
    /// What's left of the graph.
    pub graph: Graph<T>,
}

impl<T> Attack<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    pub fn fragmentation(&mut self) -> Fragmentation {
        Fragmentation::measure(&mut self.graph)
    }
}

/// Sabotages a network by removing its most important vertices, ranked by the supplied
/// centrality scores.
pub struct Sabotage<'a, T> {
    graph: &'a Graph<T>,
    ranking: Vec<T>,
}

impl<'a, T> Sabotage<'a, T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Prepares an attack on `graph`, ranking its vertices by `scores` in descending order.
    ///
    /// Equal scores keep the vertices' `Ord` order and NaN scores rank last. Vertices without a
    /// score are never targeted.
    pub fn new(graph: &'a Graph<T>, scores: &HashMap<T, f64>) -> Self {
        let mut ranking: Vec<(T, f64)> = scores
            .iter()
            .filter(|(vertex, _)| graph.contains_vertex(vertex))
            .map(|(&vertex, &score)| (vertex, score))
            .collect();

        ranking.sort_by(|(a, _), (b, _)| a.cmp(b));
        ranking.sort_by(|(_, a), (_, b)| descending_nan_last(*a, *b));

        Self {
            graph,
            ranking: ranking.into_iter().map(|(vertex, _)| vertex).collect(),
        }
    }

    /// Every scored vertex, most important first.
    pub fn ranking(&self) -> &[T] {
        &self.ranking
    }

    /// Returns the vertices the removal would target, most important first.
    pub fn targets(&self, removal: Removal) -> Result<&[T]> {
        let count = removal.resolve(self.graph.vertex_count())?;

        Ok(&self.ranking[..count.min(self.ranking.len())])
    }

    /// Removes the most important vertices from a copy of the graph. The graph being attacked is
    /// left as is.
    pub fn destroy_vertices(&self, removal: Removal) -> Result<Attack<T>> {
        let targets = self.targets(removal)?;
        debug!("removing {} of {} vertices", targets.len(), self.graph.vertex_count());

        Ok(Attack {
            removed: targets.to_vec(),
            graph: self.graph.without_vertices(targets),
        })
    }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
