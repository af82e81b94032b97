//! Centrality measures: the relative importance of each vertex in the network.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    betweenness::compute_betweenness,
    closeness::compute_closeness,
    edge::Edge,
    error::{Error, Result},
    graph::{Graph, Indexed},
};

/// Parameters for the eigenvector centrality power iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenvectorParams {
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for EigenvectorParams {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tolerance: 1.0e-6,
        }
    }
}

/// Parameters for the Katz centrality iteration.
///
/// `alpha` must be smaller than the reciprocal of the largest adjacency eigenvalue for the
/// iteration to converge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KatzParams {
    /// Attenuation factor.
    pub alpha: f64,
    /// Weight attributed to the immediate neighbourhood.
    pub beta: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    /// Scale the result to unit Euclidean norm.
    pub normalized: bool,
}

impl Default for KatzParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 1.0,
            max_iter: 1000,
            tolerance: 1.0e-6,
            normalized: true,
        }
    }
}

/// Sums each vertex's neighbour values: one sparse product with the adjacency matrix.
fn spread<T>(indexed: &Indexed<T>, x: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        indexed.len(),
        indexed
            .neighbours
            .iter()
            .map(|list| list.iter().map(|&j| x[j as usize]).sum::<f64>()),
    )
}

impl<T> Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Returns a mapping of vertices to their degree centrality, the fraction of the other
    /// vertices they're connected to.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(1, 3)].into_iter().collect();
    /// let centrality = graph.degree_centrality();
    ///
    /// assert_eq!(centrality[&1], 1.0);
    /// assert_eq!(centrality[&2], 0.5);
    /// ```
    pub fn degree_centrality(&mut self) -> HashMap<T, f64> {
        let indexed = self.indexed();
        let n = indexed.len();

        indexed.label(indexed.neighbours.iter().map(|list| match n {
            // A lone vertex is trivially connected to everything there is.
            1 => 1.0,
            _ => list.len() as f64 / (n - 1) as f64,
        }))
    }

    /// Returns a mapping of vertices to their eigenvector centrality, the relative importance of
    /// a vertex given the importance of its neighbours.
    ///
    /// Computed by power iteration on `A + I`, which has the same leading eigenvector as the
    /// adjacency matrix `A` but doesn't oscillate on bipartite graphs. The result has unit
    /// Euclidean norm.
    pub fn eigenvector_centrality(&mut self, params: EigenvectorParams) -> Result<HashMap<T, f64>> {
        let indexed = self.indexed();
        let n = indexed.len();

        if n == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut x = DVector::<f64>::from_element(n, 1.0 / n as f64);

        for iteration in 0..params.max_iter {
            let mut next = &x + spread(indexed, &x);

            let norm = next.norm();
            if norm > 0.0 {
                next.unscale_mut(norm);
            }

            let error = (&next - &x).abs().sum();
            x = next;

            if error < n as f64 * params.tolerance {
                debug!("eigenvector centrality converged after {} iterations", iteration + 1);
                return Ok(indexed.label(x.iter().copied()));
            }
        }

        Err(Error::Convergence {
            algorithm: "eigenvector centrality",
            iterations: params.max_iter,
        })
    }

    /// Returns a mapping of vertices to their Katz centrality, which counts the walks reaching
    /// a vertex with longer walks attenuated by `alpha`.
    ///
    /// An empty graph has an empty mapping.
    pub fn katz_centrality(&mut self, params: KatzParams) -> Result<HashMap<T, f64>> {
        let indexed = self.indexed();
        let n = indexed.len();

        if n == 0 {
            return Ok(HashMap::new());
        }

        let beta = DVector::<f64>::from_element(n, params.beta);
        let mut x = DVector::<f64>::zeros(n);

        for iteration in 0..params.max_iter {
            let next = spread(indexed, &x).scale(params.alpha) + &beta;

            let error = (&next - &x).abs().sum();
            x = next;

            if error < n as f64 * params.tolerance {
                debug!("katz centrality converged after {} iterations", iteration + 1);

                if params.normalized {
                    let norm = x.norm();
                    if norm > 0.0 {
                        x.unscale_mut(norm);
                    }
                }

                return Ok(indexed.label(x.iter().copied()));
            }
        }

        Err(Error::Convergence {
            algorithm: "katz centrality",
            iterations: params.max_iter,
        })
    }

    /// Returns a mapping of vertices to their betweenness centrality, the share of shortest paths
    /// between other pairs of vertices that pass through them.
    ///
    /// The work is spread over `num_threads` workers. When `normalize` is set, the values are
    /// divided by the number of pairs not containing the vertex.
    pub fn betweenness_centrality(&mut self, num_threads: usize, normalize: bool) -> HashMap<T, f64> {
        let indexed = self.indexed();
        let betweenness = compute_betweenness(indexed.neighbours.clone(), num_threads, normalize);

        indexed.label(betweenness)
    }

    /// Returns a mapping of vertices to their closeness centrality, the inverse of the average
    /// distance to the vertices they can reach, scaled by the fraction of the graph reachable.
    pub fn closeness_centrality(&mut self, num_threads: usize) -> HashMap<T, f64> {
        let indexed = self.indexed();
        let n = indexed.len();
        let reach = compute_closeness(indexed.neighbours.clone(), num_threads);

        let closeness = reach.into_iter().map(|(total_distance, reached)| {
            if total_distance == 0 || n < 2 {
                return 0.0;
            }

            // `reached` counts the vertex itself.
            let others = (reached - 1) as f64;
            (others / total_distance as f64) * (others / (n - 1) as f64)
        });

        indexed.label(closeness)
    }
}
