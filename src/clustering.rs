//! Local clustering coefficients.

use std::{collections::HashMap, fmt::Debug, hash::Hash};

use itertools::Itertools;

use crate::{
    edge::Edge,
    graph::{Graph, Indexed},
};

/// Counts the triangles passing through the vertex at position `i`.
fn triangles_at<T>(indexed: &Indexed<T>, i: usize) -> usize {
    indexed.neighbours[i]
        .iter()
        .tuple_combinations()
        .filter(|&(&u, &w)| indexed.adjacent(u as usize, w as usize))
        .count()
}

impl<T> Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Returns a mapping of vertices to their local clustering coefficient, the fraction of pairs
    /// of neighbours that are themselves connected.
    ///
    /// Vertices with fewer than two neighbours have a coefficient of 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 1), Edge::new(1, 4)]
    ///     .into_iter()
    ///     .collect();
    /// let clustering = graph.clustering();
    ///
    /// assert_eq!(clustering[&1], 1.0 / 3.0);
    /// assert_eq!(clustering[&2], 1.0);
    /// assert_eq!(clustering[&4], 0.0);
    /// ```
    pub fn clustering(&mut self) -> HashMap<T, f64> {
        let indexed = self.indexed();

        let coefficients = (0..indexed.len()).map(|i| {
            let degree = indexed.neighbours[i].len();
            if degree < 2 {
                return 0.0;
            }

            let possible = degree * (degree - 1);
            2.0 * triangles_at(indexed, i) as f64 / possible as f64
        });

        indexed.label(coefficients)
    }

    /// Returns the mean of the local clustering coefficients, 0 for an empty graph.
    pub fn average_clustering(&mut self) -> f64 {
        let n = self.vertex_count();
        if n == 0 {
            return 0.0;
        }

        self.clustering().values().sum::<f64>() / n as f64
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn empty() {
        let mut graph: Graph<u8> = Graph::new();

        assert!(graph.clustering().is_empty());
        assert_eq!(graph.average_clustering(), 0.0);
    }

    #[test]
    fn triangle_with_tail() {
        let mut graph = graph!([1, 2, 3, 1], [1, 4]);
        let clustering = graph.clustering();

        assert_eq!(clustering[&1], 1.0 / 3.0);
        assert_eq!(clustering[&2], 1.0);
        assert_eq!(clustering[&3], 1.0);
        assert_eq!(clustering[&4], 0.0);

        assert_relative_eq!(graph.average_clustering(), (1.0 / 3.0 + 2.0) / 4.0);
    }

    #[test]
    fn complete_graph() {
        let mut graph = graph!([1, 2, 3, 4, 1], [1, 3], [2, 4]);

        assert!(graph.clustering().values().all(|&c| c == 1.0));
        assert_eq!(graph.average_clustering(), 1.0);
    }

    #[test]
    fn tree_has_no_clustering() {
        let mut graph = graph!([1, 2, 3], [2, 4], [4, 5]);
        graph.insert_vertex(6);

        assert!(graph.clustering().values().all(|&c| c == 0.0));
    }

    #[test]
    fn triangle_count() {
        // Two triangles share the 1-3 edge.
        let mut graph = graph!([1, 2, 3, 1], [1, 4, 3]);
        let indexed = graph.indexed();

        assert_eq!(triangles_at(indexed, 0), 2);
        assert_eq!(triangles_at(indexed, 1), 1);
        assert_eq!(triangles_at(indexed, 2), 2);
        assert_eq!(triangles_at(indexed, 3), 1);
    }
}
