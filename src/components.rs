//! Connected components.

use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use crate::{
    edge::Edge,
    graph::{Graph, Indexed},
};

/// Labels every position with the component it belongs to, returning the labels and the number
/// of components. Components are numbered in order of their smallest position.
pub(crate) fn label_components<T>(indexed: &Indexed<T>) -> (Vec<usize>, usize) {
    let n = indexed.len();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut count = 0;
    let mut queue = VecDeque::new();

    for root in 0..n {
        if labels[root].is_some() {
            continue;
        }

        labels[root] = Some(count);
        queue.push_back(root);

        while let Some(v) = queue.pop_front() {
            for &w in &indexed.neighbours[v] {
                let w = w as usize;
                if labels[w].is_none() {
                    labels[w] = Some(count);
                    queue.push_back(w);
                }
            }
        }

        count += 1;
    }

    (labels.into_iter().flatten().collect(), count)
}

impl<T> Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Returns the connected components, largest first. Components of equal size are ordered by
    /// their smallest vertex, and each component's vertices are sorted.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(3, 4), Edge::new(4, 5)]
    ///     .into_iter()
    ///     .collect();
    ///
    /// assert_eq!(graph.connected_components(), vec![vec![3, 4, 5], vec![1, 2]]);
    /// ```
    pub fn connected_components(&mut self) -> Vec<Vec<T>> {
        let indexed = self.indexed();
        let (labels, count) = label_components(indexed);

        let mut components: Vec<Vec<T>> = vec![Vec::new(); count];
        for (position, label) in labels.into_iter().enumerate() {
            components[label].push(indexed.vertices[position]);
        }

        // Stable, so equal sizes keep the smallest-vertex order from labelling.
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    /// Returns the sizes of the connected components, largest first.
    pub fn component_sizes(&mut self) -> Vec<usize> {
        let (labels, count) = label_components(self.indexed());

        let mut sizes = vec![0; count];
        for label in labels {
            sizes[label] += 1;
        }

        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    pub fn number_connected_components(&mut self) -> usize {
        label_components(self.indexed()).1
    }

    /// Returns whether every vertex can reach every other. An empty graph isn't connected.
    pub fn is_connected(&mut self) -> bool {
        self.vertex_count() > 0 && self.number_connected_components() == 1
    }
}
