//! A module for working with graphs.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
};

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::{
    edge::Edge,
    error::{Error, Result},
};

/// Compact vertex position used in the neighbour lists handed to the worker pools.
pub(crate) type GraphIndex = u32;

pub(crate) const MIN_NUM_THREADS: usize = 1;
pub(crate) const MAX_NUM_THREADS: usize = 128;

/// An undirected simple graph, made up of vertices and the edges between them.
#[derive(Clone, Debug)]
pub struct Graph<T> {
    /// All vertices, including isolated ones.
    vertices: HashSet<T>,
    /// The edges in the graph.
    edges: HashSet<Edge<T>>,
    /// Positional view of the graph, built lazily and dropped on every mutation.
    indexed: Option<Indexed<T>>,
    /// Cache the adjacency matrix when possible.
    adjacency_matrix: Option<DMatrix<f64>>,
}

/// A snapshot of the graph where every vertex has a fixed position.
///
/// Positions follow `T`'s implementation of `Ord`, which keeps results stable between runs and
/// gives rankings a deterministic tie order.
#[derive(Clone, Debug)]
pub(crate) struct Indexed<T> {
    /// Vertices by position.
    pub(crate) vertices: Vec<T>,
    /// Positions by vertex.
    pub(crate) index: BTreeMap<T, usize>,
    /// Sorted neighbour positions for each position.
    pub(crate) neighbours: Vec<Vec<GraphIndex>>,
}

impl<T> Indexed<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn build(vertices: &HashSet<T>, edges: &HashSet<Edge<T>>) -> Self {
        let mut sorted: Vec<T> = vertices.iter().copied().collect();
        sorted.sort();

        let index: BTreeMap<T, usize> = sorted
            .iter()
            .enumerate()
            .map(|(i, &vertex)| (vertex, i))
            .collect();

        let mut neighbours = vec![Vec::new(); sorted.len()];
        for edge in edges {
            // Both endpoints are inserted alongside every edge, so the lookups can't miss.
            let i = index[edge.source()];
            let j = index[edge.target()];

            neighbours[i].push(j as GraphIndex);
            neighbours[j].push(i as GraphIndex);
        }

        for list in &mut neighbours {
            list.sort_unstable();
        }

        Self {
            vertices: sorted,
            index,
            neighbours,
        }
    }

    /// Pairs each vertex with the value at its position.
    pub(crate) fn label<V>(&self, values: impl IntoIterator<Item = V>) -> HashMap<T, V> {
        self.vertices.iter().copied().zip(values).collect()
    }
}

impl<T> Indexed<T> {
    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns whether positions `i` and `j` share an edge.
    pub(crate) fn adjacent(&self, i: usize, j: usize) -> bool {
        self.neighbours[i].binary_search(&(j as GraphIndex)).is_ok()
    }
}

impl<T> Default for Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Edge<T>> for Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    fn from_iter<I: IntoIterator<Item = Edge<T>>>(iter: I) -> Self {
        let mut graph = Self::new();
        for edge in iter {
            graph.insert(edge);
        }

        graph
    }
}

impl<T> Graph<T>
where
    Edge<T>: Eq + Hash,
    T: Copy + Eq + Hash + Ord + Debug,
{
    /// Creates an empty graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::graph::Graph;
    ///
    /// let graph: Graph<u32> = Graph::new();
    /// assert_eq!(graph.vertex_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            vertices: Default::default(),
            edges: Default::default(),
            indexed: None,
            adjacency_matrix: None,
        }
    }

    /// Returns the edge set.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let graph: Graph<u32> = [Edge::new(1, 2), Edge::new(2, 3)].into_iter().collect();
    ///
    /// assert_eq!(graph.edges().len(), 2);
    /// assert!(graph.edges().contains(&Edge::new(2, 1)));
    /// ```
    pub fn edges(&self) -> &HashSet<Edge<T>> {
        &self.edges
    }

    /// Inserts a vertex, returning whether it was new.
    pub fn insert_vertex(&mut self, vertex: T) -> bool {
        let is_inserted = self.vertices.insert(vertex);
        if is_inserted {
            self.clear_cache();
        }

        is_inserted
    }

    /// Inserts an edge and its endpoints into the graph, returning whether the edge was new.
    ///
    /// Self-loops are not part of a simple graph and are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// assert!(graph.insert(Edge::new(1, 2)));
    /// assert!(!graph.insert(Edge::new(2, 1)));
    /// assert!(!graph.insert(Edge::new(3, 3)));
    /// ```
    pub fn insert(&mut self, edge: Edge<T>) -> bool {
        if edge.is_loop() {
            debug!("ignoring self-loop on {:?}", edge.source());
            return false;
        }

        let (source, target) = (*edge.source(), *edge.target());
        let is_inserted = self.edges.insert(edge);

        // Delete the cached objects if the edge was successfully inserted because we can't
        // reliably update them from the new connection alone.
        if is_inserted {
            self.vertices.insert(source);
            self.vertices.insert(target);
            self.clear_cache();
        }

        is_inserted
    }

    /// Removes an edge from the set and returns whether it was present in the set. The endpoints
    /// stay in the graph.
    pub fn remove(&mut self, edge: &Edge<T>) -> bool {
        let is_removed = self.edges.remove(edge);
        if is_removed {
            self.clear_cache()
        }

        is_removed
    }

    /// Removes a vertex along with every edge touching it.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(2, 3)].into_iter().collect();
    ///
    /// assert!(graph.remove_vertex(&2));
    /// assert_eq!(graph.vertex_count(), 2);
    /// assert_eq!(graph.edge_count(), 0);
    /// ```
    pub fn remove_vertex(&mut self, vertex: &T) -> bool {
        if !self.vertices.remove(vertex) {
            return false;
        }

        self.edges.retain(|edge| !edge.contains(vertex));
        self.clear_cache();

        true
    }

    /// Returns a copy of the graph without the given vertices and their edges. The graph itself
    /// isn't modified.
    pub fn without_vertices(&self, removed: &[T]) -> Self {
        let removed: HashSet<&T> = removed.iter().collect();

        Self {
            vertices: self
                .vertices
                .iter()
                .filter(|vertex| !removed.contains(vertex))
                .copied()
                .collect(),
            edges: self
                .edges
                .iter()
                .filter(|edge| !removed.contains(edge.source()) && !removed.contains(edge.target()))
                .copied()
                .collect(),
            indexed: None,
            adjacency_matrix: None,
        }
    }

    /// Checks if the graph contains an edge.
    pub fn contains(&self, edge: &Edge<T>) -> bool {
        self.edges.contains(edge)
    }

    /// Checks if the graph contains a vertex.
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.vertices.contains(vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the vertices sorted by `T`'s implementation of `Ord`.
    pub fn vertices(&mut self) -> Vec<T> {
        self.indexed().vertices.clone()
    }

    /// Computes the density of the graph, the ratio of edges with respect to the maximum possible
    /// edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    ///
    /// graph.insert(Edge::new(1, 2));
    /// assert_eq!(graph.density(), 1.0);
    ///
    /// graph.insert(Edge::new(1, 3));
    /// assert_eq!(graph.density(), 2.0 / 3.0);
    /// ```
    pub fn density(&self) -> f64 {
        let vc = self.vertex_count() as f64;
        let ec = self.edge_count() as f64;

        // Calculate the total number of possible edges given a vertex count.
        let pec = vc * (vc - 1.0) / 2.0;
        ec / pec
    }

    /// Returns a mapping of vertices to their degree (number of neighbours).
    pub fn degrees(&mut self) -> HashMap<T, usize> {
        let indexed = self.indexed();
        indexed.label(indexed.neighbours.iter().map(Vec::len))
    }

    /// Returns the average number of neighbours per vertex, 0 for an empty graph.
    pub fn mean_degree(&self) -> f64 {
        if self.vertices.is_empty() {
            return 0.0;
        }

        // Every edge adds one to the degree of both endpoints.
        2.0 * self.edge_count() as f64 / self.vertex_count() as f64
    }

    /// Returns the fraction of vertices having each degree, keyed by degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(2, 3)].into_iter().collect();
    /// let distribution = graph.degree_distribution();
    ///
    /// assert_eq!(distribution.get(&1), Some(&(2.0 / 3.0)));
    /// assert_eq!(distribution.get(&2), Some(&(1.0 / 3.0)));
    /// ```
    pub fn degree_distribution(&mut self) -> BTreeMap<usize, f64> {
        let indexed = self.indexed();
        let n = indexed.len() as f64;

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for list in &indexed.neighbours {
            *counts.entry(list.len()).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(degree, count)| (degree, count as f64 / n))
            .collect()
    }

    /// Constructs the adjacency matrix for this graph, with rows and columns ordered by vertex.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph = Graph::new();
    /// graph.insert(Edge::new(1, 2));
    /// assert_eq!(
    ///     graph.adjacency_matrix(),
    ///     dmatrix![0.0, 1.0;
    ///              1.0, 0.0]
    /// );
    /// ```
    pub fn adjacency_matrix(&mut self) -> DMatrix<f64> {
        // Check the cache.
        if let Some(matrix) = self.adjacency_matrix.clone() {
            return matrix;
        }

        let indexed = self.indexed();
        let n = indexed.len();
        let mut matrix = DMatrix::<f64>::zeros(n, n);

        // The neighbour lists are symmetric, so both triangles get written.
        for (i, list) in indexed.neighbours.iter().enumerate() {
            for &j in list {
                matrix[(i, j as usize)] = 1.0;
            }
        }

        self.adjacency_matrix = Some(matrix.clone());

        matrix
    }

    /// Computes `A^length`, where entry `(i, j)` is the number of walks of that length between
    /// the `i`-th and `j`-th vertex.
    ///
    /// The matrix is dense, so this is only practical for graphs of a few thousand vertices at
    /// most. Use [`walks_from`](Self::walks_from) for a single row.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::dmatrix;
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(2, 3)].into_iter().collect();
    /// assert_eq!(
    ///     graph.walk_matrix(2),
    ///     dmatrix![1.0, 0.0, 1.0;
    ///              0.0, 2.0, 0.0;
    ///              1.0, 0.0, 1.0]
    /// );
    /// ```
    pub fn walk_matrix(&mut self, length: u32) -> DMatrix<f64> {
        let mut base = self.adjacency_matrix();
        let n = base.nrows();
        let mut result = DMatrix::<f64>::identity(n, n);

        // Exponentiation by squaring.
        let mut exponent = length;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = &result * &base;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = &base * &base;
            }
        }

        result
    }

    /// Returns the number of walks of `length` steps from `source` to every vertex.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    /// use blackout::graph::Graph;
    ///
    /// let mut graph: Graph<_> = [Edge::new(1, 2), Edge::new(2, 3)].into_iter().collect();
    /// let walks = graph.walks_from(&2, 2).unwrap();
    ///
    /// assert_eq!(walks[&2], 2.0);
    /// assert_eq!(walks[&1], 0.0);
    /// ```
    pub fn walks_from(&mut self, source: &T, length: u32) -> Result<HashMap<T, f64>> {
        let indexed = self.indexed();
        let start = *indexed
            .index
            .get(source)
            .ok_or_else(|| Error::UnknownVertex(format!("{source:?}")))?;

        let n = indexed.len();
        let mut walks = DVector::<f64>::zeros(n);
        walks[start] = 1.0;

        for _ in 0..length {
            let mut next = DVector::<f64>::zeros(n);
            for (i, list) in indexed.neighbours.iter().enumerate() {
                next[i] = list.iter().map(|&j| walks[j as usize]).sum();
            }
            walks = next;
        }

        Ok(indexed.label(walks.iter().copied()))
    }

    //
    // Crate
    //

    /// Returns the positional view of the graph, building it if the cache is empty.
    pub(crate) fn indexed(&mut self) -> &Indexed<T> {
        let (vertices, edges) = (&self.vertices, &self.edges);
        self.indexed
            .get_or_insert_with(|| Indexed::build(vertices, edges))
    }

    //
    // Private
    //

    /// Clears the computed state.
    ///
    /// This should be called every time the graph is mutated since the cached state won't
    /// correspond to the new graph.
    fn clear_cache(&mut self) {
        self.indexed = None;
        self.adjacency_matrix = None;
    }
}
