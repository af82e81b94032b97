//! Blackout is a small toolkit for analysing power-grid topologies, and how they fall apart when
//! their most important vertices are taken out. It applies to any undirected graph.
//!
//! # Basic usage
//!
//! The library is centered around the [`Graph`](graph::Graph) structure which can be constructed
//! from one or more [`Edge`](edge::Edge) instances, or loaded from a GML file with
//! [`gml::read`]. Once constructed, structural measurements and centralities can be computed,
//! and a [`Sabotage`](sabotage::Sabotage) can remove the highest ranked vertices to see how the
//! grid fragments.
//!
//! ```rust
//! use blackout::edge::Edge;
//! use blackout::graph::Graph;
//! use blackout::sabotage::{Removal, Sabotage};
//!
//! // Two substations, each feeding two consumers, joined by a single line.
//! let mut graph = Graph::new();
//! graph.insert(Edge::new("north", "south"));
//! graph.insert(Edge::new("north", "a"));
//! graph.insert(Edge::new("north", "b"));
//! graph.insert(Edge::new("south", "c"));
//! graph.insert(Edge::new("south", "d"));
//!
//! // Compute some metrics on that state of the graph.
//! assert_eq!(graph.vertex_count(), 6);
//! assert_eq!(graph.density(), 1.0 / 3.0);
//! assert_eq!(graph.average_clustering(), 0.0);
//!
//! // Knock out the most central substation...
//! let scores = graph.betweenness_centrality(2, true);
//! let mut attack = Sabotage::new(&graph, &scores)
//!     .destroy_vertices(Removal::Count(1))
//!     .unwrap();
//!
//! // ...which strands its consumers.
//! let fragmentation = attack.fragmentation();
//! assert_eq!(fragmentation.component_sizes, vec![3, 1, 1]);
//! assert_eq!(fragmentation.average_fragment_size, Some(1.0));
//! ```
//!
//! The [`Analyzer`](analysis::Analyzer) bundles all of this into a single run over a network,
//! configured through [`Config`](config::Config).

#[cfg(test)]
#[macro_use]
mod test_utils;

mod betweenness;
mod closeness;
mod clustering;
mod components;

pub mod analysis;
pub mod centrality;
pub mod config;
pub mod edge;
pub mod error;
pub mod gml;
pub mod graph;
pub mod histogram;
pub mod plot;
pub mod report;
pub mod sabotage;

pub use error::{Error, Result};
