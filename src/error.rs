//! Error types shared across the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GML parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid GML document: {0}")]
    Gml(String),

    #[error("directed graphs are not supported")]
    Directed,

    #[error("node id {0} is declared more than once")]
    DuplicateNode(i64),

    #[error("edge ({u}, {v}) refers to an undeclared node")]
    UnknownNode { u: i64, v: i64 },

    #[error("edge ({u}, {v}) is duplicated")]
    DuplicateEdge { u: i64, v: i64 },

    #[error("vertex {0} is not in the graph")]
    UnknownVertex(String),

    #[error("the graph has no vertices")]
    EmptyGraph,

    #[error("given fraction {:.2}% is not between 0-100%", .0 * 100.0)]
    InvalidFraction(f64),

    #[error("given amount of vertices to remove must be between 1-{max}, got {count}")]
    InvalidCount { count: usize, max: usize },

    #[error("{algorithm} failed to converge in {iterations} iterations")]
    Convergence {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("plotting error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
