//! Undirected edges between two vertices of a network.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

/// A line between two vertices. Lines in a power grid carry no direction, so `(a, b)` and `(b, a)`
/// are the same edge even though the endpoints are named `source` and `target`.
#[derive(Clone, Copy, Debug, Eq)]
pub struct Edge<T> {
    source: T,
    target: T,
}

impl<T> Edge<T> {
    /// Creates an edge between two vertices.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    ///
    /// assert_eq!(Edge::new(1, 2), Edge::new(2, 1));
    /// ```
    pub fn new(source: T, target: T) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Returns whether `vertex` is one of the endpoints.
    pub fn contains(&self, vertex: &T) -> bool
    where
        T: PartialEq,
    {
        self.source() == vertex || self.target() == vertex
    }

    /// Returns the endpoint opposite to `vertex`, or `None` if `vertex` isn't on this edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::edge::Edge;
    ///
    /// let edge = Edge::new("substation", "plant");
    ///
    /// assert_eq!(edge.other(&"plant"), Some(&"substation"));
    /// assert_eq!(edge.other(&"house"), None);
    /// ```
    pub fn other(&self, vertex: &T) -> Option<&T>
    where
        T: PartialEq,
    {
        if self.source() == vertex {
            Some(self.target())
        } else if self.target() == vertex {
            Some(self.source())
        } else {
            None
        }
    }

    /// Returns whether both endpoints are the same vertex.
    pub fn is_loop(&self) -> bool
    where
        T: PartialEq,
    {
        self.source == self.target
    }
}

//
// Trait implementations
//

impl<T: PartialEq> PartialEq for Edge<T> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.source, &self.target);
        let (c, d) = (&other.source, &other.target);

        a == c && b == d || a == d && b == c
    }
}

impl<T: Hash + Ord> Hash for Edge<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the endpoints in ascending order so (a, b) and (b, a) agree.
        let (lo, hi) = match self.source.cmp(&self.target) {
            Ordering::Greater => (&self.target, &self.source),
            _ => (&self.source, &self.target),
        };

        lo.hash(state);
        hi.hash(state);
    }
}
