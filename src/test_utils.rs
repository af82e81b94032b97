/// Builds a graph from one or more paths, e.g. `graph!([1, 2, 3], [2, 4])` has the edges 1-2,
/// 2-3 and 2-4.
macro_rules! graph {
    ($($path:expr),*) => {{
        let mut graph = $crate::graph::Graph::new();

        $(
            let mut iter = $path.into_iter().peekable();
            while let (Some(a), Some(b)) = (iter.next(), iter.peek()) {
                graph.insert($crate::edge::Edge::new(a, *b));
            }
        )*

        graph
    }}
}
