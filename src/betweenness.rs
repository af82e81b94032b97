//! Multi-threaded betweenness, one single-source pass per vertex spread over a worker pool.

use std::{
    collections::VecDeque,
    panic,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use tracing::debug;

use crate::graph::{GraphIndex, MAX_NUM_THREADS, MIN_NUM_THREADS};

/// Adds the dependencies of `index` on every other vertex to `betweenness_count`.
///
/// Brandes, "A Faster Algorithm for Betweenness Centrality", Algorithm 1 (unweighted graphs):
/// http://snap.stanford.edu/class/cs224w-readings/brandes01centrality.pdf
fn betweenness_for_node(index: usize, indices: &[Vec<GraphIndex>], betweenness_count: &mut [f64]) {
    let num_nodes = indices.len();
    let unvisited = num_nodes + 1;

    let mut sigma: Vec<f64> = vec![0.0; num_nodes];
    let mut distance: Vec<usize> = vec![unvisited; num_nodes];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
    let mut delta: Vec<f64> = vec![0.0; num_nodes];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut stack: Vec<usize> = Vec::new();

    sigma[index] = 1.0;
    distance[index] = 0;
    queue.push_back(index);

    while let Some(v) = queue.pop_front() {
        stack.push(v);

        for &w in &indices[v] {
            let w = w as usize;
            if distance[w] == unvisited {
                distance[w] = distance[v] + 1;
                queue.push_back(w);
            }
            if distance[w] == distance[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    // Vertices come off the stack in order of non-increasing distance from the source.
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != index {
            betweenness_count[w] += delta[w];
        }
    }
}

/// Worker loop: claims vertices from the shared counter until none are left and returns the
/// partial sums it accumulated.
fn betweenness_task(counter: Arc<AtomicUsize>, indices: Arc<Vec<Vec<GraphIndex>>>) -> Vec<f64> {
    let start = Instant::now();
    let num_nodes = indices.len();

    let mut betweenness_count: Vec<f64> = vec![0.0; num_nodes];

    loop {
        let index = counter.fetch_add(1, Ordering::Relaxed);
        if index >= num_nodes {
            break;
        }

        if index % 1000 == 0 {
            debug!("betweenness: node {index}, elapsed {:?}", start.elapsed());
        }
        betweenness_for_node(index, &indices, &mut betweenness_count);
    }

    betweenness_count
}

/// Computes the betweenness of every position in `indices` over a pool of `num_threads`
/// workers, clamped to a sane range.
///
/// Each unordered pair is visited from both ends. Unnormalised values are halved to compensate;
/// normalised ones are divided by `(n - 1)(n - 2)`, i.e. twice the number of pairs a vertex can
/// sit between.
pub fn compute_betweenness(
    indices: Vec<Vec<GraphIndex>>,
    num_threads: usize,
    normalize: bool,
) -> Vec<f64> {
    let start = Instant::now();
    let num_threads = num_threads.clamp(MIN_NUM_THREADS, MAX_NUM_THREADS);
    let num_nodes = indices.len();
    debug!("compute_betweenness: {num_nodes} nodes, {num_threads} threads");

    let mut betweenness_count: Vec<f64> = vec![0.0; num_nodes];

    let shared_indices = Arc::new(indices);
    let next_vertex = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let counter = Arc::clone(&next_vertex);
            let indices = Arc::clone(&shared_indices);
            thread::spawn(move || betweenness_task(counter, indices))
        })
        .collect();

    let divisor: f64 = match (normalize, num_nodes) {
        // With fewer than three vertices nothing can lie between a pair.
        (true, n) if n > 2 => ((n - 1) * (n - 2)) as f64,
        (true, _) => 1.0,
        (false, _) => 2.0,
    };

    // Partials are summed before scaling so equal scores stay equal whatever the thread count.
    for handle in handles {
        let partial = handle.join().unwrap_or_else(|e| panic::resume_unwind(e));
        for (total, b) in betweenness_count.iter_mut().zip(partial) {
            *total += b;
        }
    }
    betweenness_count.iter_mut().for_each(|b| *b /= divisor);

    debug!("compute_betweenness: done in {:?}", start.elapsed());

    betweenness_count
}
