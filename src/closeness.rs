//! Multi-threaded closeness: a breadth-first search from every vertex, shared out over a pool.

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

/// Breadth-first search from `index`, returning the sum of the distances to every reachable
/// vertex and the number of vertices reached (`index` included).
fn closeness_for_node(index: usize, indices: &[Vec<GraphIndex>]) -> (u64, usize) {
    let num_nodes = indices.len();

    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut distances: Vec<Option<u32>> = vec![None; num_nodes];

    let mut total_distance: u64 = 0;
    let mut reached = 1;

    distances[index] = Some(0);
    queue.push_back(index);

    while let Some(current) = queue.pop_front() {
        let next = distances[current].map_or(0, |d| d + 1);
        for &j in &indices[current] {
            let j = j as usize;
            if distances[j].is_none() {
                distances[j] = Some(next);
                total_distance += u64::from(next);
                reached += 1;
                queue.push_back(j);
            }
        }
    }

    (total_distance, reached)
}

/// Worker loop, returning a `(position, total distance, reached)` triple per vertex it claimed.
fn closeness_task(
    counter: Arc<AtomicUsize>,
    indices: Arc<Vec<Vec<GraphIndex>>>,
) -> Vec<(usize, u64, usize)> {
    let start = Instant::now();
    let num_nodes = indices.len();
    let mut results = Vec::new();

    loop {
        let index = counter.fetch_add(1, Ordering::Relaxed);
        if index >= num_nodes {
            break;
        }

        if index % 1000 == 0 {
            debug!("closeness: node {index}, elapsed {:?}", start.elapsed());
        }
        let (total_distance, reached) = closeness_for_node(index, &indices);
        results.push((index, total_distance, reached));
    }

    results
}

/// Computes, for every position in `indices`, the total distance to the reachable vertices and
/// how many vertices are reachable, spread over `num_threads` workers.
pub fn compute_closeness(indices: Vec<Vec<GraphIndex>>, num_threads: usize) -> Vec<(u64, usize)> {
    let start = Instant::now();
    let num_threads = num_threads.clamp(MIN_NUM_THREADS, MAX_NUM_THREADS);
    let num_nodes = indices.len();
    debug!("compute_closeness: {num_nodes} nodes, {num_threads} threads");

    let mut reach: Vec<(u64, usize)> = vec![(0, 1); num_nodes];

    let wrapped_indices = Arc::new(indices);
    let wrapped_counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let counter = Arc::clone(&wrapped_counter);
            let indices = Arc::clone(&wrapped_indices);
            thread::spawn(move || closeness_task(counter, indices))
        })
        .collect();

    for handle in handles {
        let partial = handle.join().unwrap_or_else(|e| panic::resume_unwind(e));
        for (index, total_distance, reached) in partial {
            reach[index] = (total_distance, reached);
        }
    }

    debug!("compute_closeness: done in {:?}", start.elapsed());

    reach
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path() {
        let indices = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];

        assert_eq!(
            compute_closeness(indices, 2),
            vec![(6, 4), (4, 4), (4, 4), (6, 4)]
        );
    }

    #[test]
    fn disconnected() {
        // 0-1 and an isolated 2.
        let indices = vec![vec![1], vec![0], vec![]];

        assert_eq!(compute_closeness(indices, 8), vec![(1, 2), (1, 2), (0, 1)]);
    }

    #[test]
    fn single_node() {
        assert_eq!(closeness_for_node(0, &[vec![]]), (0, 1));
    }
}
