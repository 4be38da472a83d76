//! Shortest swap sequences between grid states.
//!
//! Three strategies share one entry type, [`PathSearch`]:
//!
//! - [`PathSearch::bfs`] walks a prebuilt [`StateGraph`],
//! - [`PathSearch::incremental_bfs`] generates neighbors on demand,
//! - [`PathSearch::a_star`] orders the frontier by moves plus a lower bound
//!   derived from [`GridState::manhattan_distance`].
//!
//! All of them return `Ok(None)` when the target cannot be reached.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::SearchConfig;
use crate::error::{PuzzleError, Result};
use crate::graph::StateGraph;
use crate::grid::{GridState, Swap};

/// Shared flag that stops a running search at its next frontier pop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Work done by one search call.
#[derive(Debug, Clone, Copy, Default)]
struct SearchStats {
    /// States taken off the frontier and expanded.
    expanded: usize,
    /// Neighbor states looked at during expansion.
    generated: usize,
}

/// A sequence of states from source to target, each one swap from the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    states: Vec<GridState>,
}

impl Path {
    pub fn states(&self) -> &[GridState] {
        &self.states
    }

    pub fn into_states(self) -> Vec<GridState> {
        self.states
    }

    pub fn source(&self) -> &GridState {
        &self.states[0]
    }

    pub fn target(&self) -> &GridState {
        &self.states[self.states.len() - 1]
    }

    /// Number of swaps, one less than the number of states.
    pub fn len_moves(&self) -> usize {
        self.states.len() - 1
    }

    /// The swap performed at each step.
    pub fn swaps(&self) -> Vec<Swap> {
        self.states
            .windows(2)
            .filter_map(|step| Swap::between(&step[0], &step[1]))
            .collect()
    }

    /// Applies [`swaps`](Self::swaps) to `start` in order.
    pub fn replay_from(&self, start: &GridState) -> Result<GridState> {
        start.apply_swaps(&self.swaps())
    }
}

/// Runs searches under a [`SearchConfig`] and an optional [`CancelToken`].
///
/// Each call owns its frontier and parent links; nothing is shared between
/// calls, so one `PathSearch` can serve several threads.
#[derive(Debug, Clone, Default)]
pub struct PathSearch {
    config: SearchConfig,
    cancel: Option<CancelToken>,
}

impl PathSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Breadth-first search over the adjacency lists of `graph`.
    ///
    /// Source and target must both be nodes of the graph; otherwise this
    /// fails with [`PuzzleError::NotInGraph`] rather than reporting the
    /// target as unreachable.
    pub fn bfs(
        &self,
        graph: &StateGraph,
        source: &GridState,
        target: &GridState,
    ) -> Result<Option<Path>> {
        source.check_same_shape(target)?;
        let start = graph
            .id_of(source)
            .ok_or(PuzzleError::NotInGraph("source"))?;
        let goal = graph
            .id_of(target)
            .ok_or(PuzzleError::NotInGraph("target"))?;

        let mut stats = SearchStats::default();
        let mut parents: HashMap<usize, Option<usize>> = HashMap::from([(start, None)]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            self.check_cancelled(&stats)?;
            if current == goal {
                let mut states = vec![graph.node(goal).clone()];
                let mut child = goal;
                while let Some(&Some(parent)) = parents.get(&child) {
                    states.push(graph.node(parent).clone());
                    child = parent;
                }
                states.reverse();
                return Ok(finish("bfs", stats, Some(Path { states })));
            }

            self.check_budget(&stats)?;
            stats.expanded += 1;
            trace!(expanded = stats.expanded, "expanding state");
            for &next in graph.adjacent_ids(current) {
                stats.generated += 1;
                if !parents.contains_key(&next) {
                    parents.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        Ok(finish("bfs", stats, None))
    }

    /// Breadth-first search that generates neighbors with
    /// [`GridState::neighbors`] instead of materializing the graph.
    pub fn incremental_bfs(&self, source: &GridState, target: &GridState) -> Result<Option<Path>> {
        source.check_same_shape(target)?;

        let mut stats = SearchStats::default();
        let mut tree = SearchTree::new(source.clone());
        let mut queue = VecDeque::from([SearchTree::ROOT]);

        while let Some(current) = queue.pop_front() {
            self.check_cancelled(&stats)?;
            if tree.state(current) == target {
                return Ok(finish("incremental_bfs", stats, Some(tree.path_to(current))));
            }

            self.check_budget(&stats)?;
            stats.expanded += 1;
            let depth = tree.cost(current) + 1;
            trace!(depth, "expanding state");
            let neighbors = tree.state(current).neighbors();
            for neighbor in neighbors {
                stats.generated += 1;
                if tree.lookup(&neighbor).is_none() {
                    let id = tree.insert(neighbor, current, depth);
                    queue.push_back(id);
                }
            }
        }

        Ok(finish("incremental_bfs", stats, None))
    }

    /// A* ordered by `g + h`, where `g` counts swaps made and `h` is a lower
    /// bound on the swaps left.
    ///
    /// A single swap changes the value distance to `target` by at most twice
    /// the largest value gap between adjacent cells of `target`, so `h` is
    /// the value distance divided by that amount, rounded up. `h` never
    /// overestimates and never drops by more than one per swap, so the path
    /// returned is as short as the one found by breadth-first search.
    ///
    /// Ties on `f` go to the deeper state, then to the earlier insertion.
    pub fn a_star(&self, source: &GridState, target: &GridState) -> Result<Option<Path>> {
        source.check_same_shape(target)?;
        let heuristic = Heuristic::new(target);

        let mut stats = SearchStats::default();
        let mut tree = SearchTree::new(source.clone());
        let mut closed = vec![false];
        let mut seq = 0usize;
        let mut open = BinaryHeap::new();
        open.push((Reverse(heuristic.estimate(source)), 0usize, Reverse(seq), SearchTree::ROOT));

        while let Some((Reverse(f), g, _, current)) = open.pop() {
            // superseded by a cheaper entry for the same state
            if g > tree.cost(current) || closed[current] {
                continue;
            }
            self.check_cancelled(&stats)?;
            if tree.state(current) == target {
                return Ok(finish("a_star", stats, Some(tree.path_to(current))));
            }

            self.check_budget(&stats)?;
            closed[current] = true;
            stats.expanded += 1;
            trace!(f, g, "expanding state");

            let parent = tree.parent(current);
            let neighbors = tree.state(current).neighbors();
            for neighbor in neighbors {
                stats.generated += 1;
                if parent.is_some_and(|p| tree.state(p) == &neighbor) {
                    continue;
                }

                let tentative = g + 1;
                let id = match tree.lookup(&neighbor) {
                    Some(id) if tentative >= tree.cost(id) => continue,
                    Some(id) => {
                        tree.relink(id, current, tentative);
                        closed[id] = false;
                        id
                    }
                    None => {
                        closed.push(false);
                        tree.insert(neighbor, current, tentative)
                    }
                };
                seq += 1;
                let estimate = heuristic.estimate(tree.state(id));
                open.push((Reverse(tentative + estimate), tentative, Reverse(seq), id));
            }
        }

        Ok(finish("a_star", stats, None))
    }

    /// Checked once per frontier pop.
    fn check_cancelled(&self, stats: &SearchStats) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            warn!(expanded = stats.expanded, "search cancelled");
            return Err(PuzzleError::Cancelled);
        }
        Ok(())
    }

    /// Checked before each expansion, after the goal test.
    fn check_budget(&self, stats: &SearchStats) -> Result<()> {
        if let Some(limit) = self.config.max_expansions {
            if stats.expanded >= limit {
                warn!(limit, "search hit expansion limit");
                return Err(PuzzleError::ExpansionLimit(limit));
            }
        }
        Ok(())
    }
}

fn finish(algorithm: &str, stats: SearchStats, path: Option<Path>) -> Option<Path> {
    debug!(
        algorithm,
        expanded = stats.expanded,
        generated = stats.generated,
        moves = path.as_ref().map(Path::len_moves),
        "search finished"
    );
    path
}

/// Breadth-first search over `graph` with default limits.
pub fn bfs(graph: &StateGraph, source: &GridState, target: &GridState) -> Result<Option<Path>> {
    PathSearch::default().bfs(graph, source, target)
}

/// Breadth-first search with on-demand neighbors and default limits.
pub fn incremental_bfs(source: &GridState, target: &GridState) -> Result<Option<Path>> {
    PathSearch::default().incremental_bfs(source, target)
}

/// A* search with default limits.
pub fn a_star(source: &GridState, target: &GridState) -> Result<Option<Path>> {
    PathSearch::default().a_star(source, target)
}

/// Lower bound on the swaps needed to reach one target state.
struct Heuristic<'a> {
    target: &'a GridState,
    per_swap: u64,
}

impl<'a> Heuristic<'a> {
    fn new(target: &'a GridState) -> Self {
        Self {
            target,
            per_swap: 2 * target.max_adjacent_gap(),
        }
    }

    fn estimate(&self, state: &GridState) -> usize {
        if self.per_swap == 0 {
            return 0;
        }
        // shapes were checked by the caller
        let distance = state.manhattan_distance(self.target).unwrap_or(0);
        distance.div_ceil(self.per_swap) as usize
    }
}

/// Interned states with flat parent links, indexed by discovery order.
struct SearchTree {
    states: Vec<GridState>,
    index: HashMap<GridState, usize>,
    parents: Vec<Option<usize>>,
    costs: Vec<usize>,
}

impl SearchTree {
    const ROOT: usize = 0;

    fn new(root: GridState) -> Self {
        Self {
            index: HashMap::from([(root.clone(), Self::ROOT)]),
            states: vec![root],
            parents: vec![None],
            costs: vec![0],
        }
    }

    fn insert(&mut self, state: GridState, parent: usize, cost: usize) -> usize {
        let id = self.states.len();
        self.index.insert(state.clone(), id);
        self.states.push(state);
        self.parents.push(Some(parent));
        self.costs.push(cost);
        id
    }

    fn relink(&mut self, id: usize, parent: usize, cost: usize) {
        self.parents[id] = Some(parent);
        self.costs[id] = cost;
    }

    fn lookup(&self, state: &GridState) -> Option<usize> {
        self.index.get(state).copied()
    }

    fn state(&self, id: usize) -> &GridState {
        &self.states[id]
    }

    fn parent(&self, id: usize) -> Option<usize> {
        self.parents[id]
    }

    fn cost(&self, id: usize) -> usize {
        self.costs[id]
    }

    fn path_to(&self, id: usize) -> Path {
        let mut states = vec![self.states[id].clone()];
        let mut current = id;
        while let Some(parent) = self.parents[current] {
            states.push(self.states[parent].clone());
            current = parent;
        }
        states.reverse();
        Path { states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn grid(rows: Vec<Vec<u32>>) -> GridState {
        GridState::from_rows(rows).unwrap()
    }

    #[test]
    fn already_at_target() {
        let sorted = GridState::sorted(2, 2);
        let path = incremental_bfs(&sorted, &sorted).unwrap().unwrap();
        assert_eq!(path.len_moves(), 0);
        assert_eq!(path.states(), &[sorted.clone()]);
        let path = a_star(&sorted, &sorted).unwrap().unwrap();
        assert_eq!(path.len_moves(), 0);
    }

    #[test]
    fn single_cell_grid() {
        let only = GridState::sorted(1, 1);
        assert_eq!(a_star(&only, &only).unwrap().unwrap().len_moves(), 0);
        let graph = StateGraph::exhaustive(1, 1, &SearchConfig::default()).unwrap();
        assert_eq!(bfs(&graph, &only, &only).unwrap().unwrap().len_moves(), 0);
    }

    #[test]
    fn reversed_row_needs_three_swaps() {
        let source = grid(vec![vec![3, 2, 1]]);
        let target = GridState::sorted(1, 3);
        assert_eq!(incremental_bfs(&source, &target).unwrap().unwrap().len_moves(), 3);
        assert_eq!(a_star(&source, &target).unwrap().unwrap().len_moves(), 3);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let a = GridState::sorted(2, 3);
        let b = GridState::sorted(3, 2);
        let expected = PuzzleError::DimensionMismatch {
            expected: (2, 3),
            found: (3, 2),
        };
        assert_eq!(incremental_bfs(&a, &b).unwrap_err(), expected);
        assert_eq!(a_star(&a, &b).unwrap_err(), expected);
        assert_eq!(bfs(&StateGraph::new(), &a, &b).unwrap_err(), expected);
    }

    #[test]
    fn bfs_requires_endpoints_in_graph() {
        let source = grid(vec![vec![2, 1], vec![3, 4]]);
        let target = GridState::sorted(2, 2);
        let graph = StateGraph::with_nodes([source.clone()]);
        assert_eq!(
            bfs(&graph, &source, &target).unwrap_err(),
            PuzzleError::NotInGraph("target")
        );
        assert_eq!(
            bfs(&graph, &target, &source).unwrap_err(),
            PuzzleError::NotInGraph("source")
        );
    }

    #[test]
    fn bfs_reports_unreachable_as_none() {
        let source = grid(vec![vec![2, 1], vec![3, 4]]);
        let target = GridState::sorted(2, 2);
        // both present, no edges
        let graph = StateGraph::with_nodes([source.clone(), target.clone()]);
        assert_eq!(bfs(&graph, &source, &target).unwrap(), None);
    }

    #[test]
    fn expansion_limit_aborts() {
        let source = grid(vec![vec![4, 3], vec![2, 1]]);
        let target = GridState::sorted(2, 2);
        let search = PathSearch::new(SearchConfig::default().with_max_expansions(1));
        assert_eq!(
            search.incremental_bfs(&source, &target).unwrap_err(),
            PuzzleError::ExpansionLimit(1)
        );
        assert_eq!(
            search.a_star(&source, &target).unwrap_err(),
            PuzzleError::ExpansionLimit(1)
        );
    }

    #[test]
    fn target_found_within_expansion_limit() {
        let source = grid(vec![vec![2, 1], vec![3, 4]]);
        let target = GridState::sorted(2, 2);
        let search = PathSearch::new(SearchConfig::default().with_max_expansions(1));
        // adjacency follows `neighbors()` order, which lists the target first
        let graph = StateGraph::from_grid_neighbors(&source, 1);

        let path = search.bfs(&graph, &source, &target).unwrap().unwrap();
        assert_eq!(path.len_moves(), 1);
        let path = search.incremental_bfs(&source, &target).unwrap().unwrap();
        assert_eq!(path.len_moves(), 1);
        let path = search.a_star(&source, &target).unwrap().unwrap();
        assert_eq!(path.len_moves(), 1);
    }

    fn one_swap_apart() -> (GridState, GridState) {
        (grid(vec![vec![2, 1], vec![3, 4]]), GridState::sorted(2, 2))
    }

    #[test]
    #[traced_test]
    fn bfs_traces_expansions() {
        let (source, target) = one_swap_apart();
        let graph = StateGraph::from_grid_neighbors(&source, 1);
        bfs(&graph, &source, &target).unwrap();
        assert!(logs_contain("expanding state"));
    }

    #[test]
    #[traced_test]
    fn incremental_bfs_traces_expansions() {
        let (source, target) = one_swap_apart();
        incremental_bfs(&source, &target).unwrap();
        assert!(logs_contain("expanding state"));
    }

    #[test]
    #[traced_test]
    fn a_star_traces_expansions() {
        let (source, target) = one_swap_apart();
        a_star(&source, &target).unwrap();
        assert!(logs_contain("expanding state"));
    }

    #[test]
    fn cancelled_token_stops_every_strategy() {
        let token = CancelToken::new();
        let search = PathSearch::default().with_cancel(token.clone());
        token.cancel();

        let source = grid(vec![vec![2, 1], vec![3, 4]]);
        let target = GridState::sorted(2, 2);
        let graph = StateGraph::exhaustive(2, 2, search.config()).unwrap();
        assert_eq!(search.bfs(&graph, &source, &target).unwrap_err(), PuzzleError::Cancelled);
        assert_eq!(
            search.incremental_bfs(&source, &target).unwrap_err(),
            PuzzleError::Cancelled
        );
        assert_eq!(search.a_star(&source, &target).unwrap_err(), PuzzleError::Cancelled);
    }

    #[test]
    fn heuristic_is_zero_at_target_and_bounded() {
        let target = GridState::sorted(3, 3);
        let heuristic = Heuristic::new(&target);
        assert_eq!(heuristic.estimate(&target), 0);
        for neighbor in target.neighbors() {
            assert_eq!(heuristic.estimate(&neighbor), 1);
        }
    }

    #[test]
    fn path_swaps_replay() {
        let source = grid(vec![vec![1, 2, 3], vec![5, 4, 6], vec![8, 9, 7]]);
        let target = GridState::sorted(3, 3);
        let path = a_star(&source, &target).unwrap().unwrap();
        assert_eq!(path.source(), &source);
        assert_eq!(path.target(), &target);
        assert_eq!(path.swaps().len(), path.len_moves());
        assert_eq!(path.replay_from(&source).unwrap(), target);
    }
}
