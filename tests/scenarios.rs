//! End-to-end searches on the reference puzzles.

use swap_puzzle::{
    a_star, bfs, incremental_bfs, Cell, GridState, PuzzleError, SearchConfig, StateGraph, Swap,
};

fn grid(rows: Vec<Vec<u32>>) -> GridState {
    GridState::from_rows(rows).unwrap()
}

fn assert_legal_chain(states: &[GridState]) {
    for step in states.windows(2) {
        assert!(
            Swap::between(&step[0], &step[1]).is_some(),
            "{:?} -> {:?} is not a single adjacent swap",
            step[0].cells(),
            step[1].cells()
        );
    }
}

#[test]
fn two_by_two_needs_one_swap() {
    let source = grid(vec![vec![1, 2], vec![4, 3]]);
    let target = grid(vec![vec![1, 2], vec![3, 4]]);
    let graph = StateGraph::exhaustive(2, 2, &SearchConfig::default()).unwrap();

    let path = bfs(&graph, &source, &target).unwrap().unwrap();
    assert_eq!(path.len_moves(), 1);
    assert_eq!(path.swaps(), vec![Swap::new((1, 0), (1, 1))]);
    assert_eq!(path.states(), &[source.clone(), target.clone()]);

    assert_eq!(incremental_bfs(&source, &target).unwrap().unwrap().len_moves(), 1);
    assert_eq!(a_star(&source, &target).unwrap().unwrap().len_moves(), 1);
}

#[test]
fn three_by_two_bfs_variants_agree() {
    let source = grid(vec![vec![1, 6], vec![2, 3], vec![4, 5]]);
    let target = grid(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    let graph = StateGraph::exhaustive(3, 2, &SearchConfig::default()).unwrap();
    assert_eq!(graph.node_count(), 720);
    assert_eq!(graph.edge_count(), 720 * 7 / 2);

    let plain = bfs(&graph, &source, &target).unwrap().unwrap();
    let incremental = incremental_bfs(&source, &target).unwrap().unwrap();
    assert_eq!(plain.len_moves(), incremental.len_moves());
    assert_legal_chain(plain.states());
    assert_legal_chain(incremental.states());
    assert_eq!(plain.target(), &target);
    assert_eq!(incremental.target(), &target);

    let astar = a_star(&source, &target).unwrap().unwrap();
    assert_eq!(astar.len_moves(), plain.len_moves());
}

#[test]
fn three_by_three_a_star_reaches_sorted() {
    let source = grid(vec![vec![1, 2, 3], vec![5, 4, 6], vec![8, 9, 7]]);
    let target = grid(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);

    let path = a_star(&source, &target).unwrap().unwrap();
    assert_eq!(path.source(), &source);
    assert_eq!(path.target(), &target);
    assert!(path.target().is_sorted());
    assert_legal_chain(path.states());
    assert_eq!(path.replay_from(&source).unwrap(), target);
    assert_eq!(
        path.len_moves(),
        incremental_bfs(&source, &target).unwrap().unwrap().len_moves()
    );
}

#[test]
fn malformed_values_are_rejected() {
    assert!(matches!(
        GridState::new(2, 2, vec![1, 1, 2, 3]),
        Err(PuzzleError::MalformedState(_))
    ));
}

#[test]
fn diagonal_swap_is_an_invalid_move() {
    let state = GridState::sorted(2, 2);
    assert_eq!(
        state.swap((0, 0), (1, 1)).unwrap_err(),
        PuzzleError::InvalidMove {
            from: Cell::new(0, 0),
            to: Cell::new(1, 1),
        }
    );
}

#[test]
fn searches_between_unsorted_states() {
    let source = grid(vec![vec![2, 1], vec![3, 4]]);
    let target = grid(vec![vec![4, 3], vec![2, 1]]);
    let graph = StateGraph::exhaustive(2, 2, &SearchConfig::default()).unwrap();

    let expected = bfs(&graph, &source, &target).unwrap().unwrap().len_moves();
    assert_eq!(incremental_bfs(&source, &target).unwrap().unwrap().len_moves(), expected);
    assert_eq!(a_star(&source, &target).unwrap().unwrap().len_moves(), expected);
}

#[test]
fn loads_grid_from_file() {
    let path = std::env::temp_dir().join(format!("swap-puzzle-{}.in", std::process::id()));
    std::fs::write(&path, "3 2\n1 6\n2 3\n4 5\n").unwrap();
    let loaded = GridState::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.unwrap(), grid(vec![vec![1, 6], vec![2, 3], vec![4, 5]]));
    assert!(matches!(
        GridState::from_file("/nonexistent/grid.in"),
        Err(PuzzleError::Parse(_))
    ));
}

#[test]
fn bfs_over_a_neighborhood_graph_matches_incremental_search() {
    let target = GridState::sorted(2, 3);
    let radius = 3;
    let ball = StateGraph::from_grid_neighbors(&target, radius);
    assert!(ball.node_count() > 1);

    for source in ball.nodes() {
        let plain = bfs(&ball, source, &target).unwrap().unwrap();
        let incremental = incremental_bfs(source, &target).unwrap().unwrap();
        assert_eq!(plain.len_moves(), incremental.len_moves(), "from {:?}", source.cells());
        assert!(plain.len_moves() <= radius);
        assert_legal_chain(plain.states());
        assert_eq!(plain.target(), &target);
    }
}
