//! Undirected move graph over grid states.

use std::collections::HashMap;
use std::fmt;

use tracing::info;

use crate::config::SearchConfig;
use crate::error::{PuzzleError, Result};
use crate::grid::GridState;
use crate::permutations::all_permutations;

/// Adjacency lists over a set of [`GridState`] nodes.
///
/// Nodes are interned: each state is stored once and edges refer to node
/// indices. Edges are undirected and unweighted.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    nodes: Vec<GridState>,
    index: HashMap<GridState, usize>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with the given nodes and no edges. Repeated nodes are kept once.
    pub fn with_nodes(nodes: impl IntoIterator<Item = GridState>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Every state of a `rows x cols` grid, connected by every legal swap.
    ///
    /// Fails with [`PuzzleError::GraphTooLarge`] when `rows * cols` exceeds
    /// `config.exhaustive_cell_limit`.
    pub fn exhaustive(rows: usize, cols: usize, config: &SearchConfig) -> Result<Self> {
        let cells = rows.saturating_mul(cols);
        if cells > config.exhaustive_cell_limit {
            return Err(PuzzleError::GraphTooLarge {
                cells,
                limit: config.exhaustive_cell_limit,
            });
        }
        if cells == 0 {
            return Err(PuzzleError::MalformedState(format!(
                "dimensions must be positive, got {rows}x{cols}"
            )));
        }

        let mut graph = Self::with_nodes(all_permutations(rows, cols));
        for id in 0..graph.nodes.len() {
            let node = graph.nodes[id].clone();
            for neighbor in node.neighbors() {
                // each undirected edge is seen from both ends; keep one
                if neighbor.key() > node.key() {
                    graph.add_edge(node.clone(), neighbor);
                }
            }
        }

        info!(
            rows,
            cols,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built exhaustive state graph"
        );
        Ok(graph)
    }

    /// All states within `depth` swaps of `source`, expanded breadth-first
    /// through [`GridState::neighbors`].
    pub fn from_grid_neighbors(source: &GridState, depth: usize) -> Self {
        let mut graph = Self::new();
        let mut layer = vec![graph.add_node(source.clone())];
        for _ in 0..depth {
            let mut next_layer = Vec::new();
            for id in layer {
                let node = graph.nodes[id].clone();
                for neighbor in node.neighbors() {
                    let known = graph.index.get(&neighbor).copied();
                    match known {
                        // edge already added from the other end
                        Some(other) if graph.adjacency[other].contains(&id) => {}
                        Some(_) => graph.add_edge(node.clone(), neighbor),
                        None => {
                            graph.add_edge(node.clone(), neighbor.clone());
                            next_layer.push(graph.index[&neighbor]);
                        }
                    }
                }
            }
            layer = next_layer;
        }
        graph
    }

    /// Registers an undirected edge, adding either endpoint if unseen.
    ///
    /// Calling this twice for the same pair records the edge twice.
    pub fn add_edge(&mut self, a: GridState, b: GridState) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
        self.edges.push((a, b));
    }

    /// Registers a node and returns its index; known nodes keep their index.
    pub fn add_node(&mut self, node: GridState) -> usize {
        if let Some(&id) = self.index.get(&node) {
            return id;
        }
        let id = self.nodes.len();
        self.index.insert(node.clone(), id);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, node: &GridState) -> bool {
        self.index.contains_key(node)
    }

    /// Neighbors of `node` in the order their edges were added, or `None`
    /// if `node` is not in the graph.
    pub fn neighbors_of(&self, node: &GridState) -> Option<impl Iterator<Item = &GridState> + '_> {
        let id = *self.index.get(node)?;
        Some(self.adjacency[id].iter().map(|&other| &self.nodes[other]))
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GridState> + '_ {
        self.nodes.iter()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&GridState, &GridState)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b)| (&self.nodes[a], &self.nodes[b]))
    }

    /// `(node, neighbors)` pairs in node insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&GridState, Vec<&GridState>)> + '_ {
        self.nodes.iter().zip(&self.adjacency).map(|(node, adjacent)| {
            (node, adjacent.iter().map(|&other| &self.nodes[other]).collect())
        })
    }

    pub(crate) fn id_of(&self, node: &GridState) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub(crate) fn node(&self, id: usize) -> &GridState {
        &self.nodes[id]
    }

    pub(crate) fn adjacent_ids(&self, id: usize) -> &[usize] {
        &self.adjacency[id]
    }
}

impl fmt::Display for StateGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return writeln!(f, "The graph is empty");
        }
        writeln!(
            f,
            "The graph has {} nodes and {} edges.",
            self.node_count(),
            self.edge_count()
        )?;
        for (node, adjacent) in self.iter() {
            let adjacent: Vec<_> = adjacent.iter().map(|state| state.cells()).collect();
            writeln!(f, "{:?} --> {:?}", node.cells(), adjacent)?;
        }
        Ok(())
    }
}
