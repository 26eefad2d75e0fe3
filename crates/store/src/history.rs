//! Per-user rating history.
//!
//! The history is a binary tree whose leaves are the user's ratings and
//! whose internal nodes only route descents. Inserting a rating for a new
//! movie splits the leaf the descent ends on: the old rating and the new one
//! become the two children of what used to be that leaf.
//!
//! ## Algorithm
//! 1. Empty tree: the rating becomes the root leaf.
//! 2. Descend: go left when the node key is `>=` the movie id, right otherwise,
//!    until a leaf is reached.
//! 3. Same movie at the leaf: overwrite its score (last write wins).
//! 4. Different movie: the leaf turns internal, the smaller id goes left, the
//!    larger right, and the routing key becomes the smaller id.
//!
//! Reading the leaves left to right yields ratings in ascending movie id.
//! The tree is never rebalanced; its depth grows with unlucky id orders.
//!
//! Nodes live in an arena (`Vec`) and refer to each other by index, so the
//! parent/child rewiring of a split is a handful of index assignments.

use crate::error::{Result, StoreError};
use crate::types::{MovieId, Rating, Score};

/// Index of a node in the history arena
type NodeIdx = usize;

#[derive(Debug, Clone)]
enum NodeKind {
    /// The only authoritative record of a rating
    Leaf(Rating),
    /// Routing scaffolding: ids `<= key` live on the left
    Internal {
        key: MovieId,
        left: NodeIdx,
        right: NodeIdx,
    },
}

#[derive(Debug, Clone)]
struct HistoryNode {
    parent: Option<NodeIdx>,
    kind: NodeKind,
}

/// What [`History::record`] did with a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// First rating of this movie by this user
    New,
    /// The movie was already rated; its score was replaced
    Rerated { previous: Score },
}

/// A user's ratings, one leaf per rated movie
#[derive(Debug, Clone, Default)]
pub struct History {
    nodes: Vec<HistoryNode>,
    root: Option<NodeIdx>,
    leaf_count: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `rating`, splitting a leaf when the movie is new to this user.
    ///
    /// On `OutOfMemory` the tree is left exactly as it was.
    pub fn record(&mut self, rating: Rating) -> Result<Recorded> {
        let Some(root) = self.root else {
            self.reserve(1)?;
            self.root = Some(self.push_leaf(None, rating));
            self.leaf_count = 1;
            return Ok(Recorded::New);
        };

        let (leaf, existing) = self.descend(root, rating.movie_id);

        if existing.movie_id == rating.movie_id {
            if let NodeKind::Leaf(stored) = &mut self.nodes[leaf].kind {
                stored.score = rating.score;
            }
            return Ok(Recorded::Rerated {
                previous: existing.score,
            });
        }

        // Reserve both children before touching the leaf
        self.reserve(2)?;
        let (low, high) = if rating.movie_id <= existing.movie_id {
            (rating, existing)
        } else {
            (existing, rating)
        };
        let left = self.push_leaf(Some(leaf), low);
        let right = self.push_leaf(Some(leaf), high);
        self.nodes[leaf].kind = NodeKind::Internal {
            key: low.movie_id,
            left,
            right,
        };
        self.leaf_count += 1;
        Ok(Recorded::New)
    }

    /// Look up this user's rating of `movie_id`
    pub fn get(&self, movie_id: MovieId) -> Option<&Rating> {
        let (leaf, _) = self.descend(self.root?, movie_id);
        match &self.nodes[leaf].kind {
            NodeKind::Leaf(rating) if rating.movie_id == movie_id => Some(rating),
            _ => None,
        }
    }

    /// Ratings in ascending movie id order
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Mean of the leaf scores, `None` when nothing was rated
    pub fn mean_score(&self) -> Option<f64> {
        let (sum, count) = self
            .leaves()
            .fold((0u64, 0u64), |(sum, count), rating| {
                (sum + u64::from(rating.score), count + 1)
            });
        if count == 0 {
            None
        } else {
            Some(sum as f64 / count as f64)
        }
    }

    /// Number of rated movies (leaves)
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Leaves plus routing nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn depth(&self) -> usize {
        // A split pushes its children after the node being split, so every
        // parent index is smaller than its children's and one pass suffices.
        let mut depths: Vec<usize> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let depth = node.parent.map_or(1, |parent| depths[parent] + 1);
            depths.push(depth);
        }
        depths.into_iter().max().unwrap_or(0)
    }

    /// Drop every rating
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.leaf_count = 0;
    }

    fn descend(&self, mut idx: NodeIdx, movie_id: MovieId) -> (NodeIdx, Rating) {
        loop {
            match self.nodes[idx].kind {
                NodeKind::Leaf(rating) => return (idx, rating),
                NodeKind::Internal { key, left, right } => {
                    idx = if key >= movie_id { left } else { right };
                }
            }
        }
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.nodes
            .try_reserve(additional)
            .map_err(|_| StoreError::out_of_memory("history node"))
    }

    fn push_leaf(&mut self, parent: Option<NodeIdx>, rating: Rating) -> NodeIdx {
        self.nodes.push(HistoryNode {
            parent,
            kind: NodeKind::Leaf(rating),
        });
        self.nodes.len() - 1
    }
}

/// In-order iterator over the leaves of a [`History`]
pub struct Leaves<'a> {
    nodes: &'a [HistoryNode],
    stack: Vec<NodeIdx>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Rating;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            match &self.nodes[idx].kind {
                NodeKind::Leaf(rating) => return Some(rating),
                NodeKind::Internal { left, right, .. } => {
                    // Right first so the left subtree is popped first
                    self.stack.push(*right);
                    self.stack.push(*left);
                }
            }
        }
        None
    }
}
