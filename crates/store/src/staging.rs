//! Staging area for announced movies.
//!
//! Announced movies wait in a plain binary search tree keyed by movie id
//! until [`Staging::publish`] moves them into the catalog. Publication walks
//! the tree post-order: a node is published only after both its subtrees
//! were, and is unlinked right after its catalog insert succeeds.
//!
//! Nodes live in an arena and every walk uses an explicit stack, so a tree
//! that degenerated into a list (ids announced in sorted order) is handled
//! like any other.
//!
//! ## Failure policy
//! The first failed catalog insert stops the walk. Nothing is rolled back:
//! movies published so far stay in the catalog and are gone from staging,
//! the failing node stays in staging without children, and its unpublished
//! ancestors and unvisited subtrees stay where they were.

use crate::catalog::Catalog;
use crate::error::{Entity, Result, StoreError};
use crate::types::{Announcement, MovieId};
use tracing::{info, instrument, warn};

type NodeIdx = usize;

#[derive(Debug, Clone)]
struct StagingNode {
    movie: Announcement,
    parent: Option<NodeIdx>,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
}

/// Outcome of a successful [`Staging::publish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// Staging was already empty
    NothingToDo,
    /// Every staged movie moved to the catalog
    Published { count: usize },
}

/// Announced but unpublished movies
#[derive(Debug, Default)]
pub struct Staging {
    nodes: Vec<StagingNode>,
    root: Option<NodeIdx>,
    /// Nodes still linked into the tree
    len: usize,
}

impl Staging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a movie.
    ///
    /// The id must be unused both here and in every category of `catalog`.
    pub fn announce(&mut self, movie: Announcement, catalog: &Catalog) -> Result<()> {
        if self.contains(movie.id) || catalog.contains_anywhere(movie.id) {
            return Err(StoreError::AlreadyExists {
                entity: Entity::Movie,
                id: movie.id,
            });
        }

        // (parent index, descended left)
        let mut parent: Option<(NodeIdx, bool)> = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            let go_left = node.movie.id > movie.id;
            parent = Some((idx, go_left));
            current = if go_left { node.left } else { node.right };
        }

        self.nodes
            .try_reserve(1)
            .map_err(|_| StoreError::out_of_memory(format!("staging node for movie {}", movie.id)))?;
        let idx = self.nodes.len();
        self.nodes.push(StagingNode {
            movie,
            parent: parent.map(|(p, _)| p),
            left: None,
            right: None,
        });
        match parent {
            None => self.root = Some(idx),
            Some((p, true)) => self.nodes[p].left = Some(idx),
            Some((p, false)) => self.nodes[p].right = Some(idx),
        }
        self.len += 1;
        Ok(())
    }

    /// Move every staged movie into its category tree.
    #[instrument(skip(self, catalog), fields(staged = self.len))]
    pub fn publish(&mut self, catalog: &mut Catalog) -> Result<Publication> {
        let Some(root) = self.root else {
            return Ok(Publication::NothingToDo);
        };

        let mut published = 0;
        let mut outcome = Ok(());
        // (node, subtrees already scheduled)
        let mut stack = vec![(root, false)];
        while let Some((idx, expanded)) = stack.pop() {
            if !expanded {
                stack.push((idx, true));
                let node = &self.nodes[idx];
                // Right pushed first so the left subtree is finished first
                stack.extend(node.right.map(|r| (r, false)));
                stack.extend(node.left.map(|l| (l, false)));
                continue;
            }

            let Announcement { id, category, year } = self.nodes[idx].movie;
            if let Err(err) = catalog.insert(id, category, year) {
                warn!("Publication stopped at movie {}", id);
                let node = &mut self.nodes[idx];
                node.left = None;
                node.right = None;
                outcome = Err(err);
                break;
            }
            self.unlink(idx);
            published += 1;
        }
        self.len -= published;

        match outcome {
            Ok(()) => {
                self.nodes.clear();
                self.root = None;
                info!("Published {} movies", published);
                Ok(Publication::Published { count: published })
            }
            Err(err) => {
                self.compact();
                warn!(
                    "Publication halted after {} movies, {} left in staging: {}",
                    published, self.len, err
                );
                Err(err)
            }
        }
    }

    pub fn contains(&self, id: MovieId) -> bool {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.movie.id == id {
                return true;
            }
            current = if node.movie.id > id { node.left } else { node.right };
        }
        false
    }

    /// Staged movie ids in ascending order
    pub fn ids(&self) -> Vec<MovieId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(idx) = current {
                stack.push(idx);
                current = self.nodes[idx].left;
            }
            let Some(idx) = stack.pop() else {
                break;
            };
            ids.push(self.nodes[idx].movie.id);
            current = self.nodes[idx].right;
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Detach a published leaf from its parent (or from the root).
    fn unlink(&mut self, idx: NodeIdx) {
        match self.nodes[idx].parent {
            None => self.root = None,
            Some(p) => {
                let parent = &mut self.nodes[p];
                if parent.left == Some(idx) {
                    parent.left = None;
                } else {
                    parent.right = None;
                }
            }
        }
    }

    /// Rebuild the arena from the nodes still linked, dropping published ones.
    fn compact(&mut self) {
        let mut nodes: Vec<StagingNode> = Vec::with_capacity(self.len);
        // (old index, new parent index)
        let mut stack: Vec<(NodeIdx, Option<NodeIdx>)> =
            self.root.map(|r| (r, None)).into_iter().collect();
        while let Some((old, parent)) = stack.pop() {
            let node = &self.nodes[old];
            let idx = nodes.len();
            nodes.push(StagingNode {
                movie: node.movie,
                parent,
                left: None,
                right: None,
            });
            if let Some(p) = parent {
                if nodes[p].movie.id > node.movie.id {
                    nodes[p].left = Some(idx);
                } else {
                    nodes[p].right = Some(idx);
                }
            }
            stack.extend(node.left.map(|l| (l, Some(idx))));
            stack.extend(node.right.map(|r| (r, Some(idx))));
        }
        self.root = if nodes.is_empty() { None } else { Some(0) };
        self.nodes = nodes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn announcement(id: MovieId, category: Category) -> Announcement {
        Announcement {
            id,
            category,
            year: 2000,
        }
    }

    fn staged(ids: &[(MovieId, Category)], catalog: &Catalog) -> Staging {
        let mut staging = Staging::new();
        for &(id, category) in ids {
            staging.announce(announcement(id, category), catalog).unwrap();
        }
        staging
    }

    #[test]
    fn test_announce_keeps_ids_sorted() {
        let catalog = Catalog::new();
        let staging = staged(
            &[
                (30, Category::Horror),
                (10, Category::Drama),
                (50, Category::Comedy),
                (20, Category::Drama),
            ],
            &catalog,
        );
        assert_eq!(staging.ids(), vec![10, 20, 30, 50]);
        assert_eq!(staging.len(), 4);
        assert!(staging.contains(20));
        assert!(!staging.contains(40));
    }

    #[test]
    fn test_duplicate_in_staging_rejected() {
        let catalog = Catalog::new();
        let mut staging = staged(&[(10, Category::Drama)], &catalog);
        let err = staging
            .announce(announcement(10, Category::Horror), &catalog)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { id: 10, .. }));
        assert_eq!(staging.len(), 1);
    }

    #[test]
    fn test_duplicate_in_any_catalog_category_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert(10, Category::Comedy, 1999).unwrap();

        // Checked even while staging is empty, and across categories
        let mut staging = Staging::new();
        let err = staging
            .announce(announcement(10, Category::Drama), &catalog)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { id: 10, .. }));
        assert!(staging.is_empty());
    }

    #[test]
    fn test_publish_moves_everything() {
        let mut catalog = Catalog::new();
        let mut staging = staged(
            &[
                (30, Category::Horror),
                (10, Category::Drama),
                (50, Category::Horror),
                (20, Category::Drama),
                (40, Category::Comedy),
            ],
            &catalog,
        );

        assert_eq!(
            staging.publish(&mut catalog).unwrap(),
            Publication::Published { count: 5 }
        );
        assert!(staging.is_empty());
        assert_eq!(staging.len(), 0);
        assert_eq!(catalog.len(), 5);

        let horror: Vec<MovieId> = catalog.iter(Category::Horror).map(|m| m.id).collect();
        assert_eq!(horror, vec![30, 50]);
        assert!(catalog.exists(10, Category::Drama));
        assert!(catalog.exists(40, Category::Comedy));

        assert_eq!(staging.publish(&mut catalog).unwrap(), Publication::NothingToDo);
    }

    #[test]
    fn test_publish_halts_on_first_failure() {
        // Staging tree:      30
        //                  /    \
        //                10      50
        //                  \
        //                   20
        // Post-order: 20, 10, 50, 30. A budget of 2 lets 20 and 10 through.
        let mut catalog = Catalog::new().with_node_budget(Some(2));
        let mut staging = staged(
            &[
                (30, Category::Horror),
                (10, Category::Horror),
                (50, Category::Horror),
                (20, Category::Horror),
            ],
            &catalog,
        );

        let err = staging.publish(&mut catalog).unwrap_err();
        assert!(matches!(err, StoreError::OutOfMemory { .. }));

        let published: Vec<MovieId> = catalog.iter(Category::Horror).map(|m| m.id).collect();
        assert_eq!(published, vec![10, 20]);

        // 50 failed and stays; 30 was never attempted
        assert_eq!(staging.ids(), vec![30, 50]);
        assert_eq!(staging.len(), 2);
        assert!(!staging.is_empty());
    }

    #[test]
    fn test_failed_publication_can_be_retried() {
        let mut catalog = Catalog::new().with_node_budget(Some(2));
        let mut staging = staged(
            &[
                (30, Category::Drama),
                (10, Category::Drama),
                (50, Category::Drama),
                (20, Category::Drama),
            ],
            &catalog,
        );
        assert!(staging.publish(&mut catalog).is_err());
        assert_eq!(staging.ids(), vec![30, 50]);

        // The leftover tree still takes announcements and publishes cleanly
        staging.announce(announcement(40, Category::Drama), &catalog).unwrap();
        assert_eq!(staging.ids(), vec![30, 40, 50]);
        assert!(staging.contains(40));
        assert!(!staging.contains(10));

        let mut catalog = catalog.with_node_budget(None);
        assert_eq!(
            staging.publish(&mut catalog).unwrap(),
            Publication::Published { count: 3 }
        );
        let ids: Vec<MovieId> = catalog.iter(Category::Drama).map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 20, 30, 40, 50]);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_degenerate_tree_in_both_directions() {
        const COUNT: MovieId = 10_000;
        let mut catalog = Catalog::new();

        // Ascending ids build a right spine, descending ids a left spine
        let mut staging = Staging::new();
        for id in 0..COUNT {
            staging.announce(announcement(id, Category::Drama), &catalog).unwrap();
        }
        for id in (COUNT..2 * COUNT).rev() {
            staging.announce(announcement(id, Category::Horror), &catalog).unwrap();
        }
        assert_eq!(staging.ids().len(), 2 * COUNT as usize);

        assert_eq!(
            staging.publish(&mut catalog).unwrap(),
            Publication::Published {
                count: 2 * COUNT as usize
            }
        );
        assert!(staging.is_empty());
        assert_eq!(catalog.len(), 2 * COUNT as usize);
        assert!(catalog.exists(COUNT - 1, Category::Drama));
        assert!(catalog.exists(COUNT, Category::Horror));
    }

    #[test]
    fn test_dropping_a_deep_tree() {
        let catalog = Catalog::new();
        let mut staging = Staging::new();
        for id in 0..10_000 {
            staging.announce(announcement(id, Category::Comedy), &catalog).unwrap();
        }
        drop(staging);
    }
}
