//! The published movie catalog: one binary search tree per category.
//!
//! All six trees share one node arena. Empty subtrees are the shared
//! [`Link::SENTINEL`] value rather than allocated nodes, and an empty
//! category is simply a root equal to the sentinel. Descents compare links
//! against the sentinel by identity to know where a tree ends.
//!
//! Trees are not rebalanced; in-order traversal yields strictly increasing
//! movie ids and equal ids never coexist within a tree.

use crate::error::{Entity, Result, StoreError};
use crate::types::{Category, Movie, MovieId, Score};
use tracing::debug;

/// Reference to a catalog node, or the sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link(usize);

impl Link {
    /// The one empty-subtree marker, shared by every category tree
    const SENTINEL: Link = Link(usize::MAX);

    fn is_sentinel(self) -> bool {
        self == Link::SENTINEL
    }
}

#[derive(Debug, Clone)]
struct CatalogNode {
    movie: Movie,
    left: Link,
    right: Link,
}

/// Six category trees over a single arena
#[derive(Debug, Clone)]
pub struct Catalog {
    nodes: Vec<CatalogNode>,
    roots: [Link; Category::COUNT],
    /// Node count at which inserts report `OutOfMemory`
    node_budget: Option<usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: [Link::SENTINEL; Category::COUNT],
            node_budget: None,
        }
    }

    /// Configure a node budget (default: unbounded)
    pub fn with_node_budget(mut self, budget: Option<usize>) -> Self {
        self.node_budget = budget;
        self
    }

    /// Is `id` published under `category`?
    pub fn exists(&self, id: MovieId, category: Category) -> bool {
        !self.locate(id, category).is_sentinel()
    }

    /// Is `id` published under any category?
    pub fn contains_anywhere(&self, id: MovieId) -> bool {
        Category::ALL.into_iter().any(|category| self.exists(id, category))
    }

    /// Point lookup
    pub fn find(&self, id: MovieId, category: Category) -> Option<&Movie> {
        let link = self.locate(id, category);
        if link.is_sentinel() {
            None
        } else {
            Some(&self.nodes[link.0].movie)
        }
    }

    /// Add one rating to a published movie's totals
    pub fn record_rating(&mut self, id: MovieId, category: Category, score: Score) -> Result<()> {
        let link = self.locate(id, category);
        if link.is_sentinel() {
            return Err(StoreError::NotFound {
                entity: Entity::Movie,
                id,
            });
        }
        let movie = &mut self.nodes[link.0].movie;
        movie.watched_counter += 1;
        movie.sum_score += u64::from(score);
        Ok(())
    }

    /// Insert a new movie into its category tree.
    ///
    /// Fails with `AlreadyExists` on an equal id and with `OutOfMemory` when
    /// the arena cannot grow or the node budget is used up.
    pub fn insert(&mut self, id: MovieId, category: Category, year: u16) -> Result<()> {
        // (parent index, descended left)
        let mut parent: Option<(usize, bool)> = None;
        let mut current = self.roots[category.index()];
        while !current.is_sentinel() {
            let node = &self.nodes[current.0];
            if node.movie.id == id {
                return Err(StoreError::AlreadyExists {
                    entity: Entity::Movie,
                    id,
                });
            }
            let go_left = node.movie.id > id;
            parent = Some((current.0, go_left));
            current = if go_left { node.left } else { node.right };
        }

        if self.node_budget.is_some_and(|budget| self.nodes.len() >= budget) {
            return Err(StoreError::out_of_memory(format!(
                "catalog node for movie {id} (budget of {} nodes used up)",
                self.nodes.len()
            )));
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| StoreError::out_of_memory(format!("catalog node for movie {id}")))?;

        let link = Link(self.nodes.len());
        self.nodes.push(CatalogNode {
            movie: Movie::new(id, year),
            left: Link::SENTINEL,
            right: Link::SENTINEL,
        });
        match parent {
            None => self.roots[category.index()] = link,
            Some((idx, true)) => self.nodes[idx].left = link,
            Some((idx, false)) => self.nodes[idx].right = link,
        }
        debug!("Inserted movie {} into {}", id, category);
        Ok(())
    }

    /// Movies of one category in ascending id order
    pub fn iter(&self, category: Category) -> CategoryIter<'_> {
        CategoryIter {
            nodes: &self.nodes,
            stack: Vec::new(),
            current: self.roots[category.index()],
        }
    }

    /// Every movie, category by category, each in ascending id order
    pub fn iter_all(&self) -> impl Iterator<Item = (Category, &Movie)> + '_ {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.iter(category).map(move |movie| (category, movie)))
    }

    /// Total number of published movies
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does this category still point at the sentinel?
    pub fn is_category_empty(&self, category: Category) -> bool {
        self.roots[category.index()].is_sentinel()
    }

    /// Release every movie node; every root goes back to the sentinel.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots = [Link::SENTINEL; Category::COUNT];
    }

    fn locate(&self, id: MovieId, category: Category) -> Link {
        let mut current = self.roots[category.index()];
        while !current.is_sentinel() {
            let node = &self.nodes[current.0];
            if node.movie.id == id {
                break;
            }
            current = if node.movie.id > id { node.left } else { node.right };
        }
        current
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy in-order traversal of one category tree.
///
/// Calling [`Catalog::iter`] again restarts from the smallest id.
pub struct CategoryIter<'a> {
    nodes: &'a [CatalogNode],
    stack: Vec<usize>,
    current: Link,
}

impl<'a> Iterator for CategoryIter<'a> {
    type Item = &'a Movie;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.current.is_sentinel() {
            self.stack.push(self.current.0);
            self.current = self.nodes[self.current.0].left;
        }
        let idx = self.stack.pop()?;
        self.current = self.nodes[idx].right;
        Some(&self.nodes[idx].movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(catalog: &Catalog, category: Category) -> Vec<MovieId> {
        catalog.iter(category).map(|m| m.id).collect()
    }

    #[test]
    fn test_new_catalog_is_all_sentinels() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        for category in Category::ALL {
            assert!(catalog.is_category_empty(category));
            assert_eq!(catalog.iter(category).count(), 0);
        }
    }

    #[test]
    fn test_insert_and_traverse_in_order() {
        let mut catalog = Catalog::new();
        for id in [50, 20, 80, 10, 30, 70, 90] {
            catalog.insert(id, Category::Horror, 2000).unwrap();
        }
        catalog.insert(5, Category::Comedy, 1990).unwrap();

        assert_eq!(ids(&catalog, Category::Horror), vec![10, 20, 30, 50, 70, 80, 90]);
        assert_eq!(ids(&catalog, Category::Comedy), vec![5]);
        assert!(catalog.is_category_empty(Category::Drama));
        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut catalog = Catalog::new();
        for id in [3, 1, 2] {
            catalog.insert(id, Category::Drama, 2001).unwrap();
        }
        let mut first = catalog.iter(Category::Drama);
        assert_eq!(first.next().map(|m| m.id), Some(1));
        assert_eq!(ids(&catalog, Category::Drama), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_in_same_category_rejected() {
        let mut catalog = Catalog::new();
        catalog.insert(7, Category::Romance, 2010).unwrap();
        let err = catalog.insert(7, Category::Romance, 2011).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { id: 7, .. }));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(7, Category::Romance).unwrap().year, 2010);
    }

    #[test]
    fn test_lookup_respects_category() {
        let mut catalog = Catalog::new();
        catalog.insert(7, Category::Romance, 2010).unwrap();

        assert!(catalog.exists(7, Category::Romance));
        assert!(!catalog.exists(7, Category::Horror));
        assert!(catalog.find(7, Category::Documentary).is_none());
        assert!(catalog.contains_anywhere(7));
        assert!(!catalog.contains_anywhere(8));
    }

    #[test]
    fn test_record_rating() {
        let mut catalog = Catalog::new();
        catalog.insert(4, Category::SciFi, 1982).unwrap();
        catalog.record_rating(4, Category::SciFi, 9).unwrap();
        catalog.record_rating(4, Category::SciFi, 6).unwrap();

        let movie = catalog.find(4, Category::SciFi).unwrap();
        assert_eq!(movie.watched_counter, 2);
        assert_eq!(movie.sum_score, 15);
        assert_eq!(movie.average(), Some(7.5));

        let err = catalog.record_rating(4, Category::Horror, 5).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 4, .. }));
    }

    #[test]
    fn test_node_budget() {
        let mut catalog = Catalog::new().with_node_budget(Some(2));
        catalog.insert(1, Category::Horror, 2000).unwrap();
        catalog.insert(2, Category::Drama, 2000).unwrap();

        let err = catalog.insert(3, Category::Horror, 2000).unwrap_err();
        assert!(matches!(err, StoreError::OutOfMemory { .. }));
        assert_eq!(catalog.len(), 2);
        assert_eq!(ids(&catalog, Category::Horror), vec![1]);
    }

    #[test]
    fn test_iter_all_walks_categories_in_order() {
        let mut catalog = Catalog::new();
        catalog.insert(9, Category::Comedy, 2000).unwrap();
        catalog.insert(3, Category::Horror, 2000).unwrap();
        catalog.insert(1, Category::Horror, 2000).unwrap();
        catalog.insert(2, Category::Drama, 2000).unwrap();

        let all: Vec<(Category, MovieId)> = catalog.iter_all().map(|(c, m)| (c, m.id)).collect();
        assert_eq!(
            all,
            vec![
                (Category::Horror, 1),
                (Category::Horror, 3),
                (Category::Drama, 2),
                (Category::Comedy, 9),
            ]
        );
    }

    #[test]
    fn test_clear() {
        let mut catalog = Catalog::new();
        catalog.insert(1, Category::Horror, 2000).unwrap();
        catalog.clear();
        assert!(catalog.is_empty());
        assert!(catalog.is_category_empty(Category::Horror));
        assert!(!catalog.exists(1, Category::Horror));
    }
}
