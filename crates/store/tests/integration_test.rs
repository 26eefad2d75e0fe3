//! Integration tests for the store.
//!
//! These drive `MovieStore` through its public API only, the way the
//! command-line driver does.

use movie_store::{
    Category, ErrorKind, HashParams, MovieId, MovieStore, Publication, Recorded, StoreConfig,
    UserId,
};

fn create_test_store() -> MovieStore {
    let config = StoreConfig::new(5, 1000).with_hash(HashParams::new(17, 3, 1009));
    MovieStore::new(config).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let mut store = create_test_store();

    store.register_user(1).unwrap();
    store.announce_movie(10, Category::Drama, 2000).unwrap();
    assert_eq!(
        store.publish_movies().unwrap(),
        Publication::Published { count: 1 }
    );
    assert_eq!(
        store.watch_movie(1, Category::Drama, 10, 9).unwrap(),
        Recorded::New
    );

    let movie = store.search_movie(10, Category::Drama).unwrap();
    assert_eq!(movie.id, 10);
    assert_eq!(movie.year, 2000);

    let stats = store.user_stats(1).unwrap();
    assert_eq!(stats.mean_score, 9.0);
    assert_eq!(stats.rated, 1);
}

#[test]
fn test_registrations_are_findable() {
    let mut store = create_test_store();
    let ids: Vec<UserId> = (0..200).map(|i| (i * 37 + 11) % 1000).collect();

    for &id in &ids {
        assert!(store.user(id).is_err());
        store.register_user(id).unwrap();
    }
    for &id in &ids {
        assert_eq!(store.user(id).unwrap().id, id);
    }
    assert_eq!(store.users().len(), ids.len());

    // Every id sits in exactly one chain, exactly once
    let mut listed: Vec<UserId> = store
        .users()
        .buckets()
        .flat_map(|(_, chain)| chain.iter().map(|u| u.id))
        .collect();
    listed.sort_unstable();
    let mut expected = ids.clone();
    expected.sort_unstable();
    assert_eq!(listed, expected);
}

#[test]
fn test_double_registration_keeps_one_record() {
    let mut store = create_test_store();
    let bucket = store.register_user(42).unwrap();
    assert_eq!(
        store.register_user(42).unwrap_err().kind(),
        ErrorKind::AlreadyExists
    );
    let count = store
        .users()
        .chain(bucket)
        .iter()
        .filter(|u| u.id == 42)
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_publish_many_then_nothing_to_do() {
    let mut store = create_test_store();
    let movies: Vec<(MovieId, Category)> = (1..=60)
        .map(|i| ((i * 7919) % 1000, Category::ALL[(i % 6) as usize]))
        .collect();
    for &(id, category) in &movies {
        store.announce_movie(id, category, 1990).unwrap();
    }
    assert_eq!(store.staging().len(), movies.len());

    assert_eq!(
        store.publish_movies().unwrap(),
        Publication::Published {
            count: movies.len()
        }
    );
    assert!(store.staging().is_empty());
    for &(id, category) in &movies {
        assert!(store.catalog().exists(id, category));
    }
    assert_eq!(store.publish_movies().unwrap(), Publication::NothingToDo);
}

#[test]
fn test_rerating_overwrites_user_score() {
    let mut store = create_test_store();
    store.register_user(7).unwrap();
    for id in [5, 2, 9] {
        store.announce_movie(id, Category::Comedy, 2015).unwrap();
    }
    store.publish_movies().unwrap();

    store.watch_movie(7, Category::Comedy, 5, 3).unwrap();
    store.watch_movie(7, Category::Comedy, 2, 6).unwrap();
    store.watch_movie(7, Category::Comedy, 9, 1).unwrap();
    store.watch_movie(7, Category::Comedy, 5, 8).unwrap();

    let ratings: Vec<(MovieId, u8)> = store
        .user_ratings(7)
        .unwrap()
        .map(|r| (r.movie_id, r.score))
        .collect();
    assert_eq!(ratings, vec![(2, 6), (5, 8), (9, 1)]);
    assert_eq!(store.user_stats(7).unwrap().mean_score, 5.0);
}

#[test]
fn test_partial_publication_leaves_store_usable() {
    let config = StoreConfig::new(5, 1000).with_node_budget(3);
    let mut store = MovieStore::new(config).unwrap();
    for id in [40, 20, 60, 10, 30] {
        store.announce_movie(id, Category::Horror, 2000).unwrap();
    }

    // Post-order: 10, 30, 20, 60, 40; the fourth insert exceeds the budget
    let err = store.publish_movies().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    let published: Vec<MovieId> = store.catalog().iter(Category::Horror).map(|m| m.id).collect();
    assert_eq!(published, vec![10, 20, 30]);
    assert_eq!(store.staging().ids(), vec![40, 60]);

    // Everything else keeps working
    store.register_user(1).unwrap();
    store.watch_movie(1, Category::Horror, 20, 7).unwrap();
    assert_eq!(store.user_stats(1).unwrap().mean_score, 7.0);
    assert_eq!(
        store.announce_movie(30, Category::Drama, 2001).unwrap_err().kind(),
        ErrorKind::AlreadyExists
    );
}

#[test]
fn test_sorted_announcements_publish_without_recursion() {
    const COUNT: MovieId = 50_000;
    let mut store = create_test_store();

    // Ascending ids turn the staging tree into a single right spine
    for id in 0..COUNT {
        store.announce_movie(id, Category::Drama, 2000).unwrap();
    }
    assert_eq!(store.staging().len(), COUNT as usize);
    assert_eq!(store.staging().ids().last(), Some(&(COUNT - 1)));

    assert_eq!(
        store.publish_movies().unwrap(),
        Publication::Published {
            count: COUNT as usize
        }
    );
    assert!(store.staging().is_empty());
    assert_eq!(store.catalog().len(), COUNT as usize);
    assert_eq!(store.search_movie(COUNT / 2, Category::Drama).unwrap().year, 2000);
    assert_eq!(
        store.catalog().iter(Category::Drama).map(|m| m.id).last(),
        Some(COUNT - 1)
    );
}
