//! Chained hash index over registered users.
//!
//! A fixed number of buckets, each an ordered chain of users. The bucket of
//! a user is `((a * id + b) mod p) mod buckets`, computed only by
//! [`UserIndex::bucket_of`] so registration, lookup and removal always agree.
//! New users go to the tail of their chain, so a chain lists its users in
//! registration order.

use crate::config::{HashParams, StoreConfig};
use crate::error::{Entity, Result, StoreError};
use crate::history::History;
use crate::types::UserId;
use tracing::debug;

/// A registered user and the history it owns
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub history: History,
}

impl User {
    fn new(id: UserId) -> Self {
        Self {
            id,
            history: History::new(),
        }
    }
}

/// Users by id, in hash buckets
#[derive(Debug, Clone)]
pub struct UserIndex {
    chains: Vec<Vec<User>>,
    hash: HashParams,
    max_user_id: UserId,
    len: usize,
}

impl UserIndex {
    /// Build an empty table; `config` is expected to be validated already.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            chains: vec![Vec::new(); config.buckets],
            hash: config.hash,
            max_user_id: config.max_user_id,
            len: 0,
        }
    }

    /// The universal hash of `id`
    pub fn bucket_of(&self, id: UserId) -> usize {
        let HashParams { a, b, p } = self.hash;
        // u128 keeps `a * id + b` from overflowing for any u64 constants
        let key = (u128::from(a) * u128::from(id) + u128::from(b)) % u128::from(p);
        (key % self.chains.len() as u128) as usize
    }

    /// Append a new user to the tail of its chain; returns the bucket used.
    pub fn register(&mut self, id: UserId) -> Result<usize> {
        self.check_range(id)?;
        let bucket = self.bucket_of(id);
        let chain = &mut self.chains[bucket];
        if chain.iter().any(|user| user.id == id) {
            return Err(StoreError::AlreadyExists {
                entity: Entity::User,
                id,
            });
        }
        chain
            .try_reserve(1)
            .map_err(|_| StoreError::out_of_memory(format!("record for user {id}")))?;
        chain.push(User::new(id));
        self.len += 1;
        debug!("Registered user {} in bucket {}", id, bucket);
        Ok(bucket)
    }

    /// Remove a user and destroy its history.
    ///
    /// The rest of the chain keeps its order whether the user was at the
    /// head, in the middle or at the tail.
    pub fn unregister(&mut self, id: UserId) -> Result<()> {
        self.check_range(id)?;
        let bucket = self.bucket_of(id);
        let chain = &mut self.chains[bucket];
        let position = chain
            .iter()
            .position(|user| user.id == id)
            .ok_or(StoreError::NotFound {
                entity: Entity::User,
                id,
            })?;

        let mut user = chain.remove(position);
        let destroyed = user.history.len();
        user.history.clear();
        self.len -= 1;
        debug!(
            "Unregistered user {} from bucket {} ({} ratings destroyed)",
            id, bucket, destroyed
        );
        Ok(())
    }

    pub fn find(&self, id: UserId) -> Result<&User> {
        self.check_range(id)?;
        self.chains[self.bucket_of(id)]
            .iter()
            .find(|user| user.id == id)
            .ok_or(StoreError::NotFound {
                entity: Entity::User,
                id,
            })
    }

    pub fn find_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.check_range(id)?;
        let bucket = self.bucket_of(id);
        self.chains[bucket]
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or(StoreError::NotFound {
                entity: Entity::User,
                id,
            })
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.find(id).is_ok()
    }

    /// Users of one bucket, oldest registration first
    pub fn chain(&self, bucket: usize) -> &[User] {
        self.chains.get(bucket).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Every bucket with its chain, empty ones included
    pub fn buckets(&self) -> impl Iterator<Item = (usize, &[User])> + '_ {
        self.chains.iter().map(Vec::as_slice).enumerate()
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.len()
    }

    pub fn max_user_id(&self) -> UserId {
        self.max_user_id
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_range(&self, id: UserId) -> Result<()> {
        if id > self.max_user_id {
            return Err(StoreError::OutOfRange {
                entity: Entity::User,
                id,
                max: self.max_user_id,
            });
        }
        Ok(())
    }
}
