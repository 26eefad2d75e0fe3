//! Store construction parameters.
//!
//! A [`StoreConfig`] is handed to [`crate::MovieStore::new`] once and never
//! changes afterwards: the bucket of every user depends on it.

use crate::error::{Result, StoreError};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Constants of the universal hash `((a * id + b) mod p) mod buckets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    pub a: u64,
    pub b: u64,
    pub p: u64,
}

impl HashParams {
    pub fn new(a: u64, b: u64, p: u64) -> Self {
        Self { a, b, p }
    }
}

/// Everything the store needs to know up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of hash buckets (the `m` of the hash function)
    pub buckets: usize,
    /// Largest user id accepted by registration
    pub max_user_id: UserId,
    pub hash: HashParams,
    /// Cap on the number of catalog nodes; `None` means "until allocation fails"
    pub node_budget: Option<usize>,
}

impl StoreConfig {
    /// Create a config with the given table shape.
    ///
    /// `p` defaults to the smallest prime above `max_user_id`, `a` to 1 and
    /// `b` to 0. Use the `with_*` methods to override.
    pub fn new(buckets: usize, max_user_id: UserId) -> Self {
        let p = smallest_prime_above(u64::from(max_user_id));
        Self {
            buckets,
            max_user_id,
            hash: HashParams::new(1, 0, p),
            node_budget: None,
        }
    }

    /// Configure the hash constants
    pub fn with_hash(mut self, hash: HashParams) -> Self {
        self.hash = hash;
        self
    }

    /// Configure a catalog node budget
    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = Some(budget);
        self
    }

    /// Check that the hash function is well defined for this table.
    pub fn validate(&self) -> Result<()> {
        let HashParams { a, b, p } = self.hash;
        if self.buckets == 0 {
            return Err(StoreError::invalid("buckets", "must be greater than 0"));
        }
        if p == 0 {
            return Err(StoreError::invalid("p", "must be greater than 0"));
        }
        if a == 0 || a >= p {
            return Err(StoreError::invalid("a", format!("{a} is outside 1..{p}")));
        }
        if b >= p {
            return Err(StoreError::invalid("b", format!("{b} is outside 0..{p}")));
        }

        // Still a valid hash, just a poorly distributed one
        if !is_prime(p) {
            warn!("Hash modulus p={} is not prime", p);
        }
        if p <= u64::from(self.max_user_id) {
            warn!(
                "Hash modulus p={} does not exceed max_user_id={}",
                p, self.max_user_id
            );
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(16, 1000)
    }
}

/// Bases that make Miller-Rabin exact for every `u64`
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic Miller-Rabin test, exact over the whole `u64` range.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // n - 1 = d * 2^s with d odd
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for a in WITNESSES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    // The product of two u64 values always fits in u128
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Smallest prime strictly greater than `n`
pub fn smallest_prime_above(n: u64) -> u64 {
    let mut candidate = n + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}
