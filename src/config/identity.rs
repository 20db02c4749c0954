use crate::config::ConfigVector;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of one parameter configuration.
///
/// Names the run's output directory and database schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Database schema owned by this run
    pub fn schema_name(&self) -> String {
        format!("run_{}", self.0)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strategy for assigning run ids to newly built configurations
pub trait RunIdentity: Send + Sync {
    fn assign(&self, vector: &ConfigVector) -> RunId;
}

/// Run id derived from the parameter vector.
///
/// SHA-256 over [`ConfigVector::canonical_string`], first eight bytes read
/// big-endian. Identical vectors always map to the same id, across processes
/// and builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashIdentity;

impl ContentHashIdentity {
    pub fn run_id(vector: &ConfigVector) -> RunId {
        let mut hasher = Sha256::new();
        hasher.update(vector.canonical_string().as_bytes());
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        RunId(u64::from_be_bytes(prefix))
    }
}

impl RunIdentity for ContentHashIdentity {
    fn assign(&self, vector: &ConfigVector) -> RunId {
        Self::run_id(vector)
    }
}

/// Dense, monotonically increasing run ids.
///
/// Every configuration built through one generator gets the next value. The
/// counter is per generator object, so ids must be assigned before runs are
/// handed to workers in other processes.
#[derive(Debug, Default)]
pub struct SequentialIdentity {
    next: AtomicU64,
}

impl SequentialIdentity {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Return the current value and advance the counter
    pub fn next_id(&self) -> RunId {
        RunId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Value the next call to [`SequentialIdentity::next_id`] will return
    pub fn peek(&self) -> RunId {
        RunId(self.next.load(Ordering::SeqCst))
    }

    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
    }
}

impl RunIdentity for SequentialIdentity {
    fn assign(&self, _vector: &ConfigVector) -> RunId {
        self.next_id()
    }
}
