//! Shared types for the MapReduce engine. Map applications turn an input
//! file into intermediate key-value records, reduce applications fold all
//! values for a key into one output value. For simplicity, intermediate
//! data is kept on the local filesystem, unlike Hadoop or GFS.

use std::fmt;
use std::fmt::Formatter;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

pub mod codec;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function takes the input identifier and the whole input content.
///
/// It returns the intermediate records it emits, in no particular order.
pub type MapFn = fn(input_id: &str, content: &str) -> anyhow::Result<Vec<KeyValue>>;

/// A reduce function takes a key and every value collected for that key
/// across all map outputs. It returns a single reduced value.
pub type ReduceFn = fn(key: &str, values: &[String]) -> anyhow::Result<String>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key.
    pub key: String,

    /// The value.
    pub value: String,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

/// Hashes an intermediate key. Compute the reduce bucket for a given key
/// by calculating `ihash(key) % reduce_count`.
///
/// Stable across processes and runs: map and reduce workers executing at
/// different times must agree on every key's bucket.
pub fn ihash(key: &str) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key.as_bytes());
    (hasher.finish() & 0x7fff_ffff) as u32
}
