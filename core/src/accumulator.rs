//! Lock-partitioned map used to accumulate relevance from many workers.
//!
//! Keys are spread over a fixed number of shards by `key mod shard_count`, each
//! behind its own mutex. Point operations lock exactly one shard. Whole-map
//! operations lock every shard in index order, which is the only place two
//! shard locks are ever held together.

use std::collections::btree_map;
use std::collections::BTreeMap;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::flatten::Flattened;

/// Integer keys that can pick a shard.
pub trait ShardKey: Copy + Ord {
    fn shard_hash(self) -> u64;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard_hash(self) -> u64 {
                self as u64
            }
        })*
    };
}

impl_shard_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

pub struct ShardedAccumulator<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ShardedAccumulator<K, V> {
    /// A zero shard count is treated as one.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        let index = key.shard_hash() % self.shards.len() as u64;
        &self.shards[index as usize]
    }

    /// Lock the key's shard and hand out its value, inserting the default first
    /// if the key is absent. The shard stays locked until the guard drops.
    pub fn at(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        MutexGuard::map(self.shard(key).lock(), |shard| shard.entry(key).or_default())
    }

    pub fn erase(&self, key: K) -> Option<V> {
        self.shard(key).lock().remove(&key)
    }

    /// Lock every shard, in shard order, for a consistent whole-map view.
    pub fn snapshot(&self) -> Snapshot<'_, K, V> {
        Snapshot { guards: self.shards.iter().map(|shard| shard.lock()).collect() }
    }

    /// Merge all shards into one ordered map and leave the accumulator empty.
    pub fn drain(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut snapshot = self.snapshot();
        let merged = snapshot.iter().map(|(key, value)| (*key, value.clone())).collect();
        snapshot.clear();
        merged
    }
}

/// All shards of an accumulator, locked. Released on drop.
pub struct Snapshot<'a, K, V> {
    guards: Vec<MutexGuard<'a, BTreeMap<K, V>>>,
}

fn shard_entries<'s, K, V>(shard: &'s MutexGuard<'_, BTreeMap<K, V>>) -> btree_map::Iter<'s, K, V> {
    shard.iter()
}

impl<K, V> Snapshot<'_, K, V> {
    /// Every entry across all shards. Keys are ordered within a shard only.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + Clone + '_ {
        Flattened::with(&self.guards, shard_entries)
    }

    pub fn len(&self) -> usize {
        self.guards.iter().map(|shard| shard.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.iter().all(|shard| shard.is_empty())
    }

    fn clear(&mut self) {
        for shard in &mut self.guards {
            shard.clear();
        }
    }
}
