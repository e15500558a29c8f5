// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Insert-only concurrent map.
//!
//! Readers load an immutable snapshot and never block. Writers copy the
//! snapshot, add their entry and swap it in, retrying if another writer got
//! there first. The first value published for a key is the only one ever
//! observed for that key.

use std::{hash::Hash, sync::Arc};

use arc_swap::ArcSwap;
use fxhash::FxHashMap;
use tracing::trace;

pub(crate) struct PublishMap<K, V> {
    snapshot: ArcSwap<FxHashMap<K, V>>,
}

impl<K, V> Default for PublishMap<K, V> {
    fn default() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(FxHashMap::default()),
        }
    }
}

impl<K, V> PublishMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<V> {
        self.snapshot.load().get(key).cloned()
    }

    /// Returns the published value for `key`, building and publishing one if
    /// there is none yet.
    ///
    /// `build` runs without any lock held and may run on several threads at
    /// once for the same key; all but the first published result are dropped.
    pub fn get_or_publish<F>(&self, key: K, build: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let candidate = build();
        let mut published = true;
        self.snapshot.rcu(|current| {
            if current.contains_key(&key) {
                published = false;
                return Arc::clone(current);
            }
            published = true;
            let mut next = FxHashMap::clone(current);
            next.insert(key.clone(), candidate.clone());
            Arc::new(next)
        });

        if published {
            return candidate;
        }
        trace!("Lost publish race, discarding locally built value");
        self.get(&key).unwrap_or(candidate)
    }

    #[cfg(test)]
    pub fn is_published(&self, key: &K) -> bool {
        self.snapshot.load().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }
}
