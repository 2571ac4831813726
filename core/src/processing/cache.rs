use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use crate::prelude::PipelineResult;

/// Digest of a stage's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn builder(stage: &str) -> FingerprintBuilder {
        let mut hasher = DefaultHasher::new();
        stage.hash(&mut hasher);
        FingerprintBuilder(hasher)
    }
}

pub struct FingerprintBuilder(DefaultHasher);

impl FingerprintBuilder {
    /// Hashes samples by bit pattern, so `0.0` and `-0.0` differ.
    pub fn samples(mut self, samples: &[f64]) -> Self {
        samples.len().hash(&mut self.0);
        for sample in samples {
            sample.to_bits().hash(&mut self.0);
        }
        self
    }

    pub fn value<T: Hash>(mut self, value: &T) -> Self {
        value.hash(&mut self.0);
        self
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.0.finish())
    }
}

/// Bounded store of stage outputs keyed by input fingerprint.
/// The oldest entry is evicted once `max_capacity` is reached.
pub struct StageCache<V> {
    entries: VecDeque<(Fingerprint, V)>,
    max_capacity: usize,
}

impl<V: Clone> StageCache<V> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity),
            max_capacity,
        }
    }

    pub fn get(&self, key: &Fingerprint) -> Option<&V> {
        self.entries
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: Fingerprint, value: V) {
        if self.max_capacity == 0 {
            return;
        }
        self.entries.retain(|(stored, _)| *stored != key);
        while self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((key, value));
    }

    /// Returns the cached value for `key`, computing and storing it on a
    /// miss. The flag reports whether the cache was hit. Failures are not
    /// cached.
    pub fn get_or_try_insert_with<F>(
        &mut self,
        key: Fingerprint,
        compute: F,
    ) -> PipelineResult<(V, bool)>
    where
        F: FnOnce() -> PipelineResult<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok((value.clone(), true));
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok((value, false))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
