//! LRU cache for query embeddings.
//!
//! Repeated questions ("quels produits sont en rupture ?") skip model
//! inference. Default: 512 entries, 1-hour TTL.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use ndarray::Array1;
use parking_lot::Mutex;

struct Slot {
    embedding: Array1<f32>,
    stored_at: Instant,
}

struct Lru {
    slots: HashMap<String, Slot>,
    /// Least recently used at the front.
    recency: VecDeque<String>,
}

impl Lru {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }

    fn forget(&mut self, key: &str) {
        self.slots.remove(key);
        self.recency.retain(|k| k != key);
    }
}

/// Thread-safe LRU cache with per-entry expiry.
pub struct QueryCache {
    inner: Mutex<Lru>,
    capacity: usize,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Lru {
                slots: HashMap::with_capacity(capacity),
                recency: VecDeque::with_capacity(capacity),
            }),
            capacity,
            ttl,
        }
    }

    pub fn default_cache() -> Self {
        Self::new(512, Duration::from_secs(3600))
    }

    /// Cached embedding for `text`, or None on miss or expiry.
    pub fn get(&self, text: &str) -> Option<Array1<f32>> {
        let mut lru = self.inner.lock();

        let (embedding, expired) = match lru.slots.get(text) {
            Some(slot) => (slot.embedding.clone(), slot.stored_at.elapsed() >= self.ttl),
            None => return None,
        };

        if expired {
            lru.forget(text);
            return None;
        }
        lru.touch(text);
        Some(embedding)
    }

    pub fn put(&self, text: String, embedding: Array1<f32>) {
        let mut lru = self.inner.lock();

        if lru.slots.contains_key(&text) {
            lru.touch(&text);
        } else {
            while lru.slots.len() >= self.capacity {
                match lru.recency.pop_front() {
                    Some(oldest) => {
                        lru.slots.remove(&oldest);
                    }
                    None => break,
                }
            }
            lru.recency.push_back(text.clone());
        }

        lru.slots.insert(
            text,
            Slot {
                embedding,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut lru = self.inner.lock();
        lru.slots.clear();
        lru.recency.clear();
    }
}
