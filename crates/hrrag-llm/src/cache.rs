use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::ChatModel;
use crate::error::Result;

/// Exact-prompt response cache with least-recently-used eviction.
#[derive(Debug)]
pub struct PromptCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<String, (String, u64)>,
    // last-use tick -> prompt; the first key is the eviction victim
    recency: BTreeMap<u64, String>,
}

impl PromptCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, tick: 0, entries: HashMap::new(), recency: BTreeMap::new() }
    }

    pub fn get(&mut self, prompt: &str) -> Option<String> {
        let tick = self.next_tick();
        let (answer, last) = self.entries.get_mut(prompt)?;
        self.recency.remove(last);
        *last = tick;
        self.recency.insert(tick, prompt.to_string());
        Some(answer.clone())
    }

    pub fn insert(&mut self, prompt: String, answer: String) {
        if self.capacity == 0 {
            return;
        }
        let tick = self.next_tick();
        if let Some((_, last)) = self.entries.remove(&prompt) {
            self.recency.remove(&last);
        }
        while self.entries.len() >= self.capacity {
            let Some((_, victim)) = self.recency.pop_first() else { break };
            self.entries.remove(&victim);
        }
        self.recency.insert(tick, prompt.clone());
        self.entries.insert(prompt, (answer, tick));
    }

    pub fn contains(&self, prompt: &str) -> bool { self.entries.contains_key(prompt) }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn capacity(&self) -> usize { self.capacity }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Memoizes successful completions of the wrapped model. Failures pass through
/// uncached.
pub struct CachedChatModel<M: ChatModel> {
    inner: M,
    cache: Mutex<PromptCache>,
}

impl<M: ChatModel> CachedChatModel<M> {
    pub fn new(inner: M, capacity: usize) -> Self { Self { inner, cache: Mutex::new(PromptCache::new(capacity)) } }

    pub fn inner(&self) -> &M { &self.inner }

    pub fn cached_len(&self) -> usize { self.lock().len() }

    fn lock(&self) -> std::sync::MutexGuard<'_, PromptCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for CachedChatModel<M> {
    fn name(&self) -> &str { self.inner.name() }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let cached = self.lock().get(prompt);
        if let Some(hit) = cached {
            tracing::debug!("prompt cache hit");
            return Ok(hit);
        }
        let answer = self.inner.complete(prompt).await?;
        self.lock().insert(prompt.to_string(), answer.clone());
        Ok(answer)
    }
}
