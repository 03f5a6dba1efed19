//! Memoization of compiled patterns.

use super::{CompiledPattern, PatternSyntaxError, compile_pattern};
use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A thread-safe cache of compiled patterns keyed by the raw pattern string.
///
/// The cache is an explicit value: callers own it and pass it to whatever
/// needs it, so separate parsers (and separate tests) never share state
/// unless they share the cache.
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: RwLock<HashMap<String, Arc<CompiledPattern>>>,
}

impl PatternCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled pattern for `raw`, compiling it on first use.
    ///
    /// Failed compilations are not cached.
    pub fn get_or_compile(&self, raw: &str) -> Result<Arc<CompiledPattern>, PatternSyntaxError> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = entries.get(raw) {
                trace!("Pattern cache hit: '{}'", raw);
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = Arc::new(compile_pattern(raw)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(raw.to_string()).or_insert(compiled)))
    }

    /// Returns the number of cached patterns.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached pattern.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn caches_by_raw_string() {
        let cache = PatternCache::new();
        let a = cache.get_or_compile("src/**").unwrap();
        let b = cache.get_or_compile("src/**").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        // Equivalent after normalization, but keyed by raw text.
        cache.get_or_compile("src/").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = PatternCache::new();
        assert!(cache.get_or_compile("/").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn caches_are_independent() {
        let first = PatternCache::new();
        let second = PatternCache::new();
        first.get_or_compile("*.md").unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn clear_empties_cache() {
        let cache = PatternCache::new();
        cache.get_or_compile("*.md").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(PatternCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_compile("docs/*.md").unwrap())
            })
            .collect();

        let compiled: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        assert!(compiled.iter().all(|p| p.matches("docs/a.md")));
    }
}
