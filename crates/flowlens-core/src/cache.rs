//! Caller-owned lookup caches.
//!
//! Both caches are populate-once: the first insert for a key wins and later
//! lookups return the stored value. Keys are stable composite strings such as
//! `"<type id>/<group>"`.

use std::collections::HashMap;

/// Default line colors, assigned round-robin in first-seen order.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#2563eb", "#16a34a", "#dc2626", "#9333ea", "#ea580c", "#0891b2", "#ca8a04", "#db2777",
    "#4f46e5", "#65a30d", "#0d9488", "#78716c",
];

/// Assigns a stable color to each key.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
    assigned: HashMap<String, String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(ToString::to_string).collect())
    }
}

impl ColorPalette {
    /// Build a palette over `colors`. An empty list falls back to the default.
    #[must_use]
    pub fn new(colors: Vec<String>) -> Self {
        let colors = if colors.is_empty() {
            DEFAULT_PALETTE.iter().map(ToString::to_string).collect()
        } else {
            colors
        };
        Self {
            colors,
            assigned: HashMap::new(),
        }
    }

    /// Color for `key`, assigning the next palette entry on first sight.
    pub fn color_for(&mut self, key: &str) -> &str {
        let next = self.colors[self.assigned.len() % self.colors.len()].clone();
        self.assigned.entry(key.to_string()).or_insert(next)
    }

    /// Previously assigned color, without assigning one.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.assigned.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Memoized lookups keyed by composite string.
#[derive(Debug, Clone)]
pub struct MemoCache<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> MemoCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: &str, compute: impl FnOnce() -> V) -> &V {
        if !self.entries.contains_key(key) {
            let value = compute();
            self.entries.insert(key.to_string(), value);
        }
        &self.entries[key]
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Used when the values depend on a replaced snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
