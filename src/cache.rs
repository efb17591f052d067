//! Persistent translation cache.
//!
//! A flat `key → translation` map, loaded once at startup and written back
//! as pretty-printed JSON so an operator can diff or prune it by hand. The
//! cache is the process's only durable state: it is flushed after every
//! tenth newly won translation, at [`TranslationCache::close`], and as a
//! last resort when the value is dropped.
//!
//! Keys are the first 500 characters of the trimmed source text, so the same
//! article body always lands on the same entry no matter which feed carried
//! it. A value equal to the original text is a negative entry: every backend
//! failed for that text once, and we don't burn quota retrying it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Flush after this many newly inserted translations.
const SAVE_EVERY: usize = 10;

/// Characters of trimmed source text forming the cache key.
const KEY_PREFIX_CHARS: usize = 500;

struct CacheState {
    entries: HashMap<String, String>,
    inserts_since_save: usize,
    dirty: bool,
}

/// Durable key → translation map shared by all pipeline workers.
///
/// All mutation happens under one mutex: the read-check-insert done by the
/// resolver on a cache miss must not lose updates when two workers miss on
/// the same key, and the periodic flush serializes through the same lock so
/// the on-disk form is never written concurrently with itself.
pub struct TranslationCache {
    path: PathBuf,
    state: Mutex<CacheState>,
}

impl TranslationCache {
    /// Load the cache from `path`.
    ///
    /// A missing or corrupt file yields an empty cache with a warning;
    /// translation memoization is an optimization, never a precondition.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(entries) => {
                    info!(path = %path.display(), entries = entries.len(), "Loaded translation cache");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Translation cache unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No translation cache yet, starting empty");
                HashMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Translation cache unreadable, starting empty");
                HashMap::new()
            }
        };

        Self {
            path,
            state: Mutex::new(CacheState {
                entries,
                inserts_since_save: 0,
                dirty: false,
            }),
        }
    }

    /// Derive the cache key for a source text: its trimmed 500-character
    /// prefix. Deterministic and language-independent.
    pub fn key(text: &str) -> String {
        text.trim().chars().take(KEY_PREFIX_CHARS).collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.lock().expect("cache lock poisoned");
        state.entries.get(key).cloned()
    }

    /// Record a freshly won translation and checkpoint the file after every
    /// tenth one.
    pub fn insert_translation(&self, key: &str, translated: &str) {
        let mut state = self.state.lock().expect("cache lock poisoned");
        state.entries.insert(key.to_string(), translated.to_string());
        state.dirty = true;
        state.inserts_since_save += 1;
        if state.inserts_since_save >= SAVE_EVERY {
            state.inserts_since_save = 0;
            self.save_locked(&mut state);
        }
    }

    /// Record the original text against its own key — either because it is
    /// already in the target language, or as a negative entry after every
    /// backend failed. Does not count toward the checkpoint.
    pub fn insert_original(&self, key: &str, original: &str) {
        let mut state = self.state.lock().expect("cache lock poisoned");
        state.entries.insert(key.to_string(), original.to_string());
        state.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Best-effort flush to disk. Failure is logged, never raised.
    pub fn save(&self) {
        let mut state = self.state.lock().expect("cache lock poisoned");
        self.save_locked(&mut state);
    }

    /// Unconditional flush at shutdown.
    pub fn close(&self) {
        self.save();
        debug!(path = %self.path.display(), "Translation cache closed");
    }

    fn save_locked(&self, state: &mut CacheState) {
        match serde_json::to_string_pretty(&state.entries) {
            Ok(json) => match std::fs::write(&self.path, json) {
                Ok(()) => {
                    state.dirty = false;
                    debug!(path = %self.path.display(), entries = state.entries.len(), "Saved translation cache");
                }
                Err(e) => {
                    error!(path = %self.path.display(), error = %e, "Failed to save translation cache");
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to serialize translation cache");
            }
        }
    }
}

impl Drop for TranslationCache {
    // Backstop for early returns; the normal path goes through close().
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if state.dirty {
                self.save_locked(&mut state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("translation_cache.json")
    }

    #[test]
    fn test_key_is_trimmed_prefix() {
        assert_eq!(TranslationCache::key("  hello  "), "hello");
        let long = "x".repeat(800);
        assert_eq!(TranslationCache::key(&long).chars().count(), 500);
        // Same prefix, same key — independent of the tail.
        let a = format!("{}{}", "y".repeat(500), "aaa");
        let b = format!("{}{}", "y".repeat(500), "bbb");
        assert_eq!(TranslationCache::key(&a), TranslationCache::key(&b));
    }

    #[test]
    fn test_key_multibyte_prefix() {
        let long = "é".repeat(600);
        assert_eq!(TranslationCache::key(&long).chars().count(), 500);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranslationCache::load(cache_path(&dir));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir);
        std::fs::write(&path, "{not json").unwrap();
        let cache = TranslationCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir);

        let cache = TranslationCache::load(&path);
        cache.insert_translation("hello", "bonjour");
        cache.insert_translation("world", "monde");
        cache.insert_original("déjà en français", "déjà en français");
        cache.close();

        let reloaded = TranslationCache::load(&path);
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.get("hello").as_deref(), Some("bonjour"));
        assert_eq!(reloaded.get("world").as_deref(), Some("monde"));
        assert_eq!(
            reloaded.get("déjà en français").as_deref(),
            Some("déjà en français")
        );
    }

    #[test]
    fn test_checkpoint_after_ten_translations() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir);

        let cache = TranslationCache::load(&path);
        for i in 0..9 {
            cache.insert_translation(&format!("k{i}"), "v");
        }
        assert!(!path.exists(), "no checkpoint expected before the tenth insert");

        cache.insert_translation("k9", "v");
        assert!(path.exists(), "tenth insert must checkpoint the file");

        let reloaded = TranslationCache::load(&path);
        assert_eq!(reloaded.len(), 10);
    }

    #[test]
    fn test_negative_entries_do_not_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir);

        let cache = TranslationCache::load(&path);
        for i in 0..20 {
            cache.insert_original(&format!("k{i}"), "k");
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_flushes_dirty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(&dir);

        {
            let cache = TranslationCache::load(&path);
            cache.insert_translation("hello", "bonjour");
        }
        let reloaded = TranslationCache::load(&path);
        assert_eq!(reloaded.get("hello").as_deref(), Some("bonjour"));
    }
}
