//! Temporary object-reference URLs for decoder input.
//!
//! A decoder is fed a URL that points at the file bytes. The URL is a guard
//! value: it stays resolvable while the guard lives and is revoked when the
//! guard is dropped, so every decode path releases it exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const URL_SCHEME: &str = "blob:previewkit/";

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    live: HashMap<String, Arc<[u8]>>,
    revoked: u64,
}

/// Hands out and tracks object URLs. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a URL referencing `bytes`.
    pub fn create(&self, bytes: Arc<[u8]>) -> ObjectUrl {
        let mut state = self.lock();
        state.next_id += 1;
        let url = format!("{URL_SCHEME}{}", state.next_id);
        state.live.insert(url.clone(), bytes);
        log::debug!("Created object URL {url}");

        ObjectUrl {
            url,
            registry: self.clone(),
        }
    }

    /// Look up the bytes behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().live.get(url).cloned()
    }

    /// Number of URLs that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Number of URLs revoked so far.
    pub fn revoked_count(&self) -> u64 {
        self.lock().revoked
    }

    fn revoke(&self, url: &str) {
        let mut state = self.lock();
        if state.live.remove(url).is_some() {
            state.revoked += 1;
            log::debug!("Revoked object URL {url}");
        }
    }
}

/// A live object URL. Revoked on drop.
pub struct ObjectUrl {
    url: String,
    registry: ObjectUrlRegistry,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The referenced bytes.
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.registry.resolve(&self.url)
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolves_while_alive() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.create(Arc::from(&b"abc"[..]));

        assert!(url.as_str().starts_with(URL_SCHEME));
        assert_eq!(url.bytes().as_deref(), Some(&b"abc"[..]));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_drop_revokes_once() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.create(Arc::from(&b"abc"[..]));
        let name = url.as_str().to_string();

        drop(url);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
        assert!(registry.resolve(&name).is_none());
    }

    #[test]
    fn test_urls_are_unique() {
        let registry = ObjectUrlRegistry::new();
        let bytes: Arc<[u8]> = Arc::from(&b"abc"[..]);
        let a = registry.create(bytes.clone());
        let b = registry.create(bytes);

        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn test_revoked_on_other_thread() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.create(Arc::from(&b"abc"[..]));

        std::thread::spawn(move || drop(url)).join().unwrap();
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
    }
}
