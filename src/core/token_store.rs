use std::sync::{Arc, RwLock};

// Clones share one slot.
#[derive(Clone, Default)]
pub struct SessionTokenStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl SessionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn get(&self) -> Option<String> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(token.into());
    }

    pub fn clear(&self) {
        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = None;
    }

    pub fn is_set(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

impl std::fmt::Debug for SessionTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenStore")
            .field("signed_in", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_clones_share_the_slot() {
        let store = SessionTokenStore::new();
        let reader = store.clone();

        store.set("first");
        store.set("second");

        assert_eq!(reader.get().as_deref(), Some("second"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = SessionTokenStore::with_token("abc");
        store.clear();
        store.clear();

        assert!(store.get().is_none());
        assert!(!store.is_set());
    }

    #[test]
    fn poisoned_slot_still_reports_token() {
        let store = SessionTokenStore::with_token("abc");
        let writer = store.clone();

        let _ = std::thread::spawn(move || {
            let _guard = writer.slot.write().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert!(store.slot.is_poisoned());
        assert_eq!(store.get().as_deref(), Some("abc"));
        assert!(store.is_set());
    }

    #[test]
    fn debug_output_hides_token() {
        let store = SessionTokenStore::with_token("super-secret");
        let printed = format!("{store:?}");

        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("signed_in: true"));
    }
}
