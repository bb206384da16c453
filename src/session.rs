//! session.rs — one `AnalysisController` per session id, bounded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, warn};

use crate::analyze::DynAnalysisClient;
use crate::controller::AnalysisController;

pub const DEFAULT_SESSION_ID: &str = "default";

struct Entry {
    controller: Arc<AnalysisController>,
    last_used: Instant,
}

pub struct SessionStore {
    client: DynAnalysisClient,
    cap: usize,
    inner: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new(client: DynAnalysisClient, cap: usize) -> Self {
        Self {
            client,
            cap: cap.max(1),
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Existing session, touched.
    pub fn get(&self, id: &str) -> Option<Arc<AnalysisController>> {
        let mut map = self.inner.lock().expect("session mutex poisoned");
        map.get_mut(id).map(|e| {
            e.last_used = Instant::now();
            e.controller.clone()
        })
    }

    /// Session for `id`, created on first use. When full, the least recently
    /// used idle session is dropped to make room; `None` if every session is
    /// busy, so the store never grows past its cap.
    pub fn get_or_create(&self, id: &str) -> Option<Arc<AnalysisController>> {
        let mut map = self.inner.lock().expect("session mutex poisoned");
        if let Some(e) = map.get_mut(id) {
            e.last_used = Instant::now();
            return Some(e.controller.clone());
        }

        if map.len() >= self.cap {
            let victim = map
                .iter()
                .filter(|(_, e)| !e.controller.is_busy())
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            match victim {
                Some(k) => {
                    debug!(target: "analysis", evicted = %k, "session store full, evicting");
                    map.remove(&k);
                }
                None => {
                    warn!(target: "analysis", cap = self.cap, "session store full of busy sessions");
                    return None;
                }
            }
        }

        let controller = Arc::new(AnalysisController::new(self.client.clone()));
        map.insert(
            id.to_string(),
            Entry {
                controller: controller.clone(),
                last_used: Instant::now(),
            },
        );
        Some(controller)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::SendFuture;
    use crate::analyze::{AnalysisClient, MockClient};

    #[test]
    fn same_id_same_controller() {
        let store = SessionStore::new(Arc::new(MockClient::default()), 4);
        let a = store.get_or_create("a").unwrap();
        let b = store.get_or_create("a").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn evicts_least_recently_used_when_full() {
        let store = SessionStore::new(Arc::new(MockClient::default()), 2);
        store.get_or_create("a");
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.get_or_create("b");
        std::thread::sleep(std::time::Duration::from_millis(2));
        // touch "a" so "b" becomes the oldest
        store.get("a");
        store.get_or_create("c");
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    /// Never answers, so a submitted session stays in flight.
    struct Stalled;

    impl AnalysisClient for Stalled {
        fn send<'a>(&'a self, _prompt: &'a str) -> SendFuture<'a> {
            Box::pin(std::future::pending())
        }
        fn provider_name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn full_of_busy_sessions_refuses_new_ids() {
        let store = SessionStore::new(Arc::new(Stalled), 1);
        let busy = store.get_or_create("a").unwrap();
        let mut rx = busy.subscribe();
        let task = {
            let c = busy.clone();
            let text = vec!["word"; 25].join(" ");
            tokio::spawn(async move { c.submit(&text).await })
        };
        rx.wait_for(|s| s.state.is_busy()).await.unwrap();

        assert!(store.get_or_create("b").is_none());
        assert_eq!(store.len(), 1);
        // the busy session itself is still reachable
        assert!(Arc::ptr_eq(&store.get_or_create("a").unwrap(), &busy));
        task.abort();
    }
}
