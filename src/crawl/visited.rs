// src/crawl/visited.rs
// =============================================================================
// The set of URLs that already have a crawl task.
//
// Every concurrently running task shares one registry (behind an Arc) and
// the only way to change it is claim_if_new(). Insertion into the DashSet
// is atomic per shard, so two tasks racing on the same URL can never both
// win the claim. URLs are never removed during a run.
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true if nobody claimed it before,
    /// returns false if it was already claimed.
    pub fn claim_if_new(&self, url: &str) -> bool {
        // Cheap read path first so already-seen links don't allocate
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_claim_only_once() {
        let registry = VisitedRegistry::new();
        assert!(registry.claim_if_new("https://example.com"));
        assert!(!registry.claim_if_new("https://example.com"));
        assert!(!registry.claim_if_new("https://example.com"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_no_normalization() {
        let registry = VisitedRegistry::new();
        assert!(registry.claim_if_new("https://example.com"));
        assert!(registry.claim_if_new("https://example.com/"));
        assert!(registry.claim_if_new("HTTPS://example.com"));
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(VisitedRegistry::new());
        let wins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            let wins = wins.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    if registry.claim_if_new(&format!("https://example.com/{}", i)) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        // 100 distinct URLs, each won by exactly one of the 64 tasks
        assert_eq!(wins.load(Ordering::SeqCst), 100);
        assert_eq!(registry.len(), 100);
    }
}
