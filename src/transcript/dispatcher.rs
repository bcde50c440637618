use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::{FetchError, TranscriptProvider};
use crate::video_id::VideoId;

#[derive(Debug, Error, PartialEq)]
pub enum DispatcherError {
    #[error("at least one transcript provider must be registered")]
    NoProviders,
}

/// Spreads transcript requests across a fixed set of providers in round-robin order.
///
/// The provider list never changes after construction. The cursor always
/// indexes a valid provider and advances exactly once per dispatch, whether
/// the chosen provider succeeds or fails. A failed fetch is returned as-is and
/// is never retried against the next provider.
pub struct RoundRobinDispatcher {
    providers: Vec<Arc<dyn TranscriptProvider>>,
    cursor: AtomicUsize,
}

impl RoundRobinDispatcher {
    pub fn new(providers: Vec<Arc<dyn TranscriptProvider>>) -> Result<Self, DispatcherError> {
        if providers.is_empty() {
            return Err(DispatcherError::NoProviders);
        }

        Ok(Self {
            providers,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Fetch a transcript from the provider under the cursor
    pub async fn fetch_transcript(&self, video_id: &VideoId) -> Result<String, FetchError> {
        if video_id.is_empty() {
            return Err(FetchError::EmptyIdentifier);
        }

        let (index, provider) = self.next_provider();
        debug!(
            "Dispatching transcript request for {} to provider #{} ({})",
            video_id,
            index,
            provider.kind()
        );

        let result = provider.fetch(video_id).await;
        if let Err(e) = &result {
            warn!("Transcript provider {} failed for {}: {}", provider.kind(), video_id, e);
        }
        result
    }

    /// Select the provider under the cursor and advance the cursor in one atomic step
    fn next_provider(&self) -> (usize, &Arc<dyn TranscriptProvider>) {
        let len = self.providers.len();
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        (index, &self.providers[index])
    }

    /// Position of the provider that will serve the next request
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn providers(&self) -> &[Arc<dyn TranscriptProvider>] {
        &self.providers
    }
}

impl std::fmt::Debug for RoundRobinDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundRobinDispatcher")
            .field("providers", &self.providers.iter().map(|p| p.kind()).collect::<Vec<_>>())
            .field("cursor", &self.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::rapidapi::RapidApiClient;
    use crate::transcript::{build_providers, ProviderKind};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every call it serves into a shared log
    struct RecordingProvider {
        id: usize,
        fail: bool,
        log: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl TranscriptProvider for RecordingProvider {
        async fn fetch(&self, _video_id: &VideoId) -> Result<String, FetchError> {
            self.log.lock().unwrap().push(self.id);
            if self.fail {
                Err(FetchError::UpstreamError {
                    status: 503,
                    body: format!("provider {} down", self.id),
                })
            } else {
                Ok(format!("transcript from {}", self.id))
            }
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Segmented
        }
    }

    fn recording(
        count: usize,
        failing: &[usize],
    ) -> (Vec<Arc<dyn TranscriptProvider>>, Arc<Mutex<Vec<usize>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = (0..count)
            .map(|id| {
                Arc::new(RecordingProvider {
                    id,
                    fail: failing.contains(&id),
                    log: log.clone(),
                }) as Arc<dyn TranscriptProvider>
            })
            .collect();
        (providers, log)
    }

    fn video() -> VideoId {
        VideoId::new("dQw4w9WgXcQ")
    }

    #[test]
    fn test_empty_provider_list_rejected() {
        let result = RoundRobinDispatcher::new(Vec::new());
        assert_eq!(result.err(), Some(DispatcherError::NoProviders));
    }

    #[tokio::test]
    async fn test_each_provider_used_once_per_cycle() {
        for k in 1..=5 {
            let (providers, log) = recording(k, &[1, 3]);
            let dispatcher = RoundRobinDispatcher::new(providers).unwrap();

            for _ in 0..k {
                let _ = dispatcher.fetch_transcript(&video()).await;
            }

            assert_eq!(*log.lock().unwrap(), (0..k).collect::<Vec<_>>());
            assert_eq!(dispatcher.cursor(), 0);
        }
    }

    #[tokio::test]
    async fn test_rotation_is_cyclic() {
        let (providers, log) = recording(3, &[]);
        let dispatcher = RoundRobinDispatcher::new(providers).unwrap();

        for _ in 0..7 {
            dispatcher.fetch_transcript(&video()).await.unwrap();
        }

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(dispatcher.cursor(), 1);
    }

    #[tokio::test]
    async fn test_failure_then_success_without_failover() {
        let (providers, log) = recording(2, &[0]);
        let dispatcher = RoundRobinDispatcher::new(providers).unwrap();

        let first = dispatcher.fetch_transcript(&video()).await;
        let second = dispatcher.fetch_transcript(&video()).await;

        assert_eq!(
            first,
            Err(FetchError::UpstreamError {
                status: 503,
                body: "provider 0 down".to_string()
            })
        );
        assert_eq!(second, Ok("transcript from 1".to_string()));
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
        assert_eq!(dispatcher.cursor(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_provider_surfaces_and_rotates() {
        let config = ConfigBuilder::new()
            .with_provider_base_url("http://127.0.0.1:1")
            .build();
        let client = RapidApiClient::new("key", 5).unwrap();
        let dispatcher =
            RoundRobinDispatcher::new(build_providers(&config.providers, &client)).unwrap();

        let result = dispatcher.fetch_transcript(&video()).await;

        assert!(
            matches!(result, Err(FetchError::UpstreamUnreachable(_))),
            "unexpected result: {:?}",
            result
        );
        assert_eq!(dispatcher.cursor(), 1);
    }

    #[tokio::test]
    async fn test_empty_identifier_does_not_rotate() {
        let (providers, log) = recording(2, &[]);
        let dispatcher = RoundRobinDispatcher::new(providers).unwrap();

        let result = dispatcher.fetch_transcript(&VideoId::new("")).await;

        assert_eq!(result, Err(FetchError::EmptyIdentifier));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(dispatcher.cursor(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch_never_duplicates_or_skips() {
        let k = 4;
        let rounds = 50;
        let (providers, log) = recording(k, &[2]);
        let dispatcher = Arc::new(RoundRobinDispatcher::new(providers).unwrap());

        let handles: Vec<_> = (0..k * rounds)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let _ = dispatcher.fetch_transcript(&video()).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let log = log.lock().unwrap();
        for id in 0..k {
            assert_eq!(log.iter().filter(|&&p| p == id).count(), rounds);
        }
        assert_eq!(dispatcher.cursor(), 0);
    }

    #[test]
    fn test_selection_claims_distinct_slots_across_threads() {
        let (providers, _log) = recording(8, &[]);
        let dispatcher = Arc::new(RoundRobinDispatcher::new(providers).unwrap());
        let claimed = Arc::new(Mutex::new(Vec::new()));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let dispatcher = dispatcher.clone();
                let claimed = claimed.clone();
                scope.spawn(move || {
                    let (index, _) = dispatcher.next_provider();
                    claimed.lock().unwrap().push(index);
                });
            }
        });

        let claimed = claimed.lock().unwrap();
        let unique: HashSet<_> = claimed.iter().copied().collect();
        assert_eq!(claimed.len(), 8);
        assert_eq!(unique.len(), 8);
        assert_eq!(dispatcher.cursor(), 0);
    }
}
