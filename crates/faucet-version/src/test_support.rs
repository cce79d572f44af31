//! Canned release registries for unit tests.

use crate::error::{VersionError, VersionResult};
use crate::registry::ReleaseRegistry;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Registry answering with a fixed result and counting lookups.
pub struct StaticRegistry {
    tag: Option<Option<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticRegistry {
    pub fn tag(tag: &str) -> Self {
        Self::new(Some(Some(tag.to_string())))
    }

    pub fn empty() -> Self {
        Self::new(Some(None))
    }

    pub fn failing() -> Self {
        Self::new(None)
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn new(tag: Option<Option<String>>) -> Self {
        Self {
            tag,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReleaseRegistry for StaticRegistry {
    async fn latest_release_tag(&self) -> VersionResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.tag
            .clone()
            .ok_or_else(|| VersionError::Registry("registry unavailable".to_string()))
    }
}
