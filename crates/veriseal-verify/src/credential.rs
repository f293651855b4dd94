//! Credential acquisition and caching.
//!
//! The verification public key comes from an external collaborator and is
//! fetched at most once. Concurrent callers issued before the key is cached
//! subscribe to the same in-flight fetch rather than duplicating it; a
//! failed fetch resets the cache so a later call can retry.

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use veriseal_core::Ed25519PublicKey;

use crate::error::{CredentialError, Result};

/// Source of the verification public key.
///
/// Implementations must be thread-safe (Send + Sync). The transport behind
/// `fetch_public_key` (HTTP, file, environment) lives outside the engine;
/// retry and timeout policy belong to the implementation.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch the hex-encoded public key.
    async fn fetch_public_key(&self) -> Result<String>;
}

/// Outcome published to callers subscribed to an in-flight fetch.
type FetchOutcome = Option<std::result::Result<Ed25519PublicKey, CredentialError>>;

/// Cache state. `Fetching` holds the receiver subscribers wait on; the
/// sender lives with the caller performing the fetch, so a cancelled fetch
/// closes the channel and subscribers can recover.
enum KeyState {
    Uncached,
    Fetching(watch::Receiver<FetchOutcome>),
    Cached(Ed25519PublicKey),
}

/// The credential cache: at most one in-flight fetch, outcome shared by all
/// waiters, immutable once cached.
pub struct CredentialCache<S> {
    source: S,
    state: Mutex<KeyState>,
}

impl<S: CredentialSource> CredentialCache<S> {
    /// Create a cache over the given source. Nothing is fetched until the
    /// first call to [`CredentialCache::get`].
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(KeyState::Uncached),
        }
    }

    /// Access the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached key, joining or starting a fetch as needed.
    pub async fn get(&self) -> Result<Ed25519PublicKey> {
        let mut state = self.state.lock().await;
        match &*state {
            KeyState::Cached(key) => Ok(*key),
            KeyState::Fetching(shared) => {
                let rx = shared.clone();
                // A closed channel with no published outcome means the
                // fetching caller was cancelled mid-flight; start over.
                if rx.has_changed().is_err() && rx.borrow().is_none() {
                    let (tx, new_rx) = watch::channel(None);
                    *state = KeyState::Fetching(new_rx);
                    drop(state);
                    return self.fetch(tx).await;
                }
                drop(state);
                self.wait(rx).await
            }
            KeyState::Uncached => {
                let (tx, rx) = watch::channel(None);
                *state = KeyState::Fetching(rx);
                drop(state);
                self.fetch(tx).await
            }
        }
    }

    /// Perform the fetch, update the state, and publish the outcome.
    async fn fetch(&self, tx: watch::Sender<FetchOutcome>) -> Result<Ed25519PublicKey> {
        tracing::debug!("fetching verification public key");
        let outcome = match self.source.fetch_public_key().await {
            Ok(text) => Ed25519PublicKey::from_hex(text.trim())
                .map_err(|e| CredentialError::InvalidKey(e.to_string())),
            Err(e) => Err(e),
        };

        {
            let mut state = self.state.lock().await;
            match &outcome {
                Ok(key) => {
                    tracing::debug!(key = %key, "verification public key cached");
                    *state = KeyState::Cached(*key);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "public key fetch failed, cache reset");
                    *state = KeyState::Uncached;
                }
            }
        }

        // Publish after the state transition so a subscriber that wakes and
        // calls again observes the settled state.
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    /// Wait for an in-flight fetch started by another caller.
    async fn wait(&self, mut rx: watch::Receiver<FetchOutcome>) -> Result<Ed25519PublicKey> {
        match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(outcome) => match outcome.clone() {
                Some(result) => result,
                None => Err(CredentialError::Aborted),
            },
            Err(_) => {
                // The fetching caller was dropped before publishing. Reset
                // the state so the next call can start a fresh fetch.
                let mut state = self.state.lock().await;
                if let KeyState::Fetching(stale) = &*state {
                    if stale.has_changed().is_err() {
                        *state = KeyState::Uncached;
                    }
                }
                Err(CredentialError::Aborted)
            }
        }
    }
}

/// In-process credential sources for tests and local tooling.
pub mod memory {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Serves a fixed hex-encoded key, counting how many fetches were
    /// issued against it.
    pub struct StaticKeySource {
        key_hex: String,
        delay: Option<Duration>,
        fetches: AtomicUsize,
    }

    impl StaticKeySource {
        /// Create a source serving the given hex-encoded key.
        pub fn new(key_hex: impl Into<String>) -> Self {
            Self {
                key_hex: key_hex.into(),
                delay: None,
                fetches: AtomicUsize::new(0),
            }
        }

        /// Delay each fetch, giving concurrent callers time to pile up on
        /// the in-flight fetch.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Number of fetches issued against this source.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialSource for StaticKeySource {
        async fn fetch_public_key(&self) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.key_hex.clone())
        }
    }

    /// Fails the first `failures` fetches, then serves the key.
    pub struct FlakyKeySource {
        inner: StaticKeySource,
        failures: AtomicUsize,
    }

    impl FlakyKeySource {
        /// Create a source that fails `failures` times before succeeding.
        pub fn new(key_hex: impl Into<String>, failures: usize) -> Self {
            Self {
                inner: StaticKeySource::new(key_hex),
                failures: AtomicUsize::new(failures),
            }
        }

        /// Delay each fetch.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.inner = self.inner.with_delay(delay);
            self
        }

        /// Number of fetches issued against this source.
        pub fn fetch_count(&self) -> usize {
            self.inner.fetch_count()
        }
    }

    #[async_trait]
    impl CredentialSource for FlakyKeySource {
        async fn fetch_public_key(&self) -> Result<String> {
            let text = self.inner.fetch_public_key().await?;
            let failed = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(CredentialError::Fetch("synthetic failure".into()));
            }
            Ok(text)
        }
    }
}
