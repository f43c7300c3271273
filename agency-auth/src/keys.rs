use crate::error::{AuthError, AuthResult};
use crate::jwks::{Jwks, KeySet, VerificationKey};
use jsonwebtoken::Algorithm;
use log::{debug, warn};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;

/// Fetches and caches the issuer's public signing keys.
///
/// The key set is fetched lazily on first use and kept for the process
/// lifetime; a miss triggers a refresh of the whole set. Refreshes replace
/// the cached `Arc<KeySet>` wholesale, so readers never observe a partially
/// populated set and lookups of already-cached keys never wait on an
/// in-flight fetch.
#[derive(Debug)]
pub struct KeyProvider {
    client: reqwest::Client,
    jwks_url: String,
    algorithm: Algorithm,
    cache: RwLock<CacheState>,
    refresh: Mutex<()>,
}

#[derive(Debug, Default)]
struct CacheState {
    set: Arc<KeySet>,
    generation: u64,
}

impl KeyProvider {
    /// Build a provider fetching from `jwks_url` with a bounded timeout.
    pub fn new(jwks_url: String, algorithm: Algorithm, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()
            .map_err(|err| AuthError::KeyFetch(format!("failed to build key client: {err}")))?;
        Ok(Self {
            client,
            jwks_url,
            algorithm,
            cache: RwLock::new(CacheState::default()),
            refresh: Mutex::new(()),
        })
    }

    /// Resolve the verification key for a token's declared key id.
    ///
    /// On a miss the full key set is re-fetched; a key id still absent from
    /// a freshly fetched set is reported as not found, which is distinct
    /// from the endpoint being unreachable.
    pub async fn get_signing_key(&self, kid: &str) -> AuthResult<VerificationKey> {
        let (cached, seen_generation) = self.lookup(kid);
        if let Some(key) = cached {
            return Ok(key);
        }

        // Serialize refreshes. Only miss paths wait here; lookups of keys
        // already in the cache never touch this lock.
        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        let (cached, current_generation) = self.lookup(kid);
        if current_generation != seen_generation {
            return cached.ok_or_else(|| AuthError::KeyNotFound(kid.to_string()));
        }

        let set = self.fetch_key_set().await?;
        debug!("refreshed signing key set ({} keys)", set.len());
        let key = set.get(kid).cloned();
        self.replace(set);
        key.ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    fn lookup(&self, kid: &str) -> (Option<VerificationKey>, u64) {
        let state = self.cache.read().expect("key cache lock poisoned");
        (state.set.get(kid).cloned(), state.generation)
    }

    fn replace(&self, set: Arc<KeySet>) {
        let mut state = self.cache.write().expect("key cache lock poisoned");
        state.set = set;
        state.generation += 1;
    }

    /// Fetch and parse the key document, retrying once on failure.
    async fn fetch_key_set(&self) -> AuthResult<Arc<KeySet>> {
        let jwks = match self.fetch_jwks().await {
            Ok(jwks) => jwks,
            Err(err) => {
                warn!("key fetch failed, retrying once: {err}");
                self.fetch_jwks().await?
            }
        };
        KeySet::from_jwks(&jwks, self.algorithm).map(Arc::new)
    }

    async fn fetch_jwks(&self) -> AuthResult<Jwks> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|err| AuthError::KeyFetch(format!("key endpoint unreachable: {err}")))?;
        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!(
                "key endpoint returned status {}",
                response.status()
            )));
        }
        response
            .json::<Jwks>()
            .await
            .map_err(|err| AuthError::KeyFetch(format!("malformed key document: {err}")))
    }
}
