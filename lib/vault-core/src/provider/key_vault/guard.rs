use std::sync::Arc;

use shared_types::KeyHandle;

use super::KeyVault;

/// Owns freshly generated key material until the record referencing it is committed.
///
/// Dropping an armed guard (failed commit or cancelled operation) purges the key in
/// the background.
pub(crate) struct KeyHandleGuard {
    key_vault: Arc<dyn KeyVault>,
    handle: Option<KeyHandle>,
}

impl KeyHandleGuard {
    pub(crate) fn new(key_vault: Arc<dyn KeyVault>, handle: KeyHandle) -> Self {
        Self {
            key_vault,
            handle: Some(handle),
        }
    }

    /// The key is referenced by a stored record now
    pub(crate) fn disarm(mut self) {
        self.handle = None;
    }

    /// Purges the key right away
    pub(crate) async fn discard(mut self) {
        if let Some(handle) = self.handle.take() {
            purge_key(self.key_vault.as_ref(), handle).await;
        }
    }
}

impl Drop for KeyHandleGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Leaked uncommitted key {handle}, no runtime to purge it");
            return;
        };

        let key_vault = self.key_vault.clone();
        runtime.spawn(async move {
            purge_key(key_vault.as_ref(), handle).await;
        });
    }
}

/// Purge that only logs, the key material is unreferenced at this point
pub(crate) async fn purge_key(key_vault: &dyn KeyVault, handle: KeyHandle) {
    match key_vault.purge(handle.clone()).await {
        Ok(()) => tracing::debug!("Discarded key {handle}"),
        Err(err) => tracing::warn!("Failed to purge key {handle}: {err}"),
    }
}
