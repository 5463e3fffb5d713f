//! Background refresh of a cache entry after serving it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::Error;
use crate::http::Request;
use crate::store::{CacheStore, Network};

/// A detached refresh of one entry.
///
/// Dropping the handle leaves the task running. Its failure is discarded
/// inside the task and never reaches the caller.
#[derive(Debug)]
pub struct Revalidation {
    handle: JoinHandle<()>,
}

impl Revalidation {
    pub(crate) fn spawn<S: CacheStore, N: Network>(
        store: Arc<S>, network: Arc<N>, generation: String, request: Request,
    ) -> Self {
        let handle = tokio::spawn(async move {
            refresh(store.as_ref(), network.as_ref(), &generation, &request)
                .await
                .map(|updated| tracing::debug!(url = %request.url, updated, "revalidated cache entry"))
                .unwrap_or_else(|err| discard(&request, err));
        });
        Self { handle }
    }

    /// Wait until the refresh has finished, whatever its outcome.
    pub async fn settled(self) {
        if let Err(err) = self.handle.await {
            tracing::debug!(error = %err, "revalidation task did not complete");
        }
    }
}

/// Fetch the request again and overwrite the entry on a 200.
///
/// Returns whether the entry was replaced.
async fn refresh<S: CacheStore, N: Network>(
    store: &S, network: &N, generation: &str, request: &Request,
) -> Result<bool, Error> {
    let response = network.fetch(request).await?;
    if !response.is_refreshable() {
        return Ok(false);
    }
    store.put_entry(generation, request, &response).await?;
    Ok(true)
}

fn discard(request: &Request, err: Error) {
    tracing::debug!(url = %request.url, error = %err, "revalidation failed; keeping cached entry");
}
