use futures::future;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Paging and throttling knobs for batched lookups.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum ids fetched concurrently in one page.
    pub page_size: usize,
    /// Pause between one page completing and the next starting.
    pub page_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            page_delay: Duration::ZERO,
        }
    }
}

/// Run `fut` but take at least `delay` to complete.
pub async fn paced<F: Future>(delay: Duration, fut: F) -> F::Output {
    if delay.is_zero() {
        fut.await
    } else {
        let (out, _) = tokio::join!(fut, sleep(delay));
        out
    }
}

/// Fetch every id, `page_size` at a time. Pages run strictly in sequence so
/// the server only ever sees one page worth of concurrent requests; fetches
/// within a page run concurrently. The result keeps input order, with failed
/// lookups as `None` for the caller to filter.
pub async fn fetch_in_batches<T, F, Fut>(
    ids: &[String],
    config: &BatchConfig,
    mut fetch_one: F,
) -> Vec<Option<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let page_size = config.page_size.max(1);
    let total_pages = ids.len().div_ceil(page_size);
    let mut results = Vec::with_capacity(ids.len());

    for (page, chunk) in ids.chunks(page_size).enumerate() {
        debug!("Fetching page {}/{} ({} ids)", page + 1, total_pages, chunk.len());
        let fetches: Vec<Fut> = chunk.iter().cloned().map(&mut fetch_one).collect();
        results.extend(future::join_all(fetches).await);

        if page + 1 < total_pages && !config.page_delay.is_zero() {
            sleep(config.page_delay).await;
        }
    }

    results
}
