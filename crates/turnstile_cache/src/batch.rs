//! Batched fan-out of independent reads.

use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Run `read` over `items`, `batch_size` at a time.
///
/// Reads within a batch run concurrently; the next batch starts only after
/// the whole batch settles, with a `pause` in between (none after the last
/// batch). Failed reads are logged and skipped. Successful results come back
/// in input order.
///
/// A `batch_size` of zero is treated as one.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use turnstile_cache::read_in_batches;
///
/// # #[tokio::main]
/// # async fn main() {
/// let names = read_in_batches(1..=5u64, 2, Duration::ZERO, |id| async move {
///     if id == 3 {
///         Err(format!("event {} not found", id))
///     } else {
///         Ok(format!("event-{}", id))
///     }
/// })
/// .await;
/// assert_eq!(names, vec!["event-1", "event-2", "event-4", "event-5"]);
/// # }
/// ```
pub async fn read_in_batches<I, T, E, F, Fut>(
    items: impl IntoIterator<Item = I>,
    batch_size: usize,
    pause: Duration,
    read: F,
) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let batch_size = batch_size.max(1);
    let mut items = items.into_iter().peekable();
    let mut results = Vec::new();
    let mut batch_number = 0usize;

    while items.peek().is_some() {
        batch_number += 1;
        let batch: Vec<I> = items.by_ref().take(batch_size).collect();
        debug!(batch_number, size = batch.len(), "Reading batch");

        for outcome in join_all(batch.into_iter().map(&read)).await {
            match outcome {
                Ok(value) => results.push(value),
                Err(e) => warn!(batch_number, error = %e, "Batched read failed, skipping"),
            }
        }

        if items.peek().is_some() && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    results
}
