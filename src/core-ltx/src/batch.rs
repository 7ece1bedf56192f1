//! Concurrent batch processing utilities.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Processes items with controlled concurrency.
///
/// At most `concurrency` futures run at once. Results come back in submission
/// order regardless of which future finished first, and items whose future
/// returns `None` are filtered out.
///
/// # Arguments
///
/// * `items` - Work items, usually discovered files
/// * `processor` - Builds the future for one item from the item and its position
/// * `concurrency` - Upper bound on futures polled at once (0 is treated as 1)
///
/// # Examples
///
/// ```
/// # use core_ltx::batch::process_in_batches;
/// # #[tokio::main]
/// # async fn main() {
/// let files = vec!["a.html", "b.html", "c.html"];
/// let results = process_in_batches(
///     files,
///     |file, index| Box::pin(async move { Some(format!("{index}: {file}")) }),
///     2,
/// )
/// .await;
/// assert_eq!(results, vec!["0: a.html", "1: b.html", "2: c.html"]);
/// # }
/// ```
pub async fn process_in_batches<T, F, Fut, R>(items: Vec<T>, processor: F, concurrency: usize) -> Vec<R>
where
    T: Send + 'static,
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Option<R>> + Send + 'static,
    R: Send + 'static,
{
    stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| processor(item, index))
        .buffered(concurrency.max(1))
        .filter_map(|result| async move { result })
        .collect()
        .await
}
