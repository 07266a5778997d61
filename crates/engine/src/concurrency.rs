//! Bounded concurrency runner.
//!
//! Tasks are futures that record their own outcome; the runner only drives
//! them, at most `concurrency` at a time, and returns once all have finished.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Drive every task to completion with at most `concurrency` in flight.
///
/// A `concurrency` of 0 is treated as 1.
pub async fn run_with_concurrency<I, F>(tasks: I, concurrency: usize)
where
    I: IntoIterator<Item = F>,
    F: Future<Output = ()>,
{
    stream::iter(tasks)
        .for_each_concurrent(concurrency.max(1), |task| task)
        .await;
}
