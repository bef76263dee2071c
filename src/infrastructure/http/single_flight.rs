//! Single-flight execution of an async operation.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::error::TransportError;

type SharedOutcome<T> = Shared<BoxFuture<'static, Result<T, TransportError>>>;

/// Runs at most one instance of an operation at a time.
///
/// A caller arriving while an operation is pending does not start a new one:
/// it awaits the same shared future and observes the same outcome. The pending
/// slot is released by the operation itself as soon as it settles, whether it
/// succeeded or failed, so the next caller after that starts a fresh one.
///
/// The slot lock is only held to inspect or install the pending future, never
/// across the network call.
pub struct SingleFlight<T> {
    slot: Arc<Mutex<Option<SharedOutcome<T>>>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Joins the pending operation, or starts one with `start` if none is pending.
    ///
    /// `start` is invoked at most once per operation and only by the caller
    /// that finds the slot empty.
    pub async fn run<F, Fut>(&self, start: F) -> Result<T, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let pending = {
            let mut slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let operation = start();
                    let release = Arc::clone(&self.slot);
                    let pending = async move {
                        let outcome = operation.await;
                        release.lock().await.take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Returns true while an operation is in flight.
    pub async fn is_pending(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counted(
        calls: &Arc<AtomicUsize>,
        outcome: Result<u32, TransportError>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, TransportError>> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                outcome
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_operation() {
        let flight = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b, c) = tokio::join!(
            flight.run(counted(&calls, Ok(7))),
            flight.run(counted(&calls, Ok(8))),
            flight.run(counted(&calls, Ok(9))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(c, Ok(7));
        assert!(!flight.is_pending().await);
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_slot_released() {
        let flight = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = TransportError::Network("connection reset".into());

        let (a, b) = tokio::join!(
            flight.run(counted(&calls, Err(failure.clone()))),
            flight.run(counted(&calls, Ok(1))),
        );

        assert_eq!(a, Err(failure.clone()));
        assert_eq!(b, Err(failure));
        assert!(!flight.is_pending().await);

        let next = flight.run(counted(&calls, Ok(2))).await;
        assert_eq!(next, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequential_calls_start_new_operations() {
        let flight = SingleFlight::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(flight.run(counted(&calls, Ok(1))).await, Ok(1));
        assert_eq!(flight.run(counted(&calls, Ok(2))).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
