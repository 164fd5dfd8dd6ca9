//! Single-flight token refresh.
//!
//! The first caller that needs a new access token becomes the leader and runs
//! the refresh exchange. Callers that arrive while the exchange is in flight
//! are queued and released, in arrival order, with the leader's outcome once
//! it settles. At most one exchange is outstanding at any time.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::debug;

use super::error::AuthError;

/// Result every waiter receives: the new access token or the shared failure
pub type RefreshOutcome = Result<String, AuthError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    pending: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Refresh-in-progress flag plus the queue of callers waiting on it.
///
/// The mutex is only held for the check-and-update of the flag/queue pair,
/// never across an await point.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True while a refresh exchange is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.state().refreshing
    }

    /// Number of callers queued behind the in-flight exchange
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    /// Obtain a fresh access token.
    ///
    /// If no exchange is in flight, `exchange` is run and its outcome is
    /// broadcast to everyone who queued meanwhile. Otherwise `exchange` is
    /// dropped unused and this call waits for the in-flight outcome.
    ///
    /// `exchange` must finish any session bookkeeping (persisting the new
    /// token, or clearing the session on failure) before it resolves, so
    /// released waiters never see a half-updated session.
    pub async fn refresh<F, Fut>(&self, exchange: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome>,
    {
        let role = {
            let mut state = self.state();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.pending.push_back(tx);
                debug!(queued = state.pending.len(), "Refresh in flight, queueing request");
                Role::Waiter(rx)
            } else {
                state.refreshing = true;
                Role::Leader
            }
        };

        match role {
            Role::Waiter(rx) => rx.await.unwrap_or(Err(AuthError::Abandoned)),
            Role::Leader => {
                let mut guard = LeaderGuard {
                    coordinator: self,
                    settled: false,
                };
                let outcome = exchange().await;
                guard.settle(outcome.clone());
                outcome
            }
        }
    }

    /// Reset the flag and release every waiter with `outcome`
    fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state();
            state.refreshing = false;
            std::mem::take(&mut state.pending)
        };
        debug!(
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "Refresh settled, releasing queued requests"
        );
        for waiter in waiters {
            // A waiter whose caller went away has nothing left to receive
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Releases the queue even if the leader's future is dropped mid-exchange
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    fn settle(&mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(Err(AuthError::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    /// Poll until `count` callers are queued behind the leader
    async fn wait_for_pending(coordinator: &RefreshCoordinator, count: usize) {
        for _ in 0..200 {
            if coordinator.pending() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("waiters never queued");
    }

    #[tokio::test]
    async fn test_single_caller_runs_exchange() {
        let coordinator = RefreshCoordinator::new();
        let outcome = coordinator.refresh(|| async { Ok("t2".to_string()) }).await;
        assert_eq!(outcome, Ok("t2".to_string()));
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let exchanges = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let leader = {
            let coordinator = coordinator.clone();
            let exchanges = exchanges.clone();
            let release = release.clone();
            tokio::spawn(async move {
                coordinator
                    .refresh(|| async move {
                        exchanges.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        Ok("t2".to_string())
                    })
                    .await
            })
        };

        // Let the leader claim the flag before the waiters arrive
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let mut waiters = Vec::new();
        for _ in 0..4 {
            let coordinator = coordinator.clone();
            let exchanges = exchanges.clone();
            waiters.push(tokio::spawn(async move {
                coordinator
                    .refresh(|| async move {
                        exchanges.fetch_add(1, Ordering::SeqCst);
                        Ok("never".to_string())
                    })
                    .await
            }));
        }
        wait_for_pending(&coordinator, 4).await;
        assert!(coordinator.is_refreshing());

        release.notify_one();

        assert_eq!(leader.await.unwrap(), Ok("t2".to_string()));
        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Ok("t2".to_string()));
        }
        assert_eq!(exchanges.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending(), 0);
    }

    #[tokio::test]
    async fn test_waiters_are_released_in_arrival_order() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let release = Arc::new(Notify::new());
        let released = Arc::new(Mutex::new(Vec::new()));

        let leader = {
            let coordinator = coordinator.clone();
            let release = release.clone();
            tokio::spawn(async move {
                coordinator
                    .refresh(|| async move {
                        release.notified().await;
                        Ok("t2".to_string())
                    })
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        // One at a time, so queue position matches spawn order
        let mut waiters = Vec::new();
        for position in 0..5 {
            let waiter_coordinator = coordinator.clone();
            let released = released.clone();
            waiters.push(tokio::spawn(async move {
                let outcome = waiter_coordinator.refresh(|| async { Ok("never".to_string()) }).await;
                released.lock().unwrap().push(position);
                outcome
            }));
            wait_for_pending(&coordinator, position + 1).await;
        }

        release.notify_one();
        assert_eq!(leader.await.unwrap(), Ok("t2".to_string()));
        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Ok("t2".to_string()));
        }

        assert_eq!(*released.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(coordinator.pending(), 0);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let release = Arc::new(Notify::new());
        let failure = AuthError::Rejected {
            status: 401,
            body: "Token is invalid or expired".into(),
        };

        let leader = {
            let coordinator = coordinator.clone();
            let release = release.clone();
            let failure = failure.clone();
            tokio::spawn(async move {
                coordinator
                    .refresh(|| async move {
                        release.notified().await;
                        Err(failure)
                    })
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh(|| async { Ok("x".to_string()) }).await })
        };
        wait_for_pending(&coordinator, 1).await;
        release.notify_one();

        assert_eq!(leader.await.unwrap(), Err(failure.clone()));
        assert_eq!(waiter.await.unwrap(), Err(failure));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_waiters() {
        let coordinator = Arc::new(RefreshCoordinator::new());

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .refresh(|| std::future::pending::<RefreshOutcome>())
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh(|| async { Ok("x".to_string()) }).await })
        };
        wait_for_pending(&coordinator, 1).await;

        leader.abort();
        assert_eq!(waiter.await.unwrap(), Err(AuthError::Abandoned));
        assert!(!coordinator.is_refreshing());

        // The coordinator is usable again afterwards
        let outcome = coordinator.refresh(|| async { Ok("t3".to_string()) }).await;
        assert_eq!(outcome, Ok("t3".to_string()));
    }
}
