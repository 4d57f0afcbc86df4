//! Local data destruction routine
//!
//! Best-effort, order-independent teardown of every local persistence layer
//! plus remote session invalidation. Each step is isolated so one failure
//! never stops the others, and the routine always ends with a redirect to
//! the signed-out entry point carrying the `data_wiped` reason.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::idle::IdleSecurityService;
use crate::page_lock::SessionUnlockCache;
use crate::session::{SessionProvider, SignOutReason, SignOutRedirect};

/// One local persistence layer the wipe tears down
///
/// Hosts register a target per layer: persistent key-value scope, session
/// key-value scope, embedded database registry, named cache registry, and
/// background worker registrations.
#[async_trait]
pub trait WipeTarget: Send + Sync {
    /// Layer name used in logs and the report
    fn name(&self) -> &str;

    /// Destroy this layer's data
    async fn wipe(&self) -> Result<()>;
}

/// Outcome of a destruction run
#[derive(Debug, Clone, Default)]
pub struct WipeReport {
    /// Targets attempted
    pub attempted: usize,
    /// Target names whose wipe failed
    pub failed: Vec<String>,
    /// Whether the remote session was invalidated
    pub session_invalidated: bool,
}

impl WipeReport {
    /// Whether every step succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.session_invalidated
    }
}

/// Irreversible local-state teardown
pub struct DestructionRoutine {
    targets: Vec<Arc<dyn WipeTarget>>,
    session: Arc<dyn SessionProvider>,
    unlocks: Arc<SessionUnlockCache>,
}

impl DestructionRoutine {
    /// Create a routine with no targets registered yet
    pub fn new(session: Arc<dyn SessionProvider>, unlocks: Arc<SessionUnlockCache>) -> Self {
        Self {
            targets: Vec::new(),
            session,
            unlocks,
        }
    }

    /// Register one persistence layer for destruction
    pub fn register(&mut self, target: Arc<dyn WipeTarget>) {
        self.targets.push(target);
    }

    /// Run the full teardown
    ///
    /// Clears the attempt state first, wipes every registered target with
    /// per-step isolation, drops the in-process unlock cache, invalidates
    /// the remote session, and always returns the signed-out redirect no
    /// matter how many steps failed.
    pub async fn execute(&self, idle: &IdleSecurityService) -> (WipeReport, SignOutRedirect) {
        let mut report = WipeReport::default();

        idle.clear_attempt_state().await;
        self.unlocks.clear_all().await;

        for target in &self.targets {
            report.attempted += 1;
            if let Err(e) = target.wipe().await {
                warn!("Wipe step '{}' failed: {}", target.name(), e);
                report.failed.push(target.name().to_string());
            }
        }

        match self.session.invalidate().await {
            Ok(()) => report.session_invalidated = true,
            Err(e) => warn!("Remote session invalidation failed: {}", e),
        }

        info!(
            "Local data destruction finished: {}/{} targets wiped, session invalidated: {}",
            report.attempted - report.failed.len(),
            report.attempted,
            report.session_invalidated
        );

        (report, SignOutRedirect::new(SignOutReason::DataWiped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use warden_core::{LockPolicy, UserId};

    use crate::error::ServiceError;
    use crate::store::{MemoryAttemptStore, MemoryStore};

    struct RecordingTarget {
        name: &'static str,
        wiped: AtomicBool,
        fail: bool,
    }

    impl RecordingTarget {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                wiped: AtomicBool::new(false),
                fail,
            })
        }
    }

    #[async_trait]
    impl WipeTarget for RecordingTarget {
        fn name(&self) -> &str {
            self.name
        }

        async fn wipe(&self) -> Result<()> {
            self.wiped.store(true, Ordering::SeqCst);
            if self.fail {
                Err(ServiceError::storage("simulated failure"))
            } else {
                Ok(())
            }
        }
    }

    struct FakeSession {
        invalidated: AtomicBool,
    }

    #[async_trait]
    impl SessionProvider for FakeSession {
        fn current_user(&self) -> Option<UserId> {
            Some(UserId::from("u1"))
        }

        async fn invalidate(&self) -> Result<()> {
            self.invalidated.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_idle() -> IdleSecurityService {
        let store = Arc::new(MemoryStore::new());
        IdleSecurityService::new(
            store.clone(),
            Arc::new(MemoryAttemptStore::new()),
            store,
            LockPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_failing_step_does_not_stop_the_rest() {
        let session = Arc::new(FakeSession {
            invalidated: AtomicBool::new(false),
        });
        let mut routine =
            DestructionRoutine::new(session.clone(), Arc::new(SessionUnlockCache::new()));

        let kv = RecordingTarget::new("key_value", false);
        let db = RecordingTarget::new("databases", true);
        let caches = RecordingTarget::new("caches", false);
        routine.register(kv.clone());
        routine.register(db.clone());
        routine.register(caches.clone());

        let idle = test_idle();
        let (report, redirect) = routine.execute(&idle).await;

        assert!(kv.wiped.load(Ordering::SeqCst));
        assert!(db.wiped.load(Ordering::SeqCst));
        assert!(caches.wiped.load(Ordering::SeqCst));
        assert_eq!(report.attempted, 3);
        assert_eq!(report.failed, vec!["databases".to_string()]);
        assert!(session.invalidated.load(Ordering::SeqCst));
        assert_eq!(redirect.reason, SignOutReason::DataWiped);
    }

    #[tokio::test]
    async fn test_execute_clears_attempt_state_first() {
        let session = Arc::new(FakeSession {
            invalidated: AtomicBool::new(false),
        });
        let routine = DestructionRoutine::new(session, Arc::new(SessionUnlockCache::new()));

        let idle = test_idle();
        idle.record_failed_attempt(1, std::time::Duration::from_secs(900)).await;
        assert!(idle.is_locked_out().await);

        let (report, _) = routine.execute(&idle).await;
        assert!(report.is_clean());
        assert!(!idle.is_locked_out().await);
        assert_eq!(idle.attempt_state().await.failed_attempts, 0);
    }
}
