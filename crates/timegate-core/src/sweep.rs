//! Continuous enforcement loop

use std::sync::Arc;
use std::time::Duration;
use timegate_host_api::SessionHost;
use timegate_util::IdentityId;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{AccessManager, AccessStatus, Messages};

/// Fixed sweep cadence.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Recurring background task that re-evaluates every connected identity and
/// evicts sessions whose access is `Expired` or `NoAccess`.
///
/// `Valid` sessions are left alone, and so are `NotStarted` ones: a connected
/// session whose window was edited to start later is only re-checked at its
/// next login, not kicked mid-session.
pub struct EnforcementLoop {
    inner: Arc<SweepInner>,
    task: Option<JoinHandle<()>>,
}

struct SweepInner {
    manager: Arc<AccessManager>,
    host: Arc<dyn SessionHost>,
    bypass: IdentityId,
    messages: Messages,
}

impl SweepInner {
    /// One sweep over the roster. Returns the number of evictions triggered.
    ///
    /// Each identity is processed in isolation: a disconnect failure is
    /// logged and skipped, never aborting the remaining iteration.
    async fn sweep_once(&self) -> usize {
        let roster = self.host.connected_identities();
        let mut evicted = 0;

        for identity in roster {
            if identity == self.bypass {
                continue;
            }

            let (status, record) = self.manager.check_access(&identity);

            // Reason and message always agree; no record means NoAccess
            let (reason, message) = match (status, record.as_ref()) {
                (AccessStatus::Valid | AccessStatus::NotStarted, _) => continue,
                (AccessStatus::Expired, Some(rec)) => {
                    (AccessStatus::Expired, self.messages.expired(rec))
                }
                _ => (AccessStatus::NoAccess, self.messages.no_access()),
            };

            info!(identity = %identity, reason = %reason, "Evicting connected session");
            evicted += 1;

            if let Err(e) = self.host.disconnect(&identity, &message).await {
                warn!(identity = %identity, error = %e, "Failed to disconnect session");
            }
        }

        evicted
    }
}

impl EnforcementLoop {
    pub fn new(
        manager: Arc<AccessManager>,
        host: Arc<dyn SessionHost>,
        bypass: IdentityId,
        messages: Messages,
    ) -> Self {
        Self {
            inner: Arc::new(SweepInner {
                manager,
                host,
                bypass,
                messages,
            }),
            task: None,
        }
    }

    /// Start the recurring sweep. Starting an already-running loop is a
    /// no-op.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let inner = self.inner.clone();
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let evicted = inner.sweep_once().await;
                if evicted > 0 {
                    debug!(evicted, "Sweep evicted sessions");
                }
            }
        }));

        info!(period_secs = SWEEP_PERIOD.as_secs(), "Enforcement loop started");
    }

    /// Cancel the recurring sweep. No further ticks fire after this returns.
    /// Safe to call if the loop was never started, and safe to call twice.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Enforcement loop stopped");
        }
    }

    /// Run a single sweep synchronously (for tests and diagnostics).
    pub async fn sweep_once(&self) -> usize {
        self.inner.sweep_once().await
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for EnforcementLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
