//! Background operations tracked by handle.
//!
//! `submit` registers a `Pending` record in a shared table and only then
//! schedules the work, so a `poll` right after `submit` always finds the
//! handle. The background task writes the terminal status under the table's
//! write lock, which makes it visible to every later poller.
//!
//! ```text
//! submit ──► table[id] = Pending ──► spawn(work)
//!                                        │
//!                          work() ───────┤
//!                                        ▼
//!                          table[id] = Complete(result) | Failed { reason }
//!
//! poll(id) ──► snapshot of table[id]
//! ```
//!
//! Work that returns `Err` or panics ends in `Failed`, so pollers never wait
//! on an operation that can no longer finish.

use crate::error::OperationError;
use crate::HealthCheck;
use chrono::{DateTime, Utc};
use flight_control_core::environment::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

// ============================================================================
// Handle
// ============================================================================

/// Opaque handle of a submitted operation (random 128-bit UUID).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a new random `OperationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `OperationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================================
// Snapshot types
// ============================================================================

/// Status of a tracked operation.
///
/// Moves from `Pending` to exactly one terminal state, exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationStatus<R> {
    /// Work has not finished yet
    Pending,
    /// Work returned a result
    Complete(R),
    /// Work returned an error or panicked
    Failed {
        /// Error or panic message
        reason: String,
    },
}

impl<R> OperationStatus<R> {
    /// Whether the operation reached a terminal state
    #[must_use]
    pub const fn is_done(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Point-in-time view of one operation, as returned by [`OperationRunner::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation<R> {
    /// Handle of the operation
    pub id: OperationId,
    /// Current status
    pub status: OperationStatus<R>,
    /// When the operation was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the operation reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl<R> Operation<R> {
    fn pending(id: OperationId, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: OperationStatus::Pending,
            submitted_at,
            finished_at: None,
        }
    }

    /// Whether the operation reached a terminal state
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Result of a completed operation
    #[must_use]
    pub const fn result(&self) -> Option<&R> {
        match &self.status {
            OperationStatus::Complete(result) => Some(result),
            _ => None,
        }
    }

    /// Failure reason of a failed operation
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OperationStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Retention and diagnostics settings for an [`OperationRunner`].
///
/// # Example
///
/// ```
/// use flight_control_runtime::RunnerConfig;
/// use std::time::Duration;
///
/// let config = RunnerConfig::default()
///     .with_completed_ttl(Some(Duration::from_secs(600)))
///     .with_soft_limit(500);
/// assert_eq!(config.soft_limit, 500);
/// ```
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How long terminal operations stay pollable (`None` keeps them forever)
    pub completed_ttl: Option<Duration>,
    /// Table size above which health reports `Degraded`
    pub soft_limit: usize,
}

impl RunnerConfig {
    /// Create a configuration with custom values
    #[must_use]
    pub const fn new(completed_ttl: Option<Duration>, soft_limit: usize) -> Self {
        Self {
            completed_ttl,
            soft_limit,
        }
    }

    /// Set the retention period of terminal operations
    #[must_use]
    pub const fn with_completed_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.completed_ttl = ttl;
        self
    }

    /// Set the soft limit used by health checks
    #[must_use]
    pub const fn with_soft_limit(mut self, soft_limit: usize) -> Self {
        self.soft_limit = soft_limit;
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            completed_ttl: Some(Duration::from_secs(3600)),
            soft_limit: 10_000,
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// State shared between the runner handle, background tasks and the sweeper.
struct Shared<R, C> {
    table: RwLock<HashMap<OperationId, Operation<R>>>,
    finished: Notify,
    clock: C,
    config: RunnerConfig,
}

impl<R, C: Clock> Shared<R, C> {
    // Every write is a single assignment, so a poisoned table is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<OperationId, Operation<R>>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<OperationId, Operation<R>>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, id: OperationId, status: OperationStatus<R>) {
        let now = self.clock.now();
        let failed = matches!(status, OperationStatus::Failed { .. });

        {
            let mut table = self.write();
            let Some(operation) = table.get_mut(&id) else {
                tracing::debug!(operation_id = %id, "Finished operation is no longer tracked");
                return;
            };

            if let Ok(elapsed) = (now - operation.submitted_at).to_std() {
                metrics::histogram!("operation_duration_seconds").record(elapsed.as_secs_f64());
            }

            operation.status = status;
            operation.finished_at = Some(now);
        }

        metrics::gauge!("operations_pending").decrement(1.0);
        if failed {
            metrics::counter!("operations_failed_total").increment(1);
        } else {
            metrics::counter!("operations_completed_total").increment(1);
        }

        self.finished.notify_waiters();
    }

    fn evict_expired(&self) -> usize {
        let Some(ttl) = self.config.completed_ttl else {
            return 0;
        };
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let now = self.clock.now();

        let evicted = {
            let mut table = self.write();
            let before = table.len();
            table.retain(|_, operation| {
                operation
                    .finished_at
                    .is_none_or(|finished_at| finished_at + ttl > now)
            });
            before - table.len()
        };

        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired operations");
            #[allow(clippy::cast_possible_truncation)] // Eviction batches are far below u64::MAX
            metrics::counter!("operations_evicted_total").increment(evicted as u64);
        }

        evicted
    }
}

/// Runs units of work in the background and exposes their outcome by handle.
///
/// Cloning is cheap: clones share the same operation table.
///
/// # Type Parameters
///
/// - `R`: Result type produced by submitted work
/// - `C`: Clock used for timestamps and retention
///
/// # Example
///
/// ```ignore
/// let runner: OperationRunner<ExportArtifact> = OperationRunner::new(SystemClock);
///
/// let id = runner.submit(move || exporter.export(&passengers));
/// // ... later, from any task
/// let operation = runner.poll(id)?;
/// if let Some(artifact) = operation.result() {
///     println!("export written to {}", artifact.path.display());
/// }
/// ```
pub struct OperationRunner<R, C = SystemClock> {
    shared: Arc<Shared<R, C>>,
}

impl<R, C> Clone for OperationRunner<R, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R, C> fmt::Debug for OperationRunner<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRunner")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl<R, C> OperationRunner<R, C>
where
    R: Clone + Send + Sync + 'static,
    C: Clock + 'static,
{
    /// Create a runner with the default [`RunnerConfig`]
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, RunnerConfig::default())
    }

    /// Create a runner with a custom configuration
    #[must_use]
    pub fn with_config(clock: C, config: RunnerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: RwLock::new(HashMap::new()),
                finished: Notify::new(),
                clock,
                config,
            }),
        }
    }

    /// Runner configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.shared.config
    }

    /// Submit blocking work and return its handle immediately.
    ///
    /// The work runs on Tokio's blocking pool. An `Err` return or a panic
    /// marks the operation `Failed` with the error or panic message.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit<F, E>(&self, work: F) -> OperationId
    where
        F: FnOnce() -> Result<R, E> + Send + 'static,
        E: fmt::Display,
    {
        let id = self.register("blocking");
        let task = tokio::task::spawn_blocking(move || work().map_err(|e| e.to_string()));
        self.supervise(id, task);
        id
    }

    /// Submit async work and return its handle immediately.
    ///
    /// Same contract as [`submit`](Self::submit), for work that is a future.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit_async<Fut, E>(&self, work: Fut) -> OperationId
    where
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: fmt::Display,
    {
        let id = self.register("async");
        let task = tokio::spawn(async move { work.await.map_err(|e| e.to_string()) });
        self.supervise(id, task);
        id
    }

    /// Snapshot of an operation's current state. No side effects.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::NotFound`] if the handle was never issued or
    /// its operation has been evicted.
    pub fn poll(&self, id: OperationId) -> Result<Operation<R>, OperationError> {
        self.shared
            .read()
            .get(&id)
            .cloned()
            .ok_or(OperationError::NotFound(id))
    }

    /// Wait until an operation reaches a terminal state.
    ///
    /// # Errors
    ///
    /// - [`OperationError::NotFound`] for an unknown handle
    /// - [`OperationError::Timeout`] if `timeout` elapses first; the
    ///   operation itself keeps running
    pub async fn wait(
        &self,
        id: OperationId,
        timeout: Duration,
    ) -> Result<Operation<R>, OperationError> {
        let wait_for_terminal = async {
            loop {
                // Registered before the check so a completion in between is not missed
                let notified = self.shared.finished.notified();
                let operation = self.poll(id)?;
                if operation.is_done() {
                    return Ok(operation);
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait_for_terminal)
            .await
            .map_err(|_| OperationError::Timeout(id))?
    }

    /// Number of tracked operations (pending and terminal)
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    /// Whether no operation is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.read().is_empty()
    }

    /// Number of operations still running
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared
            .read()
            .values()
            .filter(|operation| !operation.is_done())
            .count()
    }

    /// Remove terminal operations older than the configured TTL.
    ///
    /// Pending operations are never evicted. Returns the number removed.
    pub fn evict_expired(&self) -> usize {
        self.shared.evict_expired()
    }

    /// Run [`evict_expired`](Self::evict_expired) every `interval`.
    ///
    /// The task stops on its own once every runner clone has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, or if `interval` is zero.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let shared: Weak<Shared<R, C>> = Arc::downgrade(&self.shared);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(shared) = shared.upgrade() else {
                    tracing::debug!("Operation runner dropped, stopping sweeper");
                    break;
                };
                shared.evict_expired();
            }
        })
    }

    /// Health of the operation table.
    ///
    /// Degraded when the number of tracked operations exceeds the soft limit.
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        let (tracked, pending) = {
            let table = self.shared.read();
            let pending = table.values().filter(|op| !op.is_done()).count();
            (table.len(), pending)
        };

        let check = if tracked > self.shared.config.soft_limit {
            HealthCheck::degraded(
                "operations",
                format!(
                    "{tracked} operations tracked (soft limit {})",
                    self.shared.config.soft_limit
                ),
            )
        } else {
            HealthCheck::healthy("operations")
        };

        check
            .with_metadata("tracked", tracked.to_string())
            .with_metadata("pending", pending.to_string())
    }

    fn register(&self, kind: &'static str) -> OperationId {
        let id = OperationId::new();
        let operation = Operation::pending(id, self.shared.clock.now());
        self.shared.write().insert(id, operation);

        metrics::counter!("operations_submitted_total", "kind" => kind).increment(1);
        metrics::gauge!("operations_pending").increment(1.0);
        tracing::debug!(operation_id = %id, kind, "Operation submitted");

        id
    }

    fn supervise(&self, id: OperationId, task: JoinHandle<Result<R, String>>) {
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let status = match task.await {
                Ok(Ok(result)) => OperationStatus::Complete(result),
                Ok(Err(reason)) => {
                    tracing::warn!(operation_id = %id, error = %reason, "Operation failed");
                    OperationStatus::Failed { reason }
                },
                Err(join_error) => {
                    let reason = if join_error.is_panic() {
                        format!("operation panicked: {}", panic_message(join_error.into_panic()))
                    } else {
                        "operation was cancelled".to_string()
                    };
                    tracing::error!(operation_id = %id, error = %reason, "Operation aborted");
                    OperationStatus::Failed { reason }
                },
            };

            shared.finish(id, status);
            tracing::debug!(operation_id = %id, "Operation finished");
        });
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&'static str>()
            .map_or_else(|| "unknown panic".to_string(), |message| (*message).to_string()),
    }
}
