//! Dashboard session: owns the view state, the identity subscription and the
//! poll loop, and turns user actions into endpoint calls.
//!
//! `mount` acquires the auth subscription and starts polling; `unmount` (or
//! dropping the session) releases both. Every fetch is fenced so that only
//! the newest response for the current principal reaches the view.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::api::CrudClient;
use super::fence::RequestFence;
use super::identity::IdentityProvider;
use super::view::{DashboardView, UpdateMatch};
use super::ClientError;
use crate::models::principal::Principal;
use crate::models::task::{Category, UpsertTask, PROGRESS_COMPLETE, PROGRESS_IN_PROCESS};

/// Default interval between polls of the task list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

struct Shared {
    api: CrudClient,
    identity: Arc<dyn IdentityProvider>,
    view: Mutex<DashboardView>,
    fence: RequestFence,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock_view(&self) -> MutexGuard<'_, DashboardView> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Signal renderers that the view changed.
    fn touch(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn update<R>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        let mut view = self.lock_view();
        let result = f(&mut *view);
        drop(view);
        self.touch();
        result
    }

    fn apply_principal(&self, principal: Option<Principal>) {
        let changed = self.lock_view().set_principal(principal);
        if changed {
            self.touch();
        }
    }

    fn current_uid(&self) -> Option<String> {
        self.lock_view().principal().map(|p| p.uid.clone())
    }

    /// Fetch the task list and apply it if it is still the newest response
    /// for the current principal. Failures keep the previous list.
    async fn refresh(&self) -> bool {
        let Some(uid) = self.current_uid() else {
            return false;
        };
        let ticket = self.fence.issue();

        let tasks = match self.api.list(&uid).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(error = %e, uid = %uid, "Failed to fetch tasks");
                return false;
            }
        };

        let changed = {
            let mut view = self.lock_view();
            if view.principal().map(|p| p.uid.as_str()) != Some(uid.as_str()) {
                tracing::debug!(ticket, "Discarding task list of a previous principal");
                return false;
            }
            if !self.fence.try_apply(ticket) {
                tracing::debug!(ticket, "Discarding stale task list");
                return false;
            }
            view.replace_tasks(tasks)
        };
        if changed {
            self.touch();
        }
        true
    }

    async fn write(&self, body: UpsertTask) -> Result<(), ClientError> {
        match self.api.upsert(&body).await {
            Ok(rows) => {
                tracing::debug!(id = ?rows.first().map(|t| t.id), "Task saved");
                self.update(DashboardView::complete_write);
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to submit task", e)),
        }
    }

    /// Log a failed action and surface it as the view notice.
    fn fail(&self, action: &str, e: ClientError) -> ClientError {
        tracing::error!(error = %e, "{action}");
        self.update(|view| view.set_notice(format!("{action}: {e}")));
        e
    }
}

struct Mounted {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct DashboardSession {
    shared: Arc<Shared>,
    poll_interval: Duration,
    mounted: Option<Mounted>,
}

impl DashboardSession {
    pub fn new(
        api: CrudClient,
        identity: Arc<dyn IdentityProvider>,
        update_match: UpdateMatch,
        poll_interval: Duration,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        let shared = Shared {
            api,
            view: Mutex::new(DashboardView::new(update_match)),
            identity,
            fence: RequestFence::new(),
            revision,
        };
        Self {
            shared: Arc::new(shared),
            poll_interval,
            mounted: None,
        }
    }

    /// Copy of the current view state for rendering.
    pub fn snapshot(&self) -> DashboardView {
        self.shared.lock_view().clone()
    }

    /// Receiver that changes whenever the view does.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Subscribe to auth state and start polling. Fetches right away, then
    /// on every interval and whenever the principal changes.
    pub fn mount(&mut self) {
        if self.mounted.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let auth = self.shared.identity.subscribe();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.shared),
            auth,
            self.poll_interval,
            cancel.clone(),
        ));
        tracing::debug!(interval_ms = self.poll_interval.as_millis() as u64, "Dashboard mounted");
        self.mounted = Some(Mounted { cancel, handle });
    }

    /// Stop polling and release the auth subscription.
    pub async fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.cancel.cancel();
            if let Err(e) = mounted.handle.await {
                tracing::warn!(error = %e, "Poll task ended abnormally");
            }
            tracing::debug!("Dashboard unmounted");
        }
    }

    /// Fetch now, outside the poll schedule.
    pub async fn refresh(&self) -> bool {
        self.shared.refresh().await
    }

    pub async fn sign_in(&self) -> Result<Principal, ClientError> {
        match self.shared.identity.sign_in().await {
            Ok(principal) => {
                self.shared.apply_principal(Some(principal.clone()));
                self.shared.update(DashboardView::clear_notice);
                Ok(principal)
            }
            Err(e) => Err(self.shared.fail("Login error", e)),
        }
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        match self.shared.identity.sign_out().await {
            Ok(()) => {
                self.shared.apply_principal(None);
                Ok(())
            }
            Err(e) => Err(self.shared.fail("Logout error", e)),
        }
    }

    pub fn select_day(&self, day: i32) -> bool {
        self.shared.update(|view| view.select_day(day))
    }

    pub fn toggle_skip(&self) -> Option<bool> {
        self.shared.update(DashboardView::toggle_skip_selected)
    }

    pub fn set_draft(&self, category: Category, text: impl Into<String>) {
        let text = text.into();
        self.shared.update(|view| view.set_draft(category, text));
    }

    pub fn start_edit(&self, id: i64) -> bool {
        self.shared.update(|view| view.start_edit(id))
    }

    /// Submit the `category` form for the selected day. Returns `Ok(false)`
    /// when there was nothing to submit.
    pub async fn submit(
        &self,
        category: Category,
        progress: Option<i32>,
    ) -> Result<bool, ClientError> {
        let body = self.shared.lock_view().plan_submit(category, progress);
        let Some(body) = body else {
            return Ok(false);
        };
        self.shared.write(body).await?;
        Ok(true)
    }

    /// Move task `id` to `progress`. Returns `Ok(false)` for unknown tasks.
    pub async fn set_progress(&self, id: i64, progress: i32) -> Result<bool, ClientError> {
        let body = self.shared.lock_view().plan_progress(id, progress);
        let Some(body) = body else {
            return Ok(false);
        };
        self.shared.write(body).await?;
        Ok(true)
    }

    pub async fn mark_in_process(&self, id: i64) -> Result<bool, ClientError> {
        self.set_progress(id, PROGRESS_IN_PROCESS).await
    }

    pub async fn mark_success(&self, id: i64) -> Result<bool, ClientError> {
        self.set_progress(id, PROGRESS_COMPLETE).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        if self.shared.current_uid().is_none() {
            return Err(ClientError::SignedOut);
        }
        match self.shared.api.delete(id).await {
            Ok(()) => {
                tracing::debug!(id, "Task deleted");
                self.shared.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.shared.fail("Failed to delete task", e)),
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.cancel.cancel();
        }
    }
}

async fn poll_loop(
    shared: Arc<Shared>,
    mut auth: watch::Receiver<Option<Principal>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let principal = auth.borrow_and_update().clone();
    shared.apply_principal(principal);

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut auth_open = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = auth.changed(), if auth_open => {
                if changed.is_err() {
                    tracing::debug!("Identity provider closed its auth channel");
                    auth_open = false;
                    continue;
                }
                let principal = auth.borrow_and_update().clone();
                shared.apply_principal(principal);
                ticker.reset();
                if !fetch_unless_cancelled(&shared, &cancel).await {
                    break;
                }
            }
            _ = ticker.tick() => {
                if !fetch_unless_cancelled(&shared, &cancel).await {
                    break;
                }
            }
        }
    }
}

/// Run one fetch, abandoning it if the session is torn down meanwhile.
/// Returns false when cancelled.
async fn fetch_unless_cancelled(shared: &Shared, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = shared.refresh() => true,
    }
}
