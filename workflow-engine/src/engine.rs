/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The workflow engine: ingress classification, the coarse-grained state
//! machine, and the action dispatch loop (spec.md §4.1).
//!
//! Concurrency follows spec.md §5 and §9's "uniform event-delivery model":
//! the engine's own bookkeeping lives behind one `tokio::sync::Mutex`, and a
//! handler operation's actual work never runs while that mutex is held.
//! Starting an operation checks the current [`WorkflowHandle`] *out* of the
//! mutex, hands it by ownership to a spawned task, and the task reports back
//! over an `mpsc` channel consumed by [`WorkflowEngine::run`] — the
//! `Arc<Mutex<mpsc::Receiver<T>>>` completion-loop idiom used throughout this
//! codebase. While a handle is checked out, a small
//! [`CheckedOutSummary`] keeps just enough state (deployment id, retry
//! token, cancellation kind, the shared cancel flag, any pending
//! replacement) for ingress classification to keep running concurrently.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_recursion::async_recursion;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

use common::config::Settings;

use crate::dispatch;
use crate::extension::{ExtensionManager, StateReport};
use crate::handle::WorkflowHandle;
use crate::handler::Handler;
use crate::manifest::{DesiredStatePayload, UpdateId};
use crate::steps_handler::StepsOrchestrator;
use crate::types::{extended_code, CancellationKind, DeploymentState, HandlerResult, ResultCode, UpdateAction, WorkflowStep};

/// Injected system actions for reboot/agent-restart (spec.md §4.2, §6
/// "reboot and agent-restart commands ... injected"). Overridable in tests.
#[async_trait]
pub trait SystemActuator: Send + Sync {
    async fn reboot(&self) -> bool;
    async fn restart_agent(&self) -> bool;
}

/// Runs the configured shell command via `sh -c`.
pub struct ShellSystemActuator {
    reboot_command: String,
    restart_command: String,
}

impl ShellSystemActuator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            reboot_command: settings.reboot_command.clone(),
            restart_command: settings.restart_command.clone(),
        }
    }

    async fn run(command: &str) -> bool {
        match tokio::process::Command::new("sh").arg("-c").arg(command).status().await {
            Ok(status) => status.success(),
            Err(e) => {
                error!(command, error = %e, "failed to spawn system command");
                false
            }
        }
    }
}

#[async_trait]
impl SystemActuator for ShellSystemActuator {
    async fn reboot(&self) -> bool {
        Self::run(&self.reboot_command).await
    }

    async fn restart_agent(&self) -> bool {
        Self::run(&self.restart_command).await
    }
}

/// State carried at the engine level while a [`WorkflowHandle`] is checked
/// out to a worker task for the duration of a handler operation. Lets
/// ingress classification keep reading/writing cancellation state without
/// waiting for the in-flight operation to finish.
struct CheckedOutSummary {
    deployment_id: String,
    retry_token: Option<String>,
    cancellation_kind: CancellationKind,
    cancel_requested: Arc<std::sync::atomic::AtomicBool>,
    pending_replacement: Option<Box<WorkflowHandle>>,
}

impl CheckedOutSummary {
    fn take_from(handle: &mut WorkflowHandle) -> Self {
        Self {
            deployment_id: handle.deployment_id.clone(),
            retry_token: handle.retry_token.clone(),
            cancellation_kind: handle.cancellation_kind,
            cancel_requested: Arc::clone(&handle.cancel_requested),
            pending_replacement: handle.pending_replacement.take(),
        }
    }

    fn restore_onto(self, handle: &mut WorkflowHandle) {
        handle.retry_token = self.retry_token;
        handle.cancellation_kind = self.cancellation_kind;
        handle.pending_replacement = self.pending_replacement;
    }
}

struct EngineInner {
    current: Option<WorkflowHandle>,
    checked_out: Option<CheckedOutSummary>,
    last_completed_workflow_id: Option<String>,
    last_goal_payload: Option<DesiredStatePayload>,
    system_reboot_in_progress: bool,
    system_restart_in_progress: bool,
}

impl EngineInner {
    fn new() -> Self {
        Self {
            current: None,
            checked_out: None,
            last_completed_workflow_id: None,
            last_goal_payload: None,
            system_reboot_in_progress: false,
            system_restart_in_progress: false,
        }
    }
}

struct CompletionEvent {
    step: WorkflowStep,
    handle: WorkflowHandle,
    result: HandlerResult,
}

/// The deployment-workflow engine (spec.md §4.1).
///
/// Owned behind an `Arc` so the completion loop ([`WorkflowEngine::run`])
/// and ingress entry points can share it across tasks; construct with
/// [`WorkflowEngine::new`] and spawn `run` once at startup.
pub struct WorkflowEngine {
    inner: Mutex<EngineInner>,
    extension: Arc<dyn ExtensionManager>,
    handler: Arc<dyn Handler>,
    actuator: Arc<dyn SystemActuator>,
    settings: Settings,
    completion_tx: mpsc::UnboundedSender<CompletionEvent>,
    completion_rx: Mutex<mpsc::UnboundedReceiver<CompletionEvent>>,
}

impl WorkflowEngine {
    pub fn new(extension: Arc<dyn ExtensionManager>, settings: Settings, actuator: Arc<dyn SystemActuator>) -> Arc<Self> {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            inner: Mutex::new(EngineInner::new()),
            handler: Arc::new(StepsOrchestrator::new(Arc::clone(&extension))),
            extension,
            actuator,
            settings,
            completion_tx,
            completion_rx: Mutex::new(completion_rx),
        })
    }

    fn downloads_base(&self) -> &Path {
        Path::new(&self.settings.downloads_base)
    }

    /// Consumes completion events until the engine is dropped. Spawn this
    /// once; every ingress entry point assumes it is already running.
    pub async fn run(self: Arc<Self>) {
        loop {
            let event = {
                let mut rx = self.completion_rx.lock().await;
                rx.recv().await
            };
            let Some(event) = event else {
                break;
            };
            let mut guard = self.inner.lock().await;
            let mut handle = event.handle;
            if let Some(summary) = guard.checked_out.take() {
                summary.restore_onto(&mut handle);
            }
            let inner = &mut *guard;
            self.complete(inner, event.step, handle, event.result).await;
        }
    }

    /// Entry point invoked when the cloud pushes a desired-state property
    /// (spec.md §4.1).
    pub async fn handle_property_update(self: &Arc<Self>, payload: DesiredStatePayload, force_deferral: bool) -> anyhow::Result<()> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        self.ingest(inner, payload, force_deferral).await
    }

    /// Called once on agent boot. `resumed_last_completed_id` seeds the
    /// duplicate-suppression marker from whatever durable store the
    /// surrounding daemon uses (persistence itself is out of scope here,
    /// spec.md §1 "configuration file loading" / §6 "Persisted state").
    pub async fn handle_startup(
        self: &Arc<Self>,
        initial_payload: Option<DesiredStatePayload>,
        resumed_last_completed_id: Option<String>,
    ) -> anyhow::Result<()> {
        let mut guard = self.inner.lock().await;
        guard.last_completed_workflow_id = resumed_last_completed_id;
        match initial_payload {
            Some(payload) => {
                let inner = &mut *guard;
                self.ingest(inner, payload, false).await
            }
            None => Ok(()),
        }
    }

    /// Re-drives the most recently cached desired-state payload with
    /// `force_deferral = true` (spec.md §4.1).
    pub async fn handle_component_changed(self: &Arc<Self>) -> anyhow::Result<()> {
        let mut guard = self.inner.lock().await;
        let payload = guard.last_goal_payload.clone();
        let inner = &mut *guard;
        match payload {
            Some(payload) => self.ingest(inner, payload, true).await,
            None => Ok(()),
        }
    }

    /// Periodic cooperative tick (spec.md §4.1).
    pub async fn do_work(self: &Arc<Self>) -> anyhow::Result<()> {
        self.extension.do_work().await
    }

    /// Ingress classification (spec.md §4.1 "Ingress classification
    /// algorithm"). Runs under `inner`'s lock for its entire duration,
    /// including the action-handling call it ends in — per spec.md §5 this
    /// rule is load-bearing and must not be relaxed by acquiring/releasing
    /// the lock partway through.
    async fn ingest(self: &Arc<Self>, inner: &mut EngineInner, payload: DesiredStatePayload, force_deferral: bool) -> anyhow::Result<()> {
        inner.last_goal_payload = Some(payload.clone());
        let action = payload.action();
        let new_id = payload.update_id.to_key();

        // I5 / R2: duplicate-ingress suppression, checked first and
        // independent of whether a deployment is current.
        if action == UpdateAction::ProcessDeployment
            && !payload.force_update
            && inner.last_completed_workflow_id.as_deref() == Some(new_id.as_str())
        {
            debug!(deployment_id = %new_id, "duplicate ingress suppressed");
            return Ok(());
        }

        let in_flight = inner.checked_out.is_some();
        let current_id = if in_flight {
            inner.checked_out.as_ref().map(|s| s.deployment_id.clone())
        } else {
            inner.current.as_ref().map(|h| h.deployment_id.clone())
        };

        match current_id {
            None if action == UpdateAction::Cancel => {
                // A cancel with nothing current to cancel is a no-op.
                Ok(())
            }
            None => {
                // Step 1: no current workflow — the new one becomes current.
                let Some(manifest) = payload.manifest.clone() else {
                    self.report(&new_id, DeploymentState::Failed, Some(HandlerResult::failure(extended_code::make(extended_code::BAND_ENGINE, 3), "desired-state payload missing manifest")), None).await;
                    return Ok(());
                };
                let mut handle = WorkflowHandle::new_root(manifest, payload.retry_timestamp.clone(), self.downloads_base());
                handle.force_update = payload.force_update;
                inner.current = Some(handle);
                self.handle_action(inner, action).await;
                Ok(())
            }
            Some(_) if action == UpdateAction::Cancel => {
                // Step 2: explicit cancel of the current workflow.
                let already_cancelling = if in_flight {
                    inner.checked_out.as_ref().unwrap().cancellation_kind != CancellationKind::None
                } else {
                    inner.current.as_ref().unwrap().cancellation_kind != CancellationKind::None
                };
                if !already_cancelling {
                    if in_flight {
                        let summary = inner.checked_out.as_mut().unwrap();
                        summary.cancellation_kind = CancellationKind::Normal;
                        summary.cancel_requested.store(true, Ordering::SeqCst);
                    } else {
                        let handle = inner.current.as_mut().unwrap();
                        handle.cancellation_kind = CancellationKind::Normal;
                        handle.request_cancel();
                    }
                    self.handle_action(inner, UpdateAction::Cancel).await;
                }
                Ok(())
            }
            Some(cur_id) if new_id == cur_id && !force_deferral => {
                // Step 3: potential retry of the same deployment id.
                let incoming_token = payload.retry_timestamp.clone();
                let current_token = if in_flight {
                    inner.checked_out.as_ref().unwrap().retry_token.clone()
                } else {
                    inner.current.as_ref().unwrap().retry_token.clone()
                };
                if crate::retry::retry_token_is_newer(current_token.as_deref(), incoming_token.as_deref()) {
                    if in_flight {
                        let summary = inner.checked_out.as_mut().unwrap();
                        summary.retry_token = incoming_token;
                        summary.cancellation_kind = CancellationKind::Retry;
                        summary.cancel_requested.store(true, Ordering::SeqCst);
                    } else {
                        let handle = inner.current.as_mut().unwrap();
                        handle.retry_token = incoming_token;
                        handle.cancellation_kind = CancellationKind::Retry;
                        handle.request_cancel();
                    }
                    self.handle_action(inner, UpdateAction::ProcessDeployment).await;
                }
                // R2: a non-greater token is a silent no-op.
                Ok(())
            }
            Some(cur_id) => {
                // Step 4: replacement — ids differ, or a same-id forced
                // deferral (component-changed re-drive).
                let Some(manifest) = payload.manifest.clone() else {
                    self.report(&new_id, DeploymentState::Failed, Some(HandlerResult::failure(extended_code::make(extended_code::BAND_ENGINE, 3), "desired-state payload missing manifest")), None).await;
                    return Ok(());
                };
                let mid_flight = in_flight || inner.current.as_ref().map_or(false, |h| h.is_mid_flight());
                if mid_flight {
                    let kind = if new_id == cur_id {
                        CancellationKind::ComponentChanged
                    } else {
                        CancellationKind::Replacement
                    };
                    let mut pending = WorkflowHandle::new_root(manifest, payload.retry_timestamp.clone(), self.downloads_base());
                    pending.force_update = payload.force_update;
                    if in_flight {
                        let summary = inner.checked_out.as_mut().unwrap();
                        summary.cancellation_kind = kind;
                        summary.pending_replacement = Some(Box::new(pending));
                        summary.cancel_requested.store(true, Ordering::SeqCst);
                    } else {
                        let handle = inner.current.as_mut().unwrap();
                        handle.cancellation_kind = kind;
                        handle.pending_replacement = Some(Box::new(pending));
                        handle.request_cancel();
                    }
                    self.handle_action(inner, UpdateAction::Cancel).await;
                } else {
                    let mut handle = WorkflowHandle::new_root(manifest, payload.retry_timestamp.clone(), self.downloads_base());
                    handle.force_update = payload.force_update;
                    inner.current = Some(handle);
                    self.handle_action(inner, UpdateAction::ProcessDeployment).await;
                }
                Ok(())
            }
        }
    }

    /// Action handling (spec.md §4.1 "Action handling"). Assumes `inner`'s
    /// lock is already held by the caller.
    async fn handle_action(self: &Arc<Self>, inner: &mut EngineInner, action: UpdateAction) {
        match action {
            UpdateAction::Cancel => {
                // cancel_requested was already set during classification;
                // the in-flight operation's eventual completion observes it
                // and `complete` arbitrates the next state. Also invoke the
                // handler's own Cancel so a real handler can act on it (kill
                // a subprocess, etc), not just flip the shared flag.
                if let Some(handle) = inner.current.as_ref() {
                    let _ = self.handler.cancel(handle).await;
                }
                // While checked out, the engine holds no `&WorkflowHandle`
                // (it was moved to the spawned task) — the shared
                // `cancel_requested` flag is the only channel available
                // until that operation's completion is observed.
            }
            UpdateAction::ProcessDeployment => {
                let in_flight = inner.checked_out.is_some() || inner.current.as_ref().map_or(false, |h| h.operation_in_progress);
                if !in_flight {
                    self.transition(inner, WorkflowStep::ProcessDeployment).await;
                }
            }
            UpdateAction::Undefined => {}
        }
    }

    /// Looks up `step` in the action dispatch table, reports its "started"
    /// state, and either runs it inline (`ProcessDeployment`'s own
    /// IsInstalled/cleanup work only) or checks the handle out to a worker
    /// task (spec.md §4.1 "Transition").
    #[async_recursion]
    async fn transition(self: &Arc<Self>, inner: &mut EngineInner, step: WorkflowStep) {
        let mut handle = match inner.current.take() {
            Some(h) => h,
            None => return,
        };
        handle.current_step = step;
        handle.operation_in_progress = true;

        if let Some(started) = dispatch::started_state(step) {
            handle.last_reported_state = started;
            self.report(&handle.deployment_id, started, None, None).await;
        }

        if step == WorkflowStep::ProcessDeployment {
            let result = self.handler.is_installed(&mut handle).await;
            self.complete(inner, step, handle, result).await;
            return;
        }

        inner.checked_out = Some(CheckedOutSummary::take_from(&mut handle));
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let result = engine.run_operation(step, &mut handle).await;
            let _ = engine.completion_tx.send(CompletionEvent { step, handle, result });
        });
    }

    /// Runs the handler operation for `step` against a checked-out handle,
    /// off the engine mutex entirely.
    async fn run_operation(&self, step: WorkflowStep, handle: &mut WorkflowHandle) -> HandlerResult {
        match step {
            WorkflowStep::Download => self.handler.download(handle).await,
            WorkflowStep::Backup => self.handler.backup(handle).await,
            WorkflowStep::Install => self.handler.install(handle).await,
            WorkflowStep::Apply => self.handler.apply(handle).await,
            WorkflowStep::Restore => self.handler.restore(handle).await,
            WorkflowStep::ProcessDeployment | WorkflowStep::Undefined => {
                HandlerResult::success(ResultCode::ApplySuccess)
            }
        }
    }

    /// The completion callback (spec.md §4.1 "Completion callback").
    #[async_recursion]
    async fn complete(self: &Arc<Self>, inner: &mut EngineInner, step: WorkflowStep, mut handle: WorkflowHandle, result: HandlerResult) {
        handle.operation_in_progress = false;
        handle.result = result.clone();

        if step == WorkflowStep::ProcessDeployment {
            self.complete_process_deployment(inner, handle, result).await;
            return;
        }

        let cancel_requested = handle.is_cancel_requested();

        if result.is_success() {
            let row = dispatch::row_for(step).expect("every dispatched step has a dispatch row");
            let (next_state, next_step) = row.next_on_success;
            handle.last_reported_state = next_state;

            if dispatch::has_reboot_restart_arbiter(step) && handle.wants_reboot_or_restart() {
                self.arbitrate_reboot(inner, handle).await;
                return;
            }

            if next_state == DeploymentState::Idle {
                self.finish_successfully(inner, handle, result).await;
                return;
            }

            handle.cancel_requested.store(false, Ordering::SeqCst);
            inner.current = Some(handle);
            self.transition(inner, next_step).await;
            return;
        }

        if cancel_requested {
            match handle.cancellation_kind {
                CancellationKind::Replacement => {
                    if let Err(e) = crate::sandbox::destroy(&handle.sandbox).await {
                        warn!(deployment_id = %handle.deployment_id, error = %e, "failed to destroy sandbox for replaced deployment");
                    }
                    let pending = handle.pending_replacement.take().expect("Replacement kind implies a pending handle");
                    let mut next = *pending;
                    next.operation_in_progress = false;
                    inner.current = Some(next);
                    self.transition(inner, WorkflowStep::ProcessDeployment).await;
                }
                CancellationKind::Retry | CancellationKind::ComponentChanged => {
                    handle.last_reported_state = DeploymentState::Idle;
                    handle.cancellation_kind = CancellationKind::None;
                    handle.cancel_requested.store(false, Ordering::SeqCst);
                    inner.current = Some(handle);
                    self.transition(inner, WorkflowStep::ProcessDeployment).await;
                }
                CancellationKind::Normal => {
                    let cancelled = HandlerResult {
                        result_code: ResultCode::Cancelled,
                        ..result
                    };
                    self.report(&handle.deployment_id, DeploymentState::Idle, Some(cancelled), None).await;
                    inner.last_completed_workflow_id = Some(handle.deployment_id.clone());
                }
                CancellationKind::None => {
                    error!(
                        deployment_id = %handle.deployment_id,
                        "failure with cancel_requested but cancellation_kind=None: invariant violation"
                    );
                    handle.last_reported_state = DeploymentState::Failed;
                    self.report(&handle.deployment_id, DeploymentState::Failed, Some(result), None).await;
                }
            }
            return;
        }

        let row = dispatch::row_for(step).expect("every dispatched step has a dispatch row");
        let (failure_state, failure_step) = row.next_on_failure;
        handle.last_reported_state = failure_state;
        self.report(&handle.deployment_id, failure_state, Some(result), None).await;
        if failure_step == WorkflowStep::Undefined {
            return;
        }
        inner.current = Some(handle);
        self.transition(inner, failure_step).await;
    }

    /// The `ProcessDeployment` step is special-cased: its "operation" is an
    /// `IsInstalled` check plus stale-sandbox cleanup, not a dispatch-table
    /// row with its own handler call, and its two outcomes (already
    /// installed vs. proceed) don't map onto generic success/failure
    /// (spec.md §4.1 "Action handling", bullets 1 and 3).
    async fn complete_process_deployment(self: &Arc<Self>, inner: &mut EngineInner, mut handle: WorkflowHandle, result: HandlerResult) {
        if matches!(result.result_code, ResultCode::IsInstalledInstalled) {
            let installed_update_id = handle.manifest().map(|m| m.update_id.clone());
            self.report(&handle.deployment_id, DeploymentState::Idle, None, installed_update_id).await;
            inner.last_completed_workflow_id = Some(handle.deployment_id.clone());
            return;
        }

        if !matches!(result.result_code, ResultCode::IsInstalledNotInstalled) {
            // A genuine precondition-check failure (detached-manifest fetch,
            // handler load, contract version) — report Failed, don't proceed.
            let row = dispatch::row_for(WorkflowStep::ProcessDeployment).expect("ProcessDeployment has a dispatch row");
            let (failure_state, _) = row.next_on_failure;
            handle.last_reported_state = failure_state;
            self.report(&handle.deployment_id, failure_state, Some(result), None).await;
            return;
        }

        if let Err(e) = crate::sandbox::cleanup_stale(self.downloads_base(), &handle.deployment_id).await {
            warn!(deployment_id = %handle.deployment_id, error = %e, "stale sandbox cleanup failed");
        }

        let row = dispatch::row_for(WorkflowStep::ProcessDeployment).expect("ProcessDeployment has a dispatch row");
        let (next_state, next_step) = row.next_on_success;
        handle.last_reported_state = next_state;
        self.report(&handle.deployment_id, next_state, None, None).await;
        inner.current = Some(handle);
        self.transition(inner, next_step).await;
    }

    /// Apply/Install/Restore completion arbiter (spec.md §4.1 "Apply
    /// completion and reboot", §4.2).
    async fn arbitrate_reboot(self: &Arc<Self>, inner: &mut EngineInner, mut handle: WorkflowHandle) {
        let wants_reboot = handle.reboot_required_immediate || handle.reboot_required_deferred;
        let wants_restart = handle.restart_required_immediate || handle.restart_required_deferred;

        if wants_reboot && self.actuator.reboot().await {
            inner.system_reboot_in_progress = true;
            inner.last_completed_workflow_id = Some(handle.deployment_id.clone());
            return;
        }
        if wants_restart && self.actuator.restart_agent().await {
            inner.system_restart_in_progress = true;
            inner.last_completed_workflow_id = Some(handle.deployment_id.clone());
            return;
        }

        // Neither was requested, or the system call failed: fall through to
        // reporting Idle. An installed-update-id is only attached when
        // nothing was requested at all; a failed reboot/restart call omits
        // it so the cloud treats the deployment as failed.
        let installed_update_id = if !wants_reboot && !wants_restart {
            handle.manifest().map(|m| m.update_id.clone())
        } else {
            None
        };
        handle.reboot_required_immediate = false;
        handle.reboot_required_deferred = false;
        handle.restart_required_immediate = false;
        handle.restart_required_deferred = false;
        let result = handle.result.clone();
        self.finish_successfully_with_id(inner, &handle, Some(result), installed_update_id).await;
    }

    async fn finish_successfully(self: &Arc<Self>, inner: &mut EngineInner, handle: WorkflowHandle, result: HandlerResult) {
        let installed_update_id = handle.manifest().map(|m| m.update_id.clone());
        self.finish_successfully_with_id(inner, &handle, Some(result), installed_update_id).await;
    }

    async fn finish_successfully_with_id(
        self: &Arc<Self>,
        inner: &mut EngineInner,
        handle: &WorkflowHandle,
        result: Option<HandlerResult>,
        installed_update_id: Option<UpdateId>,
    ) {
        let ok = self
            .report(&handle.deployment_id, DeploymentState::Idle, result.clone(), installed_update_id)
            .await;
        if !ok {
            self.report(&handle.deployment_id, DeploymentState::Failed, result, None).await;
        }
        inner.last_completed_workflow_id = Some(handle.deployment_id.clone());
    }

    /// Pushes one state/result report to the cloud transport (spec.md §4.5,
    /// §6). Awaited inline within the completion path (holding `inner`'s
    /// lock) since a transport failure feeds directly back into the state
    /// machine (spec.md §7 "Recovery policy"); see `DESIGN.md` for the
    /// tradeoff this makes against the "no I/O under the lock" guideline.
    async fn report(&self, deployment_id: &str, state: DeploymentState, result: Option<HandlerResult>, installed_update_id: Option<UpdateId>) -> bool {
        let ok = self
            .extension
            .report_state_and_result(StateReport {
                deployment_id,
                state,
                result,
                installed_update_id,
            })
            .await;
        if !ok {
            error!(deployment_id, ?state, "state report transport failure");
        }
        ok
    }
}
