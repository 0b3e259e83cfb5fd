/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The tree-structured deployment descriptor (spec.md §3 "WorkflowHandle").

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::manifest::{Manifest, ManifestStep};
use crate::types::{CancellationKind, DeploymentState, HandlerResult, WorkflowStep};

/// Whether a handle drives a full sub-manifest (root, or a reference-step
/// child — always processed by the step orchestrator) or is a single leaf
/// step (an inline child, processed by the handler named in its step).
#[derive(Debug, Clone)]
pub enum HandleKind {
    Composite { manifest: Manifest },
    Leaf { step: ManifestStep },
}

/// A node in the deployment tree (spec.md §3).
///
/// Depth is capped at 2: the root (level 0) and, for reference steps, one
/// level of children (level 1, invariant 5). A root's children are built
/// lazily by the step orchestrator the first time any operation runs.
#[derive(Debug, Clone)]
pub struct WorkflowHandle {
    pub deployment_id: String,
    pub retry_token: Option<String>,
    pub step_index: usize,
    pub level: u8,

    pub kind: HandleKind,

    pub current_step: WorkflowStep,
    pub last_reported_state: DeploymentState,
    pub cancellation_kind: CancellationKind,
    pub operation_in_progress: bool,
    /// Shared across the whole tree: setting it on the root is visible to
    /// every child without an explicit propagation pass (spec.md §4.3
    /// "Cancel... by inheritance of handle flags").
    pub cancel_requested: Arc<AtomicBool>,

    pub reboot_required_immediate: bool,
    pub reboot_required_deferred: bool,
    pub restart_required_immediate: bool,
    pub restart_required_deferred: bool,

    pub selected_components: serde_json::Value,
    pub result: HandlerResult,
    pub pending_replacement: Option<Box<WorkflowHandle>>,
    pub force_update: bool,

    pub children: Vec<WorkflowHandle>,
    pub sandbox: PathBuf,
}

impl WorkflowHandle {
    /// Builds the root handle for a newly-ingressed deployment.
    pub fn new_root(manifest: Manifest, retry_token: Option<String>, downloads_base: &std::path::Path) -> Self {
        let deployment_id = manifest.update_id.to_key();
        let sandbox = crate::sandbox::path_for(downloads_base, &deployment_id);
        Self {
            deployment_id,
            retry_token,
            step_index: 0,
            level: 0,
            kind: HandleKind::Composite { manifest },
            current_step: WorkflowStep::Undefined,
            last_reported_state: DeploymentState::Idle,
            cancellation_kind: CancellationKind::None,
            operation_in_progress: false,
            cancel_requested: Arc::new(AtomicBool::new(false)),
            reboot_required_immediate: false,
            reboot_required_deferred: false,
            restart_required_immediate: false,
            restart_required_deferred: false,
            selected_components: serde_json::Value::Array(vec![]),
            result: HandlerResult::default(),
            pending_replacement: None,
            force_update: false,
            children: Vec::new(),
            sandbox,
        }
    }

    /// Builds a child for an inline step: driven by the leaf handler named in
    /// `step.update_type`.
    pub fn new_inline_child(parent: &WorkflowHandle, step_index: usize, step: ManifestStep) -> Self {
        Self::new_child_common(parent, step_index, HandleKind::Leaf { step })
    }

    /// Builds a child for a reference step: its own composite manifest,
    /// driven recursively by the step orchestrator.
    pub fn new_reference_child(parent: &WorkflowHandle, step_index: usize, manifest: Manifest) -> Self {
        Self::new_child_common(parent, step_index, HandleKind::Composite { manifest })
    }

    fn new_child_common(parent: &WorkflowHandle, step_index: usize, kind: HandleKind) -> Self {
        Self {
            deployment_id: parent.deployment_id.clone(),
            retry_token: parent.retry_token.clone(),
            step_index,
            level: parent.level + 1,
            kind,
            current_step: WorkflowStep::Undefined,
            last_reported_state: DeploymentState::Idle,
            cancellation_kind: CancellationKind::None,
            operation_in_progress: false,
            cancel_requested: Arc::clone(&parent.cancel_requested),
            reboot_required_immediate: false,
            reboot_required_deferred: false,
            restart_required_immediate: false,
            restart_required_deferred: false,
            selected_components: serde_json::Value::Array(vec![]),
            result: HandlerResult::default(),
            pending_replacement: None,
            force_update: parent.force_update,
            children: Vec::new(),
            sandbox: parent.sandbox.clone(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// A deployment is mid-flight once it has left `Idle`/`Failed` and
    /// started walking the pipeline (spec.md §4.1 step 4).
    pub fn is_mid_flight(&self) -> bool {
        !matches!(self.last_reported_state, DeploymentState::Idle | DeploymentState::Failed)
            && self.current_step != WorkflowStep::Undefined
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match &self.kind {
            HandleKind::Composite { manifest } => Some(manifest),
            HandleKind::Leaf { .. } => None,
        }
    }

    pub fn update_type(&self) -> &str {
        match &self.kind {
            HandleKind::Leaf { step } => &step.update_type,
            HandleKind::Composite { .. } => crate::steps_handler::STEPS_UPDATE_TYPE,
        }
    }

    /// Whether a handler has asked for a reboot or agent restart (spec.md
    /// §4.2 "reboot/restart arbiter").
    pub fn wants_reboot_or_restart(&self) -> bool {
        self.reboot_required_immediate
            || self.reboot_required_deferred
            || self.restart_required_immediate
            || self.restart_required_deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::UpdateId;
    use std::path::Path;

    fn sample_manifest() -> Manifest {
        Manifest {
            update_id: UpdateId {
                provider: "acme".into(),
                name: "cam".into(),
                version: "1.0.0".into(),
            },
            compatibilities: vec![],
            steps: vec![],
        }
    }

    #[test]
    fn root_handle_has_level_zero_and_computed_sandbox() {
        let base = Path::new("/base");
        let handle = WorkflowHandle::new_root(sample_manifest(), None, base);
        assert_eq!(handle.level, 0);
        assert!(handle.is_root());
        assert_eq!(handle.sandbox, Path::new("/base/acme.cam.1.0.0"));
    }

    #[test]
    fn child_handle_increments_level_and_shares_cancel_flag() {
        let base = Path::new("/base");
        let root = WorkflowHandle::new_root(sample_manifest(), None, base);
        let step = ManifestStep {
            update_type: "apt:1".into(),
            handler_properties: serde_json::Value::Null,
            files: vec![],
            detached_manifest: None,
        };
        let child = WorkflowHandle::new_inline_child(&root, 0, step);
        assert_eq!(child.level, 1);
        assert_eq!(child.sandbox, root.sandbox);

        root.request_cancel();
        assert!(child.is_cancel_requested());
    }

    #[test]
    fn is_mid_flight_requires_a_started_step() {
        let base = Path::new("/base");
        let mut handle = WorkflowHandle::new_root(sample_manifest(), None, base);
        assert!(!handle.is_mid_flight());
        handle.current_step = WorkflowStep::Download;
        handle.last_reported_state = DeploymentState::DownloadStarted;
        assert!(handle.is_mid_flight());
        handle.last_reported_state = DeploymentState::Failed;
        assert!(!handle.is_mid_flight());
    }
}
