/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The step orchestrator: the `"steps:1"` handler that composes child
//! handlers sequentially (spec.md §4.3).

use std::sync::Arc;

use anyhow::Context;
use async_recursion::async_recursion;
use async_trait::async_trait;

use crate::extension::{DownloadOptions, ExtensionManager};
use crate::handle::{HandleKind, WorkflowHandle};
use crate::handler::{ContractVersion, Handler, SUPPORTED_CONTRACT_VERSION};
use crate::manifest::Manifest;
use crate::types::{extended_code, HandlerResult, ResultCode};

/// The update-type name a composite [`WorkflowHandle`] is implicitly driven
/// by: the root, and every reference-step child, since both are "a sequence
/// of steps" (spec.md §4.3).
pub const STEPS_UPDATE_TYPE: &str = "steps:1";

/// Implements the six handler operations for any workflow composed of
/// ordered steps — the root deployment, and recursively, any reference
/// step's child manifest (max depth 2, invariant 5).
pub struct StepsOrchestrator {
    extension: Arc<dyn ExtensionManager>,
}

impl StepsOrchestrator {
    pub fn new(extension: Arc<dyn ExtensionManager>) -> Self {
        Self { extension }
    }

    /// Materialises children for a composite handle, one per manifest step.
    /// Rebuilt from scratch whenever the child count doesn't match the step
    /// count, protecting against partial persistence across restarts
    /// (spec.md §4.3 "Child workflow materialisation").
    async fn ensure_children(&self, handle: &mut WorkflowHandle) -> anyhow::Result<()> {
        let manifest = match &handle.kind {
            HandleKind::Composite { manifest } => manifest.clone(),
            HandleKind::Leaf { .. } => return Ok(()),
        };
        if handle.children.len() == manifest.steps.len() && !manifest.steps.is_empty() {
            return Ok(());
        }
        if manifest.steps.is_empty() {
            handle.children.clear();
            return Ok(());
        }

        handle.children.clear();
        for (index, step) in manifest.steps.iter().enumerate() {
            if step.is_reference() {
                let file = step
                    .detached_manifest
                    .clone()
                    .context("reference step declared without a detached manifest file entity")?;
                self.extension
                    .download_file(&file, handle, &DownloadOptions::default())
                    .await
                    .with_context(|| format!("downloading detached manifest {}", file.name))?;
                let path = handle.sandbox.join(&file.name);
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("reading detached manifest {}", path.display()))?;
                let child_manifest: Manifest = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parsing detached manifest {}", path.display()))?;

                let mut child = WorkflowHandle::new_reference_child(handle, index, child_manifest);
                if let Some(selector) = child
                    .manifest()
                    .and_then(|m| m.compatibilities.first())
                    .cloned()
                {
                    child.selected_components = match self.extension.select_components(&selector).await {
                        Ok(components) => components,
                        Err(_) => serde_json::Value::Array(vec![]),
                    };
                }
                handle.children.push(child);
            } else {
                handle
                    .children
                    .push(WorkflowHandle::new_inline_child(handle, index, step.clone()));
            }
        }
        Ok(())
    }

    async fn resolve_leaf(&self, update_type: &str) -> Result<Arc<dyn Handler>, HandlerResult> {
        let handler = self.extension.load_content_handler(update_type).await.map_err(|e| {
            HandlerResult::failure(
                extended_code::make(extended_code::BAND_STEPS, 10),
                format!("loading handler for {update_type}: {e:#}"),
            )
        })?;
        if handler.contract_version() != SUPPORTED_CONTRACT_VERSION {
            return Err(HandlerResult::failure(
                extended_code::CONTRACT_VERSION_UNSUPPORTED,
                format!("unsupported contract version for handler {update_type}"),
            ));
        }
        Ok(handler)
    }
}

fn is_empty_components(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Array(items) if items.is_empty()) || value.is_null()
}

/// One iteration per selected component, or a single no-component iteration
/// for a top-level deployment with no enumerator registered (spec.md §4.3
/// "Component iteration").
fn iterations(handle: &WorkflowHandle) -> Vec<Option<serde_json::Value>> {
    match &handle.selected_components {
        serde_json::Value::Array(items) if !items.is_empty() => items.iter().cloned().map(Some).collect(),
        _ => vec![None],
    }
}

fn merge_reboot_flags(handle: &mut WorkflowHandle, reboot_i: bool, reboot_d: bool, restart_i: bool, restart_d: bool) {
    handle.reboot_required_immediate |= reboot_i;
    handle.reboot_required_deferred |= reboot_d;
    handle.restart_required_immediate |= restart_i;
    handle.restart_required_deferred |= restart_d;
}

#[async_trait]
impl Handler for StepsOrchestrator {
    fn contract_version(&self) -> ContractVersion {
        SUPPORTED_CONTRACT_VERSION
    }

    async fn is_installed(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        self.is_installed_inner(handle).await
    }

    async fn download(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        self.download_inner(handle).await
    }

    /// No-op at the composite level; each leaf handler performs its own
    /// backup inside [`StepsOrchestrator::install`] (spec.md §4.3).
    async fn backup(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
        HandlerResult::success(ResultCode::InstallSuccess)
    }

    async fn install(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        self.install_inner(handle).await
    }

    /// No-op for a steps workflow: the per-leaf Apply already ran inside
    /// `install` (spec.md §4.3 "Apply").
    async fn apply(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
        HandlerResult::success(ResultCode::ApplySuccess)
    }

    /// No-op at the composite level (spec.md §4.3 "Backup / Restore").
    async fn restore(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
        HandlerResult::success(ResultCode::ApplySuccess)
    }

    async fn cancel(&self, handle: &WorkflowHandle) -> HandlerResult {
        handle.request_cancel();
        HandlerResult::success(ResultCode::CancelSuccess)
    }
}

impl StepsOrchestrator {
    #[async_recursion]
    async fn is_installed_inner(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        if handle.level > 0 && is_empty_components(&handle.selected_components) {
            return HandlerResult::success(ResultCode::IsInstalledInstalled);
        }
        if let Err(e) = self.ensure_children(handle).await {
            return HandlerResult::failure(extended_code::make(extended_code::BAND_STEPS, 11), e.to_string());
        }

        for index in 0..handle.children.len() {
            let is_leaf = matches!(handle.children[index].kind, HandleKind::Leaf { .. });
            if is_leaf {
                let update_type = handle.children[index].update_type().to_string();
                let handler = match self.resolve_leaf(&update_type).await {
                    Ok(h) => h,
                    Err(r) => return r,
                };
                for component in iterations(handle) {
                    if let Some(value) = &component {
                        handle.children[index].selected_components = serde_json::json!([value]);
                    }
                    let result = handler.is_installed(&mut handle.children[index]).await;
                    if matches!(result.result_code, ResultCode::IsInstalledNotInstalled) {
                        return result;
                    }
                }
            } else {
                let result = self.is_installed_inner(&mut handle.children[index]).await;
                if matches!(result.result_code, ResultCode::IsInstalledNotInstalled) {
                    return result;
                }
            }
        }

        handle.result = HandlerResult::success(ResultCode::ApplySuccess);
        HandlerResult::success(ResultCode::IsInstalledInstalled)
    }

    #[async_recursion]
    async fn download_inner(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        if handle.level > 0 && is_empty_components(&handle.selected_components) {
            return HandlerResult::success(ResultCode::DownloadSkipped);
        }
        if let Err(e) = self.ensure_children(handle).await {
            return HandlerResult::failure(extended_code::make(extended_code::BAND_STEPS, 12), e.to_string());
        }

        for index in 0..handle.children.len() {
            if handle.is_cancel_requested() {
                return HandlerResult::failure(extended_code::CANCELLED, "download cancelled");
            }
            let is_leaf = matches!(handle.children[index].kind, HandleKind::Leaf { .. });
            if is_leaf {
                let update_type = handle.children[index].update_type().to_string();
                let handler = match self.resolve_leaf(&update_type).await {
                    Ok(h) => h,
                    Err(r) => return r,
                };
                for component in iterations(handle) {
                    if let Some(value) = &component {
                        handle.children[index].selected_components = serde_json::json!([value]);
                    }
                    let installed = handler.is_installed(&mut handle.children[index]).await;
                    if matches!(installed.result_code, ResultCode::IsInstalledInstalled) {
                        handle.children[index].result = HandlerResult::success(ResultCode::DownloadSkipped);
                        continue;
                    }
                    let result = handler.download(&mut handle.children[index]).await;
                    if !result.is_success() {
                        return result;
                    }
                    handle.children[index].result = result;
                }
            } else {
                let result = self.download_inner(&mut handle.children[index]).await;
                if !result.is_success() {
                    return result;
                }
            }
        }

        HandlerResult::success(ResultCode::DownloadSuccess)
    }

    #[async_recursion]
    async fn install_inner(&self, handle: &mut WorkflowHandle) -> HandlerResult {
        if handle.level > 0 && is_empty_components(&handle.selected_components) {
            return HandlerResult::success(ResultCode::InstallSkippedNoMatchingComponents);
        }
        if let Err(e) = self.ensure_children(handle).await {
            return HandlerResult::failure(extended_code::make(extended_code::BAND_STEPS, 13), e.to_string());
        }

        for index in 0..handle.children.len() {
            if handle.is_cancel_requested() {
                return HandlerResult::failure(extended_code::CANCELLED, "install cancelled");
            }
            let is_leaf = matches!(handle.children[index].kind, HandleKind::Leaf { .. });
            if is_leaf {
                let update_type = handle.children[index].update_type().to_string();
                let handler = match self.resolve_leaf(&update_type).await {
                    Ok(h) => h,
                    Err(r) => return r,
                };

                for component in iterations(handle) {
                    if let Some(value) = &component {
                        handle.children[index].selected_components = serde_json::json!([value]);
                    }

                    let installed = handler.is_installed(&mut handle.children[index]).await;
                    if matches!(installed.result_code, ResultCode::IsInstalledInstalled) {
                        handle.children[index].result = HandlerResult::success(ResultCode::InstallSkippedAlreadyInstalled);
                        continue;
                    }

                    let backup = handler.backup(&mut handle.children[index]).await;
                    if !backup.is_success() {
                        return backup;
                    }

                    let install = handler.install(&mut handle.children[index]).await;
                    if handle.children[index].wants_reboot_or_restart() {
                        let (ri, rd, si, sd) = {
                            let child = &handle.children[index];
                            (
                                child.reboot_required_immediate,
                                child.reboot_required_deferred,
                                child.restart_required_immediate,
                                child.restart_required_deferred,
                            )
                        };
                        merge_reboot_flags(handle, ri, rd, si, sd);
                        return install;
                    }
                    if matches!(
                        install.result_code,
                        ResultCode::InstallSkippedAlreadyInstalled | ResultCode::InstallSkippedNoMatchingComponents
                    ) {
                        continue;
                    }
                    if !install.is_success() {
                        let _ = handler.restore(&mut handle.children[index]).await;
                        return install;
                    }

                    let apply = handler.apply(&mut handle.children[index]).await;
                    if !apply.is_success() {
                        let _ = handler.restore(&mut handle.children[index]).await;
                        return apply;
                    }
                    handle.children[index].result = apply;
                }
            } else {
                let result = self.install_inner(&mut handle.children[index]).await;
                if handle.children[index].wants_reboot_or_restart() {
                    let (ri, rd, si, sd) = {
                        let child = &handle.children[index];
                        (
                            child.reboot_required_immediate,
                            child.reboot_required_deferred,
                            child.restart_required_immediate,
                            child.restart_required_deferred,
                        )
                    };
                    merge_reboot_flags(handle, ri, rd, si, sd);
                    return result;
                }
                if !result.is_success() {
                    return result;
                }
            }
        }

        HandlerResult::success(ResultCode::InstallSuccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::StateReport;
    use crate::manifest::{FileEntity, ManifestStep, UpdateId};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex as StdMutex;

    struct FakeHandler {
        installed: bool,
        install_outcome: HandlerResult,
        calls: Arc<StdMutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Handler for FakeHandler {
        fn contract_version(&self) -> ContractVersion {
            SUPPORTED_CONTRACT_VERSION
        }
        async fn is_installed(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("is_installed");
            if self.installed {
                HandlerResult::success(ResultCode::IsInstalledInstalled)
            } else {
                HandlerResult::success(ResultCode::IsInstalledNotInstalled)
            }
        }
        async fn download(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("download");
            HandlerResult::success(ResultCode::DownloadSuccess)
        }
        async fn backup(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("backup");
            HandlerResult::success(ResultCode::InstallSuccess)
        }
        async fn install(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("install");
            self.install_outcome.clone()
        }
        async fn apply(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("apply");
            HandlerResult::success(ResultCode::ApplySuccess)
        }
        async fn restore(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            self.calls.lock().unwrap().push("restore");
            HandlerResult::success(ResultCode::ApplySuccess)
        }
        async fn cancel(&self, handle: &WorkflowHandle) -> HandlerResult {
            handle.request_cancel();
            HandlerResult::success(ResultCode::CancelSuccess)
        }
    }

    struct FakeExtension {
        handler: Arc<dyn Handler>,
    }

    #[async_trait]
    impl ExtensionManager for FakeExtension {
        async fn load_content_handler(&self, _update_type: &str) -> anyhow::Result<Arc<dyn Handler>> {
            Ok(Arc::clone(&self.handler))
        }
        async fn download_file(
            &self,
            _file: &FileEntity,
            _handle: &WorkflowHandle,
            _options: &DownloadOptions,
        ) -> anyhow::Result<()> {
            Ok(())
        }
        async fn select_components(&self, _selector: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
            Ok(serde_json::Value::Array(vec![]))
        }
        async fn report_state_and_result(&self, _report: StateReport<'_>) -> bool {
            true
        }
    }

    fn single_inline_step_manifest() -> Manifest {
        Manifest {
            update_id: UpdateId {
                provider: "acme".into(),
                name: "cam".into(),
                version: "1.0.0".into(),
            },
            compatibilities: vec![],
            steps: vec![ManifestStep {
                update_type: "apt:1".into(),
                handler_properties: serde_json::Value::Null,
                files: vec![FileEntity {
                    name: "payload.bin".into(),
                    size: 10,
                    hashes: HashMap::new(),
                    download_handler: None,
                }],
                detached_manifest: None,
            }],
        }
    }

    fn root_handle(manifest: Manifest) -> WorkflowHandle {
        WorkflowHandle::new_root(manifest, None, Path::new("/tmp/update-agent-tests"))
    }

    #[tokio::test]
    async fn install_happy_path_calls_backup_install_apply_once() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let mut handle = root_handle(single_inline_step_manifest());
        let result = orchestrator.install(&mut handle).await;

        assert!(result.is_success());
        assert_eq!(*calls.lock().unwrap(), vec!["is_installed", "backup", "install", "apply"]);
    }

    #[tokio::test]
    async fn install_skips_already_installed_leaf() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: true,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let mut handle = root_handle(single_inline_step_manifest());
        let result = orchestrator.install(&mut handle).await;

        assert!(result.is_success());
        assert_eq!(*calls.lock().unwrap(), vec!["is_installed"]);
    }

    #[tokio::test]
    async fn install_failure_triggers_restore_and_returns_failure() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::failure(0, "disk full"),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let mut handle = root_handle(single_inline_step_manifest());
        let result = orchestrator.install(&mut handle).await;

        assert!(!result.is_success());
        assert_eq!(*calls.lock().unwrap(), vec!["is_installed", "backup", "install", "restore"]);
    }

    #[tokio::test]
    async fn apply_and_backup_are_no_ops_at_composite_level() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let mut handle = root_handle(single_inline_step_manifest());
        assert!(orchestrator.apply(&mut handle).await.is_success());
        assert!(orchestrator.backup(&mut handle).await.is_success());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn is_installed_reports_installed_for_optional_reference_with_no_components() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let root = root_handle(single_inline_step_manifest());
        let mut reference_child = WorkflowHandle::new_reference_child(
            &root,
            0,
            Manifest {
                update_id: root.manifest().unwrap().update_id.clone(),
                compatibilities: vec![],
                steps: vec![],
            },
        );
        reference_child.selected_components = serde_json::Value::Array(vec![]);

        let result = orchestrator.is_installed(&mut reference_child).await;
        assert_eq!(result.result_code, ResultCode::IsInstalledInstalled);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_skips_optional_reference_with_no_matching_components() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let root = root_handle(single_inline_step_manifest());
        let mut reference_child = WorkflowHandle::new_reference_child(
            &root,
            0,
            Manifest {
                update_id: root.manifest().unwrap().update_id.clone(),
                compatibilities: vec![],
                steps: vec![ManifestStep {
                    update_type: "apt:1".into(),
                    handler_properties: serde_json::Value::Null,
                    files: vec![],
                    detached_manifest: None,
                }],
            },
        );
        reference_child.selected_components = serde_json::Value::Array(vec![]);

        let result = orchestrator.download(&mut reference_child).await;
        assert_eq!(result.result_code, ResultCode::DownloadSkipped);
        assert!(calls.lock().unwrap().is_empty(), "the leaf handler must not run for a zero-match reference step");
    }

    #[tokio::test]
    async fn install_skips_optional_reference_with_no_matching_components() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls: Arc::clone(&calls),
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let root = root_handle(single_inline_step_manifest());
        let mut reference_child = WorkflowHandle::new_reference_child(
            &root,
            0,
            Manifest {
                update_id: root.manifest().unwrap().update_id.clone(),
                compatibilities: vec![],
                steps: vec![ManifestStep {
                    update_type: "apt:1".into(),
                    handler_properties: serde_json::Value::Null,
                    files: vec![],
                    detached_manifest: None,
                }],
            },
        );
        reference_child.selected_components = serde_json::Value::Array(vec![]);

        let result = orchestrator.install(&mut reference_child).await;
        assert_eq!(result.result_code, ResultCode::InstallSkippedNoMatchingComponents);
        assert!(calls.lock().unwrap().is_empty(), "the leaf handler must not run for a zero-match reference step");
    }

    #[tokio::test]
    async fn cancel_sets_shared_flag_and_is_visible_from_root() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(FakeHandler {
            installed: false,
            install_outcome: HandlerResult::success(ResultCode::InstallSuccess),
            calls,
        });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let handle = root_handle(single_inline_step_manifest());
        let result = orchestrator.cancel(&handle).await;
        assert_eq!(result.result_code, ResultCode::CancelSuccess);
        assert!(handle.is_cancel_requested());
    }

    struct ComponentTrackingHandler {
        seen: Arc<StdMutex<Vec<serde_json::Value>>>,
    }

    #[async_trait]
    impl Handler for ComponentTrackingHandler {
        fn contract_version(&self) -> ContractVersion {
            SUPPORTED_CONTRACT_VERSION
        }
        async fn is_installed(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            HandlerResult::success(ResultCode::IsInstalledNotInstalled)
        }
        async fn download(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            HandlerResult::success(ResultCode::DownloadSuccess)
        }
        async fn backup(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            HandlerResult::success(ResultCode::InstallSuccess)
        }
        async fn install(&self, handle: &mut WorkflowHandle) -> HandlerResult {
            self.seen.lock().unwrap().push(handle.selected_components.clone());
            HandlerResult::success(ResultCode::InstallSuccess)
        }
        async fn apply(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            HandlerResult::success(ResultCode::ApplySuccess)
        }
        async fn restore(&self, _handle: &mut WorkflowHandle) -> HandlerResult {
            HandlerResult::success(ResultCode::ApplySuccess)
        }
        async fn cancel(&self, handle: &WorkflowHandle) -> HandlerResult {
            handle.request_cancel();
            HandlerResult::success(ResultCode::CancelSuccess)
        }
    }

    #[tokio::test]
    async fn reference_step_with_two_matching_components_installs_each_once() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(ComponentTrackingHandler { seen: Arc::clone(&seen) });
        let extension: Arc<dyn ExtensionManager> = Arc::new(FakeExtension { handler });
        let orchestrator = StepsOrchestrator::new(extension);

        let root = root_handle(single_inline_step_manifest());
        let mut reference_child = WorkflowHandle::new_reference_child(
            &root,
            0,
            Manifest {
                update_id: root.manifest().unwrap().update_id.clone(),
                compatibilities: vec![],
                steps: vec![ManifestStep {
                    update_type: "apt:1".into(),
                    handler_properties: serde_json::Value::Null,
                    files: vec![],
                    detached_manifest: None,
                }],
            },
        );
        reference_child.selected_components = serde_json::json!(["c1", "c2"]);

        let result = orchestrator.install(&mut reference_child).await;

        assert!(result.is_success());
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![serde_json::json!(["c1"]), serde_json::json!(["c2"])]);
    }
}
