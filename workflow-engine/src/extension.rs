/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The extension collaborator interface (spec.md §4.5): the four pluggable
//! boundaries the engine depends on but does not implement.

use async_trait::async_trait;
use std::sync::Arc;

use crate::handle::WorkflowHandle;
use crate::handler::Handler;
use crate::manifest::{FileEntity, UpdateId};
use crate::types::{DeploymentState, HandlerResult};

/// Per-call knobs for [`ExtensionManager::download_file`].
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub force_full_download: bool,
}

/// A state/result report pushed to the cloud transport (spec.md §4.5, §6
/// "Outbound state report").
#[derive(Debug, Clone)]
pub struct StateReport<'a> {
    pub deployment_id: &'a str,
    pub state: DeploymentState,
    pub result: Option<HandlerResult>,
    pub installed_update_id: Option<UpdateId>,
}

/// The four pluggable boundaries outside the engine's core (spec.md §4.5).
///
/// The extension loader/registry behind `load_content_handler`, the
/// component enumerator behind `select_components`, the cloud transport
/// behind `report_state_and_result`, and the download pipeline behind
/// `download_file` are all out of scope for this crate (spec.md §1) — this
/// trait is their interface boundary only.
#[async_trait]
pub trait ExtensionManager: Send + Sync {
    /// Returns a handler instance by update-type name (e.g. `"apt:1"`,
    /// `"script:1"`). Lifetime is owned by the extension manager.
    async fn load_content_handler(&self, update_type: &str) -> anyhow::Result<Arc<dyn Handler>>;

    /// Downloads one file into the workflow's sandbox.
    async fn download_file(
        &self,
        file: &FileEntity,
        handle: &WorkflowHandle,
        options: &DownloadOptions,
    ) -> anyhow::Result<()>;

    /// Returns the subset of enumerated components matching `selector`, or
    /// an empty array if no enumerator is registered or none match.
    async fn select_components(&self, selector: &serde_json::Value) -> anyhow::Result<serde_json::Value>;

    /// Pushes a state/result payload to the cloud transport. `false` signals
    /// a transport-level failure; the engine treats that as cause to set the
    /// handle to `Failed` (spec.md §7 "Recovery policy").
    async fn report_state_and_result(&self, report: StateReport<'_>) -> bool;

    /// Periodic cooperative tick forwarded from [`crate::engine::WorkflowEngine::do_work`]
    /// (spec.md §4.1). Used by polling-style handlers (e.g. a download
    /// manager checking transfer progress); a no-op by default.
    async fn do_work(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
