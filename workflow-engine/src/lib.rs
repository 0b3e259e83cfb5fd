/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Deployment workflow engine and step orchestrator for the on-device
//! update agent: ingress classification, the coarse-grained deployment
//! state machine, and the `"steps:1"` step orchestrator that drives
//! per-component handlers (spec.md §2–§4).

pub mod dispatch;
pub mod engine;
pub mod extension;
pub mod handle;
pub mod handler;
pub mod manifest;
pub mod retry;
pub mod sandbox;
pub mod steps_handler;
pub mod types;

pub use engine::{ShellSystemActuator, SystemActuator, WorkflowEngine};
pub use extension::{DownloadOptions, ExtensionManager, StateReport};
pub use handle::{HandleKind, WorkflowHandle};
pub use handler::{ContractVersion, Handler, SUPPORTED_CONTRACT_VERSION};
pub use manifest::{DesiredStatePayload, FileEntity, Manifest, ManifestStep, UpdateId};
pub use types::{CancellationKind, DeploymentState, HandlerResult, ResultCode, UpdateAction, WorkflowStep};
