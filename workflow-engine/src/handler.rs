/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The abstract handler contract consumed by the engine and the step
//! orchestrator (spec.md §4.4).

use async_trait::async_trait;

use crate::handle::WorkflowHandle;
use crate::types::HandlerResult;

/// A handler's declared contract version. The engine refuses to dispatch to
/// a handler whose version it does not recognise (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractVersion(pub u32);

/// The only contract version this engine knows how to drive.
pub const SUPPORTED_CONTRACT_VERSION: ContractVersion = ContractVersion(1);

/// A capability provider keyed by update-type name (spec.md §4.4, glossary).
///
/// Every operation may read and write the given [`WorkflowHandle`]: its
/// sandbox path, selected components, and per-step handler properties are
/// inputs; reboot/restart-required flags and `result_details` are the
/// permitted side effects. Operations are `async` and are always awaited to
/// a terminal [`HandlerResult`] — there is no synchronous/asynchronous
/// completion-callback duality (see `SPEC_FULL.md`, "uniform event-delivery
/// model").
///
/// A conformant handler polls [`WorkflowHandle::is_cancel_requested`] at
/// progress-safe points and returns a cancelled result as soon as practical;
/// there is no hard deadline and the engine never aborts the future.
#[async_trait]
pub trait Handler: Send + Sync {
    fn contract_version(&self) -> ContractVersion;

    async fn is_installed(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn download(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn backup(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn install(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn apply(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn restore(&self, handle: &mut WorkflowHandle) -> HandlerResult;
    async fn cancel(&self, handle: &WorkflowHandle) -> HandlerResult;
}
