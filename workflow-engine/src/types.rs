/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Closed enumerations and result records for the deployment state machine
//! (spec.md §3 "Deployment state" and §7 "Error handling design").

use serde::{Deserialize, Serialize};

/// One of the closed set of states a workflow reports to the cloud.
///
/// There is no explicit `ApplySucceeded` — a successful Apply returns to
/// [`DeploymentState::Idle`] (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentState {
    Idle,
    DeploymentInProgress,
    DownloadStarted,
    DownloadSucceeded,
    BackupStarted,
    BackupSucceeded,
    InstallStarted,
    InstallSucceeded,
    ApplyStarted,
    RestoreStarted,
    Failed,
}

/// The closed set of workflow steps a [`crate::handle::WorkflowHandle`] can be at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    Undefined,
    ProcessDeployment,
    Download,
    Backup,
    Install,
    Apply,
    Restore,
}

/// Why the current deployment's in-flight operation is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancellationKind {
    None,
    /// An explicit cloud cancel action.
    Normal,
    /// A new deployment supersedes the current one.
    Replacement,
    /// Same deployment id, new retry token.
    Retry,
    /// The enumerated component set changed mid-flight.
    ComponentChanged,
}

/// The action carried on an inbound desired-state payload (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateAction {
    Undefined,
    ProcessDeployment,
    Cancel,
}

impl UpdateAction {
    /// Maps the wire-level action code (`0`, `255`, anything else) to the enum.
    pub fn from_wire(code: i32) -> Self {
        match code {
            0 => UpdateAction::Undefined,
            255 => UpdateAction::Cancel,
            _ => UpdateAction::ProcessDeployment,
        }
    }
}

/// The result-code families of spec.md §7.
///
/// `DownloadInProgress` is part of the closed enumeration for completeness
/// (and so a handler can report provisional progress) but the engine's own
/// completion routing never receives it: per `SPEC_FULL.md`'s ambient-logging
/// section, every `Handler` operation is `async` and is always awaited to a
/// terminal outcome rather than returning a synchronous in-progress marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    GenericFailure,

    DownloadSuccess,
    DownloadInProgress,
    DownloadSkipped,
    DownloadHandlerSkip,
    DownloadRequireFullDownload,

    InstallSuccess,
    InstallSkippedAlreadyInstalled,
    InstallSkippedNoMatchingComponents,
    InstallRebootRequiredImmediate,
    InstallRebootRequiredDeferred,
    InstallRestartRequiredImmediate,
    InstallRestartRequiredDeferred,

    ApplySuccess,
    ApplyRebootRequired,
    ApplyRestartRequired,

    CancelSuccess,
    CancelUnableToCancel,
    /// Reporting-only code: substituted by the engine when a `Normal`
    /// cancellation completes, regardless of the operation's own failure
    /// code (spec.md §4.1 "Failure with cancel_requested" / `Normal` case).
    Cancelled,

    IsInstalledInstalled,
    IsInstalledNotInstalled,
}

impl ResultCode {
    /// The numeric code in the band the family belongs to (spec.md §7).
    pub fn code(self) -> u32 {
        match self {
            ResultCode::GenericFailure => 0,
            ResultCode::DownloadSuccess => 500,
            ResultCode::DownloadInProgress => 501,
            ResultCode::DownloadSkipped => 502,
            ResultCode::DownloadHandlerSkip => 503,
            ResultCode::DownloadRequireFullDownload => 504,
            ResultCode::InstallSuccess => 600,
            ResultCode::InstallSkippedAlreadyInstalled => 601,
            ResultCode::InstallSkippedNoMatchingComponents => 602,
            ResultCode::InstallRebootRequiredImmediate => 603,
            ResultCode::InstallRebootRequiredDeferred => 604,
            ResultCode::InstallRestartRequiredImmediate => 605,
            ResultCode::InstallRestartRequiredDeferred => 606,
            ResultCode::ApplySuccess => 700,
            ResultCode::ApplyRebootRequired => 701,
            ResultCode::ApplyRestartRequired => 702,
            ResultCode::CancelSuccess => 800,
            ResultCode::CancelUnableToCancel => 801,
            ResultCode::Cancelled => 802,
            ResultCode::IsInstalledInstalled => 900,
            ResultCode::IsInstalledNotInstalled => 901,
        }
    }

    /// Whether this code represents a terminal success for dispatch routing.
    ///
    /// `IsInstalledNotInstalled` and `CancelUnableToCancel` are legitimate,
    /// non-error outcomes of their respective operations but are not
    /// "success" in the sense the action dispatch table cares about (they
    /// never flow through [`crate::dispatch::row_for`]'s success arm).
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ResultCode::DownloadSuccess
                | ResultCode::DownloadSkipped
                | ResultCode::DownloadHandlerSkip
                | ResultCode::InstallSuccess
                | ResultCode::InstallSkippedAlreadyInstalled
                | ResultCode::InstallSkippedNoMatchingComponents
                | ResultCode::InstallRebootRequiredImmediate
                | ResultCode::InstallRebootRequiredDeferred
                | ResultCode::InstallRestartRequiredImmediate
                | ResultCode::InstallRestartRequiredDeferred
                | ResultCode::ApplySuccess
                | ResultCode::ApplyRebootRequired
                | ResultCode::ApplyRestartRequired
                | ResultCode::CancelSuccess
                | ResultCode::IsInstalledInstalled
        )
    }
}

/// A 32-bit error space banded per subsystem (spec.md §7).
pub mod extended_code {
    /// Band prefix occupies the top byte; the low 24 bits are subsystem-local.
    const LOCAL_MASK: u32 = 0x00FF_FFFF;

    pub const BAND_ENGINE: u32 = 0x01 << 24;
    pub const BAND_STEPS: u32 = 0x02 << 24;
    pub const BAND_SCRIPT: u32 = 0x03 << 24;
    pub const BAND_DOWNLOAD: u32 = 0x04 << 24;

    /// Combines a band prefix with a subsystem-local code.
    pub const fn make(band: u32, local: u32) -> u32 {
        band | (local & LOCAL_MASK)
    }

    /// Engine-band code reported when a handler's contract version is not recognised.
    pub const CONTRACT_VERSION_UNSUPPORTED: u32 = make(BAND_ENGINE, 1);
    /// Engine-band code substituted into a handler's failure when cooperative
    /// cancellation was requested.
    pub const CANCELLED: u32 = make(BAND_ENGINE, 2);
    /// Steps-band code reported when a reference step's detached manifest
    /// could not be parsed.
    pub const STEPS_DETACHED_MANIFEST_INVALID: u32 = make(BAND_STEPS, 1);
}

/// The full result of a handler operation (spec.md §4.4 "Output").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResult {
    pub result_code: ResultCode,
    pub extended_result_code: u32,
    pub result_details: String,
}

impl HandlerResult {
    pub fn success(result_code: ResultCode) -> Self {
        Self {
            result_code,
            extended_result_code: 0,
            result_details: String::new(),
        }
    }

    pub fn failure(extended_result_code: u32, result_details: impl Into<String>) -> Self {
        Self {
            result_code: ResultCode::GenericFailure,
            extended_result_code,
            result_details: result_details.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_code.is_success()
    }
}

impl Default for HandlerResult {
    fn default() -> Self {
        Self {
            result_code: ResultCode::GenericFailure,
            extended_result_code: 0,
            result_details: String::new(),
        }
    }
}
