/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The action dispatch table (spec.md §4.2).
//!
//! The table only carries the *data* half of the original function-pointer
//! table — which state/step follows success or failure. The *operation*
//! half (which handler method to call) is a plain match in
//! [`crate::engine`], since every row ultimately calls one of the seven
//! [`crate::handler::Handler`] methods on the same handle; there is no
//! benefit to indirecting through stored closures for six rows (see
//! `SPEC_FULL.md`, "tagged data + trait").

use crate::types::{DeploymentState, WorkflowStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRow {
    pub step: WorkflowStep,
    pub next_on_success: (DeploymentState, WorkflowStep),
    pub next_on_failure: (DeploymentState, WorkflowStep),
}

pub const DISPATCH_TABLE: &[DispatchRow] = &[
    DispatchRow {
        step: WorkflowStep::ProcessDeployment,
        next_on_success: (DeploymentState::DeploymentInProgress, WorkflowStep::Download),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Undefined),
    },
    DispatchRow {
        step: WorkflowStep::Download,
        next_on_success: (DeploymentState::DownloadSucceeded, WorkflowStep::Backup),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Undefined),
    },
    DispatchRow {
        step: WorkflowStep::Backup,
        next_on_success: (DeploymentState::BackupSucceeded, WorkflowStep::Install),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Undefined),
    },
    DispatchRow {
        step: WorkflowStep::Install,
        next_on_success: (DeploymentState::InstallSucceeded, WorkflowStep::Apply),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Restore),
    },
    DispatchRow {
        step: WorkflowStep::Apply,
        next_on_success: (DeploymentState::Idle, WorkflowStep::Undefined),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Restore),
    },
    DispatchRow {
        step: WorkflowStep::Restore,
        next_on_success: (DeploymentState::Idle, WorkflowStep::Undefined),
        next_on_failure: (DeploymentState::Failed, WorkflowStep::Undefined),
    },
];

/// The "state entered on start" for each step — the state reported the
/// moment the operation begins (`DownloadStarted`, `InstallStarted`, ...).
pub fn started_state(step: WorkflowStep) -> Option<DeploymentState> {
    match step {
        WorkflowStep::Download => Some(DeploymentState::DownloadStarted),
        WorkflowStep::Backup => Some(DeploymentState::BackupStarted),
        WorkflowStep::Install => Some(DeploymentState::InstallStarted),
        WorkflowStep::Apply => Some(DeploymentState::ApplyStarted),
        WorkflowStep::Restore => Some(DeploymentState::RestoreStarted),
        WorkflowStep::ProcessDeployment | WorkflowStep::Undefined => None,
    }
}

pub fn row_for(step: WorkflowStep) -> Option<&'static DispatchRow> {
    DISPATCH_TABLE.iter().find(|row| row.step == step)
}

/// Whether the completion arbiter for this step consults the handle's
/// reboot/restart flags (spec.md §4.2: Install/Apply/Restore only).
pub fn has_reboot_restart_arbiter(step: WorkflowStep) -> bool {
    matches!(step, WorkflowStep::Install | WorkflowStep::Apply | WorkflowStep::Restore)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_but_undefined_has_a_row() {
        for step in [
            WorkflowStep::ProcessDeployment,
            WorkflowStep::Download,
            WorkflowStep::Backup,
            WorkflowStep::Install,
            WorkflowStep::Apply,
            WorkflowStep::Restore,
        ] {
            assert!(row_for(step).is_some(), "missing row for {step:?}");
        }
        assert!(row_for(WorkflowStep::Undefined).is_none());
    }

    #[test]
    fn install_failure_routes_to_restore() {
        let row = row_for(WorkflowStep::Install).unwrap();
        assert_eq!(row.next_on_failure.1, WorkflowStep::Restore);
    }

    #[test]
    fn apply_success_ends_the_pipeline_at_idle() {
        let row = row_for(WorkflowStep::Apply).unwrap();
        assert_eq!(row.next_on_success, (DeploymentState::Idle, WorkflowStep::Undefined));
    }
}
