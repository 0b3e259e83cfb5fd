/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The inbound update manifest and desired-state payload (spec.md §3 "Manifest
//! view", §6 "Inbound desired state").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::UpdateAction;

/// Identifies one update: `{provider, name, version}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateId {
    pub provider: String,
    pub name: String,
    pub version: String,
}

impl UpdateId {
    /// A stable string key used for deployment-id comparisons and sandbox
    /// directory naming.
    pub fn to_key(&self) -> String {
        format!("{}.{}.{}", self.provider, self.name, self.version)
    }
}

/// A single file referenced by a manifest step: name, size, hashes, and an
/// optional download-handler override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileEntity {
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
    #[serde(default)]
    pub download_handler: Option<String>,
}

/// One step of a manifest: either inline (handled locally by `update_type`)
/// or a reference to a detached child manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestStep {
    pub update_type: String,
    #[serde(default = "default_properties")]
    pub handler_properties: serde_json::Value,
    #[serde(default)]
    pub files: Vec<FileEntity>,
    #[serde(default)]
    pub detached_manifest: Option<FileEntity>,
}

fn default_properties() -> serde_json::Value {
    serde_json::Value::Null
}

impl ManifestStep {
    pub fn is_reference(&self) -> bool {
        self.detached_manifest.is_some()
    }
}

/// An update manifest: the parent or a child, composed of ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub update_id: UpdateId,
    #[serde(default)]
    pub compatibilities: Vec<serde_json::Value>,
    pub steps: Vec<ManifestStep>,
}

/// The raw desired-state payload pushed by the cloud (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesiredStatePayload {
    pub update_id: UpdateId,
    pub action: i32,
    #[serde(default)]
    pub retry_timestamp: Option<String>,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default)]
    pub manifest: Option<Manifest>,
}

impl DesiredStatePayload {
    pub fn action(&self) -> UpdateAction {
        UpdateAction::from_wire(self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_id_key_is_dot_joined() {
        let id = UpdateId {
            provider: "acme".into(),
            name: "camera-fw".into(),
            version: "2.3.0".into(),
        };
        assert_eq!(id.to_key(), "acme.camera-fw.2.3.0");
    }

    #[test]
    fn action_from_wire_maps_closed_set() {
        assert_eq!(UpdateAction::from_wire(0), UpdateAction::Undefined);
        assert_eq!(UpdateAction::from_wire(255), UpdateAction::Cancel);
        assert_eq!(UpdateAction::from_wire(1), UpdateAction::ProcessDeployment);
        assert_eq!(UpdateAction::from_wire(-1), UpdateAction::ProcessDeployment);
    }

    #[test]
    fn payload_parses_from_json_with_defaults() {
        let json = r#"{
            "update_id": {"provider": "acme", "name": "cam", "version": "1.0.0"},
            "action": 1
        }"#;
        let payload: DesiredStatePayload = serde_json::from_str(json).unwrap();
        assert!(payload.manifest.is_none());
        assert!(!payload.force_update);
        assert_eq!(payload.action(), UpdateAction::ProcessDeployment);
    }
}
