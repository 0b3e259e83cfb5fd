/*
* SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
* SPDX-License-Identifier: Apache-2.0
*/
use serde::Deserialize;
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Process-wide configuration surface for the workflow engine (spec.md §6).
///
/// Loaded once at startup and treated as immutable for the lifetime of the
/// process, mirroring how `statemanager`/`filtergateway` read their own
/// `/etc/piccolo/settings.yaml` once via `config::Config` and cache the
/// result behind a `OnceLock`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base directory under which per-deployment sandbox folders are created.
    pub downloads_base: String,
    /// Directory the extension manager scans for handler plugins.
    pub handler_extensions_dir: String,
    /// Shell command invoked to request a device reboot.
    pub reboot_command: String,
    /// Shell command invoked to request an agent restart.
    pub restart_command: String,
}

fn default_settings() -> Settings {
    Settings {
        downloads_base: String::from("/var/lib/update-agent/downloads"),
        handler_extensions_dir: String::from("/etc/update-agent/handlers"),
        reboot_command: String::from("/sbin/reboot"),
        restart_command: String::from("systemctl restart update-agent"),
    }
}

fn load_settings() -> Settings {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("/etc/update-agent/settings.yaml").required(false))
        .build();

    match settings {
        Ok(result) => result
            .try_deserialize::<Settings>()
            .unwrap_or_else(|_| default_settings()),
        Err(_) => default_settings(),
    }
}

/// Returns the process-wide settings, loading them on first access.
pub fn get_settings() -> &'static Settings {
    SETTINGS.get_or_init(load_settings)
}
