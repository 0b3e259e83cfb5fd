/*
 * SPDX-FileCopyrightText: Copyright 2024 LG Electronics Inc.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-deployment sandbox directory management (spec.md §5 "Resource policy",
//! §6 "Sandbox layout").

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `<downloads_base>/<deployment_id>`.
pub fn path_for(downloads_base: &Path, deployment_id: &str) -> PathBuf {
    downloads_base.join(deployment_id)
}

/// Destroys one sandbox directory, tolerating it already being gone.
pub async fn destroy(path: &Path) -> anyhow::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "sandbox destroyed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Destroys every sibling of `keep_id` under `downloads_base`.
///
/// Called on every fresh `ProcessDeployment` (spec.md §4.1 "Action handling")
/// to clean up directories left behind by a prior run; the current
/// deployment's own sandbox is preserved since it may hold resumed payloads.
pub async fn cleanup_stale(downloads_base: &Path, keep_id: &str) -> anyhow::Result<()> {
    let mut entries = match tokio::fs::read_dir(downloads_base).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name() == std::ffi::OsStr::new(keep_id) {
            continue;
        }
        let path = entry.path();
        if let Err(e) = destroy(&path).await {
            warn!(path = %path.display(), error = %e, "failed to clean up stale sandbox");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn path_for_joins_base_and_id() {
        let base = Path::new("/var/lib/update-agent/downloads");
        assert_eq!(
            path_for(base, "acme.cam.1.0.0"),
            PathBuf::from("/var/lib/update-agent/downloads/acme.cam.1.0.0")
        );
    }

    #[tokio::test]
    async fn cleanup_stale_removes_siblings_but_keeps_current() {
        let base = tempdir().unwrap();
        let current = base.path().join("current-id");
        let stale_a = base.path().join("stale-a");
        let stale_b = base.path().join("stale-b");
        tokio::fs::create_dir_all(&current).await.unwrap();
        tokio::fs::create_dir_all(&stale_a).await.unwrap();
        tokio::fs::create_dir_all(&stale_b).await.unwrap();

        cleanup_stale(base.path(), "current-id").await.unwrap();

        assert!(current.exists());
        assert!(!stale_a.exists());
        assert!(!stale_b.exists());
    }

    #[tokio::test]
    async fn cleanup_stale_tolerates_missing_base_dir() {
        let base = tempdir().unwrap();
        let missing = base.path().join("does-not-exist");
        cleanup_stale(&missing, "current-id").await.unwrap();
    }

    #[tokio::test]
    async fn destroy_tolerates_already_absent_directory() {
        let base = tempdir().unwrap();
        let missing = base.path().join("gone");
        destroy(&missing).await.unwrap();
    }
}
