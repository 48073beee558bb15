// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dependencies.rs`

#[cfg(test)]
mod tests {
    use super::super::{find_executable, DependencyChecker};
    use crate::errors::ProviderError;
    use std::fs;
    use std::path::Path;

    fn write_executable(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_all_dependencies_present() {
        let dir = tempfile::tempdir().unwrap();
        write_executable(dir.path(), "kind");
        write_executable(dir.path(), "docker");

        let checker = DependencyChecker::with_search_path(dir.path());
        let resolved = checker.check(&["kind", "docker"]).await.unwrap();

        let names: Vec<&str> = resolved.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["docker", "kind"]);
        assert_eq!(resolved[1].1, dir.path().join("kind"));
    }

    #[tokio::test]
    async fn test_only_missing_dependency_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_executable(dir.path(), "kind");
        write_executable(dir.path(), "docker");

        let checker = DependencyChecker::with_search_path(dir.path());
        let err = checker
            .check(&["kind", "docker", "missing-tool-xyz"])
            .await
            .unwrap_err();

        match err {
            ProviderError::DependencyMissing { missing } => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].name, "missing-tool-xyz");
            }
            other => panic!("expected DependencyMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_missing_dependency_reported_sorted() {
        let dir = tempfile::tempdir().unwrap();

        let checker = DependencyChecker::with_search_path(dir.path());
        let dependencies = ["kind", "docker", "helm"];
        let err = checker.check(&dependencies).await.unwrap_err();

        let message = err.to_string();
        match err {
            ProviderError::DependencyMissing { missing } => {
                let names: Vec<&str> = missing.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["docker", "helm", "kind"]);
            }
            other => panic!("expected DependencyMissing, got {other:?}"),
        }
        assert!(message.contains("'docker'"));
        assert!(message.contains("'helm'"));
        assert!(message.contains("'kind'"));
    }

    #[tokio::test]
    async fn test_empty_dependency_list_succeeds() {
        let checker = DependencyChecker::with_search_path("");
        let resolved = checker.check::<&str>(&[]).await.unwrap();
        assert!(resolved.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_not_resolved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kind"), "not executable").unwrap();

        let result = find_executable("kind", Some(dir.path().as_os_str()));
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_path_is_checked_directly() {
        let dir = tempfile::tempdir().unwrap();
        write_executable(dir.path(), "kind");
        let full = dir.path().join("kind");

        let resolved = find_executable(full.to_str().unwrap(), Some("".as_ref())).unwrap();
        assert_eq!(resolved, full);

        let missing = dir.path().join("docker");
        assert!(find_executable(missing.to_str().unwrap(), None).is_err());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(find_executable("  ", None).is_err());
    }
}
