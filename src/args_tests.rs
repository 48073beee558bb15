// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `args.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        build_cluster_config, build_cluster_config_from_stack, build_volume_set_config,
        extract_cluster_name, normalize, PropertyMap, VolumeSetConfig,
    };
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn props(value: serde_json::Value) -> PropertyMap {
        value
            .as_object()
            .cloned()
            .expect("test properties must be an object")
    }

    #[test]
    fn test_defaults_for_empty_properties() {
        let config = build_cluster_config(&PropertyMap::new()).unwrap();
        let cwd = normalize(&std::env::current_dir().unwrap());

        assert_eq!(config.cluster_name, "pulumi");
        assert_eq!(config.working_directory, cwd);
        assert_eq!(config.config_file_path, cwd.join("kind/config.yaml"));
        assert!(!config.purge_on_delete);
    }

    #[test]
    fn test_supplied_values_are_used() {
        let config = build_cluster_config(&props(json!({
            "clusterName": "dev",
            "configFile": "clusters/dev.yaml",
            "workingDir": "/srv/kind",
            "purge": true,
        })))
        .unwrap();

        assert_eq!(config.cluster_name, "dev");
        assert_eq!(config.working_directory, PathBuf::from("/srv/kind"));
        assert_eq!(
            config.config_file_path,
            PathBuf::from("/srv/kind/clusters/dev.yaml")
        );
        assert!(config.purge_on_delete);
    }

    #[test]
    fn test_absolute_config_file_is_kept() {
        let config = build_cluster_config(&props(json!({
            "configFile": "/etc/kind/cluster.yaml",
            "workingDir": "/srv/kind",
        })))
        .unwrap();

        assert_eq!(
            config.config_file_path,
            PathBuf::from("/etc/kind/cluster.yaml")
        );
    }

    #[test]
    fn test_legacy_working_dir_key() {
        let config = build_cluster_config(&props(json!({
            "kindConfigDir": "/opt/kind",
        })))
        .unwrap();

        assert_eq!(config.working_directory, PathBuf::from("/opt/kind"));
        assert_eq!(
            config.config_file_path,
            PathBuf::from("/opt/kind/kind/config.yaml")
        );
    }

    #[test]
    fn test_relative_working_dir_is_made_absolute() {
        let config = build_cluster_config(&props(json!({
            "workingDir": "./infra/../deploy",
        })))
        .unwrap();

        let expected = normalize(&std::env::current_dir().unwrap()).join("deploy");
        assert_eq!(config.working_directory, expected);
        assert!(config.working_directory.is_absolute());
    }

    #[test]
    fn test_null_values_fall_back_to_defaults() {
        let config = build_cluster_config(&props(json!({
            "clusterName": null,
            "purge": null,
        })))
        .unwrap();

        assert_eq!(config.cluster_name, "pulumi");
        assert!(!config.purge_on_delete);
    }

    #[test]
    fn test_type_mismatch_is_a_field_error() {
        let err = build_cluster_config(&props(json!({
            "clusterName": 42,
            "configFile": ["a.yaml"],
            "purge": "yes",
        })))
        .unwrap_err();

        assert_eq!(err.properties(), vec!["clusterName", "configFile", "purge"]);
        let reasons: Vec<&str> = err.errors.iter().map(|e| e.reason.as_str()).collect();
        assert!(reasons[0].contains("expected a string, got a number"));
        assert!(reasons[2].contains("expected a boolean"));
    }

    #[test]
    fn test_working_dir_type_mismatch_names_the_supplied_key() {
        let err = build_cluster_config(&props(json!({ "kindConfigDir": false }))).unwrap_err();
        assert_eq!(err.properties(), vec!["kindConfigDir"]);
    }

    #[test]
    fn test_empty_strings_are_preserved_for_validation() {
        let config = build_cluster_config(&props(json!({
            "clusterName": "",
            "configFile": "",
            "workingDir": "",
        })))
        .unwrap();

        assert_eq!(config.cluster_name, "");
        assert_eq!(config.config_file_path, PathBuf::new());
        assert_eq!(config.working_directory, PathBuf::new());
    }

    #[test]
    fn test_stack_defaults() {
        let config = build_cluster_config_from_stack(&PropertyMap::new()).unwrap();
        let cwd = normalize(&std::env::current_dir().unwrap());

        assert_eq!(config.cluster_name, "cluster");
        assert_eq!(config.working_directory, cwd);
        assert_eq!(config.config_file_path, cwd.join("kind.yaml"));
    }

    #[test]
    fn test_stack_values_use_stack_keys() {
        let config = build_cluster_config_from_stack(&props(json!({
            "kindClusterName": "ci",
            "kindConfigFile": "ci.yaml",
            "workingDir": "/builds",
            "purge": true,
            // Resource keys are not consulted on this path.
            "clusterName": "ignored",
        })))
        .unwrap();

        assert_eq!(config.cluster_name, "ci");
        assert_eq!(config.config_file_path, PathBuf::from("/builds/ci.yaml"));
        assert!(config.purge_on_delete);
    }

    #[test]
    fn test_extract_cluster_name() {
        assert_eq!(
            extract_cluster_name(&props(json!({ "clusterName": "dev" }))).unwrap(),
            Some("dev".to_string())
        );
        assert_eq!(extract_cluster_name(&PropertyMap::new()).unwrap(), None);
        assert!(extract_cluster_name(&props(json!({ "clusterName": 7 }))).is_err());
    }

    #[test]
    fn test_volume_set_for_cluster() {
        let set = VolumeSetConfig::for_cluster("dev");
        assert_eq!(set.cluster_name, "dev");
        assert_eq!(
            set.volume_names,
            vec!["dev-worker1-containerd", "dev-control1-containerd"]
        );
        assert_eq!(build_volume_set_config("dev"), set);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }
}
