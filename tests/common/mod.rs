//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory with a mkrun.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mkrun.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test config with an empty subdirectory next to it
pub fn create_test_config_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mkrun.yml");
    let sub_dir = temp_dir.path().join("subdir");

    fs::write(&config_path, content).unwrap();
    fs::create_dir(&sub_dir).unwrap();

    (temp_dir, config_path, sub_dir)
}

/// Lines recorded in a log file, empty if it was never written
pub fn read_log(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// A lifecycle whose recipes only append to `run.log` and touch files
pub const LIFECYCLE: &str = r#"
name: demo
interpreter: [sh, -c]

settings:
  env-dir: envs
  tools:
    interpreter: bin/python

tasks:
  clean:
    usage: Remove build output
    run:
      - remove: ["${build_dir}", "${dist_dir}", "*.egg-info"]

dev:
  tasks:
    init-environment:
      output: "${env_dir}/${version}/bin/python"
      run:
        - echo init-environment >> run.log
        - mkdir -p "${env_dir}/${version}/bin"
        - touch "${env_dir}/${version}/bin/python"

    test:
      usage: Run the tests
      deps: init-environment
      run:
        - echo "test ${interpreter}" >> run.log
        - record() { for a in "$@"; do echo "arg $a" >> args.log; done; }; record

    dist:
      deps: test
      run:
        - echo dist >> run.log
        - mkdir -p "${dist_dir}"
        - touch "${dist_dir}/demo-1.0.tar.gz"

    install:
      deps: dist
      run: echo install >> run.log

user:
  tasks:
    test:
      run:
        message: set a version to run the tests

    dist:
      run: echo user-dist >> run.log
"#;
