//! Integration test: the `unstable-lint` binary over a temporary project.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const BETA: &str = "package com.google.common.annotations;

public @interface Beta {}
";

const ANNOTATED: &str = "package com.google.common.foo;

import com.google.common.annotations.Beta;

@Beta
public class AnnotatedClass {
  public static void staticMethod() {}
}
";

const CACHE: &str = "package com.google.common.cache;

import com.google.common.annotations.Beta;

@Beta
public interface Cache<K, V> {}
";

const CACHE_CLIENT: &str = "package com.example;

import com.google.common.cache.Cache;

class Holder {
  Cache<String, String> cache;
}
";

const CLIENT: &str = "package com.example;

import com.google.common.foo.AnnotatedClass;

class Client {
  void run() {
    AnnotatedClass.staticMethod();
  }
}
";

/// A repository root; config lookup does not climb above it.
fn repo() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    std::fs::create_dir(tmp.path().join(".git")).expect("mkdir .git");
    tmp
}

fn write(root: &Path, files: &[(&str, &str)]) {
    for (path, text) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, text).expect("write");
    }
}

fn project() -> TempDir {
    let tmp = repo();
    write(
        tmp.path(),
        &[
            ("src/com/google/common/annotations/Beta.java", BETA),
            ("src/com/google/common/foo/AnnotatedClass.java", ANNOTATED),
            ("src/com/example/Client.java", CLIENT),
        ],
    );
    tmp
}

fn unstable_lint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_unstable-lint"))
        .args(args)
        .current_dir(dir)
        .env("UNSTABLE_LINT_CONFIG_DIR", dir.join("no-global"))
        .output()
        .expect("binary runs")
}

#[test]
fn check_reports_and_exits_nonzero() {
    let tmp = project();
    let out = unstable_lint(tmp.path(), &["check", "--format", "compact", "src"]);

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");
    assert!(lines.iter().all(|l| l.contains("Client.java:7:") && l.contains("[UA001]")));
}

#[test]
fn json_output_is_machine_readable() {
    let tmp = project();
    let out = unstable_lint(tmp.path(), &["check", "--format", "json", "src"]);

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid json");
    assert_eq!(json["files_checked"], 3);
    assert_eq!(json["violations"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["violations"][0]["code"], "UA001");
}

#[test]
fn project_config_downgrades_severity() {
    let tmp = project();
    std::fs::write(
        tmp.path().join("unstable-lint.toml"),
        "[rules.beta-api]\nseverity = \"warning\"\n",
    )
    .expect("write config");

    let out = unstable_lint(tmp.path(), &["check", "."]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn config_in_an_ancestor_applies_to_subdirectories() {
    let tmp = project();
    std::fs::write(
        tmp.path().join("unstable-lint.toml"),
        "[rules.beta-api]\nseverity = \"warning\"\n",
    )
    .expect("write config");

    let out = unstable_lint(tmp.path(), &["check", "--format", "compact", "src"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
    assert!(stdout.lines().all(|l| l.contains(": warning [UA001]")), "{stdout}");
}

#[test]
fn strict_preset_drops_the_cache_exemption() {
    let tmp = project();
    write(
        tmp.path(),
        &[
            ("src/com/google/common/cache/Cache.java", CACHE),
            ("src/com/example/Holder.java", CACHE_CLIENT),
        ],
    );
    std::fs::write(tmp.path().join("unstable-lint.toml"), "preset = \"recommended\"\n")
        .expect("write config");

    let holder_lines = |args: &[&str]| {
        let out = unstable_lint(tmp.path(), args);
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .filter(|l| l.contains("Holder.java"))
            .count()
    };
    assert_eq!(holder_lines(&["check", "--format", "compact", "src"]), 0);
    assert_eq!(
        holder_lines(&["check", "--format", "compact", "--preset", "strict", "src"]),
        1
    );

    let out = unstable_lint(tmp.path(), &["--preset", "minimal", "check", "src"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown preset"));
}

#[test]
fn rules_filter_can_select_nothing() {
    let tmp = project();
    let out = unstable_lint(tmp.path(), &["check", "--rules", "internal-api", "src"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn invalid_restricted_table_fails() {
    let tmp = project();
    std::fs::write(
        tmp.path().join("unstable-lint.toml"),
        "[[restricted]]\nname = \"x\"\nbase_namespace = \"\"\nannotation = \"a.B\"\n",
    )
    .expect("write config");

    let out = unstable_lint(tmp.path(), &["check", "."]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("restricted"));
}

#[test]
fn init_then_list_rules() {
    let tmp = repo();

    let out = unstable_lint(tmp.path(), &["init"]);
    assert!(out.status.success());
    assert!(tmp.path().join("unstable-lint.toml").exists());

    let out = unstable_lint(tmp.path(), &["init"]);
    assert!(!out.status.success());

    let out = unstable_lint(tmp.path(), &["list-rules"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("UA001"));
    assert!(stdout.contains("beta-api"));
    assert!(stdout.contains("Config: "));

    let out = unstable_lint(tmp.path(), &["list-rules", "--preset", "strict"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let strict = stdout.lines().find(|l| l.trim_start().starts_with("strict"));
    assert!(strict.is_some_and(|l| l.ends_with("(active)")), "{stdout}");
}
