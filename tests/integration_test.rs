//! Integration tests for the stackcheck CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const FAILING_GROUPS: &str = r#"
[[groups]]
name = "api-lint"
role = "api"
run = "echo 'style error in User.php' && exit 1"

[[groups]]
name = "api-test"
role = "api"
run = "exit 0"

[[groups]]
name = "frontend-lint"
role = "frontend"
run = "exit 0"
"#;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, "{}").expect("write");
}

/// Creates a project with an `api/` and a `webapp/` directory.
fn create_test_project() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    touch(temp.path(), "api/artisan");
    touch(temp.path(), "api/composer.json");
    touch(temp.path(), "webapp/package.json");
    temp
}

fn stackcheck(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stackcheck").expect("binary");
    cmd.current_dir(dir)
        .env_remove("CLAUDE_PROJECT_DIR")
        .env_remove("STACKCHECK_SKIP")
        .env_remove("RUST_LOG");
    cmd
}

fn payload(tool: &str, file: &Path) -> String {
    serde_json::json!({
        "hook_event_name": "PostToolUse",
        "tool_name": tool,
        "tool_input": { "file_path": file }
    })
    .to_string()
}

#[test]
fn test_help() {
    let temp = TempDir::new().expect("create temp dir");
    stackcheck(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Edit-time checks"));
}

#[test]
fn test_version() {
    let temp = TempDir::new().expect("create temp dir");
    stackcheck(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_detect_shows_roles() {
    let temp = create_test_project();

    stackcheck(temp.path())
        .arg("detect")
        .assert()
        .success()
        .stderr(predicate::str::contains("API: api"))
        .stderr(predicate::str::contains("Frontend: webapp"));
}

#[test]
fn test_install_writes_all_artifacts() {
    let temp = create_test_project();

    stackcheck(temp.path()).arg("install").assert().success();

    for rel in [
        ".claude/settings.json",
        ".claude/hooks/pre-write.sh",
        ".claude/hooks/post-edit.sh",
        ".claude/commands/check.md",
        ".claude/commands/api-test.md",
        ".claude/commands/frontend-lint.md",
        "CLAUDE.md",
        "stackcheck.toml",
    ] {
        assert!(temp.path().join(rel).exists(), "{rel} should exist");
    }

    let settings = std::fs::read_to_string(temp.path().join(".claude/settings.json")).expect("read");
    assert!(settings.contains("PreToolUse"));
    assert!(settings.contains("post-edit.sh post-write"));
}

#[test]
fn test_install_frontend_only_skips_api_shortcut() {
    let temp = TempDir::new().expect("create temp dir");
    touch(temp.path(), "client/package.json");

    stackcheck(temp.path()).args(["install", "--no-docs"]).assert().success();

    assert!(temp.path().join(".claude/commands/frontend-lint.md").exists());
    assert!(!temp.path().join(".claude/commands/api-test.md").exists());
    assert!(!temp.path().join("CLAUDE.md").exists());
}

#[test]
fn test_install_fails_without_roles() {
    let temp = TempDir::new().expect("create temp dir");

    stackcheck(temp.path())
        .arg("install")
        .assert()
        .failure()
        .code(78)
        .stderr(predicate::str::contains("API candidates tried"));

    assert_eq!(std::fs::read_dir(temp.path()).expect("read dir").count(), 0);
}

#[test]
fn test_install_missing_explicit_dir() {
    let temp = create_test_project();

    stackcheck(temp.path())
        .args(["install", "laravel"])
        .assert()
        .failure()
        .code(66);
}

#[test]
fn test_install_explicit_dir_without_markers() {
    let temp = create_test_project();
    std::fs::create_dir_all(temp.path().join("laravel")).expect("mkdir");

    stackcheck(temp.path())
        .args(["install", "laravel"])
        .assert()
        .failure()
        .code(66)
        .stderr(predicate::str::contains("missing required files: artisan, composer.json"));

    assert!(!temp.path().join(".claude").exists());
}

#[test]
fn test_install_refuses_foreign_guidance_without_force() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("CLAUDE.md"), "# hand written\n").expect("write");

    stackcheck(temp.path())
        .arg("install")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    stackcheck(temp.path()).args(["install", "--force"]).assert().success();
}

#[test]
fn test_hook_failure_reports_summary_with_sentinel() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");
    let edited = temp.path().join("api/app/Models/User.php");

    stackcheck(temp.path())
        .args(["hook", "post-edit"])
        .write_stdin(payload("Edit", &edited))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api-lint failed (exit 1)"))
        .stderr(predicate::str::contains("style error in User.php"))
        .stderr(predicate::str::contains("frontend-lint").not());
}

#[test]
fn test_hook_success_still_uses_sentinel() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");
    let edited = temp.path().join("webapp/src/App.vue");

    stackcheck(temp.path())
        .args(["hook", "post-write"])
        .write_stdin(payload("Write", &edited))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("All checks passed"));
}

#[test]
fn test_hook_edit_outside_roles_is_silent() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");
    let edited = temp.path().join("docs/README.md");

    stackcheck(temp.path())
        .args(["hook", "post-edit"])
        .write_stdin(payload("Edit", &edited))
        .assert()
        .code(0)
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_hook_without_payload_runs_everything() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");

    stackcheck(temp.path())
        .args(["hook", "post-edit"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("1 check(s) failed"));
}

#[test]
fn test_hook_uses_project_dir_env() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");
    let elsewhere = TempDir::new().expect("create temp dir");

    stackcheck(elsewhere.path())
        .args(["hook", "post-edit"])
        .env("CLAUDE_PROJECT_DIR", temp.path())
        .write_stdin(payload("Edit", Path::new("api/routes/web.php")))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("api-lint failed"));
}

#[test]
fn test_hook_reports_broken_config_with_sentinel() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), "[[groups]\nname = ").expect("write config");

    stackcheck(temp.path())
        .args(["hook", "post-edit"])
        .write_stdin(payload("Edit", &temp.path().join("api/app/User.php")))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_skip_with_env_var() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");

    stackcheck(temp.path())
        .args(["hook", "post-edit"])
        .env("STACKCHECK_SKIP", "1")
        .write_stdin(payload("Edit", &temp.path().join("api/app/User.php")))
        .assert()
        .success();
}

#[test]
fn test_pre_write_blocks_protected_paths() {
    let temp = create_test_project();

    stackcheck(temp.path())
        .args(["hook", "pre-write"])
        .write_stdin(payload("Write", &temp.path().join("api/.env")))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("protected"));

    stackcheck(temp.path())
        .args(["hook", "pre-write"])
        .write_stdin(payload("Write", &temp.path().join("api/app/User.php")))
        .assert()
        .success();
}

#[test]
fn test_unknown_hook_event() {
    let temp = create_test_project();

    stackcheck(temp.path())
        .args(["hook", "pre-commit"])
        .write_stdin("")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Unknown hook event"));
}

#[test]
fn test_manual_run_uses_conventional_exit_codes() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");

    stackcheck(temp.path())
        .args(["run", "api"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api-lint failed (exit 1)"));

    stackcheck(temp.path())
        .args(["run", "webapp/src/main.ts"])
        .assert()
        .success();
}

#[test]
fn test_run_single_unknown_group() {
    let temp = create_test_project();

    stackcheck(temp.path())
        .args(["run", "--group", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Command group not found"));
}

#[test]
fn test_uninstall_removes_hooks() {
    let temp = create_test_project();

    stackcheck(temp.path()).arg("install").assert().success();
    stackcheck(temp.path()).arg("uninstall").assert().success();

    assert!(!temp.path().join(".claude/hooks/post-edit.sh").exists());
    assert!(temp.path().join("CLAUDE.md").exists());
    let settings = std::fs::read_to_string(temp.path().join(".claude/settings.json")).expect("read");
    assert!(!settings.contains("post-edit.sh"));
}

#[test]
fn test_init_and_validate() {
    let temp = TempDir::new().expect("create temp dir");

    stackcheck(temp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));

    stackcheck(temp.path()).arg("init").assert().success();
    stackcheck(temp.path()).arg("init").assert().failure();

    stackcheck(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_rejects_duplicate_groups() {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::write(
        temp.path().join("stackcheck.toml"),
        "[[groups]]\nname = \"x\"\nrole = \"api\"\nrun = \"true\"\n\n[[groups]]\nname = \"x\"\nrole = \"frontend\"\nrun = \"true\"\n",
    )
    .expect("write config");

    stackcheck(temp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn test_list_shows_groups() {
    let temp = create_test_project();
    std::fs::write(temp.path().join("stackcheck.toml"), FAILING_GROUPS).expect("write config");

    stackcheck(temp.path())
        .args(["list", "--role", "frontend"])
        .assert()
        .success()
        .stderr(predicate::str::contains("frontend-lint"))
        .stderr(predicate::str::contains("api-lint").not());
}
