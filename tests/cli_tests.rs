use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn servicehub_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("servicehub").unwrap();
    cmd.env("SERVICEHUB_DB_PATH", db_path.to_str().unwrap())
        .env_remove("SERVICEHUB_MERGE_POLICY")
        .env_remove("SERVICEHUB_HTTP_TIMEOUT");
    cmd
}

fn write_manifest(dir: &TempDir, name: &str, document: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, document).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_fetch_help_shows_paging_flags() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("fetch")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--page"))
        .stdout(predicate::str::contains("--pages"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_list_shows_builtin_rss() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("RSS [builtin]"))
        .stdout(predicate::str::contains("Features: post"));
}

#[test]
fn test_show_builtin() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("show")
        .arg("rss")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"rss\""))
        .stdout(predicate::str::contains("Origin: builtin"));
}

#[test]
fn test_show_unknown_fails() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("show")
        .arg("ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no service with id 'ghost'"));
}

#[test]
fn test_validate_good_and_bad_manifests() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let good = write_manifest(
        &temp_dir,
        "good.json",
        r#"{"id": "me.service", "name": "MyService"}"#,
    );
    let bad = write_manifest(
        &temp_dir,
        "bad.json",
        r#"{"id": "me service", "name": "MyService"}"#,
    );

    servicehub_cmd(&db_path)
        .arg("validate")
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest OK: me.service (MyService)"));

    servicehub_cmd(&db_path)
        .arg("validate")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid manifest"));
}

#[test]
fn test_fetch_unknown_service_fails() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("fetch")
        .arg("ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Service not found: ghost"));
}

#[test]
fn test_fetch_rss_without_url_reports_failure() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("fetch")
        .arg("rss")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a `url` config"));
}

#[test]
fn test_fetch_rejects_malformed_page_token() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("fetch")
        .arg("rss")
        .arg("--page")
        .arg("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed page token"));
}

#[test]
fn test_user_on_post_only_service_is_not_implemented() {
    let temp_dir = TempDir::new().unwrap();

    servicehub_cmd(&temp_dir.path().join("test.db"))
        .arg("user")
        .arg("rss")
        .arg("someone")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not implemented yet."));
}

mod install_integration {
    use super::*;

    #[test]
    fn test_install_list_uninstall() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manifest = write_manifest(
            &temp_dir,
            "manifest.json",
            r#"{"id": "me.service", "name": "MyService"}"#,
        );

        servicehub_cmd(&db_path)
            .arg("install")
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed: me.service (MyService)"));

        servicehub_cmd(&db_path)
            .arg("install")
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("Reinstalled: me.service"));

        servicehub_cmd(&db_path)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("MyService [installed]"))
            .stdout(predicate::str::contains("Features: unbound"));

        servicehub_cmd(&db_path)
            .arg("uninstall")
            .arg("me.service")
            .assert()
            .success()
            .stdout(predicate::str::contains("Uninstalled: me.service"));

        servicehub_cmd(&db_path)
            .arg("uninstall")
            .arg("me.service")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Service not found"));
    }

    #[test]
    fn test_unbound_override_keeps_builtin_usable() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manifest = write_manifest(
            &temp_dir,
            "rss.json",
            r#"{"id": "rss", "name": "Custom RSS"}"#,
        );

        servicehub_cmd(&db_path)
            .arg("install")
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("a built-in service has the same id"));

        servicehub_cmd(&db_path)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("RSS [builtin]"))
            .stdout(predicate::str::contains("Features: post"))
            .stdout(predicate::str::contains("Shadowed:"))
            .stdout(predicate::str::contains("rss [installed]"))
            .stdout(predicate::str::contains("Custom RSS [installed]").not());

        servicehub_cmd(&db_path)
            .arg("fetch")
            .arg("rss")
            .assert()
            .failure()
            .stderr(predicate::str::contains("needs a `url` config"))
            .stderr(predicate::str::contains("has no implementation").not());

        servicehub_cmd(&db_path)
            .env("SERVICEHUB_MERGE_POLICY", "builtin")
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("RSS [builtin]"))
            .stdout(predicate::str::contains("Custom RSS [installed]").not());
    }

    #[test]
    fn test_unbound_installed_service_cannot_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manifest = write_manifest(
            &temp_dir,
            "manifest.json",
            r#"{"id": "me.service", "name": "MyService"}"#,
        );

        servicehub_cmd(&db_path).arg("install").arg(&manifest).assert().success();

        servicehub_cmd(&db_path)
            .arg("fetch")
            .arg("me.service")
            .assert()
            .failure()
            .stderr(predicate::str::contains("has no implementation bound to it"));
    }
}
