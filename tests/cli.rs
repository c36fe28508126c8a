//! End-to-end tests driving the `tick` binary against a temp database.

use assert_cmd::Command;
use std::path::Path;

fn tick(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tick").unwrap();
    cmd.env_remove("TICK_DB")
        .env_remove("TICK_USER")
        .arg("--db")
        .arg(db);
    cmd
}

#[test]
fn init_create_show_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ticklist.db");

    tick(&db).arg("init").assert().success();

    let details =
        r#"[{"task":"Buy milk"},{"task":"Buy eggs","children":[{"task":"Buy brown eggs"}]}]"#;
    let create = tick(&db)
        .args([
            "checklist", "create", "Groceries", "--details", details, "--user", "1", "--json",
        ])
        .assert()
        .success();

    let created: serde_json::Value =
        serde_json::from_slice(&create.get_output().stdout).unwrap();
    let root_id = created["root"]["id"].as_str().unwrap().to_string();
    assert!(root_id.starts_with("chk_"));
    assert_eq!(created["root"]["title"], "Groceries");
    assert_eq!(created["details"].as_array().unwrap().len(), 3);

    // The child detail points at the second detail's generated id.
    let eggs_id = created["details"][1]["id"].as_str().unwrap();
    assert_eq!(created["details"][2]["parent_detail_id"], eggs_id);

    // Show reassembles the tree at the boundary.
    let show = tick(&db)
        .args(["checklist", "show", &root_id, "--user", "1", "--json"])
        .assert()
        .success();
    let shown: serde_json::Value = serde_json::from_slice(&show.get_output().stdout).unwrap();
    let forest = shown["details"].as_array().unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[1]["children"][0]["task"], "Buy brown eggs");
}

#[test]
fn foreign_checklist_is_rejected_with_ownership_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ticklist.db");

    tick(&db).arg("init").assert().success();

    let create = tick(&db)
        .args(["checklist", "create", "Secrets", "--user", "25", "--json"])
        .assert()
        .success();
    let created: serde_json::Value =
        serde_json::from_slice(&create.get_output().stdout).unwrap();
    let root_id = created["root"]["id"].as_str().unwrap();

    // Not-found/ownership category exits with 3.
    tick(&db)
        .args(["checklist", "show", root_id, "--user", "1", "--json"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn unknown_delete_target_is_rejected_with_reconciliation_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ticklist.db");

    tick(&db).arg("init").assert().success();

    let create = tick(&db)
        .args(["checklist", "create", "Groceries", "--user", "1", "--json"])
        .assert()
        .success();
    let created: serde_json::Value =
        serde_json::from_slice(&create.get_output().stdout).unwrap();
    let root_id = created["root"]["id"].as_str().unwrap();

    tick(&db)
        .args([
            "checklist", "update", root_id, "--title", "Groceries", "--delete", "itm_ghost",
            "--user", "1", "--json",
        ])
        .assert()
        .failure()
        .code(5);
}
