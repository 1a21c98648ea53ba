mod common;

use common::cli::{Workspace, run_perfboard};
use common::fixtures::seed_standard;

fn built_workspace() -> Workspace {
    let workspace = Workspace::new();
    seed_standard(&workspace);
    let build = run_perfboard(&workspace, ["build", "--no-fetch"], "build");
    assert!(build.status.success(), "build failed: {}", build.stderr);
    workspace
}

#[test]
fn e2e_missing_reference_table() {
    let _log = common::test_log("e2e_missing_reference_table");
    let workspace = Workspace::new();
    workspace.write("results/abc.tsv", "h\th\th\th\th\n");

    let run = run_perfboard(&workspace, ["--json", "build", "--no-fetch"], "build");
    assert_eq!(run.code(), Some(2));
    let err = run.error_json();
    assert_eq!(err["error"]["code"], "MISSING_FILE");
    assert!(
        err["error"]["context"]["path"]
            .as_str()
            .is_some_and(|p| p.ends_with("best_times.csv"))
    );
    assert!(!workspace.root.join("dataset.json").exists());
}

#[test]
fn e2e_short_reference_row_fails_the_build() {
    let _log = common::test_log("e2e_short_reference_row_fails_the_build");
    let workspace = Workspace::new();
    workspace.write("best_times.csv", "id,name,best_time\n1,loop\n");
    workspace.write("results/abc.tsv", "h\th\th\th\th\n");

    let run = run_perfboard(&workspace, ["--json", "build", "--no-fetch"], "build");
    assert_eq!(run.code(), Some(3));
    assert_eq!(run.error_json()["error"]["code"], "MALFORMED_ROW");
}

#[test]
fn e2e_missing_dataset() {
    let _log = common::test_log("e2e_missing_dataset");
    let workspace = Workspace::new();

    let run = run_perfboard(&workspace, ["compare", "a", "b"], "compare_missing");
    assert_eq!(run.code(), Some(2));
}

#[test]
fn e2e_commit_selection_errors() {
    let _log = common::test_log("e2e_commit_selection_errors");
    let workspace = built_workspace();

    let ambiguous = run_perfboard(&workspace, ["compare", "a1b", "f00d"], "ambiguous");
    assert_eq!(ambiguous.code(), Some(4));
    let err = ambiguous.error_json();
    assert_eq!(err["error"]["code"], "AMBIGUOUS_COMMIT");

    let missing = run_perfboard(&workspace, ["show", "deadbeef"], "not_found");
    assert_eq!(missing.code(), Some(4));
    assert_eq!(missing.error_json()["error"]["code"], "COMMIT_NOT_FOUND");
}

#[test]
fn e2e_invalid_sort_key() {
    let _log = common::test_log("e2e_invalid_sort_key");
    let workspace = built_workspace();

    let run = run_perfboard(
        &workspace,
        ["compare", "a1b2", "a1b9", "--sort", "colour"],
        "bad_sort",
    );
    assert_eq!(run.code(), Some(5));
    assert_eq!(run.error_json()["error"]["code"], "INVALID_SORT_KEY");
}

#[test]
fn e2e_invalid_config_value() {
    let _log = common::test_log("e2e_invalid_config_value");
    let workspace = built_workspace();
    workspace.write(".perfboard/config.yaml", "fetch_workers: 0\n");

    let run = run_perfboard(&workspace, ["list"], "bad_config");
    assert_eq!(run.code(), Some(6));
    assert_eq!(run.error_json()["error"]["code"], "CONFIG_ERROR");
}

#[test]
fn e2e_explicit_config_must_exist() {
    let _log = common::test_log("e2e_explicit_config_must_exist");
    let workspace = built_workspace();

    let run = run_perfboard(
        &workspace,
        ["--config", "nowhere.yaml", "list"],
        "missing_config",
    );
    assert_eq!(run.code(), Some(6));
}
