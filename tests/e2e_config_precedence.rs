mod common;

use common::cli::{Workspace, run_perfboard, run_perfboard_with_env};
use common::fixtures::seed_standard;

const KEY: &str = "repo_url";

fn get_json(workspace: &Workspace, env: &[(&str, &str)], label: &str) -> serde_json::Value {
    let run = run_perfboard_with_env(
        workspace,
        ["--json", "config", "--get", KEY],
        env.iter().copied(),
        label,
    );
    assert!(run.status.success(), "{label} failed: {}", run.stderr);
    run.json()
}

#[test]
fn e2e_config_layers_in_order() {
    let _log = common::test_log("e2e_config_layers_in_order");
    let workspace = Workspace::new();

    let value = get_json(&workspace, &[], "default");
    assert_eq!(value["source"], "default");

    workspace.write(
        ".config/perfboard/config.yaml",
        "repo_url: https://user.example.com/r\n",
    );
    let value = get_json(&workspace, &[], "user");
    assert_eq!(value["value"], "https://user.example.com/r");
    assert_eq!(value["source"], "user");

    workspace.write(
        ".perfboard/config.yaml",
        "repo-url: https://project.example.com/r\n",
    );
    let value = get_json(&workspace, &[], "project");
    assert_eq!(value["value"], "https://project.example.com/r");
    assert_eq!(value["source"], "project");

    let value = get_json(
        &workspace,
        &[("PERFBOARD_REPO_URL", "https://env.example.com/r")],
        "env",
    );
    assert_eq!(value["value"], "https://env.example.com/r");
    assert_eq!(value["source"], "env");
}

#[test]
fn e2e_cli_flags_beat_env() {
    let _log = common::test_log("e2e_cli_flags_beat_env");
    let workspace = Workspace::new();
    seed_standard(&workspace);

    let build = run_perfboard_with_env(
        &workspace,
        ["build", "--no-fetch", "--output", "from-cli.json"],
        [("PERFBOARD_OUTPUT", "from-env.json")],
        "build_cli_output",
    );
    assert!(build.status.success(), "build failed: {}", build.stderr);
    assert!(workspace.root.join("from-cli.json").is_file());
    assert!(!workspace.root.join("from-env.json").exists());

    // Read commands pick the dataset path up from the environment.
    let list = run_perfboard_with_env(
        &workspace,
        ["--json", "list"],
        [("PERFBOARD_OUTPUT", "from-cli.json")],
        "list_env_dataset",
    );
    assert!(list.status.success(), "list failed: {}", list.stderr);
    assert_eq!(list.json().as_array().map(Vec::len), Some(3));
}

#[test]
fn e2e_explicit_config_file() {
    let _log = common::test_log("e2e_explicit_config_file");
    let workspace = Workspace::new();
    seed_standard(&workspace);
    workspace.write(
        "ci/perfboard.yaml",
        "reference_file: best_times.csv\noutput: ci/out.json\nshort_sha_len: 4\n",
    );

    let build = run_perfboard(
        &workspace,
        ["--config", "ci/perfboard.yaml", "build", "--no-fetch"],
        "build_explicit",
    );
    assert!(build.status.success(), "build failed: {}", build.stderr);
    assert!(workspace.root.join("ci/out.json").is_file());

    let list = run_perfboard_with_env(
        &workspace,
        ["--json", "list", "--limit", "1"],
        [("PERFBOARD_CONFIG", "ci/perfboard.yaml")],
        "list_explicit",
    );
    assert!(list.status.success(), "list failed: {}", list.stderr);
    let entries = list.json();
    assert_eq!(entries[0]["short_sha"].as_str().map(str::len), Some(4));
}

#[test]
fn e2e_config_list_marks_unknown_keys() {
    let _log = common::test_log("e2e_config_list_marks_unknown_keys");
    let workspace = Workspace::new();
    workspace.write(".perfboard/config.yaml", "colour: always\nfetch_workers: 8\n");

    let list = run_perfboard(&workspace, ["config", "--list"], "config_list");
    assert!(list.status.success(), "config failed: {}", list.stderr);
    assert!(list.stdout.contains("(ignored: unknown key)"));
    let workers = list
        .stdout
        .lines()
        .find(|line| line.starts_with("fetch_workers"))
        .expect("fetch_workers line");
    assert!(workers.contains('8'));
    assert!(workers.contains("(project)"));

    let unknown = run_perfboard(&workspace, ["config", "--get", "colour"], "config_get_unknown");
    assert_eq!(unknown.code(), Some(6));
}
