//! Input files for end-to-end runs.
//!
//! The standard workspace holds three result files:
//! - `BASE_SHA` (2024-01-01): loop 4.0, x 0, sort 1.5
//! - `HEAD_SHA` (2024-01-02): loop 2.0, x 0.0005, an unknown case `ghost`
//! - `ORPHAN_SHA`: no metadata record, so it falls back to the epoch

use super::cli::Workspace;

pub const BASE_SHA: &str = "a1b2c3d4e5f6a7b8c9d0a1b2c3d4e5f6a7b8c9d0";
pub const HEAD_SHA: &str = "a1b9f8e7d6c5b4a3928170a1b9f8e7d6c5b4a392";
pub const ORPHAN_SHA: &str = "f00dfeed";

pub const REFERENCE: &str = "id,name,best_time\n1,loop,2.0\n2,x,0.00\n3,sort,1.5\n";

const RESULT_HEADER: &str = "idx\tcase\tstatus\truntime\tmemory\n";

pub fn result_file(rows: &[(&str, &str)]) -> String {
    let mut out = String::from(RESULT_HEADER);
    for (idx, (name, runtime)) in rows.iter().enumerate() {
        out.push_str(&format!("{idx}\t{name}\tPASS\t{runtime}\t0\n"));
    }
    out
}

pub fn metadata_json() -> String {
    serde_json::json!({
        (BASE_SHA): {
            "message": "Baseline loop implementation",
            "author": "Ada",
            "author_email": "ada@example.com",
            "date": "2024-01-01T10:00:00Z",
        },
        (HEAD_SHA): {
            "message": "Unroll the hot loop\n\nDetails in the body.",
            "author": "Grace",
            "author_email": "grace@example.com",
            "date": "2024-01-02T10:00:00Z",
            "parent_sha": BASE_SHA,
        },
    })
    .to_string()
}

/// Reference table, three result files and `commits.json`.
pub fn seed_standard(workspace: &Workspace) {
    workspace.write("best_times.csv", REFERENCE);
    workspace.write(
        &format!("results/{BASE_SHA}.tsv"),
        &result_file(&[("loop", "4.0"), ("x", "0"), ("sort", "1.5")]),
    );
    workspace.write(
        &format!("results/{HEAD_SHA}.tsv"),
        &result_file(&[("loop", "2.0"), ("x", "0.0005"), ("ghost", "1.0")]),
    );
    workspace.write(
        &format!("results/{ORPHAN_SHA}.tsv"),
        &result_file(&[("loop", "3.0")]),
    );
    workspace.write("commits.json", &metadata_json());
}
