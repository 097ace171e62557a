#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_upserts_and_deletes_subjects() {
    run_cli("subject 1 Maths hard 2025-06-10\nsubject 2 Art easy\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Subject upserted."))
        .stdout(str_contains("Deleted subject 2."));
}

#[test]
fn cli_rejects_assignments_after_the_exam() {
    // Week of 2025-06-09; slot 17 is Wednesday 2025-06-11 slot 1, one day
    // past the exam.
    let script = "subject 1 Maths hard 2025-06-10\nweek 2025-06-09\nassign 17 1\nquit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("Rejected:"))
        .stdout(str_contains("Maths"))
        .stdout(str_contains("2025-06-11"))
        .stdout(str_contains("2025-06-10"));
}

#[test]
fn cli_refuses_deleting_a_scheduled_subject() {
    let script = "subject 1 Maths hard\nweek 2025-06-02\nassign 1 1\ndelete 1\nquit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("cannot delete 'Maths'"));
}

#[test]
fn cli_reports_metadata_validation_errors() {
    run_cli("meta dates 2025-01-10 2025-01-05\nquit\n")
        .success()
        .stdout(str_contains(
            "horizon start date 2025-01-10 must be on or before horizon end date 2025-01-05",
        ));
}

#[test]
fn cli_grid_batch_is_atomic() {
    // Slot 1 is Monday 2025-06-09, slot 17 is Wednesday 2025-06-11.
    let script = "subject 1 Maths hard 2025-06-10\nweek 2025-06-09\n\
                  grid 1=1 17=1\nshow grid\nquit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("Grid not saved; 1 edit(s) rejected:"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "subject 1 Maths hard 2025-06-10\nsave json {}\nsubject 2 Temp easy\nload json {}\nshow subjects\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Planner loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output.split("Planner loaded from").last().unwrap_or_default();
    assert!(
        after_reload.contains("Maths"),
        "persisted subject should remain:\n{}",
        after_reload
    );
    assert!(
        !after_reload.contains("Temp"),
        "temporary subject should not appear after reload:\n{}",
        after_reload
    );
}
