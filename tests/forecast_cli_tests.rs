use assert_fs::prelude::*;
use predicates::prelude::*;

// Twelve finished items over four weeks plus five open ones.
const ISSUES_CSV: &str = "Key,Summary,Status,Created,Resolved
FT-1,Login page,Done,2026-01-01 09:00,2026-01-05 17:00
FT-2,Logout,Done,2026-01-02 09:00,2026-01-06 12:00
FT-3,Profile,Closed,2026-01-03 09:00,2026-01-07 10:00
FT-4,Settings,Done,2026-01-05 09:00,2026-01-12 16:00
FT-5,Search,Done,2026-01-06 09:00,2026-01-13 11:00
FT-6,Filters,Resolved,2026-01-08 09:00,2026-01-14 15:00
FT-7,Export,Done,2026-01-09 09:00,2026-01-15 09:30
FT-8,Import,Done,2026-01-12 09:00,2026-01-20 13:00
FT-9,Audit log,Done,2026-01-13 09:00,2026-01-21 14:00
FT-10,Billing,Done,2026-01-15 09:00,2026-01-27 10:00
FT-11,Invoices,Done,2026-01-19 09:00,2026-01-28 16:00
FT-12,Reports,Done,2026-01-20 09:00,2026-01-29 12:00
FT-13,Dashboards,In Progress,2026-01-22 09:00,
FT-14,Alerts,In Progress,2026-01-23 09:00,
FT-15,Webhooks,To Do,2026-01-26 09:00,
FT-16,SSO,To Do,2026-01-27 09:00,
FT-17,API keys,To Do,2026-01-28 09:00,
";

fn write_issues(dir: &assert_fs::TempDir) -> String {
    let file = dir.child("issues.csv");
    file.write_str(ISSUES_CSV).unwrap();
    file.path().to_str().unwrap().to_string()
}

#[test]
fn forecast_writes_yaml_and_prints_report() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = write_issues(&dir);
    let output_file = dir.child("forecast.yaml");
    let output = output_file.path().to_str().unwrap();

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast", "-i", input.as_str(), "-o", output, "-n", "2000", "--seed", "17", "-s", "2026-02-02",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Forecast Report"))
        .stdout(predicate::str::contains("Data source: issues.csv"))
        .stdout(predicate::str::contains("Remaining items: 5"))
        .stdout(predicate::str::contains("Confidence | Date | Periods | Days"))
        .stdout(predicate::str::contains(format!(
            "Forecast for 5 items written to {output}"
        )));

    output_file.assert(predicate::path::exists());
    let contents = std::fs::read_to_string(output).unwrap();
    assert!(contents.contains("data_source: issues.csv"));
    assert!(contents.contains("remaining_items: 5"));
    assert!(contents.contains("sampling_mode: bootstrap"));
    assert!(contents.contains("confidence_intervals:"));
    assert!(contents.contains("confidence_level: 85"));
    assert!(contents.contains("reference_date:"));
    assert!(contents.contains("2026-02-02"));
    assert!(contents.contains("cycle_times:"));
}

#[test]
fn same_seed_produces_identical_output() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = write_issues(&dir);
    let first = dir.child("first.yaml");
    let second = dir.child("second.yaml");

    for (output, parallel) in [(&first, false), (&second, true)] {
        let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
        cmd.args([
            "forecast",
            "-i",
            input.as_str(),
            "-o",
            output.path().to_str().unwrap(),
            "-n",
            "500",
            "-r",
            "40",
            "--seed",
            "99",
            "-s",
            "2026-02-02",
        ]);
        if parallel {
            cmd.arg("--parallel");
        }
        cmd.assert().success();
    }

    let first = std::fs::read_to_string(first.path()).unwrap();
    let second = std::fs::read_to_string(second.path()).unwrap();
    assert!(first.contains("remaining_items: 40"));
    assert_eq!(first, second);
}

#[test]
fn json_output_is_selected_by_extension() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = write_issues(&dir);
    let output_file = dir.child("forecast.json");

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast",
        "-i",
        input.as_str(),
        "-o",
        output_file.path().to_str().unwrap(),
        "-n",
        "300",
        "-m",
        "cycle-time",
        "-p",
        "W",
        "--seed",
        "5",
        "-s",
        "2026-02-02",
    ]);
    cmd.assert().success();

    let contents = std::fs::read_to_string(output_file.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["sampling_mode"], "cycle_time");
    assert_eq!(json["result"]["iterations"], 300);
    assert_eq!(json["result"]["period_length_days"], 7);
    assert_eq!(json["result"]["raw_trial_results"].as_array().unwrap().len(), 300);
}

#[test]
fn settings_file_configures_columns_and_simulation() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("renamed.csv");
    input
        .write_str(
            "Opened,Finished,State\n\
             2026-01-01,2026-01-03,Shipped\n\
             2026-01-02,2026-01-09,Shipped\n\
             2026-01-05,2026-01-10,Shipped\n\
             2026-01-06,,Open\n",
        )
        .unwrap();
    let settings = dir.child("settings.yaml");
    settings
        .write_str(
            "simulation:\n  iterations: 200\n  confidence_levels: [50, 90]\n  done_statuses: [Shipped]\n  seed: 4\n\
             columns:\n  created: Opened\n  resolved: Finished\n  status: State\n",
        )
        .unwrap();
    let output_file = dir.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast",
        "-i",
        input.path().to_str().unwrap(),
        "-c",
        settings.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
        "-s",
        "2026-02-02",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Iterations: 200"))
        .stdout(predicate::str::contains("Remaining items: 1"))
        .stdout(predicate::str::contains("P90 |"));
}

#[test]
fn forecast_from_throughput_file_requires_remaining() {
    let dir = assert_fs::TempDir::new().unwrap();
    let throughput = dir.child("throughput.yaml");
    throughput
        .write_str(
            "- date: 2026-01-05\n  completed_issues: 2\n- date: 2026-01-12\n  completed_issues: 0\n- date: 2026-01-19\n  completed_issues: 3\n",
        )
        .unwrap();
    let output_file = dir.child("forecast.yaml");
    let args = [
        "forecast",
        "-f",
        throughput.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
        "-n",
        "200",
        "--seed",
        "8",
        "-s",
        "2026-02-02",
    ];

    let mut missing = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    missing.args(args);
    missing
        .assert()
        .failure()
        .stderr(predicate::str::contains("--remaining is required"));

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args(args).args(["-r", "10"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Data source: throughput.yaml"))
        .stdout(predicate::str::contains("Remaining items: 10"));
}

#[test]
fn certain_total_blocker_fails_with_non_convergence() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = write_issues(&dir);
    let settings = dir.child("blocked.yaml");
    settings
        .write_str(
            "simulation:\n  iterations: 10\n  max_periods: 100\n  blocker_probability: 1.0\n  blocker_impact_range: [1.0, 1.0]\n",
        )
        .unwrap();
    let output_file = dir.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast",
        "-i",
        input.as_str(),
        "-c",
        settings.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
        "--seed",
        "1",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("did not finish the backlog within 100 periods"));
    output_file.assert(predicate::path::missing());
}

#[test]
fn too_little_history_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("issues.csv");
    input
        .write_str("Created,Resolved,Status\n2026-01-01,2026-01-02,Done\n2026-01-03,,To Do\n")
        .unwrap();
    let output_file = dir.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast",
        "-i",
        input.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("insufficient history"));
}

#[test]
fn weekly_throughput_file_is_not_relabelled_as_daily() {
    let dir = assert_fs::TempDir::new().unwrap();
    let throughput = dir.child("weekly.yaml");
    throughput
        .write_str("- date: 2026-01-05\n  completed_issues: 7\n- date: 2026-01-12\n  completed_issues: 7\n")
        .unwrap();
    let output_file = dir.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("backlog-forecast");
    cmd.args([
        "forecast",
        "-f",
        throughput.path().to_str().unwrap(),
        "-o",
        output_file.path().to_str().unwrap(),
        "-r",
        "70",
        "-p",
        "D",
        "--seed",
        "2",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(
            "throughput records are 7 days apart and cannot be regrouped into 1-day periods",
        ));
    output_file.assert(predicate::path::missing());
}
