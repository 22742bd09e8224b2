use assert_cmd::Command;
use predicates::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

fn mlend() -> Command {
    Command::cargo_bin("mlend").unwrap()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn dec_field(value: &Value, field: &str) -> Decimal {
    let raw = &value["result"][field];
    let text = raw.as_str().map(str::to_string).unwrap_or_else(|| raw.to_string());
    Decimal::from_str(&text).unwrap()
}

#[test]
fn test_terms_json_envelope() {
    let out = stdout_json(mlend().args(["terms", "--principal", "1000"]));
    assert_eq!(dec_field(&out, "interest"), Decimal::from(150));
    assert_eq!(dec_field(&out, "total"), Decimal::from(1150));
    assert_eq!(out["result"]["tenor_days"], 7);
    assert!(out["metadata"]["version"].is_string());
}

#[test]
fn test_terms_minimal_prints_total() {
    let output = mlend()
        .args(["terms", "--principal", "250", "--output", "minimal"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(Decimal::from_str(text.trim()).unwrap(), Decimal::from_str("287.5").unwrap());
}

#[test]
fn test_penalty_minimal() {
    mlend()
        .args([
            "penalty",
            "--amount-due",
            "1196",
            "--days-overdue",
            "12",
            "--output",
            "minimal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("299"));
}

#[test]
fn test_zero_tenor_is_an_error() {
    mlend()
        .args(["terms", "--principal", "1000", "--tenor-days", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Tenor must be at least one day"));
}

#[test]
fn test_missing_principal_is_an_error() {
    mlend()
        .arg("terms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--principal is required"));
}

#[test]
fn test_reduced_weekly_preset() {
    let out = stdout_json(mlend().args(["--preset", "reduced-weekly", "terms", "--principal", "1000"]));
    assert_eq!(dec_field(&out, "total"), Decimal::from(1100));
}

#[test]
fn test_rates_from_yaml_file() {
    let path = std::env::temp_dir().join(format!("mlend-rates-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "weekly_interest_rate: 0.12\ndaily_penalty_rate: 0.02\ngrace_period_days: 3\n",
    )
    .unwrap();

    let out = stdout_json(mlend().args([
        "--rates",
        path.to_str().unwrap(),
        "penalty",
        "--amount-due",
        "100",
        "--days-overdue",
        "5",
    ]));
    std::fs::remove_file(&path).ok();

    // 2 chargeable days at 2%
    assert_eq!(dec_field(&out, "penalty_amount"), Decimal::from(4));
    assert_eq!(out["result"]["chargeable_days"], 2);
}

#[test]
fn test_statement_from_stdin() {
    let request = r#"{
        "loan": { "principal": "1040", "disbursed_on": "2024-03-01" },
        "as_of": "2024-03-20"
    }"#;
    let out = stdout_json(mlend().arg("statement").write_stdin(request));
    assert_eq!(dec_field(&out, "penalty"), Decimal::from(299));
    assert_eq!(dec_field(&out, "current_due"), Decimal::from(1495));
    assert_eq!(out["result"]["status"], "overdue");
}

#[test]
fn test_schedule_csv_has_one_row_per_day() {
    let output = mlend()
        .args([
            "schedule",
            "--principal",
            "700",
            "--disbursed-on",
            "2024-05-01",
            "--output",
            "csv",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    // header + 7 installments
    assert_eq!(text.lines().count(), 8);
    assert!(text.contains("2024-05-08"));
}

#[test]
fn test_book_replay() {
    let commands = r#"[
        { "command": "originate", "borrower": "amina", "principal": "250", "disbursed_on": "2024-03-01" },
        { "command": "record_repayment", "id": 1, "amount": "287.5", "paid_on": "2024-03-07" },
        { "command": "rate", "id": 1, "stars": 5 },
        { "command": "originate", "borrower": "kofi", "principal": "100", "disbursed_on": "2024-03-01" }
    ]"#;
    let out = stdout_json(mlend().args(["book", "--as-of", "2024-03-12"]).write_stdin(commands));
    let loans = out["result"]["loans"].as_array().unwrap();
    assert_eq!(loans.len(), 2);
    assert_eq!(loans[0]["status"], "repaid");
    assert_eq!(loans[0]["rating"], 5);
    assert_eq!(loans[1]["status"], "overdue");
    assert_eq!(out["ledger"].as_array().unwrap().len(), 5);
}

#[test]
fn test_book_table_keeps_columns_only_later_loans_have() {
    let commands = r#"[
        { "command": "originate", "borrower": "kofi", "principal": "100", "disbursed_on": "2024-03-01" },
        { "command": "originate", "borrower": "amina", "principal": "250", "disbursed_on": "2024-03-01" },
        { "command": "record_repayment", "id": 2, "amount": "287.5", "paid_on": "2024-03-07" },
        { "command": "rate", "id": 2, "stars": 4 }
    ]"#;
    mlend()
        .args(["book", "--output", "table"])
        .write_stdin(commands)
        .assert()
        .success()
        .stdout(predicate::str::contains("closed_on"))
        .stdout(predicate::str::contains("rating"));
}

#[test]
fn test_schedule_rejects_overlong_tenor() {
    mlend()
        .args([
            "schedule",
            "--principal",
            "100",
            "--tenor-days",
            "90000000",
            "--disbursed-on",
            "2024-05-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tenor_days"));
}

#[test]
fn test_book_rejects_second_rating() {
    let commands = r#"[
        { "command": "originate", "borrower": "amina", "principal": "250", "disbursed_on": "2024-03-01" },
        { "command": "record_repayment", "id": 1, "amount": "287.5", "paid_on": "2024-03-07" },
        { "command": "rate", "id": 1, "stars": 4 },
        { "command": "rate", "id": 1, "stars": 1 }
    ]"#;
    mlend()
        .arg("book")
        .write_stdin(commands)
        .assert()
        .failure()
        .stderr(predicate::str::contains("command 4 of 4"));
}

#[test]
fn test_huge_principal_fails_cleanly() {
    mlend()
        .args(["terms", "--principal", "79228162514264337593543950335"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn test_book_reports_failing_command() {
    let commands = r#"[ { "command": "refresh", "id": 9, "as_of": "2024-03-12" } ]"#;
    mlend()
        .arg("book")
        .write_stdin(commands)
        .assert()
        .failure()
        .stderr(predicate::str::contains("command 1 of 1"));
}

#[test]
fn test_version() {
    mlend()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mlend "));
}
