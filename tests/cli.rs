//! E2E tests for the command line

use std::process::Command;

fn dpfo(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test the calculation table for an employment-only return
#[test]
fn calculate_table() {
    let output = dpfo(&["calculate", "-f", "tests/data/employment.json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("r38"));
    assert!(stdout.contains("20760.00"));
    assert!(stdout.contains("2851.18"));
    assert!(stdout.contains("Refund:  48.82 EUR"));
}

/// Test JSON output carries the result and warnings
#[test]
fn calculate_json() {
    let output = dpfo(&["calculate", "-f", "tests/data/full_form.json", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["result"]["r81"], "3789.78");
    assert_eq!(json["result"]["r135"], "-875.22");
    assert_eq!(json["result"]["is_refund"], true);
    assert_eq!(json["result"]["children"][0]["total"], "900.00");
    assert!(json["warnings"].as_array().is_some());
}

/// Test CSV output lists every row
#[test]
fn calculate_csv() {
    let output = dpfo(&["calculate", "-f", "tests/data/employment.json", "--csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.starts_with("row,description,amount"));
    assert!(stdout.contains("r135,Settlement,-48.82"));
}

/// Test export writes the document with the computed rows
#[test]
fn export_document() {
    let output = dpfo(&["export", "-f", "tests/data/full_form.json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains("<dic>1234567890</dic>"));
    assert!(stdout.contains("<rok>2025</rok>"));
    assert!(stdout.contains("<r81>3789.78</r81>"));
    assert!(stdout.contains("<ico>12345678</ico>"));
}

/// Test export is refused without a tax ID or birth number
#[test]
fn export_requires_identity() {
    let output = dpfo(&["export", "-f", "tests/data/no_identity.json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("no valid tax ID"));
}

/// Test a prior-year document only brings identity and allocations
#[test]
fn import_prior_year() {
    let output = dpfo(&["import", "-f", "tests/data/prior_year.xml"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["personal_info"]["dic"], "1234567890");
    assert_eq!(json["personal_info"]["city"], "Bratislava");
    assert_eq!(json["two_percent"]["enabled"], true);
    assert_eq!(json["two_percent"]["ico"], "12345678");
    assert_eq!(json["employment"]["enabled"], false);
}

/// Test birth number validation output
#[test]
fn rc_validation() {
    let output = dpfo(&["rc", "100715/1233", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["valid"], true);
    assert_eq!(json["lenient_birth_date"], "2010-07-15");
    assert_eq!(json["monthly_bonus"][0], "100.00");
    assert_eq!(json["monthly_bonus"][6], "50.00");
}

/// Test the JSON schema names the form sections
#[test]
fn schema_json() {
    let output = dpfo(&["schema"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("personal_info"));
    assert!(stdout.contains("child_bonus"));
}
