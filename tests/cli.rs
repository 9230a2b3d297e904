//! End-to-end tests against the real binary, each pointed at its own
//! store file via `--data-file`.

use assert_cmd::Command;
use predicates::prelude::*;

fn factura() -> Command {
    Command::cargo_bin("factura").unwrap()
}

fn seeded_store(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("invoice_data.json");
    std::fs::write(
        &path,
        r#"{
  "last_invoice_number": 41,
  "templates": {
    "rexo": {
      "client_name": "Rexo, Inc.",
      "client_address": "251 Little Falls Drive, Wilmington, DE 19808",
      "client_ein": "33-2631448",
      "contractor_name": "Juana Molina",
      "contractor_cuil": "20-12345678-9",
      "contractor_tax_status": "monotributista",
      "service_description": "Contractor services - Software Engineer",
      "account_holder": "Juana Molina",
      "dolartag": "$juana",
      "additional_payment_info": ""
    }
  }
}"#,
    )
    .unwrap();
    path
}

#[test]
fn listing_an_empty_store_reports_no_templates() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    factura()
        .args(["--data-file", store.to_str().unwrap(), "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No templates saved yet."));
}

#[test]
fn listing_shows_saved_templates() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir);
    factura()
        .args(["--data-file", store.to_str().unwrap(), "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rexo"))
        .stdout(predicate::str::contains("Rexo, Inc."));
}

#[test]
fn number_peeks_without_allocating() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");

    factura()
        .args(["--data-file", store.to_str().unwrap(), "number"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0000"));
    assert!(!store.exists(), "peeking must not create the store");

    let store = seeded_store(&dir);
    factura()
        .args(["--data-file", store.to_str().unwrap(), "number"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0041"));
}

#[test]
fn unknown_template_is_reported_and_burns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    factura()
        .args([
            "--data-file",
            store.to_str().unwrap(),
            "new",
            "--use-template",
            "nope",
            "--amount",
            "100",
            "--account-holder",
            "Jane",
            "--dolartag",
            "$jane",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nope' not found"));
    assert!(!store.exists(), "a failed lookup must not touch the store");
}

#[test]
fn partial_mode_flags_error_without_allocating() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    factura()
        .args([
            "--data-file",
            store.to_str().unwrap(),
            "new",
            "--amount",
            "100",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("argument mode"));
    assert!(!store.exists(), "no invoice number may be allocated");
}

#[test]
fn unparseable_amount_is_an_immediate_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    factura()
        .args([
            "--data-file",
            store.to_str().unwrap(),
            "new",
            "--amount",
            "abc",
            "--account-holder",
            "Jane",
            "--dolartag",
            "$jane",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid amount 'abc'"));
    assert!(!store.exists());
}

#[test]
fn corrupt_store_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    std::fs::write(&store, "{{ definitely not json").unwrap();
    factura()
        .args(["--data-file", store.to_str().unwrap(), "number"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}

fn typst_available() -> bool {
    std::process::Command::new("typst")
        .arg("--version")
        .output()
        .is_ok()
}

#[test]
fn generates_a_pdf_and_advances_the_counter() {
    if !typst_available() {
        eprintln!("skipping: typst not installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir);
    let output = dir.path().join("invoice_january_2025.pdf");

    factura()
        .current_dir(dir.path())
        .args([
            "--data-file",
            store.to_str().unwrap(),
            "new",
            "--use-template",
            "rexo",
            "--amount",
            "5000",
            "--service-period",
            "Services provided during January 2025",
            "--issue-date",
            "2025-01-31",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice #0042 generated"));

    assert!(output.exists(), "the PDF must be written");
    let raw = std::fs::read_to_string(&store).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["last_invoice_number"], 42);
}

#[test]
fn save_template_projects_the_resolved_invoice() {
    if !typst_available() {
        eprintln!("skipping: typst not installed");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("invoice_data.json");
    let output = dir.path().join("first.pdf");

    factura()
        .current_dir(dir.path())
        .args([
            "--data-file",
            store.to_str().unwrap(),
            "new",
            "--amount",
            "1200",
            "--account-holder",
            "Jane Doe",
            "--dolartag",
            "$janedoe",
            "--client-name",
            "Acme Corp",
            "--service-period",
            "Services provided during July 2025",
            "--output",
            output.to_str().unwrap(),
            "--save-template",
            "acme",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template saved as 'acme'"));

    let raw = std::fs::read_to_string(&store).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let tpl = &doc["templates"]["acme"];
    assert_eq!(tpl["client_name"], "Acme Corp");
    assert_eq!(tpl["account_holder"], "Jane Doe");
    assert!(tpl.get("amount").is_none());
    assert!(tpl.get("service_period").is_none());
    assert!(tpl.get("issue_date").is_none());
    assert!(tpl.get("invoice_number").is_none());
}
