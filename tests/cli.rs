//! CLI tests for `mt940_to_csv`.
//!
//! The rate API is pointed at a closed local port, so no test depends on the
//! network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const CLOSED_PORT_API: &str = "http://127.0.0.1:9/api/exchangerates/rates/A";

#[allow(deprecated)]
fn mt940_to_csv() -> Command {
    let mut cmd = Command::cargo_bin("mt940_to_csv").unwrap();
    for var in [
        "MT940_INPUT_DIR",
        "MT940_OUTPUT",
        "MT940_EXTENSION",
        "MT940_BASE_CURRENCY",
        "MT940_RATE_API_URL",
        "MT940_RATE_TIMEOUT_SECS",
        "MT940_RATE_LOOKBACK_DAYS",
        "MT940_DELIMITER",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_missing_input_directory_fails() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("results.csv");

    mt940_to_csv()
        .args([
            "--input-dir",
            dir.path().join("absent").to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot list input directory"));

    assert!(!output.exists());
}

#[test]
fn test_unreachable_rate_api_still_succeeds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("statement.txt"),
        ":20:ST1\r\n:25:/PL61109010140000071219812874\r\n:60F:C230509EUR0,00\r\n\
:61:230510C100,50NTRFINV-17\r\n:86:Invoice 17\r\n-\r\n",
    )
    .unwrap();
    let output = dir.path().join("results.csv");

    mt940_to_csv()
        .env("MT940_INPUT_DIR", &input)
        .env("MT940_OUTPUT", &output)
        .env("MT940_RATE_API_URL", CLOSED_PORT_API)
        .env("MT940_RATE_TIMEOUT_SECS", "2")
        .assert()
        .success()
        .stderr(predicate::str::contains("exchange rate unavailable"));

    let csv = fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv.lines().nth(1),
        Some("PL 61109010140000071219812874,2023-05-10,100.50,EUR,,INV-17,Invoice 17")
    );
}

#[test]
fn test_base_currency_and_delimiter_flags() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("a.txt"),
        ":20:A\n:25:/1\n:60F:C230509EUR0,00\n:61:230510D5,00NTRFX\n",
    )
    .unwrap();
    fs::write(input.join("skip.csv"), "ignored").unwrap();
    let output = dir.path().join("out.csv");

    mt940_to_csv()
        .args([
            "--input-dir",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--extension",
            "txt",
            "--base-currency",
            "eur",
            "--delimiter",
            "|",
            "--rate-api-url",
            CLOSED_PORT_API,
        ])
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("|Currency rate (to EUR)|"));
    assert_eq!(lines[1], "1|2023-05-10|-5.00|EUR|1|X|");
}

#[test]
fn test_invalid_base_currency_is_rejected() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();

    mt940_to_csv()
        .current_dir(dir.path())
        .args(["--base-currency", "ZLOTY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base currency"));

    assert!(!dir.path().join("results.csv").exists());
}
