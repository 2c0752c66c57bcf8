//! End-to-end tests for the ordex binary.

use assert_cmd::Command;
use predicates::prelude::*;

const DOMESTIC_ORDER: &str = "\
amazon.com
Order #123-4567890-1234567
Order Placed: December 15, 2023
Items Ordered
1 of: Echo Dot (4th Gen) $129.99
1 of: Smart Plug $29.99
Subtotal: $159.98
Shipping & Handling: $0.00
Tax: $12.80
Grand Total: $172.78
";

#[test]
fn process_outputs_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.txt");
    std::fs::write(&input, DOMESTIC_ORDER).unwrap();

    Command::cargo_bin("ordex")
        .unwrap()
        .args(["process", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("123-4567890-1234567"))
        .stdout(predicate::str::contains("2023-12-15"));
}

#[test]
fn process_text_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.txt");
    std::fs::write(&input, DOMESTIC_ORDER).unwrap();

    Command::cargo_bin("ordex")
        .unwrap()
        .args(["process", input.to_str().unwrap(), "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order number: 123-4567890-1234567"));
}

#[test]
fn process_missing_file_fails() {
    Command::cargo_bin("ordex")
        .unwrap()
        .args(["process", "/nonexistent/order.txt"])
        .assert()
        .failure();
}

#[test]
fn process_empty_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    std::fs::write(&input, "").unwrap();

    Command::cargo_bin("ordex")
        .unwrap()
        .args(["process", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable data"));
}

#[test]
fn config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ordex.json");

    Command::cargo_bin("ordex")
        .unwrap()
        .args(["config", "init", path.to_str().unwrap()])
        .assert()
        .success();

    Command::cargo_bin("ordex")
        .unwrap()
        .args(["config", "show", "--path", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ambiguity_cutoff"));
}
