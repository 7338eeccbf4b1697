use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("cvtrends").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cvtrends"));
}

#[test]
fn trends_subcommand_lists_its_plot_flags() {
    let mut cmd = Command::cargo_bin("cvtrends").unwrap();
    cmd.args(["trends", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--plot"))
        .stdout(predicate::str::contains("--viewport-width"));
}

#[test]
fn unreachable_service_fails_with_a_network_error() {
    let mut cmd = Command::cargo_bin("cvtrends").unwrap();
    // Port 9 (discard) is reliably closed.
    cmd.args(["--api-url", "http://127.0.0.1:9", "trends"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("network error"));
}

// Live test (opt-in): cargo test --features online -- --ignored
#[cfg(feature = "online")]
#[test]
fn fetch_live_market_trends() {
    let mut cmd = Command::cargo_bin("cvtrends").unwrap();
    cmd.args(["trends", "--json"]);
    cmd.assert().success();
}
