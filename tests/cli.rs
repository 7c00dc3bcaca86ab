//! CLI integration tests.
//!
//! These exercise the binary end to end on paths that need no model
//! credentials: argument parsing, corpus loading failures, and the
//! offline fallbacks (empty-window FAQ and moderation, reindex with
//! nothing to do).

#![allow(clippy::panic)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rummage() -> Command {
    let mut cmd = Command::cargo_bin("rummage")
        .unwrap_or_else(|e| panic!("binary not built: {e}"));
    // Keep runs deterministic regardless of the host environment.
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("RUMMAGE_API_KEY")
        .env_remove("RUMMAGE_CORPUS");
    cmd
}

fn corpus_file(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let path = dir.path().join("listings.json");
    fs::write(&path, content).unwrap_or_else(|e| panic!("write failed: {e}"));
    (dir, path)
}

#[test]
fn test_help_lists_subcommands() {
    rummage()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("similar"))
        .stdout(predicate::str::contains("assist"))
        .stdout(predicate::str::contains("moderate"))
        .stdout(predicate::str::contains("claim-check"))
        .stdout(predicate::str::contains("faq"))
        .stdout(predicate::str::contains("reindex"));
}

#[test]
fn test_version_flag() {
    rummage()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rummage"));
}

#[test]
fn test_missing_corpus_file_fails() {
    rummage()
        .args(["--corpus", "/nonexistent/listings.json", "faq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read corpus file"));
}

#[test]
fn test_faq_empty_corpus_returns_fallback() {
    let (_dir, path) = corpus_file("[]");

    rummage()
        .arg("--corpus")
        .arg(&path)
        .arg("faq")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "What items are commonly lost on campus?",
        ))
        .stdout(predicate::str::contains(
            "What should I do if I lose something?",
        ));
}

#[test]
fn test_faq_json_output_is_parseable() {
    let (_dir, path) = corpus_file("[]");

    let assert = rummage()
        .args(["--json", "--corpus"])
        .arg(&path)
        .arg("faq")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let value: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON: {e}\n{stdout}"));
    assert_eq!(value["faq"].as_array().map_or(0, |entries| entries.len()), 2);
    assert_eq!(value["stats"]["lost_count"], 0);
}

#[test]
fn test_moderate_empty_corpus_reports_no_data() {
    let (_dir, path) = corpus_file("[]");

    rummage()
        .arg("--corpus")
        .arg(&path)
        .arg("moderate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No listings found in the specified time range.",
        ));
}

#[test]
fn test_reindex_empty_corpus_nothing_to_do() {
    let (_dir, path) = corpus_file("[]");

    rummage()
        .arg("--corpus")
        .arg(&path)
        .arg("reindex")
        .assert()
        .success()
        .stdout(predicate::str::contains("No listings needed embedding."));
}

#[test]
fn test_search_blank_query_rejected() {
    let (_dir, path) = corpus_file("[]");

    rummage()
        .arg("--corpus")
        .arg(&path)
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search query must not be empty"));
}

#[test]
fn test_claim_check_rejects_malformed_id() {
    let (_dir, path) = corpus_file("[]");

    rummage()
        .arg("--corpus")
        .arg(&path)
        .args(["claim-check", "not-a-uuid", "that bag is mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
