//! Integration tests for the `modgraph` CLI.
#![cfg(feature = "cli")]

use std::fs;

use assert_cmd::Command;
use modgraph_catalog::{descriptor, Library};
use modgraph_repo::Repository;
use testresult::TestResult;

fn sample_info(text: &str) -> modgraph_types::ModuleInfo {
    descriptor::from_text(text).unwrap()
}

/// `modgraph resolve` against a library containing a single, dependence-free module
/// prints exactly one context for it.
#[test]
fn resolve_prints_single_context() -> TestResult {
    let dir = tempfile::tempdir()?;
    let library_path = dir.path().join("lib");
    let library = Library::create(&library_path)?;
    library.create_entry(&sample_info("module com.example.widget@1.0.0\n"))?;

    let mut cmd = Command::cargo_bin("modgraph")?;
    cmd.arg("--library-path")
        .arg(&library_path)
        .args(["resolve", "com.example.widget"]);
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(stdout.contains("context"));
    assert!(stdout.contains("com.example.widget@1.0.0"));
    Ok(())
}

/// `modgraph resolve` against a library with no matching module fails with the
/// documented resolution-failure exit code.
#[test]
fn resolve_missing_module_fails_with_code_2() -> TestResult {
    let dir = tempfile::tempdir()?;
    let library_path = dir.path().join("lib");
    Library::create(&library_path)?;

    let mut cmd = Command::cargo_bin("modgraph")?;
    cmd.arg("--library-path")
        .arg(&library_path)
        .args(["resolve", "com.example.missing"]);
    cmd.assert().failure().code(2);
    Ok(())
}

/// Packing a directory with a descriptor, then inspecting and verifying the
/// result, all succeed end to end.
#[test]
fn pack_then_inspect_and_verify_round_trip() -> TestResult {
    let dir = tempfile::tempdir()?;
    let input_dir = dir.path().join("input");
    fs::create_dir_all(input_dir.join("resources"))?;
    fs::write(input_dir.join("resources/icon.png"), b"fake-icon-bytes")?;
    let descriptor_path = dir.path().join("module.descriptor");
    fs::write(
        &descriptor_path,
        "module com.example.widget@1.0.0\nexport com.example.widget.api\n",
    )?;
    let output_path = dir.path().join("widget.modfile");

    Command::cargo_bin("modgraph")?
        .arg("pack")
        .arg(&input_dir)
        .arg(&descriptor_path)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let inspect = Command::cargo_bin("modgraph")?
        .arg("inspect")
        .arg(&output_path)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&inspect.get_output().stdout);
    assert!(stdout.contains("ModuleInfo"));
    assert!(stdout.contains("Resources"));

    let verify = Command::cargo_bin("modgraph")?
        .arg("verify")
        .arg(&output_path)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&verify.get_output().stdout);
    assert!(stdout.contains("all hashes verified"));
    Ok(())
}

/// `modgraph verify` reports a hash mismatch with exit code 5 when a module
/// file has been tampered with after packing.
#[test]
fn verify_detects_tampering_with_code_5() -> TestResult {
    let dir = tempfile::tempdir()?;
    let input_dir = dir.path().join("input");
    fs::create_dir_all(&input_dir)?;
    let descriptor_path = dir.path().join("module.descriptor");
    fs::write(&descriptor_path, "module com.example.widget@1.0.0\n")?;
    let output_path = dir.path().join("widget.modfile");

    Command::cargo_bin("modgraph")?
        .arg("pack")
        .arg(&input_dir)
        .arg(&descriptor_path)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let mut bytes = fs::read(&output_path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&output_path, bytes)?;

    Command::cargo_bin("modgraph")?
        .arg("verify")
        .arg(&output_path)
        .assert()
        .failure()
        .code(5);
    Ok(())
}

/// `modgraph catalog` on a freshly created, empty repository reports it as
/// consistent under `--validate` and lists no entries.
#[test]
fn catalog_on_empty_repository() -> TestResult {
    let dir = tempfile::tempdir()?;
    let repo_path = dir.path().join("repo");
    Repository::create(&repo_path)?;

    let output = Command::cargo_bin("modgraph")?
        .arg("catalog")
        .arg(&repo_path)
        .arg("--validate")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(stdout.contains("repository is consistent"));
    Ok(())
}
