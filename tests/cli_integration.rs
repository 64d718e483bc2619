//! CLI integration tests
//!
//! Tests the command-line interface end-to-end.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Iteration count for tests that do not involve fixtures made with the default.
const FAST_ITERATIONS: &str = "1000";

/// Run sealcrypt with the secret supplied on stdin
fn run_with_secret(args: &[&str], secret: &str) -> std::io::Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sealcrypt"))
        .arg("--secret-stdin")
        .args(args)
        .env_remove("SEALCRYPT_ITERATIONS")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // Ignore BrokenPipe errors - the command may exit before reading stdin
        // if it encounters an error (e.g., file not found)
        let _ = stdin.write_all(secret.as_bytes());
    }

    child.wait_with_output()
}

fn run_fast(command: &str, input: &Path, output: &Path, secret: &str) -> Output {
    run_with_secret(
        &[
            "--iterations",
            FAST_ITERATIONS,
            command,
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        secret,
    )
    .unwrap()
}

/// Get path to testdata directory
fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

/// Decrypt a known envelope made with the default iteration count.
#[test]
fn test_decrypt_known_envelope() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello-decrypted.txt");

    let result = run_with_secret(
        &[
            "decrypt",
            "-i",
            testdata_path("hello.txt.sealed").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();

    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let decrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();
    assert_eq!(decrypted, expected);
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = testdata_path("hello.txt");
    let encrypted_path = temp_dir.path().join("hello.txt.sealed");
    let decrypted_path = temp_dir.path().join("hello-decrypted.txt");

    let result = run_fast("encrypt", &plaintext_path, &encrypted_path, "test");
    assert!(
        result.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let result = run_fast("decrypt", &encrypted_path, &decrypted_path, "test");
    assert!(
        result.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let original = fs::read_to_string(&plaintext_path).unwrap();
    let decrypted = fs::read_to_string(&decrypted_path).unwrap();
    assert_eq!(original, decrypted);
}

#[test]
fn test_aliases_and_trailing_newline_in_secret() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = temp_dir.path().join("amount.txt");
    let encrypted_path = temp_dir.path().join("amount.txt.sealed");
    let decrypted_path = temp_dir.path().join("amount-decrypted.txt");
    fs::write(&plaintext_path, "42.50").unwrap();

    assert!(run_fast("e", &plaintext_path, &encrypted_path, "correct-secret\n").status.success());
    assert!(run_fast("d", &encrypted_path, &decrypted_path, "correct-secret").status.success());
    assert_eq!(fs::read_to_string(&decrypted_path).unwrap(), "42.50");
}

#[test]
fn test_update_operation() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.sealed");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext1, "Original content").unwrap();
    assert!(run_fast("encrypt", &plaintext1, &encrypted, "test").status.success());

    fs::write(&plaintext2, "Updated content").unwrap();
    let result = run_fast("update", &plaintext2, &encrypted, "test");
    assert!(
        result.status.success(),
        "update failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    assert!(run_fast("decrypt", &encrypted, &decrypted, "test").status.success());
    assert_eq!(fs::read_to_string(&decrypted).unwrap(), "Updated content");
}

#[test]
fn test_update_with_wrong_secret_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.txt.sealed");

    fs::write(&plaintext1, "Original").unwrap();
    assert!(run_fast("encrypt", &plaintext1, &encrypted, "correct").status.success());
    let before = fs::read_to_string(&encrypted).unwrap();

    fs::write(&plaintext2, "Updated").unwrap();
    let result = run_fast("update", &plaintext2, &encrypted, "wrong");
    assert!(!result.status.success());
    assert_eq!(fs::read_to_string(&encrypted).unwrap(), before);
}

#[test]
fn test_wrong_secret_and_garbage_report_same_error() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let encrypted = temp_dir.path().join("plain.txt.sealed");
    let garbage = temp_dir.path().join("garbage.sealed");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext, "secret").unwrap();
    fs::write(&garbage, "not-base64!!").unwrap();
    assert!(run_fast("encrypt", &plaintext, &encrypted, "correct").status.success());

    let wrong = run_fast("decrypt", &encrypted, &decrypted, "wrong");
    let malformed = run_fast("decrypt", &garbage, &decrypted, "correct");

    assert_eq!(wrong.status.code(), Some(1));
    assert_eq!(malformed.status.code(), Some(1));
    assert_eq!(wrong.stderr, malformed.stderr);
    assert_eq!(
        String::from_utf8_lossy(&wrong.stderr).trim(),
        "Error: could not decrypt: check secret or data"
    );
    assert!(!decrypted.exists());
}

#[test]
fn test_non_utf8_envelope_reports_decrypt_failure() {
    let temp_dir = TempDir::new().unwrap();
    let binary = temp_dir.path().join("binary.sealed");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&binary, [0xffu8, 0xfe, 0x00, 0x41]).unwrap();

    let result = run_fast("decrypt", &binary, &decrypted, "correct");
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&result.stderr).trim(),
        "Error: could not decrypt: check secret or data"
    );
    assert!(!decrypted.exists());
}

#[test]
fn test_mismatched_iterations_fail() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let encrypted = temp_dir.path().join("plain.txt.sealed");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext, "secret").unwrap();
    assert!(run_fast("encrypt", &plaintext, &encrypted, "test").status.success());

    let result = run_with_secret(
        &[
            "--iterations",
            "2000",
            "decrypt",
            "-i",
            encrypted.to_str().unwrap(),
            "-o",
            decrypted.to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert!(!result.status.success());
}

#[test]
fn test_empty_secret_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    let encrypted = temp_dir.path().join("plain.txt.sealed");

    fs::write(&plaintext, "secret").unwrap();
    let result = run_fast("encrypt", &plaintext, &encrypted, "");
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("non-empty secret"));
    assert!(!encrypted.exists());
}

#[test]
fn test_zero_iterations_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("plain.txt");
    fs::write(&plaintext, "secret").unwrap();

    let result = run_with_secret(
        &[
            "--iterations",
            "0",
            "encrypt",
            "-i",
            plaintext.to_str().unwrap(),
            "-o",
            temp_dir.path().join("out").to_str().unwrap(),
        ],
        "test",
    )
    .unwrap();
    assert!(!result.status.success());
}

#[test]
fn test_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = run_fast(
        "encrypt",
        &temp_dir.path().join("does-not-exist.txt"),
        &temp_dir.path().join("out.sealed"),
        "test",
    );
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("failed to read from"));
}

#[test]
fn test_no_command_shows_usage() {
    let result = Command::new(env!("CARGO_BIN_EXE_sealcrypt"))
        .output()
        .unwrap();
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Usage"));
}
