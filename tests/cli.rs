//! End-to-end tests for the `hostvault` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "correct horse battery staple";
const PLAINTEXT: &str = "hunter2-api-token";

// Produced by an independent AES-GCM implementation (salt 00..1f, iv a0..af).
const VECTOR_JSON: &str = r#"{"encrypted":"PXK2m6r98JKcS36sBb0MiLQ=","iv":"oKGio6SlpqeoqaqrrK2urw==","tag":"ltgSlarmv+1K7SGgDuvtAQ==","salt":"AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8="}"#;

fn hostvault(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hostvault").unwrap();
    cmd.env("HOSTVAULT_DATA_DIR", dir.path())
        .env_remove("HOSTVAULT_PASSWORD")
        .env_remove("HOSTVAULT_MASTER_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn encrypt_then_decrypt_with_password() {
    let dir = TempDir::new().unwrap();

    let record = stdout_of(
        hostvault(&dir)
            .args(["encrypt", PLAINTEXT])
            .env("HOSTVAULT_PASSWORD", PASSWORD),
    );
    let json: serde_json::Value = serde_json::from_str(&record).unwrap();
    for field in ["encrypted", "iv", "tag", "salt"] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }

    hostvault(&dir)
        .args(["decrypt", &record])
        .env("HOSTVAULT_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(format!("{}\n", PLAINTEXT));
}

#[test]
fn decrypts_record_from_other_client_via_stdin() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .arg("decrypt")
        .args(["--password", PASSWORD])
        .write_stdin(format!("{}\n", VECTOR_JSON))
        .assert()
        .success()
        .stdout(format!("{}\n", PLAINTEXT));
}

#[test]
fn wrong_password_fails_without_detail() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .args(["decrypt", VECTOR_JSON, "--password", "not it"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Authentication failed: wrong password or tampered data",
        ));
}

#[test]
fn malformed_record_is_rejected() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .args(["decrypt", r#"{"encrypted":"AAAA"}"#, "--password", PASSWORD])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed record"));
}

#[test]
fn raw_key_round_trip() {
    let dir = TempDir::new().unwrap();

    let key = stdout_of(hostvault(&dir).arg("generate-key"));
    assert_eq!(key.len(), 44);

    let record = stdout_of(
        hostvault(&dir)
            .args(["encrypt", "serial:/dev/ttyUSB0"])
            .env("HOSTVAULT_MASTER_KEY", &key),
    );
    let json: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert!(json.get("salt").is_none());

    hostvault(&dir)
        .args(["decrypt", &record, "--key", &key])
        .assert()
        .success()
        .stdout("serial:/dev/ttyUSB0\n");
}

#[test]
fn key_takes_precedence_over_exported_password() {
    let dir = TempDir::new().unwrap();
    let key = stdout_of(hostvault(&dir).arg("generate-key"));

    let record = stdout_of(
        hostvault(&dir)
            .args(["encrypt", "ssh-pass", "--key", &key])
            .env("HOSTVAULT_PASSWORD", PASSWORD),
    );
    let json: serde_json::Value = serde_json::from_str(&record).unwrap();
    assert!(json.get("salt").is_none());

    hostvault(&dir)
        .args(["decrypt", &record])
        .env("HOSTVAULT_PASSWORD", PASSWORD)
        .env("HOSTVAULT_MASTER_KEY", &key)
        .assert()
        .success()
        .stdout("ssh-pass\n");
}

#[test]
fn hash_and_verify_password() {
    let dir = TempDir::new().unwrap();

    let record = stdout_of(hostvault(&dir).args(["hash-password", "--password", "open sesame"]));
    let (salt, hash) = record.split_once(':').unwrap();
    assert_eq!((salt.len(), hash.len()), (32, 128));

    hostvault(&dir)
        .args(["verify-password", &record, "--password", "open sesame"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Password matches."));

    hostvault(&dir)
        .args(["verify-password", &record, "--password", "open sesame!"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Password does not match."));
}

#[test]
fn malformed_password_record_does_not_match() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .args(["verify-password", "deadbeef", "--password", "x"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Password does not match."));
}

#[test]
fn master_password_lifecycle() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .args(["master", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT SET"));

    hostvault(&dir)
        .args(["master", "set", "--password", "short"])
        .assert()
        .failure();

    hostvault(&dir)
        .args(["master", "set", "--password", "a long master password"])
        .assert()
        .success();

    assert!(dir.path().join("config.json").exists());

    hostvault(&dir)
        .args(["master", "verify"])
        .env("HOSTVAULT_PASSWORD", "a long master password")
        .assert()
        .success()
        .stdout(predicate::str::contains("correct"));

    hostvault(&dir)
        .args(["master", "verify", "--password", "wrong master password"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("incorrect"));

    hostvault(&dir).args(["master", "clear"]).assert().success();

    hostvault(&dir)
        .args(["master", "verify", "--password", "a long master password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No master password set"));
}

#[test]
fn config_shows_protocol_parameters() {
    let dir = TempDir::new().unwrap();

    hostvault(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("16-byte IV"))
        .stdout(predicate::str::contains("100000 iterations"));
}
