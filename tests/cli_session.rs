use predicates::prelude::*;

#[test]
fn logout_clears_the_session_and_reports_it() {
    let store = tempfile::TempDir::new().expect("create store dir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("helpcenter");
    cmd.args(["--store-dir", store.path().to_str().unwrap(), "logout"])
        .assert()
        .success()
        .stdout("logged out\n");
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let store = tempfile::TempDir::new().expect("create store dir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("helpcenter");
    cmd.env("RUST_LOG", "debug")
        .args(["--store-dir", store.path().to_str().unwrap(), "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn guide_against_an_unreachable_backend_fails_cleanly() {
    let store = tempfile::TempDir::new().expect("create store dir");

    // Nothing listens on this port; the command must fail with the view
    // layer's load error rather than a panic.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("helpcenter");
    cmd.args([
        "--api-base",
        "http://127.0.0.1:9",
        "--store-dir",
        store.path().to_str().unwrap(),
        "guide",
        "--path",
        "/help/network/wifi",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load content"));
}

#[test]
fn unknown_guide_path_is_reported_as_not_found() {
    let store = tempfile::TempDir::new().expect("create store dir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("helpcenter");
    cmd.args([
        "--api-base",
        "http://127.0.0.1:9",
        "--store-dir",
        store.path().to_str().unwrap(),
        "guide",
        "--path",
        "/no/such/guide",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Content not found"));
}
