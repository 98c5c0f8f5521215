use predicates::prelude::*;

#[test]
fn test_help_describes_config_argument() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("sizelogd");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CONFIG"))
        .stdout(predicate::str::contains("config.txt"))
        .stdout(predicate::str::contains("--version"))
        .stdout(predicate::str::contains("--help"));
}

#[test]
fn test_help_mentions_control_signals() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("sizelogd");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SIGHUP"))
        .stdout(predicate::str::contains("SIGTERM"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("sizelogd");
    cmd.arg("--foreground");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--foreground"));
}
