use assert_cmd::Command;

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("trackcurate").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn subcommand_help_smoke() {
    for sub in ["detect", "curate", "align"] {
        let mut cmd = Command::cargo_bin("trackcurate").unwrap();
        cmd.args([sub, "--help"]);
        cmd.assert().success();
    }
}
