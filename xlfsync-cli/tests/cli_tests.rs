use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn xlfsync_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("xlfsync"))
}

const RESX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root>
  <data name="Hello" xml:space="preserve">
    <value>Hello</value>
  </data>
</root>
"#;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small source tree with one artifact of every kind plus files that must
/// be left alone.
fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(&root.join("src").join("Strings.resx"), RESX);
    write(&root.join("src").join("Strings.de.resx"), RESX);
    write(
        &root.join("src").join("LocalizableStrings.cs"),
        r#"class LocalizableStrings { public const string Usage = "Usage"; }"#,
    );
    write(
        &root.join("src").join("Menus.vsct"),
        r#"<CommandTable><Button id="cmdFoo"><Strings><ButtonText>Run</ButtonText></Strings></Button></CommandTable>"#,
    );
    write(
        &root.join("src").join("Rules").join("General.xaml"),
        r#"<Rule Name="General" DisplayName="General" />"#,
    );
    write(
        &root.join("src").join("Views").join("Main.xaml"),
        r#"<Window Name="Main" DisplayName="Main" />"#,
    );
    write(&root.join("bin").join("Debug").join("Copied.resx"), RESX);
    write(&root.join("TestAssets").join("Fixture.resx"), RESX);
    dir
}

#[test]
fn test_converts_tree() {
    let dir = sample_tree();
    let output = xlfsync_cmd()
        .args(["--languages", "de,fr"])
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4 artifacts"), "unexpected summary: {stdout}");

    let xlf = dir.path().join("src").join("xlf");
    for name in [
        "Strings.de.xlf",
        "Strings.fr.xlf",
        "Strings.xlf",
        "LocalizableStrings.de.xlf",
        "Menus.vsct.de.xlf",
        "Menus.vsct.xlf",
    ] {
        assert!(xlf.join(name).exists(), "missing {name}");
    }
    assert!(dir.path().join("src").join("Rules").join("xlf").join("General.xaml.fr.xlf").exists());
    assert!(!dir.path().join("src").join("Views").join("xlf").exists());
    assert!(!dir.path().join("bin").join("Debug").join("xlf").exists());
    assert!(!dir.path().join("TestAssets").join("xlf").exists());
    assert!(!xlf.join("Strings.de.de.xlf").exists());
}

#[test]
fn test_two_way_and_json_report() {
    let dir = sample_tree();
    let output = xlfsync_cmd()
        .args(["--two-way", "--json", "-l", "ja"])
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["artifacts"], 4);
    assert_eq!(report["localized_written"], 3);
    assert!(dir.path().join("src").join("Strings.ja.resx").exists());
    assert!(dir.path().join("src").join("Menus.ja.vsct").exists());
    assert!(dir.path().join("src").join("Rules").join("ja").join("General.xaml").exists());
}

#[test]
fn test_settings_file() {
    let dir = sample_tree();
    fs::write(
        dir.path().join("xlfsync.toml"),
        "languages = [\"it\"]\nxlf_directory = \"loc\"\n",
    )
    .unwrap();

    let output = xlfsync_cmd()
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert!(dir.path().join("src").join("loc").join("Strings.it.xlf").exists());
    assert!(!dir.path().join("src").join("xlf").exists());
}

#[test]
fn test_malformed_artifact_does_not_fail_run() {
    let dir = sample_tree();
    write(&dir.path().join("src").join("Broken.resx"), "<root><data>");

    let output = xlfsync_cmd()
        .args(["-l", "de"])
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Broken.resx"));
    assert!(dir.path().join("src").join("xlf").join("Strings.de.xlf").exists());
}

#[test]
fn test_invalid_language_fails() {
    let dir = sample_tree();
    let output = xlfsync_cmd()
        .args(["-l", "not a tag"])
        .arg(dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid configuration"));
}

#[test]
fn test_missing_root_fails() {
    let output = xlfsync_cmd()
        .arg("/definitely/not/here")
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a directory"));
}
