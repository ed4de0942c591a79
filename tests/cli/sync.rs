use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const CONFIG: &str = r#"{
  "domain": "theme",
  "locales": ["languages/fr.po"]
}"#;

const FRENCH: &str = r#"msgid ""
msgstr ""
"Language: fr\n"

msgid "Hello"
msgstr "Bonjour"

msgid "Welcome"
msgstr "Bienvenue"
"#;

fn theme_project() -> Result<CliTest> {
    let test = CliTest::with_file(".potsyncrc.json", CONFIG)?;
    test.write_file(
        "src/app.js",
        "import { __ } from '@wordpress/i18n';\n\
         // translators: greeting on the front page\n\
         __( 'Hello', 'theme' );\n",
    )?;
    test.write_file("header.php", "<?php\n_e( 'Welcome', 'theme' );\n")?;
    test.write_file("templates/footer.twig", "<p>{{ __('Footer', 'theme') }}</p>\n")?;
    test.write_file(
        "style.css",
        "/*\nTheme Name: Sample Theme\nText Domain: theme\n*/\n",
    )?;
    test.write_file("languages/fr.po", FRENCH)?;
    Ok(test)
}

#[test]
fn test_sync_writes_template() -> Result<()> {
    let test = theme_project()?;

    let output = test.sync_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Synced 4 messages"));

    let pot = test.read_file("languages/messages.pot")?;
    assert!(pot.contains("#. translators: greeting on the front page\n#: src/app.js:3\nmsgid \"Hello\""));
    assert!(pot.contains("#: header.php:2\nmsgid \"Welcome\""));
    assert!(pot.contains("#: templates/footer.twig:1\nmsgid \"Footer\""));
    assert!(pot.contains("#. Theme Name of the theme\n"));
    assert!(pot.contains("msgid \"Sample Theme\""));

    Ok(())
}

#[test]
fn test_sync_updates_locale_and_compiles() -> Result<()> {
    let test = theme_project()?;

    let output = test.sync_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    let po = test.read_file("languages/fr.po")?;
    assert!(po.contains("\"Language: fr\\n\""));
    assert!(po.contains("msgid \"Hello\"\nmsgstr \"Bonjour\""));
    assert!(po.contains("msgid \"Footer\"\nmsgstr \"\""));

    assert!(test.root().join("languages/fr.mo").exists());

    let json_files = test.files_with_prefix("languages", "theme-fr-")?;
    assert_eq!(json_files.len(), 1);
    assert!(json_files[0].ends_with(".json"));
    let json = test.read_file(&format!("languages/{}", json_files[0]))?;
    assert!(json.contains("\"Hello\":[\"Bonjour\"]"));
    assert!(!json.contains("Bienvenue"));

    Ok(())
}

#[test]
fn test_sync_is_stable() -> Result<()> {
    let test = theme_project()?;

    test.sync_command().output()?;
    let first = test.read_file("languages/fr.po")?;
    test.sync_command().output()?;
    assert_eq!(test.read_file("languages/fr.po")?, first);

    Ok(())
}

#[test]
fn test_sync_dry_run_writes_nothing() -> Result<()> {
    let test = theme_project()?;

    let output = test.sync_command().arg("--dry-run").output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would write"));
    assert!(stdout.contains("(dry run)"));
    assert!(!test.root().join("languages/messages.pot").exists());
    assert_eq!(test.read_file("languages/fr.po")?, FRENCH);

    Ok(())
}

#[test]
fn test_sync_reports_missing_domain() -> Result<()> {
    let test = CliTest::with_file(".potsyncrc.json", CONFIG)?;
    test.write_file("app.js", "import { __ } from '@wordpress/i18n';\n__( 'Orphan' );\n")?;

    let output = test.sync_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("warning: \"Orphan\" has no text domain  missing-domain"));
    assert!(stdout.contains("--> app.js:2:1"));
    assert!(!test.read_file("languages/messages.pot")?.contains("Orphan"));

    let output = test.sync_command().arg("--deny-warnings").output()?;
    assert_eq!(output.status.code(), Some(1));

    Ok(())
}

#[test]
fn test_sync_domain_override() -> Result<()> {
    let test = CliTest::with_file("app.js", "import { __ } from '@wordpress/i18n';\n__( 'Plugin', 'plugin' );\n")?;

    let output = test.sync_command().args(["--domain", "plugin"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(test.read_file("languages/messages.pot")?.contains("msgid \"Plugin\""));

    Ok(())
}

#[test]
fn test_sync_invalid_config() -> Result<()> {
    let test = CliTest::with_file(".potsyncrc.json", "{ not json")?;

    let output = test.sync_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Failed to parse config file"));

    Ok(())
}
