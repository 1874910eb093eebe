use std::io::Write;

use anyhow::Result;
use test_utils::script_fixture;

use super::Script;

#[test]
fn it_has_fifteen_default_messages() {
    let script = Script::default();
    assert_eq!(script.len(), 15);
    assert_eq!(script.take(15).len(), 15);
}

#[test]
fn it_cycles_when_taking_more_than_available() -> Result<()> {
    let script = Script::parse("a\nb\nc")?;
    assert_eq!(script.take(7), vec!["a", "b", "c", "a", "b", "c", "a"]);
    assert_eq!(script.take(2), vec!["a", "b"]);
    assert!(script.take(0).is_empty());
    return Ok(());
}

#[test]
fn it_parses_skipping_blank_lines() -> Result<()> {
    let script = Script::parse(script_fixture())?;
    assert_eq!(
        script.take(3),
        vec![
            "Hello, is anyone there?",
            "How do I publish an announcement?",
            "Which departments are registered?",
        ]
    );
    return Ok(());
}

#[test]
fn it_rejects_empty_scripts() {
    let err = Script::parse("\n   \n").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Script has no messages");
}

#[tokio::test]
async fn it_loads_from_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "first\nsecond")?;

    let script = Script::load(file.path()).await?;
    assert_eq!(script.take(2), vec!["first", "second"]);
    return Ok(());
}
