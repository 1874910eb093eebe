use std::io;
use std::path::PathBuf;

use serde_json::json;

use super::body_text;
use super::HarnessError;

#[test]
fn it_renders_auth_errors() {
    let err = HarnessError::Auth {
        status: 500,
        body: body_text(&json!({"message": "Internal error"})),
    };

    insta::assert_snapshot!(err.to_string(), @r###"Login failed with status 500: {"message":"Internal error"}"###);
}

#[test]
fn it_renders_plain_string_bodies_unquoted() {
    assert_eq!(body_text(&json!("Bad Gateway")), "Bad Gateway");
}

#[test]
fn it_renders_report_write_errors_with_path() {
    let err = HarnessError::ReportWrite {
        path: PathBuf::from("/nope/report.json"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
    };

    insta::assert_snapshot!(err.to_string(), @"Failed to write report to /nope/report.json: permission denied");
}
