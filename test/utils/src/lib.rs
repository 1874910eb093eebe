use serde_json::json;

/// Body returned by `/api/login` for a successful demo login.
pub fn login_body(username: &str, role: &str) -> String {
    return json!({
        "id": 1,
        "username": username,
        "role": role,
    })
    .to_string();
}

/// Body returned by `/api/chat` for an assistant reply.
pub fn chat_body(content: &str) -> String {
    return json!({
        "message": {
            "id": 42,
            "role": "assistant",
            "content": content,
        }
    })
    .to_string();
}

pub fn script_fixture() -> &'static str {
    return r#"
Hello, is anyone there?

How do I publish an announcement?
Which departments are registered?
"#
    .trim_start();
}
