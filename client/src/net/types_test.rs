use super::*;

#[test]
fn auth_response_deserializes_login_body() {
    let body = serde_json::json!({
        "access_token": "tok-123",
        "token_type": "bearer",
        "user": { "id": 7, "email": "ada@example.com", "username": "ada" }
    });
    let parsed: AuthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.access_token, "tok-123");
    assert_eq!(parsed.token_type, "bearer");
    assert_eq!(
        parsed.user,
        User { id: 7, email: "ada@example.com".to_owned(), username: "ada".to_owned() }
    );
}

#[test]
fn generated_report_deserializes() {
    let body = serde_json::json!({
        "filename": "report_ai.pdf",
        "download_url": "/download/report_ai.pdf",
        "message": "Report generated"
    });
    let parsed: GeneratedReport = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.filename, "report_ai.pdf");
    assert_eq!(parsed.download_url, "/download/report_ai.pdf");
}

#[test]
fn signup_request_serializes_all_fields() {
    let req = SignupRequest { email: "a@b.com", username: "ab", password: "pw" };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, serde_json::json!({ "email": "a@b.com", "username": "ab", "password": "pw" }));
}

#[test]
fn error_detail_reads_string_detail() {
    assert_eq!(error_detail(r#"{"detail":"Email already registered"}"#), Some("Email already registered".to_owned()));
}

#[test]
fn error_detail_ignores_structured_detail() {
    assert_eq!(error_detail(r#"{"detail":[{"loc":["body","topic"],"msg":"field required"}]}"#), None);
}

#[test]
fn error_detail_ignores_non_json() {
    assert_eq!(error_detail("Internal Server Error"), None);
    assert_eq!(error_detail(""), None);
}
