use super::*;

#[test]
fn from_values_defaults_api_url() {
    let cfg = ClientConfig::from_values(None, Some(Path::new("/tmp/s.json"))).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/s.json"));
}

#[test]
fn from_values_trims_trailing_slashes() {
    let cfg = ClientConfig::from_values(Some("https://reports.example.test/api//"), Some(Path::new("t.json"))).unwrap();
    assert_eq!(cfg.api_url, "https://reports.example.test/api");
}

#[test]
fn from_values_rejects_non_http_url() {
    let err = ClientConfig::from_values(Some("ftp://example.test"), Some(Path::new("t.json"))).unwrap_err();
    assert!(err.to_string().contains(API_URL_VAR));
    assert!(matches!(err, ConfigError::InvalidValue { var: API_URL_VAR, .. }));
}

#[test]
fn default_token_file_lives_under_app_dir() {
    if let Some(path) = default_token_file() {
        assert!(path.ends_with("report-client/session.json"));
    }
}

#[test]
fn env_values_apply_unless_flag_given() {
    // Only this test touches these variables.
    unsafe {
        std::env::set_var(API_URL_VAR, "http://127.0.0.1:9000/");
        std::env::set_var(TOKEN_FILE_VAR, "/tmp/report-client-test.json");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/report-client-test.json"));

    let cfg = ClientConfig::resolve(Some("https://flag.example.test"), None).unwrap();
    assert_eq!(cfg.api_url, "https://flag.example.test");
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/report-client-test.json"));

    let cfg = ClientConfig::resolve(None, Some(Path::new("/tmp/flag.json"))).unwrap();
    assert_eq!(cfg.api_url, "http://127.0.0.1:9000");
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/flag.json"));

    unsafe {
        std::env::remove_var(API_URL_VAR);
        std::env::remove_var(TOKEN_FILE_VAR);
    }
}
