//! Integration tests for the CSRF guard

use csrfp_audit::AttackRecord;
use csrfp_core::{HttpRequest, RequestType};
use csrfp_guard::*;
use csrfp_session::Session;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn new_session() -> Session {
    Session::new("integration", Duration::from_secs(600))
}

fn stored(session: &mut Session, key: &str) -> Vec<String> {
    TokenStore::new(session, key).tokens().unwrap_or_default()
}

#[test]
fn test_issued_tokens_validate_until_superseded() {
    let generator = TokenGenerator::new();
    let mut session = new_session();
    let issued: Vec<Token> = (0..5).map(|_| generator.generate(16)).collect();

    let mut store = TokenStore::new(&mut session, "csrfp_token");
    for token in &issued {
        store.issue(token);
    }

    assert!(!store.validate_and_consume("never-issued"));

    assert!(store.validate_and_consume(issued[2].as_str()));
    for older in &issued[..2] {
        assert!(!store.contains(older.as_str()));
        assert!(!store.validate_and_consume(older.as_str()));
    }
    for newer in &issued[2..] {
        assert!(store.contains(newer.as_str()));
    }
}

#[test]
fn test_allowlist_is_pure() {
    let allowlist = UrlAllowlist::new(["*://example.com/admin/*", "/account/*/close"]).unwrap();
    let urls = [
        "https://example.com/admin/users",
        "http://example.com/public",
        "http://shop.example/account/7/close",
    ];

    let first: Vec<bool> = urls
        .iter()
        .map(|u| allowlist.requires_get_validation(u))
        .collect();
    let second: Vec<bool> = urls
        .iter()
        .map(|u| allowlist.requires_get_validation(u))
        .collect();

    assert_eq!(first, vec![true, false, true]);
    assert_eq!(first, second);
}

#[test]
fn test_generated_length_bounds() {
    for source in [TokenSource::Sha512, TokenSource::Alphanumeric] {
        let generator = TokenGenerator::with_source(source);
        for length in [0usize, 1, 10, 32, 100, 128, 129, 1000] {
            assert_eq!(generator.generate(length).len(), effective_length(length));
        }
    }
}

#[tokio::test]
async fn test_attack_written_to_log_directory() {
    let dir = TempDir::new().unwrap();
    let config = CsrfpConfig::new(dir.path(), FailedAuthAction::new(0, 0));
    let engine = AuthorizationEngine::from_config(config).unwrap();

    let mut session = new_session();
    let mut request = HttpRequest::new("POST", "/transfer?via=form")
        .with_header("Host", "bank.example")
        .with_body_param("amount", "100")
        .with_body_param("password", "hunter2")
        .with_body_param("csrfp_token", "forged");

    let protection = engine.protect(&mut request, &mut session).await.unwrap();
    assert_eq!(protection.short_circuit().unwrap().status, 403);

    let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
    let content = fs::read_to_string(entry.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: AttackRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record.host, "bank.example");
    assert_eq!(record.request_uri, "/transfer?via=form");
    assert_eq!(record.request_type, RequestType::Post);
    assert_eq!(record.query["csrfp_token"], "forged");
    assert_eq!(record.query["password"], csrfp_audit::MASK);
}

#[tokio::test]
async fn test_missing_log_directory_aborts_request() {
    let dir = TempDir::new().unwrap();
    let config = CsrfpConfig::new(dir.path().join("gone"), FailedAuthAction::new(0, 0));
    let engine = AuthorizationEngine::from_config(config).unwrap();

    let mut session = new_session();
    let mut request = HttpRequest::new("POST", "/transfer");

    let result = engine.protect(&mut request, &mut session).await;
    assert!(matches!(result, Err(CsrfpError::LogDestinationUnavailable(_))));
}

#[tokio::test]
async fn test_failure_codes_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cases = [
        (0, Some(403)),
        (1, None),
        (2, Some(302)),
        (3, Some(200)),
        (4, Some(500)),
        (9, None),
    ];

    for (code, expected_status) in cases {
        let config = CsrfpConfig::new(dir.path(), FailedAuthAction::new(0, code))
            .with_error_redirection_page("https://example.com/denied")
            .with_custom_error_message("rejected");
        let engine = AuthorizationEngine::from_config(config).unwrap();
        let mut session = new_session();
        let mut request = HttpRequest::new("POST", "/").with_body_param("field", "value");

        let protection = engine.protect(&mut request, &mut session).await.unwrap();

        assert_eq!(
            protection.short_circuit().map(|r| r.status),
            expected_status,
            "action code {code}"
        );
        assert_eq!(
            request.body_params.is_empty(),
            expected_status.is_none(),
            "action code {code}"
        );
    }
}

#[tokio::test]
async fn test_config_file_drives_engine() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("logs");
    fs::create_dir(&log_dir).unwrap();
    let path = dir.path().join("csrfp.toml");
    fs::write(
        &path,
        format!(
            r#"
tokenName = "anti_forgery"
tokenLength = "0"
verifyGetFor = ["*/admin/*"]
logDirectory = "{}"

[failedAuthAction]
GET = 4
POST = 0
"#,
            log_dir.display()
        ),
    )
    .unwrap();

    let config = CsrfpConfig::load(&path).unwrap();
    assert_eq!(config.token_name, "anti_forgery");
    let engine = AuthorizationEngine::from_config(config).unwrap();

    let mut session = new_session();
    let mut request = HttpRequest::new("GET", "/home").with_header("Host", "example.com");
    let protection = engine.protect(&mut request, &mut session).await.unwrap();
    let token = protection.refreshed.unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(stored(&mut session, "anti_forgery"), vec![token.as_str()]);

    let mut request = HttpRequest::new("GET", "/admin/purge").with_header("Host", "example.com");
    let protection = engine.protect(&mut request, &mut session).await.unwrap();
    assert_eq!(protection.short_circuit().unwrap().status, 500);

    let mut request = HttpRequest::new("GET", &format!("/admin/purge?anti_forgery={}", token))
        .with_header("Host", "example.com");
    let protection = engine.protect(&mut request, &mut session).await.unwrap();
    assert_eq!(protection.verdict, Verdict::Pass);
}

#[test]
fn test_incomplete_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("csrfp.json");
    fs::write(&path, r#"{"tokenLength": 12}"#).unwrap();

    assert!(matches!(
        CsrfpConfig::load(&path),
        Err(CsrfpError::Configuration(_))
    ));
}
