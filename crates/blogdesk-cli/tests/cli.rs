use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tmp dir"),
        }
    }

    fn session_file(&self) -> std::path::PathBuf {
        self.dir.path().join("session.json")
    }

    fn command(&self, api_url: &str) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("blogdesk"));
        cmd.env("BLOGDESK_API_URL", api_url)
            .env("BLOGDESK_CONFIG", self.dir.path().join("config.json"))
            .env("BLOGDESK_SESSION_FILE", self.session_file())
            .env_remove("BLOGDESK_PASSWORD")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn status_without_session_is_anonymous() {
    let ws = Workspace::new();
    ws.command("http://localhost:8080")
        .arg("status")
        .assert()
        .success()
        .stdout(contains("\"isAuthenticated\": false"))
        .stdout(contains("\"ready\": true"));
}

#[test]
fn status_restores_persisted_token() {
    let ws = Workspace::new();
    std::fs::write(ws.session_file(), r#"{"token":"abc123"}"#).unwrap();

    let assert = ws
        .command("http://localhost:8080")
        .arg("status")
        .assert()
        .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"isAuthenticated\": true"));
    assert!(output.contains("<redacted>"));
    assert!(!output.contains("abc123"));
}

#[test]
fn login_then_requests_carry_token_then_logout() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/v1/auth/login")
            .json_body(json!({"email": "a@b.com", "password": "right"}));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"token": "xyz", "expiresIn": 86400}));
    });
    let categories = server.mock(|when, then| {
        when.method("GET")
            .path("/api/v1/categories")
            .header("authorization", "Bearer xyz");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([{"id": "c1", "name": "Rust", "postCount": 2}]));
    });

    let ws = Workspace::new();
    ws.command(&server.base_url())
        .env("BLOGDESK_PASSWORD", "right")
        .args(["login", "--email", "a@b.com"])
        .assert()
        .success()
        .stdout(contains("Logged in as a@b.com"));
    login.assert();

    let persisted = std::fs::read_to_string(ws.session_file()).unwrap();
    assert!(persisted.contains("xyz"));

    let config = std::fs::read_to_string(ws.dir.path().join("config.json")).unwrap();
    assert!(config.contains("a@b.com"));

    ws.command(&server.base_url())
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("Rust\t2 posts"));
    categories.assert();

    ws.command(&server.base_url())
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logged out"));
    assert!(!ws.session_file().exists());
}

#[test]
fn rejected_login_fails_and_persists_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/v1/auth/login");
        then.status(401).body("Bad credentials");
    });

    let ws = Workspace::new();
    ws.command(&server.base_url())
        .env("BLOGDESK_PASSWORD", "wrong")
        .args(["login", "--email", "a@b.com"])
        .assert()
        .failure()
        .stderr(contains("Invalid email or password"));
    assert!(!ws.session_file().exists());
}
