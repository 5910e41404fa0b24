#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

const API_KEY: &str = "API-XXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
const OCTOPUS_VARS: &[&str] = &[
    "OCTOPUS_URL",
    "OCTOPUS_API_KEY",
    "OCTOPUS_ACCESS_TOKEN",
    "OCTOPUS_SPACE",
    "OCTOPUS_NO_PROMPT",
    "RUST_LOG",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    headers: HashMap<String, String>,
}

/// A one-request-per-connection HTTP server answering GETs from a fixed route table.
struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    fn start(routes: &[(&str, u16, String)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.clone())))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                let (status, body) = routes.get(&request.path).cloned().unwrap_or_else(|| {
                    (404, json!({"ErrorMessage": "not found"}).to_string())
                });
                recorded.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { url, requests }
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    fn first_request(&self) -> Recorded {
        self.requests.lock().unwrap()[0].clone()
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let text = String::from_utf8_lossy(&buffer);
    let mut lines = text.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();
    Some(Recorded { path, headers })
}

fn root() -> String {
    json!({
        "Application": "Octopus Deploy",
        "Version": "2023.1.0",
        "ApiVersion": "3.0.0",
        "Links": {"Self": "/api"}
    })
    .to_string()
}

fn spaces() -> String {
    json!([
        {"Id": "Spaces-1", "Name": "Default", "IsDefault": true},
        {"Id": "Spaces-2", "Name": "Integrations", "IsDefault": false}
    ])
    .to_string()
}

fn space_root(id: &str) -> String {
    json!({"Links": {"Self": format!("/api/spaces/{}", id)}}).to_string()
}

fn octopus_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("octopus"));
    for var in OCTOPUS_VARS {
        cmd.env_remove(var);
    }
    cmd.env("OCTOPUS_CONFIG_DIR", config_dir).env("NO_COLOR", "1");
    cmd
}

fn connected_cmd(server: &StubServer, config_dir: &Path) -> Command {
    let mut cmd = octopus_cmd(config_dir);
    cmd.env("OCTOPUS_URL", &server.url)
        .env("OCTOPUS_API_KEY", API_KEY);
    cmd
}

#[test]
fn test_space_list_uses_system_client() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[("/api", 200, root()), ("/api/spaces/all", 200, spaces())]);

    connected_cmd(&server, temp.path())
        .args(["space", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spaces-1  Default (default)"))
        .stdout(predicate::str::contains("Spaces-2  Integrations"));

    assert_eq!(server.paths(), vec!["/api", "/api/spaces/all"]);
    let first = server.first_request();
    assert_eq!(first.headers.get("x-octopus-apikey").map(String::as_str), Some(API_KEY));
    assert!(first.headers["user-agent"].contains("(space list)"));
}

#[test]
fn test_missing_space_fails_without_listing_when_not_interactive() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[("/api", 200, root()), ("/api/spaces/all", 200, spaces())]);

    connected_cmd(&server, temp.path())
        .args(["deployment-target", "azure-web-app", "list", "--no-prompt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: partition must be specified when not running interactively; please set it via the environment variable or the command line.",
        ));

    assert_eq!(server.paths(), vec!["/api"]);
}

#[test]
fn test_spaced_command_resolves_space_by_name() {
    let temp = TempDir::new().unwrap();
    let machines = json!({
        "Items": [
            {"Id": "Machines-1", "Name": "web-prod", "Roles": ["web"], "HealthStatus": "Healthy"}
        ],
        "TotalResults": 1
    })
    .to_string();
    let server = StubServer::start(&[
        ("/api", 200, root()),
        ("/api/spaces/all", 200, spaces()),
        ("/api/Spaces-2", 200, space_root("Spaces-2")),
        ("/api/Spaces-2/machines?deploymentTargetTypes=AzureWebApp", 200, machines),
    ]);

    connected_cmd(&server, temp.path())
        .args(["deployment-target", "azure-web-app", "ls", "--space", "integrations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web-prod"))
        .stdout(predicate::str::contains("Healthy"));

    assert_eq!(
        server.paths(),
        vec![
            "/api",
            "/api/spaces/all",
            "/api",
            "/api/Spaces-2",
            "/api/Spaces-2/machines?deploymentTargetTypes=AzureWebApp",
        ]
    );
}

#[test]
fn test_space_from_environment() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[
        ("/api", 200, root()),
        ("/api/spaces/all", 200, spaces()),
        ("/api/Spaces-1", 200, space_root("Spaces-1")),
        (
            "/api/Spaces-1/machines?deploymentTargetTypes=AzureWebApp",
            200,
            json!({"Items": [], "TotalResults": 0}).to_string(),
        ),
    ]);

    connected_cmd(&server, temp.path())
        .env("OCTOPUS_SPACE", "Spaces-1")
        .args(["deployment-target", "azure-web-app", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No deployment targets found."));
}

#[test]
fn test_unknown_space_is_reported() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[("/api", 200, root()), ("/api/spaces/all", 200, spaces())]);

    connected_cmd(&server, temp.path())
        .args(["deployment-target", "azure-web-app", "list", "-s", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot find partition 'Nope'"));

    assert_eq!(server.paths(), vec!["/api", "/api/spaces/all"]);
}

#[test]
fn test_access_token_is_sent_as_bearer() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[("/api", 200, root())]);

    octopus_cmd(temp.path())
        .env("OCTOPUS_URL", &server.url)
        .env("OCTOPUS_ACCESS_TOKEN", "token")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Octopus Deploy 2023.1.0"))
        .stdout(predicate::str::contains(server.url.as_str()));

    let first = server.first_request();
    assert_eq!(
        first.headers.get("authorization").map(String::as_str),
        Some("Bearer token")
    );
    assert!(!first.headers.contains_key("x-octopus-apikey"));
}

#[test]
fn test_rejected_credential_is_reported() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[(
        "/api",
        401,
        json!({"ErrorMessage": "You must be logged in"}).to_string(),
    )]);

    connected_cmd(&server, temp.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));
}

#[test]
fn test_missing_server_url() {
    let temp = TempDir::new().unwrap();

    octopus_cmd(temp.path())
        .args(["space", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no server URL configured"));
}

#[test]
fn test_config_set_then_get() {
    let temp = TempDir::new().unwrap();

    octopus_cmd(temp.path())
        .args(["config", "space", "Integrations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("space updated"));

    octopus_cmd(temp.path())
        .args(["config", "space"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Integrations"));

    octopus_cmd(temp.path())
        .args(["config", "api-key", API_KEY])
        .assert()
        .success();

    octopus_cmd(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("api-key = API-********"))
        .stdout(predicate::str::contains(API_KEY).not());

    assert!(temp.path().join("cli_config.json").exists());
}

#[test]
fn test_config_rejects_unknown_key() {
    let temp = TempDir::new().unwrap();

    octopus_cmd(temp.path())
        .args(["config", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key 'colour'"));
}

#[test]
fn test_config_file_supplies_connection() {
    let temp = TempDir::new().unwrap();
    let server = StubServer::start(&[("/api", 200, root()), ("/api/spaces/all", 200, spaces())]);

    octopus_cmd(temp.path())
        .args(["config", "url", server.url.as_str()])
        .assert()
        .success();
    octopus_cmd(temp.path())
        .args(["config", "api-key", API_KEY])
        .assert()
        .success();

    octopus_cmd(temp.path())
        .args(["space", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Integrations"));
}
