#![allow(unused_crate_dependencies)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use repocard_lib::commands::card::{self, CardOutcome};
use repocard_lib::config::Settings;
use repocard_lib::domain::{
    EnvError, Environment, ErrorOrigin, HttpRequest, HttpResponse, LoadError, Transport,
    TransportError,
};
use repocard_lib::infrastructure::ProcessEnvironment;

/// In-memory environment: only the files and variables it was given exist.
#[derive(Debug, Default)]
struct MemoryEnvironment {
    files: RefCell<HashMap<PathBuf, Vec<(String, String)>>>,
    vars: RefCell<HashMap<String, String>>,
    reads: Cell<usize>,
}

impl MemoryEnvironment {
    fn with_file(self, path: PathBuf, vars: &[(&str, &str)]) -> Self {
        self.files.borrow_mut().insert(
            path,
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    fn with_var(self, key: &str, value: &str) -> Self {
        self.vars
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MemoryEnvironment {
    fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn load_file(&self, path: &Path) -> Result<(), LoadError> {
        let files = self.files.borrow();
        let vars = files
            .get(path)
            .ok_or_else(|| format!("{} not found", path.display()))?;
        let mut current = self.vars.borrow_mut();
        for (k, v) in vars {
            current.entry(k.clone()).or_insert_with(|| v.clone());
        }
        Ok(())
    }

    fn var(&self, key: &str) -> String {
        self.reads.set(self.reads.get() + 1);
        self.vars.borrow().get(key).cloned().unwrap_or_default()
    }
}

struct CannedTransport {
    status: u16,
    body: String,
    calls: Cell<usize>,
}

impl CannedTransport {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            calls: Cell::new(0),
        }
    }
}

impl Transport for CannedTransport {
    fn post(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.set(self.calls.get() + 1);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone().into_bytes(),
        })
    }
}

const CARD_RESPONSE: &str = r##"{
  "data": {
    "repository": {
      "name": "async_button",
      "isArchived": false,
      "description": "Buttons that wait",
      "parent": null,
      "languages": {"nodes": [{"name": "Dart", "color": "#00B4AB"}]},
      "stargazerCount": 7,
      "forkCount": 2
    }
  }
}"##;

fn dir() -> PathBuf {
    PathBuf::from("/project")
}

#[test]
fn token_from_env_file_drives_fetch() {
    let env = MemoryEnvironment::default()
        .with_file(dir().join(".env.example"), &[])
        .with_file(dir().join(".env"), &[("GITHUB_TOKEN", "ghp_file")]);
    let settings = Settings::default();

    let token = card::resolve_token(&settings, &dir(), &env).unwrap();
    assert_eq!(token.cached_value(), "ghp_file");

    let transport = CannedTransport::new(200, CARD_RESPONSE);
    let response = card::fetch(&settings, token.cached_value(), &transport).unwrap();

    let repository = response.data.unwrap().repository.unwrap();
    assert_eq!(repository.name, "async_button");
    assert_eq!(repository.stargazer_count, 7);
    assert_eq!(repository.primary_language().unwrap().name, "Dart");
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn missing_example_file_is_reported_first() {
    let env = MemoryEnvironment::default()
        .with_file(dir().join(".env"), &[("GITHUB_TOKEN", "ghp_file")])
        .with_var("GITHUB_TOKEN", "ghp_ambient");

    let err = card::resolve_token(&Settings::default(), &dir(), &env).unwrap_err();

    assert!(matches!(err, EnvError::ExampleFileNotFound { ref path } if path == &dir().join(".env.example")));
    assert_eq!(env.reads.get(), 0);
}

#[test]
fn missing_env_file_is_reported() {
    let env = MemoryEnvironment::default()
        .with_file(dir().join(".env.example"), &[])
        .with_var("GITHUB_TOKEN", "ghp_ambient");

    let err = card::resolve_token(&Settings::default(), &dir(), &env).unwrap_err();

    assert_eq!(err.to_string(), "file not found");
    assert!(err.hint().contains("already present in system environment variables"));
}

#[test]
fn disabled_files_fall_back_to_ambient_variable() {
    let env = MemoryEnvironment::default().with_var("GITHUB_TOKEN", "ghp_ambient");
    let settings = Settings {
        env_file: PathBuf::new(),
        example_file: PathBuf::new(),
        ..Settings::default()
    };

    let token = card::resolve_token(&settings, &dir(), &env).unwrap();

    assert_eq!(token.cached_value(), "ghp_ambient");
    assert_eq!(token.key().key, "GITHUB_TOKEN");
}

#[test]
fn empty_token_key_is_invalid() {
    let env = MemoryEnvironment::default().with_var("", "whatever");
    let settings = Settings {
        env_file: PathBuf::new(),
        example_file: PathBuf::new(),
        token_key: String::new(),
        ..Settings::default()
    };

    let err = card::resolve_token(&settings, &dir(), &env).unwrap_err();

    assert!(matches!(err, EnvError::InvalidKey));
    assert_eq!(env.reads.get(), 0);
}

#[test]
fn missing_token_explains_its_use() {
    let env = MemoryEnvironment::default().with_file(dir().join(".env.example"), &[]);
    let settings = Settings {
        env_file: PathBuf::new(),
        ..Settings::default()
    };

    let err = card::resolve_token(&settings, &dir(), &env).unwrap_err();

    assert_eq!(err.to_string(), "value not found");
    let hint = err.hint();
    assert!(hint.contains("Github Authentication Token"));
    assert!(hint.contains(".env.example"));
}

#[test]
fn github_error_becomes_printable_outcome() {
    let transport = CannedTransport::new(
        401,
        r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/graphql"}"#,
    );

    let outcome = CardOutcome::from(card::fetch(&Settings::default(), "bad", &transport));

    match &outcome {
        CardOutcome::Failed(error) => {
            assert_eq!(error.origin, ErrorOrigin::Github);
            assert_eq!(error.message, "Bad credentials");
        }
        CardOutcome::Fetched(_) => panic!("Expected Failed outcome"),
    }
    let rendered = serde_json::to_value(&outcome).unwrap();
    assert_eq!(rendered["source"], "github");
    assert_eq!(rendered["documentation_url"], "https://docs.github.com/graphql");
}

#[test]
fn unresolvable_repository_is_still_a_payload() {
    let transport = CannedTransport::new(
        200,
        r#"{"data":{"repository":null},"errors":[{"type":"NOT_FOUND","path":["repository"],"message":"Could not resolve to a Repository with the name 'x/y'."}]}"#,
    );
    let settings = Settings {
        owner: "x".to_string(),
        name: "y".to_string(),
        ..Settings::default()
    };

    let response = card::fetch(&settings, "ghp_token", &transport).unwrap();

    assert!(response.data.unwrap().repository.is_none());
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].kind.as_deref(), Some("NOT_FOUND"));
}

#[test]
fn process_environment_loads_real_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join(".env"), "REPOCARD_CARD_TEST_TOKEN=ghp_disk\n").unwrap();
    fs::write(root.join(".env.example"), "REPOCARD_CARD_TEST_TOKEN=\n").unwrap();
    let settings = Settings {
        token_key: "REPOCARD_CARD_TEST_TOKEN".to_string(),
        ..Settings::default()
    };

    let token = card::resolve_token(&settings, root, ProcessEnvironment).unwrap();

    assert_eq!(token.cached_value(), "ghp_disk");
    assert_eq!(token.file_path(), Some(root.join(".env").as_path()));
}
