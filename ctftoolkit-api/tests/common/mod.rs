//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Router over an in-memory store and a scripted tool runner
//! - Scratch upload directory per test
//! - Request builders (JSON, multipart) and response decoding
//! - Registration/login helpers

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ctftoolkit_api::app::{build_router, AppState};
use ctftoolkit_api::config::Config;
use ctftoolkit_shared::db::{memory::MemoryStore, Store, StoreResult};
use ctftoolkit_shared::models::{
    tool_log::ToolLog,
    user::{NewUser, User},
};
use ctftoolkit_shared::tools::{
    DispatchError, DispatchResult, Tool, ToolInvocation, ToolOutput, ToolRunner,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// How the scripted runner answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Mimic each script's contract (Caesar shifts text, others echo args)
    Contract,
    /// Exit non-zero with a traceback on stderr
    Crash,
    /// Exit zero but print something that is not JSON
    Garbage,
}

/// A recorded tool call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub invocation: ToolInvocation,
    /// Whether the first argument named an existing file at call time
    pub first_arg_existed: bool,
}

/// Stand-in for the external scripts
pub struct ScriptedRunner {
    behavior: Behavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Shifts ASCII letters by `key`, wrapping within the alphabet
pub fn caesar_shift(text: &str, key: i64, decrypt: bool) -> String {
    let shift = key.rem_euclid(26) as u8;
    let shift = if decrypt { (26 - shift) % 26 } else { shift };

    text.chars()
        .map(|c| match c {
            'a'..='z' => ((c as u8 - b'a' + shift) % 26 + b'a') as char,
            'A'..='Z' => ((c as u8 - b'A' + shift) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

fn contract_output(invocation: &ToolInvocation) -> Value {
    let args = invocation.args();
    match invocation.tool() {
        Tool::Caesar => {
            let key: i64 = args[1].parse().unwrap();
            let decrypt = args[2] == "decrypt";
            json!({
                "success": true,
                "input": args[0],
                "key": key,
                "mode": args[2],
                "result": caesar_shift(&args[0], key, decrypt),
            })
        }
        Tool::QrCode => json!({
            "success": true,
            "text": args[0],
            "output_file": args[1],
        }),
        other => json!({
            "success": true,
            "tool": other.as_str(),
            "args": args,
        }),
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(&self, invocation: &ToolInvocation) -> DispatchResult<ToolOutput> {
        let first_arg_existed = invocation
            .args()
            .first()
            .map(|arg| Path::new(arg).is_file())
            .unwrap_or(false);

        self.calls.lock().unwrap().push(RecordedCall {
            invocation: invocation.clone(),
            first_arg_existed,
        });

        let tool = invocation.tool();
        match self.behavior {
            Behavior::Contract => Ok(ToolOutput {
                tool,
                stdout: contract_output(invocation).to_string().into_bytes(),
                stderr: Vec::new(),
            }),
            Behavior::Crash => Err(DispatchError::NonZeroExit {
                tool,
                code: Some(1),
                stderr: "Traceback (most recent call last): ModuleNotFoundError".to_string(),
            }),
            Behavior::Garbage => Ok(ToolOutput {
                tool,
                stdout: b"this is not json".to_vec(),
                stderr: Vec::new(),
            }),
        }
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub runner: Arc<ScriptedRunner>,
    pub app: axum::Router,
    pub config: Config,
    pub upload_dir: TempDir,
}

impl TestContext {
    /// Creates a context whose tools follow their normal contract
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Contract)
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let config = test_config(upload_dir.path());

        let store = Arc::new(MemoryStore::new());
        let runner = Arc::new(ScriptedRunner::new(behavior));

        let state = AppState::new(store.clone(), runner.clone(), config.clone());
        let app = build_router(state);

        TestContext {
            store,
            runner,
            app,
            config,
            upload_dir,
        }
    }

    /// Sends a request and decodes the JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&body))
            })
        };

        (status, value)
    }

    /// Sends a request and returns the raw body bytes
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, body, None)).await
    }

    /// Registers `username` and returns a login token
    pub async fn register_and_login(&self, username: &str) -> String {
        let (status, _) = self
            .post_json(
                "/api/v1/auth/register",
                json!({
                    "username": username,
                    "password": "secret1",
                    "email": format!("{}@x.com", username),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .post_json(
                "/api/v1/auth/login",
                json!({ "username": username, "password": "secret1" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["token"].as_str().unwrap().to_string()
    }
}

/// Configuration with the test secret and `upload_dir`
pub fn test_config(upload_dir: &Path) -> Config {
    let mut vars = HashMap::new();
    vars.insert("JWT_SECRET", JWT_SECRET.to_string());
    vars.insert("UPLOAD_PATH", upload_dir.display().to_string());
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Store whose tool-log writes never complete
///
/// User operations go to an in-memory store.
pub struct StalledLogStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl Store for StalledLogStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.inner.create_user(user).await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn record_tool_log(&self, _log: ToolLog) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Builds a JSON POST, optionally with a bearer token
pub fn json_request(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds an urlencoded form POST
pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a GET, optionally with a raw Authorization header value
pub fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);

    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }

    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "ctftoolkit-test-boundary";

/// Builds a multipart POST with a single file field
pub fn multipart_request(uri: &str, field: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
