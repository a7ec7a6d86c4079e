#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use notes_api::auth::JwtKeys;
use notes_api::config::{AppConfig, StoreBackend};
use notes_api::database::MemoryRecordStore;
use notes_api::AppState;
use serde_json::Value;
use tokio::net::TcpListener;

pub const RESOURCE: &str = "notas";
const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub base_url: String,
    pub keys: JwtKeys,
    pub client: reqwest::Client,
}

impl TestServer {
    /// URL of the record collection, or of one record when `id` is given
    pub fn records_url(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, RESOURCE, id),
            None => format!("{}/{}", self.base_url, RESOURCE),
        }
    }

    pub fn bearer(&self, subject: &str) -> Result<String> {
        Ok(format!("Bearer {}", self.keys.issue(subject)?))
    }

    /// POST a record with a valid token and return the created JSON
    pub async fn create(&self, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.records_url(None))
            .header("Authorization", self.bearer("tester")?)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn search(&self, term: Option<&str>) -> Result<Vec<Value>> {
        let mut req = self.client.get(self.records_url(None));
        if let Some(term) = term {
            req = req.query(&[("search", term)]);
        }
        let res = req.send().await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::OK, "list failed: {}", res.status());
        let body: Value = res.json().await?;
        body.as_array().cloned().context("list body is not an array")
    }
}

/// Start the real router on an ephemeral port with a fresh in-memory store
pub async fn spawn_server(enforce_writes: bool) -> Result<TestServer> {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.api.resource = RESOURCE.to_string();
    config.security.jwt_secret = SECRET.to_string();
    config.security.enforce_writes = enforce_writes;
    config.logging.log_dir = None;

    let keys = JwtKeys::from_config(&config.security)?;
    let state = AppState::new(
        Arc::new(MemoryRecordStore::new()),
        keys.clone(),
        RESOURCE,
        enforce_writes,
    );
    let app = notes_api::app(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.context("failed to bind test listener")?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        keys,
        client: reqwest::Client::new(),
    })
}
