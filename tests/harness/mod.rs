//! Integration test harness
//!
//! - `TestServer` - spawns a real tavernd server on a random port with
//!   an in-memory database
//! - `TestClient` - WebSocket chat client speaking the session protocol

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tavernd::api::AppState;
use tavernd::{Config, Server};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Test harness that spawns a real tavernd server on a random port
pub struct TestServer {
    pub addr: SocketAddr,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server instance
    pub async fn start() -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let config = Config {
            bind_addr: addr,
            db_path: None, // In-memory for tests
            ..Config::default()
        };

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        // Poll until server is ready (max 2 seconds)
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }
        if !ready {
            bail!("Server did not become ready in time");
        }

        Ok(Self {
            addr,
            server,
            _handle: handle,
        })
    }

    /// Shared application state, for seeding game data directly
    pub fn state(&self) -> &AppState {
        self.server.state()
    }

    /// HTTP GET against the server
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(reqwest::get(format!("http://{}{}", self.addr, path)).await?)
    }

    /// Open a chat session
    pub async fn connect(&self) -> Result<TestClient> {
        TestClient::connect(self.addr).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.shutdown();
    }
}

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;
type WsStream = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

/// WebSocket chat client for tests
pub struct TestClient {
    write: WsSink,
    read: WsStream,
    pub personage_id: Option<i64>,
}

impl TestClient {
    /// Connect a fresh unbound session
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (socket, _) = connect_async(format!("ws://{}/ws", addr)).await?;
        let (write, read) = socket.split();
        Ok(Self {
            write,
            read,
            personage_id: None,
        })
    }

    /// Bind this session to a personage, creating one on first login
    pub async fn login(&mut self, name: &str) -> Result<Value> {
        self.send(&serde_json::json!({"type": "login", "name": name}))
            .await?;
        let welcome = self.expect("welcome").await?;
        self.personage_id = welcome["personage_id"].as_i64();
        Ok(welcome)
    }

    /// Send a login message without waiting for the reply
    pub async fn send_login_raw(&mut self, name: &str) -> Result<()> {
        self.send(&serde_json::json!({"type": "login", "name": name}))
            .await
    }

    /// Send a chat command
    pub async fn command(&mut self, text: &str) -> Result<()> {
        self.send(&serde_json::json!({"type": "command", "text": text}))
            .await
    }

    /// Send a command and return the output text
    pub async fn command_output(&mut self, text: &str) -> Result<String> {
        self.command(text).await?;
        let output = self.expect("output").await?;
        Ok(output["text"].as_str().unwrap_or_default().to_string())
    }

    /// Wait for the next message of the given type, failing on others
    pub async fn expect(&mut self, msg_type: &str) -> Result<Value> {
        let msg = self.next_message().await?;
        let got = msg["type"].as_str().unwrap_or_default();
        if got != msg_type {
            bail!("Expected message type '{}', got: {}", msg_type, msg);
        }
        Ok(msg)
    }

    /// Read the next server message (5 second timeout)
    pub async fn next_message(&mut self) -> Result<Value> {
        let frame = tokio::time::timeout(Duration::from_secs(5), self.read.next())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for server message"))?;
        match frame {
            Some(Ok(Message::Text(text))) => Ok(serde_json::from_str(&text)?),
            other => bail!("Unexpected WebSocket frame: {:?}", other),
        }
    }

    async fn send(&mut self, value: &Value) -> Result<()> {
        self.write
            .send(Message::Text(value.to_string().into()))
            .await?;
        Ok(())
    }
}
