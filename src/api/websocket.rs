//! WebSocket handler for chat sessions
//!
//! Each connection is one chat session. A session binds to a personage
//! via a login message, then sends slash commands and receives rendered
//! text. Event announcements are broadcast to every bound session in
//! its own language.

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::AppState;
use crate::command::{self, Command};
use crate::locale::{common, Language};
use crate::personage::PersonageId;

/// A connected chat session
#[derive(Debug)]
pub struct ChatSession {
    pub session_id: Uuid,
    pub personage_id: Option<PersonageId>,
    pub language: Language,
    pub sender: mpsc::Sender<ServerMessage>,
}

/// Connection manager for all active chat sessions
#[derive(Default)]
pub struct ConnectionManager {
    sessions: RwLock<HashMap<Uuid, ChatSession>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session
    pub async fn register(&self, session: ChatSession) {
        self.sessions
            .write()
            .await
            .insert(session.session_id, session);
    }

    /// Remove a session
    pub async fn unregister(&self, session_id: Uuid) {
        self.sessions.write().await.remove(&session_id);
    }

    /// Bind a session to a personage
    pub async fn bind_personage(&self, session_id: Uuid, personage_id: PersonageId) {
        if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
            session.personage_id = Some(personage_id);
        }
    }

    /// Switch a session's language
    pub async fn set_language(&self, session_id: Uuid, language: Language) {
        if let Some(session) = self.sessions.write().await.get_mut(&session_id) {
            session.language = language;
        }
    }

    /// Send a message to one session
    pub async fn send_to_session(&self, session_id: Uuid, msg: ServerMessage) {
        let sender = {
            let sessions = self.sessions.read().await;
            sessions.get(&session_id).map(|s| s.sender.clone())
        };
        if let Some(sender) = sender {
            if sender.send(msg).await.is_err() {
                warn!("Failed to send message to session {}", session_id);
            }
        }
    }

    /// Broadcast a per-language rendered text to every bound session
    pub async fn broadcast_localized<F>(&self, render: F)
    where
        F: Fn(Language) -> String,
    {
        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            if session.personage_id.is_none() {
                continue;
            }
            let msg = ServerMessage::Output {
                text: render(session.language),
            };
            if session.sender.send(msg).await.is_err() {
                warn!("Failed to broadcast to session {}", session.session_id);
            }
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Session is bound to a personage
    #[serde(rename = "welcome")]
    Welcome { personage_id: PersonageId, name: String },
    /// Text output to display
    #[serde(rename = "output")]
    Output { text: String },
    /// Error message
    #[serde(rename = "error")]
    Error { message: String },
}

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Bind this session to a personage by name, creating one if needed
    #[serde(rename = "login")]
    Login { name: String },
    /// Chat command input
    #[serde(rename = "command")]
    Command { text: String },
    /// Ping to keep connection alive
    #[serde(rename = "ping")]
    Ping,
}

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);
    let session_id = Uuid::new_v4();

    info!("Chat session connected: {}", session_id);

    let session = ChatSession {
        session_id,
        personage_id: None,
        language: state.default_language,
        sender: tx,
    };
    state.connections.register(session).await;

    // Main loop: interleave outgoing channel messages and socket input
    loop {
        tokio::select! {
            Some(msg) = rx.recv() => {
                if let Ok(json) = serde_json::to_string(&msg) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                            handle_client_message(&state, session_id, client_msg).await;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    state.connections.unregister(session_id).await;
    info!("Chat session disconnected: {}", session_id);
}

/// Handle a message from the client
async fn handle_client_message(state: &AppState, session_id: Uuid, msg: ClientMessage) {
    match msg {
        ClientMessage::Login { name } => {
            let reply = login(state, session_id, &name).await;
            state.connections.send_to_session(session_id, reply).await;
        }
        ClientMessage::Command { text } => {
            let (personage_id, language) = session_view(state, session_id).await;
            let Some(personage_id) = personage_id else {
                let reply = ServerMessage::Error {
                    message: common::login_first(language).to_string(),
                };
                state.connections.send_to_session(session_id, reply).await;
                return;
            };

            let reply = match command::parse(&text) {
                None => ServerMessage::Output {
                    text: common::unknown_command(language).to_string(),
                },
                Some(cmd) => {
                    // The session owns the language; apply the switch
                    // before rendering the confirmation.
                    let language = match &cmd {
                        Command::ChangeLanguage { language: switched } => {
                            state.connections.set_language(session_id, *switched).await;
                            *switched
                        }
                        _ => language,
                    };
                    ServerMessage::Output {
                        text: state.dispatcher.execute(personage_id, language, cmd).await,
                    }
                }
            };
            state.connections.send_to_session(session_id, reply).await;
        }
        ClientMessage::Ping => {
            // Just keep the connection alive, no response needed
        }
    }
}

/// Bind the session to a personage by name, creating one on first login
async fn login(state: &AppState, session_id: Uuid, name: &str) -> ServerMessage {
    let language = session_view(state, session_id).await.1;
    let name = name.trim();

    let existing = match state.personages.get_by_name(name).await {
        Ok(existing) => existing,
        Err(e) => {
            error!("Login lookup failed: {}", e);
            return ServerMessage::Error {
                message: common::internal_error(language).to_string(),
            };
        }
    };

    let personage = match existing {
        Some(personage) => personage,
        None => {
            // Validate before creating so a bad name leaves no orphan row
            if !crate::personage::is_valid_name(name) {
                return ServerMessage::Error {
                    message: common::invalid_name(language).to_string(),
                };
            }
            let created = match state.personages.create_personage().await {
                Ok(created) => created,
                Err(e) => {
                    error!("Personage creation failed: {}", e);
                    return ServerMessage::Error {
                        message: common::internal_error(language).to_string(),
                    };
                }
            };
            match state.personages.change_name(created, name).await {
                Ok(named) => named,
                Err(crate::personage::PersonageError::InvalidName) => {
                    return ServerMessage::Error {
                        message: common::invalid_name(language).to_string(),
                    };
                }
                Err(e) => {
                    error!("Personage rename failed: {}", e);
                    return ServerMessage::Error {
                        message: common::internal_error(language).to_string(),
                    };
                }
            }
        }
    };

    state
        .connections
        .bind_personage(session_id, personage.id)
        .await;
    ServerMessage::Welcome {
        personage_id: personage.id,
        name: personage.name,
    }
}

async fn session_view(state: &AppState, session_id: Uuid) -> (Option<PersonageId>, Language) {
    let sessions = state.connections.sessions.read().await;
    match sessions.get(&session_id) {
        Some(session) => (session.personage_id, session.language),
        None => (None, state.default_language),
    }
}
