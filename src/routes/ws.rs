// WebSocket dashboard stream: one session per connection, a view after every command

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::error::ReportError;
use crate::session::DashboardSession;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Client → server selection commands.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum ClientCommand {
    Toggle { phase: String },
    Select { phases: Vec<String> },
    Reset,
}

impl ClientCommand {
    fn apply(self, session: &mut DashboardSession) {
        match self {
            ClientCommand::Toggle { phase } => session.toggle(&phase),
            ClientCommand::Select { phases } => session.select(phases),
            ClientCommand::Reset => session.reset(),
        }
    }
}

/// The run is loaded before upgrading so a bad file name or document is a plain HTTP error.
pub(super) async fn ws_report(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ReportError> {
    let run = state.run(&file).await?;
    Ok(ws
        .on_upgrade(move |socket| async move {
            if let Err(e) = stream_report(socket, DashboardSession::new(run)).await {
                tracing::info!("Report stream error: {}", e);
            }
        })
        .into_response())
}

/// false when the client is gone or too slow.
async fn send(socket: &mut WebSocket, msg: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, socket.send(msg)).await, Ok(Ok(())))
}

async fn send_view(socket: &mut WebSocket, session: &DashboardSession) -> anyhow::Result<bool> {
    let json = serde_json::to_string(&session.view())?;
    Ok(send(socket, Message::Text(json.into())).await)
}

async fn stream_report(mut socket: WebSocket, mut session: DashboardSession) -> anyhow::Result<()> {
    tracing::info!(file = %session.run().result_file, "Client connected to report stream");
    if !send_view(&mut socket, &session).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // first tick completes immediately
    ping_interval.tick().await;
    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                };
                match serde_json::from_str::<ClientCommand>(text.as_str()) {
                    Ok(command) => {
                        tracing::debug!(?command, "dashboard command");
                        command.apply(&mut session);
                        if !send_view(&mut socket, &session).await? {
                            break;
                        }
                    }
                    Err(e) => {
                        let reply = serde_json::json!({ "error": format!("invalid command: {}", e) });
                        if !send(&mut socket, Message::Text(reply.to_string().into())).await {
                            break;
                        }
                    }
                }
            }
            _ = ping_interval.tick() => {
                if !send(&mut socket, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    tracing::info!(file = %session.run().result_file, "Client disconnected from report stream");
    Ok(())
}
