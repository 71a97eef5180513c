//! WebSocket Connection Handler
//!
//! Connection lifecycle: authenticate, admit, receive loop, teardown.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use super::auth::authenticate;
use crate::application::realtime::Session;
use crate::infrastructure::metrics;
use crate::shared::error::{AuthError, FrameError};
use crate::startup::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// WebSocket upgrade handler
///
/// The credential is taken from `?token=` or, failing that, from an
/// `Authorization: Bearer` header.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Response {
    let token = params
        .token
        .or_else(|| bearer.map(|TypedHeader(Authorization(b))| b.token().to_owned()));

    ws.max_message_size(state.settings.websocket.max_message_size)
        .max_frame_size(state.settings.websocket.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state, token))
}

/// Handle individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState, token: Option<String>) {
    let user = match authenticate(
        token.as_deref(),
        &state.settings.jwt.secret,
        state.users.as_ref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "WebSocket handshake rejected");
            reject(&mut socket, &e).await;
            return;
        }
    };

    let profile = user.profile();
    let (session, mut outbound) = Session::open(user.id);

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Drain the session queue into the socket
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sender.send(Message::Text(frame.to_string().into())).await.is_err() {
                break;
            }
        }
    });

    tracing::info!(
        user_id = %user.id,
        session_id = %session.id(),
        "User connected"
    );
    state.realtime.connect(session.clone(), &profile).await;

    let dispatcher = state.dispatcher();
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = dispatcher.handle(&session, &profile, text.as_str()).await {
                    log_dropped_frame(&session, &e);
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %session.id(), "Connection closed");
                break;
            }
            // Ping/pong are answered by axum; binary frames are not part of the protocol
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup
    state.realtime.disconnect(&session).await;
    writer.abort();

    tracing::info!(
        user_id = %user.id,
        session_id = %session.id(),
        "User disconnected"
    );
}

/// Close with a policy-violation code. The server never retries.
async fn reject(socket: &mut WebSocket, error: &AuthError) {
    let reason = match error {
        AuthError::MissingToken => "missing token",
        AuthError::InactiveAccount(_) => "account inactive",
        AuthError::Lookup(_) => "authentication unavailable",
        _ => "invalid token",
    };
    let close = Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: reason.into(),
    }));
    if let Err(e) = socket.send(close).await {
        tracing::debug!(error = %e, "Failed to send close frame");
    }
}

fn log_dropped_frame(session: &Session, error: &FrameError) {
    metrics::record_dropped_frame(error.reason());
    match error {
        FrameError::Persistence(e) => tracing::warn!(
            session_id = %session.id(),
            user_id = %session.user_id(),
            error = %e,
            "Frame dropped: persistence failed"
        ),
        _ => tracing::debug!(
            session_id = %session.id(),
            reason = error.reason(),
            error = %error,
            "Malformed frame dropped"
        ),
    }
}
