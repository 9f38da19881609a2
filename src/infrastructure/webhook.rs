//! # Webhook Server
//!
//! Receives Telegram updates over HTTP and exposes a small admin surface.
//!
//! - `POST /`: Telegram update.
//! - Without `SECRET_PATH`, only `GET /setup` is served.
//! - With it, `GET /{secret}/` plus `health`, `setup`, `webhook-info`,
//!   `delete-webhook` and `test?chat_id=ID` below it.
//!
//! Everything else answers `404` with an empty body.

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::application::bot::Bot;
use crate::application::router::MENU_HELP;
use crate::domain::types::{Button, Keyboard, Reply};
use crate::infrastructure::telegram::Update;
use crate::strings::messages;

#[derive(Clone)]
struct WebhookState {
    bot: Arc<Bot>,
    started_at: DateTime<Utc>,
}

pub fn router(bot: Arc<Bot>) -> Router {
    let state = WebhookState {
        bot,
        started_at: Utc::now(),
    };

    Router::new()
        .route("/", post(receive_update).fallback(admin))
        .fallback(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    bot: Arc<Bot>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    tracing::info!("Webhook server listening on {}", addr);

    axum::serve(listener, router(bot))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Webhook server failed")?;

    tracing::info!("Webhook server stopped");
    Ok(())
}

async fn receive_update(State(state): State<WebhookState>, body: Bytes) -> Response {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::error!("Error handling webhook: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response();
        }
    };

    state.bot.deliver(update).await;
    (StatusCode::OK, "OK").into_response()
}

async fn admin(
    State(state): State<WebhookState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if method != Method::GET {
        return not_found();
    }

    let path = uri.path();
    let Some(secret) = state.bot.config.webhook.secret_path.clone() else {
        // Only initial configuration is possible without a secret.
        return if path == "/setup" {
            setup(&state, &headers, None).await
        } else {
            not_found()
        };
    };

    let Some(admin_path) = path.strip_prefix(&format!("/{secret}/")) else {
        return not_found();
    };

    match admin_path {
        "" => panel(&secret),
        "health" => health(&state),
        "setup" => setup(&state, &headers, Some(&secret)).await,
        "webhook-info" => webhook_info(&state).await,
        "delete-webhook" => delete_webhook(&state).await,
        "test" => test_messages(&state, query.get("chat_id")).await,
        _ => not_found(),
    }
}

fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

fn failed(e: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string(), "status": "failed" })),
    )
        .into_response()
}

fn panel(secret: &str) -> Response {
    let text = format!(
        concat!(
            "🤖 Neko Bot - Admin Panel\n\n",
            "Available endpoints:\n",
            "- GET /{s}/health - Health check\n",
            "- GET /{s}/setup - Configure webhook\n",
            "- GET /{s}/webhook-info - Check webhook status\n",
            "- GET /{s}/delete-webhook - Reset webhook\n",
            "- GET /{s}/test?chat_id=ID - Test message sending\n\n",
            "Main webhook:\n",
            "- POST / - Telegram webhook endpoint"
        ),
        s = secret
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response()
}

fn health(state: &WebhookState) -> Response {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at.to_rfc3339(),
        "commands": state.bot.config.commands.len(),
        "authenticated": true,
    }))
    .into_response()
}

/// Public base URL: configured, or rebuilt from the request's host.
fn public_base(state: &WebhookState, headers: &HeaderMap) -> Option<String> {
    if let Some(url) = &state.bot.config.webhook.public_url {
        return Some(url.trim_end_matches('/').to_string());
    }
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    Some(format!("{scheme}://{host}"))
}

async fn setup(state: &WebhookState, headers: &HeaderMap, secret: Option<&str>) -> Response {
    let Some(base) = public_base(state, headers) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Cannot determine public URL; set WEBHOOK_URL",
                "status": "failed"
            })),
        )
            .into_response();
    };

    let webhook_url = format!("{base}/");
    match state.bot.api.set_webhook(&webhook_url).await {
        Ok(accepted) => {
            tracing::info!("Webhook set to {}", webhook_url);
            Json(json!({
                "webhook_url": webhook_url,
                "admin_panel": secret.map(|s| format!("{base}/{s}/")),
                "telegram_response": accepted,
                "status": "success",
            }))
            .into_response()
        }
        Err(e) => failed(e),
    }
}

async fn webhook_info(state: &WebhookState) -> Response {
    match state.bot.api.get_webhook_info().await {
        Ok(info) => Json(info).into_response(),
        Err(e) => failed(e),
    }
}

async fn delete_webhook(state: &WebhookState) -> Response {
    match state.bot.api.delete_webhook(true).await {
        Ok(accepted) => Json(json!({
            "message": "Webhook deleted/reset successfully",
            "telegram_response": accepted,
            "status": "success",
            "note": "Run /setup to configure webhook again",
        }))
        .into_response(),
        Err(e) => failed(e),
    }
}

async fn test_messages(state: &WebhookState, chat_id: Option<&String>) -> Response {
    let Some(chat_id) = chat_id.and_then(|raw| raw.parse::<i64>().ok()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing chat_id parameter",
                "usage": "/test?chat_id=YOUR_CHAT_ID",
            })),
        )
            .into_response();
    };

    let replies = [
        Reply::plain(messages::TEST_PLAIN),
        Reply::markdown(messages::TEST_MARKDOWN),
        Reply::plain(messages::TEST_KEYBOARD)
            .with_keyboard(Keyboard::new().row(Button::callback("Test Button", MENU_HELP))),
    ];

    let mut message_ids = Vec::with_capacity(replies.len());
    for reply in &replies {
        match state.bot.api.send_message(chat_id, reply).await {
            Ok(id) => message_ids.push(id),
            Err(e) => return failed(e),
        }
    }

    Json(json!({ "status": "Tests completed", "message_ids": message_ids })).into_response()
}
