//! Trigger server routes
//!
//! `POST /generate_conversation` runs one dialogue per request and answers
//! with `{message, pairs_generated, outcome}`. The status is 200 only for a
//! dialogue that ran all its rounds.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use duet_application::ports::dialogue_runner::{
    DialogueRequest, DialogueRunner, GENERATE_CONVERSATION_PATH, TriggerReply,
};
use duet_domain::DialogueOutcome;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Greeting served at `/`
pub const WELCOME_MESSAGE: &str = "Welcome to the duet conversation collector API";

#[derive(Clone)]
struct AppState {
    runner: Arc<dyn DialogueRunner>,
}

/// Build the trigger router around a dialogue runner
pub fn router(runner: Arc<dyn DialogueRunner>) -> Router {
    let generate = format!("/{}", GENERATE_CONVERSATION_PATH);
    let generate_api = format!("/api/{}", GENERATE_CONVERSATION_PATH);

    Router::new()
        .route("/", get(welcome))
        .route(&generate, post(generate_conversation))
        .route(&generate_api, post(generate_conversation))
        .with_state(AppState { runner })
}

/// Serve the trigger router until `shutdown` is cancelled.
///
/// In-flight dialogues finish before the server returns.
pub async fn serve(
    listener: TcpListener,
    runner: Arc<dyn DialogueRunner>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Trigger server listening on http://{}", addr);
    }
    axum::serve(listener, router(runner))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn generate_conversation(
    State(state): State<AppState>,
    body: Result<Json<DialogueRequest>, JsonRejection>,
) -> (StatusCode, Json<TriggerReply>) {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected trigger request: {}", rejection.body_text());
            let reply = TriggerReply {
                message: rejection.body_text(),
                pairs_generated: 0,
                outcome: None,
            };
            return (StatusCode::BAD_REQUEST, Json(reply));
        }
    };

    info!(
        "Generating conversation on '{}' between {} and {} ({} rounds)",
        request.topic,
        request.server_url,
        request.second_endpoint(),
        request.max_prompt
    );
    let report = state.runner.run(request).await;

    let status = if report.outcome == DialogueOutcome::Completed {
        StatusCode::OK
    } else {
        warn!("Conversation failed: {}", report.message);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(TriggerReply::from(&report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use duet_domain::{DialoguePhase, DialogueReport, Endpoint};
    use std::sync::Mutex;

    /// Answers every request with the same report and records the requests
    struct FixedRunner {
        report: DialogueReport,
        seen: Mutex<Vec<DialogueRequest>>,
    }

    impl FixedRunner {
        fn new(report: DialogueReport) -> Arc<Self> {
            Arc::new(Self {
                report,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DialogueRunner for FixedRunner {
        async fn run(&self, request: DialogueRequest) -> DialogueReport {
            self.seen.lock().unwrap().push(request);
            self.report.clone()
        }
    }

    async fn spawn(runner: Arc<FixedRunner>) -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let token = CancellationToken::new();
        tokio::spawn(serve(listener, runner, token.clone()));
        (base, token)
    }

    fn body() -> Value {
        json!({
            "server_url": "http://localhost:8080",
            "initial_message": "Be brief.",
            "topic": "life",
            "max_prompt": 2
        })
    }

    #[tokio::test]
    async fn test_welcome() {
        let (base, _token) = spawn(FixedRunner::new(DialogueReport::completed(0))).await;
        let reply: Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
        assert_eq!(reply["message"], WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn test_completed_dialogue_is_ok() {
        let runner = FixedRunner::new(DialogueReport::completed(2));
        let (base, _token) = spawn(Arc::clone(&runner)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate_conversation", base))
            .json(&body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["message"], "Conversation generated successfully");
        assert_eq!(reply["pairs_generated"], 2);
        assert_eq!(reply["outcome"], "completed");

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].second_endpoint(),
            &Endpoint::try_new("http://localhost:8080").unwrap()
        );
    }

    #[tokio::test]
    async fn test_api_prefix_route() {
        let (base, _token) = spawn(FixedRunner::new(DialogueReport::completed(1))).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/generate_conversation", base))
            .json(&body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_partial_dialogue_is_server_error_with_count() {
        let report = DialogueReport::stopped_early(1, "no response");
        let (base, _token) = spawn(FixedRunner::new(report)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate_conversation", base))
            .json(&body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 500);
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["pairs_generated"], 1);
        assert_eq!(reply["outcome"], "stopped_early");
    }

    #[tokio::test]
    async fn test_aborted_dialogue_is_server_error() {
        let report = DialogueReport::aborted(DialoguePhase::Init, "connection refused");
        let (base, _token) = spawn(FixedRunner::new(report)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate_conversation", base))
            .json(&body())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 500);
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["pairs_generated"], 0);
        assert!(reply["message"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let runner = FixedRunner::new(DialogueReport::completed(1));
        let (base, _token) = spawn(Arc::clone(&runner)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate_conversation", base))
            .json(&json!({ "server_url": "ftp://nope", "topic": "life" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let reply: Value = response.json().await.unwrap();
        assert_eq!(reply["pairs_generated"], 0);
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_stops_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(
            listener,
            FixedRunner::new(DialogueReport::completed(0)),
            token.clone(),
        ));

        token.cancel();
        assert!(handle.await.unwrap().is_ok());
    }
}
