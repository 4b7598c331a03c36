//! reqwest-backed [`ChatBackend`] adapter.
//!
//! Every call is a JSON POST retried under a [`BackoffPolicy`]. A reply only
//! counts when the status is 200 and the body decodes; anything else is a
//! failed attempt. Once the budget is spent the caller gets
//! [`RemoteError::Unavailable`], never the transport error itself.

use super::error::HttpError;
use super::protocol::{
    CONVERSATION_PATH, ConversationRequest, ConversationResponse, EndSessionRequest, START_PATH,
    StartRequest, StartResponse,
};
use async_trait::async_trait;
use duet_application::ports::chat_backend::{
    ChatBackend, ChatBackendFactory, RemoteError, SendResult, StartResult,
};
use duet_application::retry_with_backoff;
use duet_domain::{BackoffPolicy, ChatId, Endpoint, ServerId};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Chat backend reached over HTTP
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: Endpoint,
    policy: BackoffPolicy,
    teardown_path: Option<String>,
}

impl HttpChatBackend {
    pub fn new(client: reqwest::Client, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            policy: BackoffPolicy::default(),
            teardown_path: None,
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Route used by [`ChatBackend::end_session`]; without one teardown is a no-op
    pub fn with_teardown_path(mut self, path: Option<String>) -> Self {
        self.teardown_path = path;
        self
    }

    /// One POST attempt: 200 with a decodable body, or a failure
    async fn post_once<B, R>(&self, url: &str, body: &B, attempt: u32) -> Result<R, HttpError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(HttpError::status(status, &text));
        }
        let reply = response
            .json::<R>()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;
        debug!("POST {} -> {} (attempt {})", url, status.as_u16(), attempt + 1);
        Ok(reply)
    }

    /// POST `body` to `path` under the retry policy
    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint.join(path);
        let label = format!("POST {}", url);
        let url = url.as_str();

        retry_with_backoff(&self.policy, &label, move |attempt| {
            self.post_once::<B, R>(url, body, attempt)
        })
        .await
        .map_err(|exhausted| {
            RemoteError::unavailable(
                self.endpoint.as_str(),
                exhausted.attempts,
                exhausted.last_error.to_string(),
            )
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn start(&self, server_id: Option<&ServerId>) -> StartResult {
        let body = StartRequest {
            server_id: server_id.map(ServerId::as_str),
        };
        let reply: StartResponse = self.call(START_PATH, &body).await?;
        Ok(ChatId::new(reply.chat_id))
    }

    async fn send(
        &self,
        chat_id: &ChatId,
        prompt: &str,
        server_id: Option<&ServerId>,
    ) -> SendResult {
        let body = ConversationRequest {
            chat_id: chat_id.as_str(),
            prompt,
            server_id: server_id.map(ServerId::as_str),
        };
        let reply: ConversationResponse = self.call(CONVERSATION_PATH, &body).await?;
        Ok(reply.response)
    }

    async fn end_session(
        &self,
        chat_id: &ChatId,
        server_id: Option<&ServerId>,
    ) -> Result<(), RemoteError> {
        let Some(path) = &self.teardown_path else {
            return Ok(());
        };
        let body = EndSessionRequest {
            chat_id: chat_id.as_str(),
            server_id: server_id.map(ServerId::as_str),
        };
        let _: serde_json::Value = self.call(path, &body).await?;
        Ok(())
    }
}

/// Builds [`HttpChatBackend`]s that share one connection pool
pub struct HttpChatBackendFactory {
    client: reqwest::Client,
    policy: BackoffPolicy,
    teardown_path: Option<String>,
}

impl HttpChatBackendFactory {
    /// Factory whose requests give up after `request_timeout` each
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            policy: BackoffPolicy::default(),
            teardown_path: None,
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_teardown_path(mut self, path: Option<String>) -> Self {
        self.teardown_path = path;
        self
    }
}

impl ChatBackendFactory for HttpChatBackendFactory {
    fn connect(&self, endpoint: &Endpoint) -> Arc<dyn ChatBackend> {
        Arc::new(
            HttpChatBackend::new(self.client.clone(), endpoint.clone())
                .with_policy(self.policy.clone())
                .with_teardown_path(self.teardown_path.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn spawn_backend(app: Router) -> Endpoint {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Endpoint::try_new(format!("http://{}", addr)).unwrap()
    }

    fn backend(endpoint: Endpoint, attempts: u32) -> HttpChatBackend {
        HttpChatBackend::new(reqwest::Client::new(), endpoint)
            .with_policy(BackoffPolicy::immediate(attempts))
    }

    async fn echo_start(Json(body): Json<Value>) -> Json<Value> {
        let server = body["serverId"].as_str().unwrap_or("none").to_string();
        Json(json!({ "chatId": format!("chat-{}", server), "serverId": server }))
    }

    async fn echo_conversation(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "response": format!(
                "{} said {} via {}",
                body["chatId"].as_str().unwrap_or(""),
                body["prompt"].as_str().unwrap_or(""),
                body["serverId"].as_str().unwrap_or("none")
            )
        }))
    }

    fn echo_app() -> Router {
        Router::new()
            .route("/start", post(echo_start))
            .route("/conversation", post(echo_conversation))
    }

    /// Fails with 500 until `fail_first` requests have been seen
    async fn flaky(
        State((hits, fail_first)): State<(Arc<AtomicUsize>, usize)>,
    ) -> (AxumStatus, Json<Value>) {
        let seen = hits.fetch_add(1, Ordering::SeqCst);
        if seen < fail_first {
            (
                AxumStatus::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "model busy" })),
            )
        } else {
            (AxumStatus::OK, Json(json!({ "response": "finally" })))
        }
    }

    fn flaky_app(fail_first: usize) -> (Router, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/conversation", post(flaky))
            .with_state((Arc::clone(&hits), fail_first));
        (app, hits)
    }

    #[tokio::test]
    async fn test_start_and_send_carry_server_id() {
        let endpoint = spawn_backend(echo_app()).await;
        let backend = backend(endpoint, 1);
        let server = ServerId::for_worker(3);

        let chat_id = backend.start(Some(&server)).await.unwrap();
        assert_eq!(chat_id.as_str(), "chat-server_3");

        let reply = backend.send(&chat_id, "hello", Some(&server)).await.unwrap();
        assert_eq!(reply, "chat-server_3 said hello via server_3");
    }

    #[tokio::test]
    async fn test_server_id_omitted_when_absent() {
        let endpoint = spawn_backend(echo_app()).await;
        let backend = backend(endpoint, 1);

        let chat_id = backend.start(None).await.unwrap();
        assert_eq!(chat_id.as_str(), "chat-none");
        let reply = backend.send(&chat_id, "hi", None).await.unwrap();
        assert!(reply.ends_with("via none"));
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let (app, hits) = flaky_app(2);
        let endpoint = spawn_backend(app).await;

        let reply = backend(endpoint, 3)
            .send(&ChatId::new("A1"), "ping", None)
            .await
            .unwrap();

        assert_eq!(reply, "finally");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_report_unavailable() {
        let (app, hits) = flaky_app(usize::MAX);
        let endpoint = spawn_backend(app).await;

        let err = backend(endpoint.clone(), 3)
            .send(&ChatId::new("A1"), "ping", None)
            .await
            .unwrap_err();

        let RemoteError::Unavailable {
            endpoint: failed,
            attempts,
            last_failure,
        } = err;
        assert_eq!(failed, endpoint.as_str());
        assert_eq!(attempts, 3);
        assert!(last_failure.contains("500"));
        assert!(last_failure.contains("model busy"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_failed_attempt() {
        let app = Router::new().route(
            "/start",
            post(|| async { Json(json!({ "unexpected": true })) }),
        );
        let endpoint = spawn_backend(app).await;

        let err = backend(endpoint, 2).start(None).await.unwrap_err();
        let RemoteError::Unavailable {
            attempts,
            last_failure,
            ..
        } = err;
        assert_eq!(attempts, 2);
        assert!(last_failure.contains("malformed"));
    }

    #[tokio::test]
    async fn test_connection_refused_reports_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let endpoint = Endpoint::try_new(format!("http://{}", addr)).unwrap();

        let err = backend(endpoint, 2).start(None).await.unwrap_err();
        let RemoteError::Unavailable { attempts, .. } = err;
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_teardown_only_with_configured_path() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/end",
                post(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "message": "closed" }))
                }),
            )
            .with_state(Arc::clone(&hits));
        let endpoint = spawn_backend(app).await;
        let chat_id = ChatId::new("A1");

        backend(endpoint.clone(), 1)
            .end_session(&chat_id, None)
            .await
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        backend(endpoint, 1)
            .with_teardown_path(Some("end".to_string()))
            .end_session(&chat_id, None)
            .await
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_factory_connects_to_requested_endpoint() {
        let endpoint = spawn_backend(echo_app()).await;
        let factory = HttpChatBackendFactory::new(Duration::from_secs(5))
            .unwrap()
            .with_policy(BackoffPolicy::immediate(1));

        let backend = factory.connect(&endpoint);
        assert_eq!(backend.endpoint(), &endpoint);
        assert_eq!(backend.start(None).await.unwrap().as_str(), "chat-none");
    }
}
