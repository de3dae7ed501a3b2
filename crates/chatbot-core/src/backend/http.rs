use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ChatBackend;
use crate::error::BackendError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    user_input: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// Chat backend reached with a single JSON POST per query.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn ask(&self, query: &str) -> Result<String, BackendError> {
        let request = ChatRequest { user_input: query };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let reply: ChatReply = response.json().await.map_err(BackendError::Decode)?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_ask_posts_user_input_and_returns_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "user_input": "hello" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"hi there"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        let answer = backend.ask("hello").await.unwrap();

        assert_eq!(answer, "hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ask_sends_query_untrimmed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_body(Matcher::Json(json!({ "user_input": "  spaced  " })))
            .with_status(200)
            .with_body(r#"{"response":"ok"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        assert_eq!(backend.ask("  spaced  ").await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ask_ignores_extra_fields() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response":"Product: Laptop","data":[]}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        assert_eq!(backend.ask("laptops").await.unwrap(), "Product: Laptop");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"detail":"Database connection error"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        let err = backend.ask("hello").await.unwrap_err();

        match err {
            BackendError::Status(status) => assert_eq!(status.as_u16(), 500),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reply_without_response_field_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"answer":"wrong shape"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        let err = backend.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_non_json_reply_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/chat", server.url()));
        let err = backend.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_request_error() {
        // Nothing listens on port 1
        let backend = HttpBackend::new("http://127.0.0.1:1/chat");
        let err = backend.ask("hello").await.unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
    }
}
