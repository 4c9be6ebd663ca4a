//! Fake AI client for testing.
//!
//! Returns canned responses based on prompt matching, so tests run without
//! network access or API costs.

use super::{AiClient, AiError, ChatRequest, ChatResponse, Usage};
use async_trait::async_trait;
use std::sync::Mutex;

/// Responses are matched by checking if the user turns of the request contain a
/// registered substring (case-insensitive). Every request is recorded.
#[derive(Debug, Default)]
pub struct FakeAiClient {
    /// (prompt substring, response) in registration order
    responses: Vec<(String, String)>,
    default_response: Option<String>,
    requests: Mutex<Vec<(String, ChatRequest)>>,
}

impl FakeAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that returns `response` for prompts containing `prompt_contains`.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut client = Self::new();
        client.add_response(prompt_contains, response);
        client
    }

    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.responses
            .push((prompt_contains.to_lowercase(), response.to_string()));
    }

    /// Set the response used when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Requests received so far, paired with their prompt names.
    pub fn requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let haystack = request.user_text().to_lowercase();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push((prompt_name.to_string(), request));
        }

        let matched = self
            .responses
            .iter()
            .find(|(pattern, _)| haystack.contains(pattern))
            .map(|(_, response)| response.clone())
            .or_else(|| self.default_response.clone());

        match matched {
            Some(content) => Ok(ChatResponse {
                content,
                usage: Usage::default(),
            }),
            None => Err(AiError::RequestFailed(format!(
                "FakeAiClient: no response configured for prompt {}",
                prompt_name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user(text)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fake_client_matching() {
        let client = FakeAiClient::with_response("HELLO", "world");
        let result = client.complete("test", request("hello there")).await.unwrap();
        assert_eq!(result.content, "world");
        assert_eq!(client.requests().len(), 1);
        assert_eq!(client.requests()[0].0, "test");
    }

    #[tokio::test]
    async fn test_fake_client_no_match() {
        let client = FakeAiClient::new();
        assert!(client.complete("test", request("anything")).await.is_err());
    }

    #[tokio::test]
    async fn test_fake_client_default_response() {
        let client = FakeAiClient::new().with_default_response("{}");
        let result = client.complete("test", request("anything")).await.unwrap();
        assert_eq!(result.content, "{}");
    }
}
