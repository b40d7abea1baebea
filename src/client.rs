use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

#[derive(Serialize)]
pub struct ChatRequest {
    pub context: String,
    pub question: String,
}

/// One server turn: the reply text plus the replacement context token.
#[derive(Deserialize)]
pub struct ChatReply {
    pub context: String,
    pub response: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one question with the current context token and parse the reply.
    pub async fn ask(&self, context: &str, question: &str) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            context: context.to_string(),
            question: question.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "chat request failed with status: {}",
                response.status()
            ));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply)
    }

    /// Tell the server to tear down the session.
    pub async fn notify_exit(&self) -> Result<()> {
        let url = format!("{}/exit", self.base_url);

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "exit notification failed with status: {}",
                response.status()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            context: String::new(),
            question: "Hi".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"context": "", "question": "Hi"}));
    }

    #[test]
    fn test_reply_parsing() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"context":"c1","response":"**ok**"}"#).unwrap();
        assert_eq!(reply.context, "c1");
        assert_eq!(reply.response, "**ok**");
    }

    #[test]
    fn test_reply_parsing_ignores_extra_fields() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"context":"c2","response":"hi","model":"x"}"#).unwrap();
        assert_eq!(reply.context, "c2");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ChatClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
