use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Serialize;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Chat-style model boundary: one user message plus a sampling temperature in, raw text out.
pub trait LlmClient: Send + Sync {
    fn chat<'a>(
        &'a self,
        model: &'a str,
        prompt: String,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

/// Client for an Ollama-style `POST /api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaChatClient {
    client: Client,
    endpoint: String,
}

impl OllamaChatClient {
    pub fn new(cfg: &LlmConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
        })
    }

    async fn send(&self, model: &str, prompt: &str, temperature: f64) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions { temperature },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        extract_reply(&payload)
    }
}

/// Pulls the reply text out of a chat response, accepting the generate-style `response` field too.
fn extract_reply(payload: &serde_json::Value) -> Result<String, LlmError> {
    payload
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .or_else(|| payload.get("response").and_then(serde_json::Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| LlmError::Decode(format!("no message content in response: {payload}")))
}

impl LlmClient for OllamaChatClient {
    fn chat<'a>(
        &'a self,
        model: &'a str,
        prompt: String,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(async move { self.send(model, &prompt, temperature).await })
    }
}

pub const MOCK_REPLIES: [&str; 5] = ["UP", "DOWN", "LEFT", "RIGHT", "STOP"];

/// Offline stand-in that answers uniformly from the walk vocabulary, ignoring temperature.
#[derive(Debug)]
pub struct RandomReplyLlm {
    rng: Mutex<StdRng>,
}

impl RandomReplyLlm {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn next_reply(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        MOCK_REPLIES
            .choose(&mut *rng)
            .copied()
            .unwrap_or("STOP")
            .to_string()
    }
}

impl LlmClient for RandomReplyLlm {
    fn chat<'a>(
        &'a self,
        _model: &'a str,
        _prompt: String,
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        let reply = self.next_reply();
        Box::pin(async move { Ok(reply) })
    }
}

/// Builds the client selected by config: the offline mock for `endpoint = "mock"`, HTTP otherwise.
pub fn build_client(cfg: &LlmConfig) -> Result<Box<dyn LlmClient>, LlmError> {
    if cfg.is_mock() {
        return Ok(Box::new(RandomReplyLlm::new(cfg.mock_seed)));
    }
    Ok(Box::new(OllamaChatClient::new(cfg)?))
}
