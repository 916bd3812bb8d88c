use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use serde_json::{json, Value};

use crate::error::OracleError;
use crate::oracle::{TextOracle, VisionOracle};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CLASSIFY_MAX_TOKENS: u32 = 300;
const COMPARE_MAX_TOKENS: u32 = 10;
const COMPLETE_MAX_TOKENS: u32 = 500;

/// Blocking OpenAI-compatible chat-completions client. Implements both the
/// vision and text collaborator seams; construct once and pass by
/// reference, never as ambient global state.
pub struct OpenAiVision {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, OracleError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OracleError::Config("OPENAI_API_KEY is not set".into()))?;
        let mut oracle = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            oracle.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            oracle.model = model;
        }
        Ok(oracle)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn data_url(image: &Path) -> Result<String, OracleError> {
        let bytes = fs::read(image)?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
    }

    fn image_part(image: &Path) -> Result<Value, OracleError> {
        Ok(json!({
            "type": "image_url",
            "image_url": { "url": Self::data_url(image)? }
        }))
    }

    fn chat(&self, content: Value, max_tokens: u32) -> Result<String, OracleError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": content }],
            "max_tokens": max_tokens,
        });

        debug!("chat completion request (max_tokens={})", max_tokens);
        let response: Value = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| OracleError::Malformed("response has no message content".into()))
    }
}

impl VisionOracle for OpenAiVision {
    fn classify_image(&self, image: &Path, prompt: &str) -> Result<String, OracleError> {
        let content = json!([
            { "type": "text", "text": prompt },
            Self::image_part(image)?,
        ]);
        self.chat(content, CLASSIFY_MAX_TOKENS)
    }

    fn compare_images(
        &self,
        first: &Path,
        second: &Path,
        prompt: &str,
    ) -> Result<String, OracleError> {
        let content = json!([
            { "type": "text", "text": prompt },
            Self::image_part(first)?,
            Self::image_part(second)?,
        ]);
        self.chat(content, COMPARE_MAX_TOKENS)
    }
}

impl TextOracle for OpenAiVision {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.chat(json!(prompt), COMPLETE_MAX_TOKENS)
    }
}
