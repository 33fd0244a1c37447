use log::{ info, warn };
use reqwest::{ Client as HttpClient, RequestBuilder, Response, StatusCode };
use reqwest::multipart;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::cli::Args;
use crate::models::catalog::{ default_models, parse_catalog, ModelEntry };
use crate::models::chat::RequestPayload;

/// Prefix for every error string recorded as an assistant reply.
pub const ERROR_INDICATOR: &str = "⚠️";

const BODY_SNIPPET_LEN: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Multipart,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseWireFormatError {
    message: String,
}

impl fmt::Display for ParseWireFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ParseWireFormatError {}

impl FromStr for WireFormat {
    type Err = ParseWireFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "multipart" => Ok(WireFormat::Multipart),
            _ => Err(ParseWireFormatError {
                message: format!("Invalid wire format: '{}' (expected json or multipart)", s),
            }),
        }
    }
}

#[derive(Debug)]
pub enum WebhookError {
    Transport(reqwest::Error),
    Unauthorized(u16),
    Http {
        status: u16,
        body: String,
    },
    InvalidBody(String),
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookError::Transport(e) => write!(f, "Transport failure: {}", e),
            WebhookError::Unauthorized(status) => write!(f, "Authorization failed (status {})", status),
            WebhookError::Http { status, body } => write!(f, "Webhook returned status {}: {}", status, body),
            WebhookError::InvalidBody(msg) => write!(f, "Webhook reply was not valid JSON: {}", msg),
        }
    }
}

impl Error for WebhookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WebhookError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl WebhookError {
    /// Short string recorded as the assistant reply for a failed turn.
    pub fn user_message(&self) -> String {
        match self {
            WebhookError::Transport(e) => {
                format!("{} Could not reach the webhook: {}", ERROR_INDICATOR, e)
            }
            WebhookError::Unauthorized(status) => {
                format!(
                    "{} The webhook rejected the supplied credentials (status {}).",
                    ERROR_INDICATOR,
                    status
                )
            }
            WebhookError::Http { status, body } => {
                format!("{} Webhook returned status {}: {}", ERROR_INDICATOR, status, body)
            }
            WebhookError::InvalidBody(msg) => {
                format!("{} The webhook reply could not be parsed: {}", ERROR_INDICATOR, msg)
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    format!("{}…", snippet)
}

/// Thin client around the automation webhook. One attempt per call, bounded
/// by a fixed timeout; all failures map onto [`WebhookError`].
pub struct WebhookClient {
    http: HttpClient,
    webhook_url: String,
    models_url: Option<String>,
    basic_user: Option<String>,
    basic_pass: Option<String>,
}

impl WebhookClient {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(args.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            webhook_url: args.webhook_url.clone(),
            models_url: args.models_url.clone(),
            basic_user: args.basic_user.clone().filter(|u| !u.is_empty()),
            basic_pass: args.basic_pass.clone(),
        })
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.basic_user {
            Some(user) => request.basic_auth(user, self.basic_pass.as_deref()),
            None => request,
        }
    }

    /// Sends one chat turn as an `application/json` body.
    pub async fn send_chat(&self, payload: &RequestPayload) -> Result<Value, WebhookError> {
        let request = self.http
            .post(&self.webhook_url)
            .header("X-Request-Id", &payload.request_id)
            .json(payload);
        let response = self.apply_auth(request).send().await.map_err(WebhookError::Transport)?;
        Self::read_json(response).await
    }

    /// Sends one chat turn as form fields plus an optional file part named
    /// `image`, for workflows that consume uploads directly.
    pub async fn send_chat_multipart(&self, payload: &RequestPayload) -> Result<Value, WebhookError> {
        let history = serde_json
            ::to_string(&payload.history)
            .map_err(|e| WebhookError::InvalidBody(e.to_string()))?;

        let mut form = multipart::Form::new()
            .text("request_id", payload.request_id.clone())
            .text("message", payload.message.clone())
            .text("project", payload.project.clone())
            .text("provider", payload.routing.provider.clone())
            .text("model", payload.routing.model.clone())
            .text("master_prompt", payload.master_prompt.clone())
            .text("history", history);

        if let Some(image) = payload.images.first() {
            let bytes = image.bytes().map_err(|e| WebhookError::InvalidBody(e.to_string()))?;
            let part = multipart::Part
                ::bytes(bytes)
                .file_name(image.filename.clone())
                .mime_str(&image.mime)
                .map_err(|e| WebhookError::InvalidBody(e.to_string()))?;
            form = form.part("image", part);
        }

        let request = self.http
            .post(&self.webhook_url)
            .header("X-Request-Id", &payload.request_id)
            .multipart(form);
        let response = self.apply_auth(request).send().await.map_err(WebhookError::Transport)?;
        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<Value, WebhookError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WebhookError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        let body = response.text().await.map_err(WebhookError::Transport)?;
        serde_json::from_str(&body).map_err(|e| WebhookError::InvalidBody(e.to_string()))
    }

    /// Fetches the model catalog; any failure or an empty list falls back to
    /// the built-in defaults so the UI always has something to offer.
    pub async fn fetch_models(&self) -> Vec<ModelEntry> {
        let Some(url) = self.models_url.clone() else {
            info!("No models endpoint configured, using built-in catalog");
            return default_models().to_vec();
        };

        match self.try_fetch_models(&url).await {
            Ok(models) if !models.is_empty() => {
                info!("Loaded {} models from catalog endpoint", models.len());
                models
            }
            Ok(_) => {
                warn!("Model catalog at {} was empty, using built-in defaults", url);
                default_models().to_vec()
            }
            Err(e) => {
                warn!("Model catalog fetch from {} failed ({}), using built-in defaults", url, e);
                default_models().to_vec()
            }
        }
    }

    async fn try_fetch_models(&self, url: &str) -> Result<Vec<ModelEntry>, WebhookError> {
        let response = self
            .apply_auth(self.http.get(url))
            .send().await
            .map_err(WebhookError::Transport)?;
        let value = Self::read_json(response).await?;
        Ok(parse_catalog(&value))
    }
}
