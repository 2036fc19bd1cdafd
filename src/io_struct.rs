use serde::{Deserialize, Serialize};

/// Inbound body of `POST /chat`. Unknown fields are tolerated.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Body sent to the backend's `/api/chat` endpoint. `stream` is always false.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Backend reply. Only `message.content` is surfaced to the caller; every
/// field defaults so a body carrying just the message still decodes.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub message: ResponseMessage,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatReply {
    pub reply: String,
}
