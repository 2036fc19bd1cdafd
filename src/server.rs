use crate::gateway_state::{GatewayConfig, GatewayState};
use crate::io_struct::{ChatMessage, ChatPayload, ChatReply, ChatRequest};
use actix_web::http::Method;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, web};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[get("/healthz")]
pub async fn healthz(_req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Handles `POST /chat`. Registered as a catch-all route so that non-POST
/// methods get the 405 body instead of falling through the router.
pub async fn chat(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> HttpResponse {
    if req.method() != Method::POST {
        return HttpResponse::MethodNotAllowed().body("method not allowed");
    }

    let payload = match decode_payload(&body) {
        Some(payload) => payload,
        None => return HttpResponse::BadRequest().body("invalid JSON payload"),
    };
    if payload.prompt.trim().is_empty() {
        return HttpResponse::BadRequest().body("prompt is required");
    }

    // The override is trimmed before use; the prompt goes downstream as-is.
    let model = match payload.model.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => state.model.clone(),
    };
    if !state.allowed_models.is_empty() && !state.allowed_models.iter().any(|m| *m == model) {
        return HttpResponse::BadRequest().body(model_not_allowed(&state.allowed_models));
    }

    let request = ChatRequest {
        model,
        stream: false,
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
                images: None,
            },
            ChatMessage {
                role: "user".to_string(),
                content: payload.prompt,
                images: payload.images,
            },
        ],
    };

    let response = match tokio::time::timeout(state.timeout, state.client.chat(&request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            log::error!("chat request failed: {e:#}");
            return HttpResponse::BadGateway().body(format!("{e:#}"));
        }
        Err(_) => {
            let message = format!("chat request timed out after {}s", state.timeout.as_secs());
            log::error!("{}", message);
            return HttpResponse::BadGateway().body(message);
        }
    };

    let reply = ChatReply {
        reply: response.message.content,
    };
    let mut data = match serde_json::to_string(&reply) {
        Ok(data) => data,
        Err(e) => {
            log::error!("failed to encode chat reply: {}", e);
            return HttpResponse::InternalServerError().body("failed to encode response");
        }
    };
    data.push('\n');
    HttpResponse::Ok().content_type(ContentType::json()).body(data)
}

/// The body must hold exactly one JSON object; anything but whitespace after
/// it rejects the payload.
fn decode_payload(body: &[u8]) -> Option<ChatPayload> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<ChatPayload>();
    let payload = match stream.next() {
        Some(Ok(payload)) => payload,
        _ => return None,
    };
    match stream.next() {
        None => Some(payload),
        Some(_) => None,
    }
}

fn model_not_allowed(allowed: &[String]) -> String {
    if allowed.len() == 1 {
        format!("model not allowed: use {}", allowed[0])
    } else {
        format!("model not allowed: use one of {}", allowed.join(", "))
    }
}

pub async fn startup(config: GatewayConfig, state: GatewayState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    log::info!(
        "Server on {}:{} → /chat POST {{prompt}}",
        config.host,
        config.port
    );

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .service(healthz)
            .service(web::resource("/chat").route(web::route().to(chat)))
    })
    .bind((config.host, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_with_trailing_whitespace_is_accepted() {
        let payload = decode_payload(b"{\"prompt\":\"hi\"}  \n").unwrap();
        assert_eq!(payload.prompt, "hi");
    }

    #[test]
    fn payload_with_trailing_content_is_rejected() {
        assert!(decode_payload(b"{\"prompt\":\"hi\"}{\"prompt\":\"again\"}").is_none());
        assert!(decode_payload(b"{\"prompt\":\"hi\"} garbage").is_none());
    }

    #[test]
    fn malformed_and_empty_bodies_are_rejected() {
        assert!(decode_payload(b"{not json").is_none());
        assert!(decode_payload(b"").is_none());
        assert!(decode_payload(b"   ").is_none());
    }

    #[test]
    fn allow_list_error_phrasing() {
        assert_eq!(
            model_not_allowed(&["m1".to_string()]),
            "model not allowed: use m1"
        );
        assert_eq!(
            model_not_allowed(&["m1".to_string(), "m2".to_string()]),
            "model not allowed: use one of m1, m2"
        );
    }
}
