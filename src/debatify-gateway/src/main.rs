//! Debatify Gateway - HTTP generation boundary
//!
//! Serverless-style HTTP surface over the response generation gateway:
//! POST a participant identity and prompt context, get generated text
//! back. Credentials are resolved once at startup and any origin may call
//! the endpoint.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use debatify_core::{
    HttpSink, NullSink, Participant, ProviderCredentials, ProviderId, ResponseGateway,
    ResponseGenerator, TranscriptSink,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    participant_identity: String,
    prompt_context: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    generated_text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: String,
}

struct AppState {
    gateway: ResponseGateway,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let credentials = ProviderCredentials::from_env();
    let sink: Arc<dyn TranscriptSink> = match std::env::var("DEBATIFY_SINK_URL") {
        Ok(url) if !url.trim().is_empty() => Arc::new(HttpSink::new(url)),
        _ => Arc::new(NullSink),
    };
    let state = Arc::new(AppState {
        gateway: ResponseGateway::new(credentials, sink),
    });
    let app = router(state);

    let addr =
        std::env::var("DEBATIFY_GATEWAY_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("debatify gateway listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(generate))
        .layer(cors)
        .with_state(state)
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    log::info!("generation request for {}", request.participant_identity);

    let result = async {
        let provider = ProviderId::from_str(&request.participant_identity)?;
        let participant = Participant::debater(provider.display_name(), provider)
            .with_id(request.participant_identity.clone());
        state
            .gateway
            .generate(&participant, &request.prompt_context)
            .await
    }
    .await;

    match result {
        Ok(generated_text) => Ok(Json(GenerateResponse { generated_text })),
        Err(err) => {
            log::error!("generation failed: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                    details: "Check the gateway logs for more information".to_string(),
                }),
            ))
        }
    }
}
