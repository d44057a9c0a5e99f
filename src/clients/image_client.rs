use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use reqwest::{header, StatusCode};

use crate::{
    config::StabilityConfig,
    error::{Error, Result},
    imaging::{encode_png, write_bytes},
    logger,
    models::{EngineInfo, GenerationRequest, GenerationResponse},
};

#[derive(Clone)]
pub struct ImageClient {
    http: reqwest::Client,
    config: StabilityConfig,
}

impl ImageClient {
    pub fn new(http: reqwest::Client, config: StabilityConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    pub fn supported_engines() -> Vec<EngineInfo> {
        vec![
            EngineInfo {
                id: "stable-diffusion-xl-1024-v1-0".into(),
                name: "Stable Diffusion XL 1.0".into(),
                native_size: (1024, 1024),
                description: "SDXL base model, 1024px native".into(),
            },
            EngineInfo {
                id: "stable-diffusion-v1-6".into(),
                name: "Stable Diffusion 1.6".into(),
                native_size: (512, 512),
                description: "Faster, lower resolution".into(),
            },
        ]
    }

    /// Run one `text-to-image` call and decode the first artifact.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<DynamicImage> {
        request.validate()?;
        let api_key = self.config.require_api_key()?;
        let url = self.config.generation_url();

        log::info!(
            "Requesting {}x{} image from {} (style {})",
            request.width,
            request.height,
            self.config.engine_id,
            request.style_preset
        );
        log::debug!(
            "Generation request payload: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let _timer = logger::timer("text-to-image request");
        let mut builder = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(api_key)
            .json(request);
        if let Some(timeout) = self.config.timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_generation(status, &body)
    }

    /// Generate, then write the image as PNG to `output`. No file is
    /// created when any step before the write fails.
    pub async fn generate_to_file(
        &self,
        request: &GenerationRequest,
        output: &Path,
    ) -> Result<PathBuf> {
        let image = self.generate(request).await?;
        let bytes = encode_png(&image)?;
        write_bytes(&bytes, output)?;

        log::info!("Image generated and saved to {}", output.display());
        Ok(output.to_path_buf())
    }
}

fn decode_generation(status: StatusCode, body: &str) -> Result<DynamicImage> {
    if status != StatusCode::OK {
        log::error!("Generation failed with {}: {}", status, body);
        return Err(Error::remote(Some(status.as_u16()), body.trim()));
    }

    let parsed: GenerationResponse = serde_json::from_str(body)
        .map_err(|e| Error::remote(Some(status.as_u16()), format!("malformed response JSON: {}", e)))?;

    let artifact = parsed
        .artifacts
        .first()
        .ok_or_else(|| Error::remote(Some(status.as_u16()), "response contained no artifacts"))?;
    if parsed.artifacts.len() > 1 {
        log::debug!("Using first of {} artifacts", parsed.artifacts.len());
    }
    if let Some(reason) = &artifact.finish_reason {
        log::debug!("Artifact finish reason: {} (seed {:?})", reason, artifact.seed);
    }

    let bytes = STANDARD
        .decode(artifact.base64.trim())
        .map_err(|e| Error::remote(Some(status.as_u16()), format!("invalid base64 payload: {}", e)))?;

    image::load_from_memory(&bytes).map_err(|e| {
        Error::remote(
            Some(status.as_u16()),
            format!("artifact is not a decodable image: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_support::{dead_url, spawn_server};
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use image::{Rgb, RgbImage};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    const GENERATION_ROUTE: &str = "/v1/generation/:engine/text-to-image";

    fn sample_png() -> (RgbImage, String) {
        let img = RgbImage::from_fn(8, 4, |x, y| Rgb([x as u8 * 30, y as u8 * 60, 255]));
        let bytes = encode_png(&DynamicImage::ImageRgb8(img.clone())).unwrap();
        (img, STANDARD.encode(bytes))
    }

    fn client_for(base_url: &str) -> ImageClient {
        ImageClient::new(
            reqwest::Client::new(),
            StabilityConfig::new()
                .with_api_key("sk-test")
                .with_api_host(base_url),
        )
    }

    #[test]
    fn test_decode_rejects_non_200() {
        let err = decode_generation(StatusCode::BAD_REQUEST, "{\"name\":\"invalid_prompts\"}")
            .unwrap_err();
        match err {
            Error::RemoteGeneration { status, message } => {
                assert_eq!(status, Some(400));
                assert!(message.contains("invalid_prompts"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // 2xx other than 200 is still a failure
        assert!(decode_generation(StatusCode::ACCEPTED, "{}").is_err());
    }

    #[test]
    fn test_decode_rejects_malformed_bodies() {
        let cases = [
            "not json",
            "{\"artifacts\": []}",
            "{\"artifacts\": [{\"base64\": \"***\"}]}",
            "{\"artifacts\": [{\"base64\": \"aGVsbG8gd29ybGQ=\"}]}",
        ];
        for body in cases {
            assert!(
                matches!(
                    decode_generation(StatusCode::OK, body),
                    Err(Error::RemoteGeneration { .. })
                ),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_decode_uses_first_artifact() {
        let (img, payload) = sample_png();
        let other = STANDARD.encode(
            encode_png(&DynamicImage::new_rgb8(2, 2)).unwrap(),
        );
        let body = json!({
            "artifacts": [
                { "base64": payload, "seed": 1, "finishReason": "SUCCESS" },
                { "base64": other, "seed": 2, "finishReason": "SUCCESS" }
            ]
        })
        .to_string();

        let decoded = decode_generation(StatusCode::OK, &body).unwrap();
        assert_eq!(decoded.to_rgb8(), img);
    }

    #[tokio::test]
    async fn test_generate_writes_png() {
        let (img, payload) = sample_png();
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();

        let app = Router::new().route(
            GENERATION_ROUTE,
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                let payload = payload.clone();
                async move {
                    *captured.lock().unwrap() = Some((headers, body));
                    Json(json!({
                        "artifacts": [{ "base64": payload, "seed": 7, "finishReason": "SUCCESS" }]
                    }))
                }
            }),
        );
        let base_url = spawn_server(app).await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("generated_ship.png");
        let written = client_for(&base_url)
            .generate_to_file(&GenerationRequest::default(), &output)
            .await
            .unwrap();
        assert_eq!(written, output);

        let saved = image::open(&output).unwrap();
        assert_eq!(saved.to_rgb8(), img);

        let (headers, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body, serde_json::to_value(GenerationRequest::default()).unwrap());
    }

    #[tokio::test]
    async fn test_http_400_writes_nothing() {
        let app = Router::new().route(
            GENERATION_ROUTE,
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({ "name": "invalid_prompts", "message": "prompt rejected" })),
                )
            }),
        );
        let base_url = spawn_server(app).await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("generated_ship.png");
        let err = client_for(&base_url)
            .generate_to_file(&GenerationRequest::default(), &output)
            .await
            .unwrap_err();

        match err {
            Error::RemoteGeneration { status, message } => {
                assert_eq!(status, Some(400));
                assert!(message.contains("prompt rejected"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = ImageClient::new(
            reqwest::Client::new(),
            StabilityConfig::new().with_api_host(dead_url()),
        );
        let err = client.generate(&GenerationRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_request() {
        let client = client_for(&dead_url());
        let request = GenerationRequest::default().with_size(1024, 0);
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("generated_ship.png");
        let err = client_for(&dead_url())
            .generate_to_file(&GenerationRequest::default(), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_supported_engines() {
        let engines = ImageClient::supported_engines();
        assert!(engines
            .iter()
            .any(|engine| engine.id == crate::config::DEFAULT_ENGINE_ID));
    }
}
