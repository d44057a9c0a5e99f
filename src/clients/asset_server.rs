use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::AssetServerConfig,
    error::{Error, Result},
    models::{
        HealthResponse, ShipSpec, Size, SpriteRequest, SpriteResponse, UiRequest, UiResponse,
    },
};

pub const SPRITE_ENDPOINT: &str = "/api/generate/sprite";
pub const UI_ENDPOINT: &str = "/api/generate/ui";
pub const HEALTH_ENDPOINT: &str = "/health";

/// Client for the local asset-generation server the game talks to.
#[derive(Clone)]
pub struct AssetServerClient {
    http: reqwest::Client,
    config: AssetServerConfig,
}

impl AssetServerClient {
    pub fn new(http: reqwest::Client, config: AssetServerConfig) -> Self {
        Self { http, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST `payload` and return whatever JSON comes back, regardless of
    /// status. Only a body that is not JSON is an error.
    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Value> {
        let (status, body) = self.send(path, payload).await?;
        parse_typed(status, &body)
    }

    pub async fn generate_sprite(&self, request: &SpriteRequest) -> Result<String> {
        let response: SpriteResponse = self
            .post_checked(SPRITE_ENDPOINT, request, "Failed to generate sprite")
            .await?;
        Ok(response.sprite_path)
    }

    pub async fn generate_ui(&self, request: &UiRequest) -> Result<String> {
        let response: UiResponse = self
            .post_checked(UI_ENDPOINT, request, "Failed to generate UI")
            .await?;
        Ok(response.ui_path)
    }

    pub async fn generate_ship(&self, spec: &ShipSpec) -> Result<String> {
        self.generate_sprite(&SpriteRequest {
            prompt: spec.prompt(),
            size: spec.size,
        })
        .await
    }

    pub async fn generate_background(&self, theme: &str, size: Size) -> Result<String> {
        self.generate_sprite(&SpriteRequest {
            prompt: format!(
                "Generate a space {} background with stars and nebula effects in pixel art style",
                theme
            ),
            size,
        })
        .await
    }

    pub async fn generate_effect(&self, kind: &str, size: Size) -> Result<String> {
        self.generate_sprite(&SpriteRequest {
            prompt: format!("Generate a {} effect sprite sheet in pixel art style", kind),
            size,
        })
        .await
    }

    /// A UI element drawn through the sprite endpoint from a prompt, unlike
    /// `generate_ui` which uses the dedicated UI endpoint.
    pub async fn generate_ui_element(&self, kind: &str, size: Size) -> Result<String> {
        self.generate_sprite(&SpriteRequest {
            prompt: format!(
                "Generate a sci-fi {} UI element with glowing edges and holographic effects",
                kind
            ),
            size,
        })
        .await
    }

    /// `true` only when the server reports `{"status": "healthy"}`.
    pub async fn check_health(&self) -> bool {
        match self.fetch_health().await {
            Ok(health) => health.status == "healthy",
            Err(e) => {
                log::warn!("Health check failed for {}: {}", self.config.base_url, e);
                false
            }
        }
    }

    async fn fetch_health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(self.config.endpoint(HEALTH_ENDPOINT))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_typed(status, &body)
    }

    async fn send<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<(StatusCode, String)> {
        let url = self.config.endpoint(path);
        log::debug!("POST {}", url);

        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn post_checked<T, R>(&self, path: &str, payload: &T, what: &str) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let (status, body) = self.send(path, payload).await?;
        if !status.is_success() {
            return Err(Error::remote(
                Some(status.as_u16()),
                format!("{}: {}", what, status.canonical_reason().unwrap_or("unknown status")),
            ));
        }
        parse_typed(status, &body)
    }
}

fn parse_typed<R: DeserializeOwned>(status: StatusCode, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| {
        Error::remote(
            Some(status.as_u16()),
            format!("unexpected response body: {}", e),
        )
    })
}
