//! Manual check for the local asset server: two fixed requests whose JSON
//! answers are printed for a human to read. Nothing is asserted.

use serde_json::Value;

use crate::{
    clients::{
        asset_server::{SPRITE_ENDPOINT, UI_ENDPOINT},
        AssetServerClient,
    },
    error::Result,
    models::{SpriteRequest, UiRequest},
};

#[derive(Debug, Clone)]
pub struct SmokeResult {
    pub title: &'static str,
    pub response: Value,
}

pub fn sprite_request() -> SpriteRequest {
    SpriteRequest {
        prompt: "player".to_string(),
        size: [64, 64],
    }
}

pub fn ui_request() -> UiRequest {
    UiRequest {
        kind: "button".to_string(),
        size: [200, 50],
        theme: None,
    }
}

/// Sends the sprite request, then the UI request. Each response is handed to
/// `on_result` before the next request goes out, so an error on the second
/// call still leaves the first one reported. The first error ends the run.
pub async fn run_smoke_test<F>(client: &AssetServerClient, mut on_result: F) -> Result<Vec<SmokeResult>>
where
    F: FnMut(&SmokeResult),
{
    log::info!("Testing asset generator server at {}", client.base_url());

    let mut results = Vec::with_capacity(2);

    let sprite = SmokeResult {
        title: "Sprite Generation Response:",
        response: client.post_json(SPRITE_ENDPOINT, &sprite_request()).await?,
    };
    on_result(&sprite);
    results.push(sprite);

    let ui = SmokeResult {
        title: "UI Generation Response:",
        response: client.post_json(UI_ENDPOINT, &ui_request()).await?,
    };
    on_result(&ui);
    results.push(ui);

    Ok(results)
}

/// Heading followed by 2-space indented JSON.
pub fn render_result(result: &SmokeResult) -> String {
    let body = serde_json::to_string_pretty(&result.response)
        .unwrap_or_else(|_| result.response.to_string());
    format!("{}\n{}\n", result.title, body)
}
