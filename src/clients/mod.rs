pub mod asset_server;
pub mod image_client;

use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    error::Result,
    imaging::{self, StripOptions},
    models::GenerationRequest,
};

pub use asset_server::AssetServerClient;
pub use image_client::ImageClient;

/// One HTTP connection pool shared by the remote generator and the local
/// asset server client.
#[derive(Clone)]
pub struct AssetClient {
    image_client: ImageClient,
    asset_server: AssetServerClient,
}

impl AssetClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spriteforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            image_client: ImageClient::new(http.clone(), config.stability),
            asset_server: AssetServerClient::new(http, config.asset_server),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn assets(&self) -> &AssetServerClient {
        &self.asset_server
    }

    /// Generate an image to `generated`, then strip its background into
    /// `stripped`. The second step only runs once the first file exists.
    pub async fn generate_and_strip(
        &self,
        request: &GenerationRequest,
        generated: &Path,
        stripped: &Path,
        options: &StripOptions,
    ) -> Result<PathBuf> {
        let generated = self.image_client.generate_to_file(request, generated).await?;
        imaging::strip_background_file(&generated, stripped, options)
    }
}
