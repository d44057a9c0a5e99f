//! Tooling for producing game sprites: a client for the Stability AI
//! text-to-image REST API, a near-white background stripper, and a client
//! for the local asset-generation server.

pub mod clients;
pub mod config;
pub mod error;
pub mod imaging;
pub mod logger;
pub mod models;
pub mod smoke;

pub use clients::{AssetClient, AssetServerClient, ImageClient};
pub use config::{AssetServerConfig, Config, StabilityConfig};
pub use error::{Error, Result};
pub use imaging::StripOptions;
pub use models::*;
