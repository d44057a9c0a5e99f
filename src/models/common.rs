use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub id: String,
    pub name: String,
    pub native_size: (u32, u32),
    pub description: String,
}

/// `[width, height]`, the shape the asset server expects for `size`.
pub type Size = [u32; 2];
