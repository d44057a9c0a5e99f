use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_SHIP_PROMPT: &str = "A sleek, futuristic spaceship on a pure white background, top-down view, 2D game asset style, clean lines, minimalist design, centered composition";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

/// Body of a `text-to-image` call. Field names match the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text_prompts: Vec<TextPrompt>,
    pub cfg_scale: f32,
    pub height: u32,
    pub width: u32,
    pub samples: u32,
    pub steps: u32,
    pub style_preset: StylePreset,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::from_prompt(DEFAULT_SHIP_PROMPT)
    }
}

impl GenerationRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            text_prompts: vec![TextPrompt {
                text: prompt.into(),
                weight: 1.0,
            }],
            cfg_scale: 7.0,
            height: 1024,
            width: 1024,
            samples: 1,
            steps: 30,
            style_preset: StylePreset::DigitalArt,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_style(mut self, style_preset: StylePreset) -> Self {
        self.style_preset = style_preset;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f32) -> Self {
        self.cfg_scale = cfg_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.text_prompts.is_empty() {
            return Err(Error::Validation("at least one text prompt is required".into()));
        }
        if self.text_prompts.iter().any(|p| p.text.trim().is_empty()) {
            return Err(Error::Validation("text prompts must not be empty".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Validation(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples == 0 || self.steps == 0 {
            return Err(Error::Validation("samples and steps must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub base64: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    #[serde(rename = "3d-model")]
    ThreeDModel,
    AnalogFilm,
    Anime,
    Cinematic,
    ComicBook,
    DigitalArt,
    Enhance,
    FantasyArt,
    Isometric,
    LineArt,
    LowPoly,
    ModelingCompound,
    NeonPunk,
    Origami,
    Photographic,
    PixelArt,
    TileTexture,
}

impl StylePreset {
    pub fn all() -> &'static [StylePreset] {
        use StylePreset::*;
        &[
            ThreeDModel,
            AnalogFilm,
            Anime,
            Cinematic,
            ComicBook,
            DigitalArt,
            Enhance,
            FantasyArt,
            Isometric,
            LineArt,
            LowPoly,
            ModelingCompound,
            NeonPunk,
            Origami,
            Photographic,
            PixelArt,
            TileTexture,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::ThreeDModel => "3d-model",
            StylePreset::AnalogFilm => "analog-film",
            StylePreset::Anime => "anime",
            StylePreset::Cinematic => "cinematic",
            StylePreset::ComicBook => "comic-book",
            StylePreset::DigitalArt => "digital-art",
            StylePreset::Enhance => "enhance",
            StylePreset::FantasyArt => "fantasy-art",
            StylePreset::Isometric => "isometric",
            StylePreset::LineArt => "line-art",
            StylePreset::LowPoly => "low-poly",
            StylePreset::ModelingCompound => "modeling-compound",
            StylePreset::NeonPunk => "neon-punk",
            StylePreset::Origami => "origami",
            StylePreset::Photographic => "photographic",
            StylePreset::PixelArt => "pixel-art",
            StylePreset::TileTexture => "tile-texture",
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StylePreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        StylePreset::all()
            .iter()
            .copied()
            .find(|preset| preset.as_str() == wanted)
            .ok_or_else(|| Error::Validation(format!("unknown style preset '{}'", s)))
    }
}
