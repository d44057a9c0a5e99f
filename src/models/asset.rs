use serde::{Deserialize, Serialize};

use super::common::Size;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteRequest {
    pub prompt: String,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpriteResponse {
    pub sprite_path: String,
}

#[derive(Debug, Deserialize)]
pub struct UiResponse {
    pub ui_path: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    Player,
    Enemy,
    Derelict,
    Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipStyle {
    Sleek,
    Bulky,
    Damaged,
    Alien,
}

impl ShipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipKind::Player => "player",
            ShipKind::Enemy => "enemy",
            ShipKind::Derelict => "derelict",
            ShipKind::Station => "station",
        }
    }

    fn details(&self) -> &'static str {
        match self {
            ShipKind::Player => " featuring sleek lines, visible thrusters, and a cockpit",
            ShipKind::Enemy => " with aggressive angles, weapon mounts, and intimidating design",
            ShipKind::Derelict => {
                " showing battle damage, exposed internal structure, and dim lighting"
            }
            ShipKind::Station => {
                " with multiple docking ports, habitat sections, and communication arrays"
            }
        }
    }
}

impl ShipStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipStyle::Sleek => "sleek",
            ShipStyle::Bulky => "bulky",
            ShipStyle::Damaged => "damaged",
            ShipStyle::Alien => "alien",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub kind: ShipKind,
    pub style: ShipStyle,
    pub color: Option<String>,
    pub size: Size,
}

impl ShipSpec {
    pub fn new(kind: ShipKind, style: ShipStyle, size: Size) -> Self {
        Self {
            kind,
            style,
            color: None,
            size,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn prompt(&self) -> String {
        let color = match self.color.as_deref() {
            Some(color) if !color.is_empty() => format!(" with {} accents", color),
            _ => String::new(),
        };

        format!(
            "Generate a {} {} spaceship{}{}. Use a pixel art style with clean edges and good contrast.",
            self.style.as_str(),
            self.kind.as_str(),
            color,
            self.kind.details()
        )
    }
}
