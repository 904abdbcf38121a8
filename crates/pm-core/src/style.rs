use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::ValidationError;

/// Style presets offered to the user, each backed by a fixed prompt fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    Superhero,
    Anime,
    Cyberpunk,
    PixelArt,
    Custom,
}

impl StylePreset {
    /// Identifier used on the wire and in form fields
    pub fn id(&self) -> &'static str {
        match self {
            Self::Superhero => "superhero",
            Self::Anime => "anime",
            Self::Cyberpunk => "cyberpunk",
            Self::PixelArt => "pixel-art",
            Self::Custom => "custom",
        }
    }

    /// Label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Superhero => "Superhero",
            Self::Anime => "Healing Anime",
            Self::Cyberpunk => "Cyberpunk",
            Self::PixelArt => "Pixel Art",
            Self::Custom => "Custom",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Superhero => "🦸",
            Self::Anime => "🎌",
            Self::Cyberpunk => "🌃",
            Self::PixelArt => "👾",
            Self::Custom => "✨",
        }
    }

    /// Prompt fragment sent to the generation model for this style
    pub fn prompt_fragment(&self) -> &'static str {
        match self {
            Self::Superhero => "Dressed as a superhero with costume and cape, powerful heroic pose, dynamic action stance",
            Self::Anime => "Transform into healing anime style, Studio Ghibli inspired, warm and peaceful atmosphere, soft colors and gentle expressions",
            Self::Cyberpunk => "Transform into cyberpunk style, neon lights, futuristic cityscape, high-tech aesthetic with glowing elements",
            Self::PixelArt => "Transform into pixel art style, retro gaming aesthetic, 8-bit or 16-bit graphics with vibrant colors",
            Self::Custom => "High quality artistic transformation with creative interpretation",
        }
    }

    /// Full prompt for this style, with optional user text appended
    pub fn build_prompt(&self, extra: Option<&str>) -> String {
        match extra.map(str::trim).filter(|s| !s.is_empty()) {
            Some(extra) => format!("{}, {}", self.prompt_fragment(), extra),
            None => self.prompt_fragment().to_string(),
        }
    }

    /// All available presets
    pub fn all() -> [StylePreset; 5] {
        [Self::Superhero, Self::Anime, Self::Cyberpunk, Self::PixelArt, Self::Custom]
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StylePreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::MissingStyle);
        }

        Self::all()
            .into_iter()
            .find(|style| style.id() == s)
            .ok_or_else(|| ValidationError::UnknownStyle(s.to_string()))
    }
}
