use crate::progress::RewardPolicy;
use crate::puzzle::common::Face;
use crate::puzzle::cube::default_colors;
use crate::render::DEFAULT_SPACING;
use crate::util::color::Color;
use enum_map::EnumMap;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

pub const PREFS_PATH: &str = "./preferences.json";

fn default_twist_duration() -> f32 {
    220.0
}

fn default_spacing() -> f32 {
    DEFAULT_SPACING
}

fn default_shuffle_length() -> usize {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPreferences {
    #[serde(default = "default_colors")]
    #[serde(with = "crate::util::enum_map_serde")]
    pub cube: EnumMap<Face, Color>,
}

impl Default for ColorPreferences {
    fn default() -> Self {
        Self {
            cube: default_colors(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationPreferences {
    /// Length of one twist, whatever its angle.
    #[serde(default = "default_twist_duration")]
    pub twist_duration_ms: f32,
    #[serde(default = "default_spacing")]
    pub spacing: f32,
}

impl Default for AnimationPreferences {
    fn default() -> Self {
        Self {
            twist_duration_ms: default_twist_duration(),
            spacing: default_spacing(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShufflePreferences {
    #[serde(default = "default_shuffle_length")]
    pub length: usize,
}

impl Default for ShufflePreferences {
    fn default() -> Self {
        Self {
            length: default_shuffle_length(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(default)]
    pub colors: ColorPreferences,
    #[serde(default)]
    pub animation: AnimationPreferences,
    #[serde(default)]
    pub shuffle: ShufflePreferences,
    #[serde(default)]
    pub rewards: RewardPolicy,
}

impl Preferences {
    pub fn save(&self) -> eyre::Result<()> {
        self.save_to(PREFS_PATH)
    }

    pub fn load() -> eyre::Result<Self> {
        Self::load_from(PREFS_PATH)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Missing files give the defaults; so do missing fields.
    pub fn load_from(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no preferences file, using defaults");
            return Ok(Default::default());
        }
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
