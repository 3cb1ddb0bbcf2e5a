use std::collections::BTreeMap;

use crate::error::{SceneError, SceneResult};

/// A full narration script: the external input that drives the engine.
///
/// Produced by the narration-authoring side (out of scope); consumed here as
/// immutable data. One line = one scene.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NarrationScript {
    /// Topic key, e.g. `"basic-arithmetic"` or `"bezier"`.
    pub topic: String,
    /// Determinism seed for topics that simulate data.
    #[serde(default)]
    pub seed: u64,
    pub lines: Vec<NarrationLineScene>,
}

/// One narration line and the scene it selects. Immutable snapshot, consumed
/// once per render.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NarrationLineScene {
    #[serde(rename = "lineId")]
    pub line_id: String,
    #[serde(rename = "sectionId")]
    pub section_id: String,
    pub scene: SceneConfig,
    #[serde(rename = "lineState", default, skip_serializing_if = "Option::is_none")]
    pub line_state: Option<LineState>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SceneType,
}

/// Scene type vocabulary of the narration scripts. The lowercase string form
/// is the external contract; everything downstream works on this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    Title,
    Text,
    Waveform,
    Spectrum,
    Formula,
    Comparison,
    Animation,
    Interactive,
    Application,
    Illustration,
    Summary,
}

/// Per-line visual state: parameter overrides, element visibility, highlights
/// and an optional annotation.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct LineState {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub show: BTreeMap<String, ShowFlag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlight: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

/// Visibility flag: scripts write either a bool ("all or nothing") or a count
/// ("show the first N elements").
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ShowFlag {
    Bool(bool),
    Count(u32),
}

impl ShowFlag {
    pub fn visible(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Count(n) => n > 0,
        }
    }

    /// How many of `total` elements to show.
    pub fn count(self, total: u32) -> u32 {
        match self {
            Self::Bool(true) => total,
            Self::Bool(false) => 0,
            Self::Count(n) => n.min(total),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub text: String,
    pub position: AnnotationPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl NarrationScript {
    pub fn validate(&self) -> SceneResult<()> {
        if self.topic.trim().is_empty() {
            return Err(SceneError::script("script topic must be non-empty"));
        }
        if self.lines.is_empty() {
            return Err(SceneError::script("script must have at least one line"));
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

impl NarrationLineScene {
    pub fn validate(&self) -> SceneResult<()> {
        if self.line_id.trim().is_empty() {
            return Err(SceneError::script("line id must be non-empty"));
        }
        if self.section_id.trim().is_empty() {
            return Err(SceneError::script(format!(
                "line '{}' has an empty section id",
                self.line_id
            )));
        }
        if self.scene.id.trim().is_empty() {
            return Err(SceneError::script(format!(
                "line '{}' has an empty scene id",
                self.line_id
            )));
        }
        Ok(())
    }
}

/// Seeded FNV-1a 64 over a string; gives each line a stable sub-seed.
pub fn stable_hash64(seed: u64, s: &str) -> u64 {
    let mut h = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for &b in s.as_bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}
