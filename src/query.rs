//! Wire-level data model shared with VOICEVOX-compatible clients.
//!
//! Field names are part of the compatibility contract: clients round-trip these
//! structures as JSON, so renames here break downstream tooling.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A single mora: the smallest pronounceable timing unit (roughly one kana).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mora {
    /// Display text: a katakana mora, or the punctuation glyph itself.
    pub text: String,
    pub consonant: Option<String>,
    /// Present exactly when `consonant` is.
    pub consonant_length: Option<f64>,
    /// Vowel phoneme; `pau` for punctuation moras.
    pub vowel: String,
    pub vowel_length: f64,
    pub pitch: f64,
}

/// A run of moras sharing one pitch-accent contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentPhrase {
    pub moras: Vec<Mora>,
    /// 1-indexed position of the accent nucleus.
    pub accent: usize,
    pub pause_mora: Option<Mora>,
    #[serde(default)]
    pub is_interrogative: bool,
}

/// A full synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
#[serde(rename_all = "camelCase")]
pub struct AudioQuery {
    #[serde(rename = "accent_phrases")]
    pub accent_phrases: Vec<AccentPhrase>,
    pub speed_scale: f64,
    /// Drives the style weight of the voice model.
    pub intonation_scale: f64,
    /// Drives the SDP ratio of the voice model.
    #[serde(default = "default_scale")]
    pub tempo_dynamics_scale: f64,
    pub pitch_scale: f64,
    pub volume_scale: f64,
    /// Leading silence in seconds.
    pub pre_phoneme_length: f64,
    /// Trailing silence in seconds.
    pub post_phoneme_length: f64,
    #[serde(default)]
    pub pause_length: Option<f64>,
    #[serde(default = "default_scale")]
    pub pause_length_scale: f64,
    pub output_sampling_rate: u32,
    pub output_stereo: bool,
    /// Reading of the query. A non-empty value is spoken verbatim instead of the
    /// text rebuilt from `accent_phrases`, so callers may put plain
    /// kanji-kana text here.
    #[serde(default)]
    pub kana: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for AudioQuery {
    fn default() -> Self {
        Self {
            accent_phrases: Vec::new(),
            speed_scale: 1.0,
            intonation_scale: 1.0,
            tempo_dynamics_scale: 1.0,
            pitch_scale: 0.0,
            volume_scale: 1.0,
            pre_phoneme_length: 0.1,
            post_phoneme_length: 0.1,
            pause_length: None,
            pause_length_scale: 1.0,
            output_sampling_rate: 44100,
            output_stereo: false,
            kana: None,
        }
    }
}

impl AudioQuery {
    /// A query with default controls speaking `accent_phrases`.
    pub fn from_accent_phrases(accent_phrases: Vec<AccentPhrase>) -> Self {
        Self {
            accent_phrases,
            ..Default::default()
        }
    }
}

/// All moras of `accent_phrases` in order, pause moras included.
pub fn flatten_moras(accent_phrases: &[AccentPhrase]) -> Vec<&Mora> {
    accent_phrases
        .iter()
        .flat_map(|phrase| phrase.moras.iter().chain(phrase.pause_mora.as_ref()))
        .collect()
}
