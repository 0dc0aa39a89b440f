use std::collections::HashMap;
use std::sync::Arc;

use crate::StyleId;

use super::device::Device;

/// Native output sample rate of Style-Bert-VITS2 models.
pub const SAMPLE_RATE: u32 = 44100;

#[derive(thiserror::Error, Debug)]
pub enum StyleBertVits2Error {
    #[error("Malformed phoneme sequence: {0}")]
    MalformedPhoneSequence(String),
    #[error("Consonant '{phoneme}' has tone {tone} but the following vowel has tone {next_tone}")]
    ToneMismatch {
        phoneme: String,
        tone: u8,
        next_tone: u8,
    },
    #[error("No mora matches '{0}'")]
    UnknownMora(String),
    #[error("Style {0} not found. Install the voice model that provides it.")]
    StyleNotFound(StyleId),
    #[error("Style with local ID {local_style_id} not found in model {model_id}")]
    StyleNameNotFound { model_id: String, local_style_id: u32 },
    #[error("Failed to load model {model_id}: {reason}")]
    ModelLoadFailure { model_id: String, reason: String },
    #[error("Cannot read text {text:?}: {reason}")]
    UnreadableText { text: String, reason: String },
    #[error("Invalid audio query: {0}")]
    InvalidQuery(String),
    #[error("Invalid style catalog: {0}")]
    Config(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StyleBertVits2Error {
    /// Whether the caller caused the failure (unknown style, unreadable text,
    /// out-of-range query) rather than the engine or its models.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::StyleNotFound(_) | Self::UnreadableText { .. } | Self::InvalidQuery(_)
        )
    }
}

/// Everything a voice model needs for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub text: String,
    /// `None` lets the model derive phonemes from `text` on its own.
    pub phonemes: Option<Vec<String>>,
    /// Same length as `phonemes`.
    pub tones: Option<Vec<u8>>,
    pub speaker_id: u32,
    pub style_name: String,
    pub style_weight: f64,
    pub sdp_ratio: f64,
    pub length: f64,
    pub pitch_scale: f64,
}

/// 16-bit PCM produced by a voice model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWave {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl RawWave {
    /// Samples scaled into `[-1, 1]`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }
}

/// A loaded Style-Bert-VITS2 voice model.
///
/// Calls on one model may arrive from several threads; implementations that
/// cannot run concurrently must serialize internally.
pub trait VoiceModel: Send + Sync {
    /// Style name to local style ID table from the model's hyper-parameters.
    ///
    /// `None` when the model keeps no such table, in which case the manifest's
    /// style name is used as is.
    fn style_table(&self) -> Option<&HashMap<String, u32>> {
        None
    }

    fn infer(&self, request: &InferenceRequest) -> Result<RawWave, StyleBertVits2Error>;
}

/// Builds voice models from installed packages.
pub trait VoiceModelLoader: Send + Sync {
    /// Load the model identified by `model_id` onto `device`.
    ///
    /// Unreadable or corrupt packages fail with
    /// [`StyleBertVits2Error::ModelLoadFailure`].
    fn load(
        &self,
        model_id: &str,
        device: Device,
    ) -> Result<Arc<dyn VoiceModel>, StyleBertVits2Error>;
}
