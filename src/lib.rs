//! # sbv2-compat
//!
//! A Rust library that drives Style-Bert-VITS2 voice models through the
//! VOICEVOX accent phrase data model, so that existing VOICEVOX client tools
//! keep working against a newer model family.
//!
//! ## Features
//!
//! - **Accent phrase reconstruction**: rebuilds moras and accent phrases from the
//!   phoneme/tone sequence produced by a Japanese phonological front-end
//! - **Parameter mapping**: maps VOICEVOX style controls (speed, intonation, tempo
//!   dynamics, pitch) onto Style-Bert-VITS2's native parameters
//! - **Model cache**: loads each voice model once per process, on a device chosen once
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sbv2-compat = { version = "2026.10", features = ["style-bert-vits2"] }
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use sbv2_compat::engines::style_bert_vits2::{EngineParams, StyleBertVits2Engine};
//! use sbv2_compat::SynthesisEngine;
//!
//! let engine = StyleBertVits2Engine::new(manager, front_end, loader, EngineParams::default())?;
//! let accent_phrases = engine.create_accent_phrases("こんにちは", 0)?;
//! let query = sbv2_compat::query::AudioQuery::from_accent_phrases(accent_phrases);
//! let result = engine.synthesize_wave(&query, 0, true)?;
//! result.write_wav(std::path::Path::new("output.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;
pub mod query;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::query::{AccentPhrase, AudioQuery};

/// Caller-facing style identifier, resolved to a model-local speaker/style pair
/// by the model manager.
pub type StyleId = u32;

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values in `[-1, 1]`
    pub samples: Vec<f32>,
    /// Sample rate of the audio (44100 for Style-Bert-VITS2)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Devices an engine can run synthesis on, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSupport {
    pub cpu: bool,
    pub cuda: bool,
    pub dml: bool,
}

/// Common interface for voice engines that speak the accent phrase data model.
///
/// Several engines can sit behind this trait; which one serves a request is
/// decided when the engine is constructed.
pub trait SynthesisEngine {
    /// Error returned by every fallible operation of the engine.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the accent phrase sequence for `text`.
    fn create_accent_phrases(
        &self,
        text: &str,
        style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error>;

    /// Fill in the phoneme lengths of every mora for the given style.
    fn update_length(
        &self,
        accent_phrases: Vec<AccentPhrase>,
        style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error>;

    /// Fill in the pitch of every mora for the given style.
    fn update_pitch(
        &self,
        accent_phrases: Vec<AccentPhrase>,
        style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error>;

    /// Update lengths, then pitches.
    fn update_length_and_pitch(
        &self,
        accent_phrases: Vec<AccentPhrase>,
        style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error> {
        let accent_phrases = self.update_length(accent_phrases, style_id)?;
        self.update_pitch(accent_phrases, style_id)
    }

    /// Synthesize the waveform described by `query`.
    ///
    /// The query is never modified; engines that need to edit it work on a copy.
    fn synthesize_wave(
        &self,
        query: &AudioQuery,
        style_id: StyleId,
        enable_interrogative_upspeak: bool,
    ) -> Result<SynthesisResult, Self::Error>;

    /// Prepare everything needed to synthesize with `style_id`.
    fn initialize_synthesis(&self, style_id: StyleId, skip_reinit: bool)
        -> Result<(), Self::Error>;

    /// Whether `style_id` is ready for synthesis without further loading.
    fn is_synthesis_initialized(&self, style_id: StyleId) -> Result<bool, Self::Error>;

    /// Native output sample rate of the engine.
    fn default_sampling_rate(&self) -> u32;

    /// Devices this engine can synthesize on, if the engine reports them.
    fn supported_devices(&self) -> Option<DeviceSupport>;
}
