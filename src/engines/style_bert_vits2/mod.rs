//! Style-Bert-VITS2 engine behind the VOICEVOX accent phrase data model.
//!
//! Style-Bert-VITS2 reads text through its own Japanese front-end and cannot
//! report per-mora lengths or pitches. This module rebuilds accent phrases
//! from the front-end's phoneme/tone output so VOICEVOX clients can edit
//! them, and turns edited accent phrases back into the explicit phonemes and
//! tones the model accepts.
//!
//! # Collaborators
//!
//! The engine owns no model runtime of its own. It is wired to:
//!
//! | Trait | Role |
//! |---|---|
//! | [`ModelManager`] | resolves a style ID to a model and its local speaker/style |
//! | [`FrontEnd`] | text → `(phoneme, tone)` pairs |
//! | [`VoiceModelLoader`] / [`VoiceModel`] | loads models and runs inference |
//! | [`PostProcessor`] | volume, resampling and channel layout of the output |
//!
//! [`StyleCatalog`] is a ready-made [`ModelManager`] read from JSON.
//!
//! # Parameter Mapping
//!
//! | Query field | Model parameter | Range |
//! |---|---|---|
//! | `speedScale` | `length = 1 / speed` | |
//! | `intonationScale` | style weight | 0 – 10, 1.0 at scale 1 |
//! | `tempoDynamicsScale` | SDP ratio | 0 – 1, 0.2 at scale 1 |
//! | `pitchScale` | `1 + pitch` | ≥ 0 |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sbv2_compat::{SynthesisEngine, query::AudioQuery};
//! use sbv2_compat::engines::style_bert_vits2::{EngineParams, StyleBertVits2Engine, StyleCatalog};
//!
//! let engine = StyleBertVits2Engine::new(
//!     Arc::new(StyleCatalog::load("styles.json".as_ref())?),
//!     front_end,
//!     loader,
//!     EngineParams::default(),
//! )?;
//!
//! let accent_phrases = engine.create_accent_phrases("こんにちは", 888753760)?;
//! let mut query = AudioQuery::from_accent_phrases(accent_phrases);
//! query.kana = Some("こんにちは".to_string());
//! engine.synthesize_wave(&query, 888753760, true)?.write_wav("out.wav".as_ref())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accent_phrase;
pub mod cache;
pub mod device;
pub mod engine;
pub mod frontend;
pub mod manifest;
pub mod model;
pub mod mora_list;
pub mod params;
pub mod phone_tone;
pub mod post_process;

#[cfg(test)]
mod test_support;

pub use device::{Accelerator, AcceleratorProbe, CpuOnly, Device, DeviceSelection};
#[cfg(feature = "onnx")]
pub use device::OrtAcceleratorProbe;
pub use engine::{EngineParams, StyleBertVits2Engine};
pub use frontend::FrontEnd;
pub use manifest::{ModelManager, StyleCatalog, StyleReference};
pub use model::{InferenceRequest, RawWave, StyleBertVits2Error, VoiceModel, VoiceModelLoader};
pub use post_process::{Passthrough, PostProcessor};
