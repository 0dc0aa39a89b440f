//! Speech synthesis engines.
//!
//! This module contains implementations of [`SynthesisEngine`](crate::SynthesisEngine).
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `style-bert-vits2` - Style-Bert-VITS2 voice models (enabled by default)
//! - `onnx` - ONNX Runtime accelerator probing for the Style-Bert-VITS2 engine

#[cfg(feature = "style-bert-vits2")]
pub mod style_bert_vits2;
