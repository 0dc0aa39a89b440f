use std::sync::Arc;
use std::time::Instant;

use crate::query::{flatten_moras, AccentPhrase, AudioQuery};
use crate::{DeviceSupport, StyleId, SynthesisEngine, SynthesisResult};

use super::accent_phrase::{
    fill_dummy_lengths, fill_dummy_pitches, mora_tone_to_accent_phrases,
};
use super::cache::ModelCache;
use super::device::{AcceleratorProbe, DeviceSelection};
use super::frontend::FrontEnd;
use super::manifest::{ModelManager, StyleReference};
use super::model::{
    InferenceRequest, StyleBertVits2Error, VoiceModel, VoiceModelLoader, SAMPLE_RATE,
};
use super::mora_list::MoraTable;
use super::params::SynthesisParams;
use super::phone_tone::{
    accent_phrases_to_kata_tone, kata_tone_to_phone_tone, phone_tone_to_mora_tone,
};
use super::post_process::{pad_silence, Passthrough, PostProcessor};

/// Mora whose loss at the end of a reading breaks the tone count during
/// accent dictionary previews.
const TRAILING_GA: &str = "ガ";

/// Sentence terminator appended to text rebuilt from moras.
const FULL_STOP: &str = "。";

/// Parameters for constructing a [`StyleBertVits2Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineParams {
    /// Run inference on an accelerator when one is available.
    pub use_gpu: bool,
    /// Load every installed model up front instead of on first use.
    pub load_all_models: bool,
}

/// Style-Bert-VITS2 engine behind the VOICEVOX accent phrase data model.
///
/// Models are loaded on first use (or all at once, see
/// [`EngineParams::load_all_models`]) and kept for the life of the engine.
/// Every method takes `&self`, so one engine can be shared across threads.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use sbv2_compat::engines::style_bert_vits2::{EngineParams, StyleBertVits2Engine, StyleCatalog};
/// use sbv2_compat::SynthesisEngine;
///
/// let catalog = StyleCatalog::load(std::path::Path::new("styles.json"))?;
/// let engine = StyleBertVits2Engine::new(
///     Arc::new(catalog),
///     Arc::new(my_front_end),
///     Arc::new(my_loader),
///     EngineParams { use_gpu: true, ..Default::default() },
/// )?;
/// let accent_phrases = engine.create_accent_phrases("こんにちは", 888753760)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct StyleBertVits2Engine {
    manager: Arc<dyn ModelManager>,
    front_end: Arc<dyn FrontEnd>,
    loader: Arc<dyn VoiceModelLoader>,
    post_processor: Arc<dyn PostProcessor>,
    mora_table: MoraTable,
    models: ModelCache<dyn VoiceModel>,
    device: DeviceSelection,
}

impl StyleBertVits2Engine {
    /// Create an engine, probing ONNX Runtime for accelerators when the `onnx`
    /// feature is enabled.
    pub fn new(
        manager: Arc<dyn ModelManager>,
        front_end: Arc<dyn FrontEnd>,
        loader: Arc<dyn VoiceModelLoader>,
        params: EngineParams,
    ) -> Result<Self, StyleBertVits2Error> {
        #[cfg(feature = "onnx")]
        let probe = super::device::OrtAcceleratorProbe;
        #[cfg(not(feature = "onnx"))]
        let probe = super::device::CpuOnly;

        Self::with_probe(manager, front_end, loader, params, &probe)
    }

    /// Create an engine that asks `probe` which accelerator is present.
    pub fn with_probe(
        manager: Arc<dyn ModelManager>,
        front_end: Arc<dyn FrontEnd>,
        loader: Arc<dyn VoiceModelLoader>,
        params: EngineParams,
        probe: &dyn AcceleratorProbe,
    ) -> Result<Self, StyleBertVits2Error> {
        let engine = Self {
            manager,
            front_end,
            loader,
            post_processor: Arc::new(Passthrough),
            mora_table: MoraTable::new(),
            models: ModelCache::new(),
            device: DeviceSelection::select(probe, params.use_gpu),
        };

        if params.load_all_models {
            log::info!("Loading all models...");
            for model_id in engine.manager.installed_model_ids() {
                engine.load_model(&model_id)?;
            }
            log::info!("All models loaded.");
        }

        Ok(engine)
    }

    /// Replace the post-processing stage (volume, resampling, channels).
    pub fn with_post_processor(mut self, post_processor: Arc<dyn PostProcessor>) -> Self {
        self.post_processor = post_processor;
        self
    }

    pub fn device(&self) -> DeviceSelection {
        self.device
    }

    /// Load the model `model_id` unless it is already loaded.
    pub fn load_model(&self, model_id: &str) -> Result<Arc<dyn VoiceModel>, StyleBertVits2Error> {
        self.models.get_or_load(model_id, |model_id| {
            log::info!("Loading model {model_id} on {}...", self.device.device);
            let start = Instant::now();
            let model = self
                .loader
                .load(model_id, self.device.device)
                .map_err(|e| match e {
                    e @ StyleBertVits2Error::ModelLoadFailure { .. } => e,
                    other => StyleBertVits2Error::ModelLoadFailure {
                        model_id: model_id.to_string(),
                        reason: other.to_string(),
                    },
                })?;
            log::info!(
                "{model_id} loaded. ({:.2} sec)",
                start.elapsed().as_secs_f64()
            );
            Ok(model)
        })
    }

    pub fn is_model_loaded(&self, model_id: &str) -> bool {
        self.models.contains(model_id)
    }

    /// Text handed to the voice model alongside the phonemes.
    fn speech_text(&self, query: &AudioQuery) -> Result<String, StyleBertVits2Error> {
        if let Some(kana) = query.kana.as_deref().filter(|kana| !kana.is_empty()) {
            let mut text = kana.trim().to_string();
            if self.needs_trailing_ga(query, &text)? {
                text.push_str(TRAILING_GA);
            }
            return Ok(text);
        }

        log::warn!("AudioQuery.kana is not specified. Using accent phrases instead.");
        let mut text: String = flatten_moras(&query.accent_phrases)
            .iter()
            .map(|mora| mora.text.as_str())
            .collect();
        text.push_str(FULL_STOP);
        let text = katakana_to_hiragana(&text);
        Ok(if text == FULL_STOP { String::new() } else { text })
    }

    /// Accent dictionary previews drop a final ガ from `kana` while keeping it
    /// in the accent phrases, leaving one tone without a phoneme.
    fn needs_trailing_ga(
        &self,
        query: &AudioQuery,
        text: &str,
    ) -> Result<bool, StyleBertVits2Error> {
        let ends_with_ga = query
            .accent_phrases
            .last()
            .and_then(|phrase| phrase.moras.last())
            .is_some_and(|mora| mora.text == TRAILING_GA);
        if !ends_with_ga {
            return Ok(false);
        }

        let phone_tones = self.front_end.analyze(text)?;
        let moras = phone_tone_to_mora_tone(&self.mora_table, &phone_tones)?;
        Ok(moras
            .last()
            .is_some_and(|(mora, _)| mora.text != TRAILING_GA))
    }

    /// Name the model uses for the referenced style.
    fn style_name(
        &self,
        model: &dyn VoiceModel,
        reference: &StyleReference,
    ) -> Result<String, StyleBertVits2Error> {
        let Some(table) = model.style_table() else {
            return Ok(reference.style_name.clone());
        };
        table
            .iter()
            .find(|(_, local_id)| **local_id == reference.style_local_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| StyleBertVits2Error::StyleNameNotFound {
                model_id: reference.model_id.clone(),
                local_style_id: reference.style_local_id,
            })
    }
}

/// Convert katakana to hiragana, leaving everything else untouched.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ァ'..='ヶ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            _ => c,
        })
        .collect()
}

impl SynthesisEngine for StyleBertVits2Engine {
    type Error = StyleBertVits2Error;

    fn create_accent_phrases(
        &self,
        text: &str,
        style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error> {
        let phone_tones = self.front_end.analyze(text)?;
        let mora_tones = phone_tone_to_mora_tone(&self.mora_table, &phone_tones)?;
        let accent_phrases = mora_tone_to_accent_phrases(mora_tones);
        self.update_length_and_pitch(accent_phrases, style_id)
    }

    /// Style-Bert-VITS2 cannot predict phoneme lengths, so every length is the
    /// dummy value.
    fn update_length(
        &self,
        accent_phrases: Vec<AccentPhrase>,
        _style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error> {
        Ok(fill_dummy_lengths(accent_phrases))
    }

    /// Style-Bert-VITS2 cannot predict pitches, so every pitch is the dummy
    /// value.
    fn update_pitch(
        &self,
        accent_phrases: Vec<AccentPhrase>,
        _style_id: StyleId,
    ) -> Result<Vec<AccentPhrase>, Self::Error> {
        Ok(fill_dummy_pitches(accent_phrases))
    }

    /// Interrogative upspeak is left to the model's own prosody, so
    /// `enable_interrogative_upspeak` has no effect.
    fn synthesize_wave(
        &self,
        query: &AudioQuery,
        style_id: StyleId,
        _enable_interrogative_upspeak: bool,
    ) -> Result<SynthesisResult, Self::Error> {
        let text = self.speech_text(query)?;

        // Explicit phonemes with an empty text fail the model's tone count
        // check, so the model gets neither.
        let (phonemes, tones) = if text.is_empty() {
            (None, None)
        } else {
            let kata_tones = accent_phrases_to_kata_tone(&query.accent_phrases);
            let phone_tones = kata_tone_to_phone_tone(&self.mora_table, &kata_tones)?;
            let (phonemes, tones): (Vec<String>, Vec<u8>) = phone_tones.into_iter().unzip();
            (Some(phonemes), Some(tones))
        };

        let reference = self.manager.resolve_style(style_id)?;
        let model = self.load_model(&reference.model_id)?;
        let style_name = self.style_name(model.as_ref(), &reference)?;
        let params = SynthesisParams::from_query(query);

        log::info!("Model: {}", reference.model_id);
        log::info!(
            "Speaker: {} / Style: {style_name}",
            reference.speaker_local_id
        );
        log::info!("Running inference...");
        log::info!("Text: {text}");
        log::info!(
            "         Speed: {:.2} (Input: {:.2})",
            params.length,
            query.speed_scale
        );
        log::info!(
            "  Style Weight: {:.2} (Input: {:.2})",
            params.style_weight,
            query.intonation_scale
        );
        log::info!(
            "Tempo Dynamics: {:.2} (Input: {:.2})",
            params.sdp_ratio,
            query.tempo_dynamics_scale
        );
        log::info!(
            "         Pitch: {:.2} (Input: {:.2})",
            params.pitch_scale,
            query.pitch_scale
        );
        log::info!("        Volume: {:.2}", query.volume_scale);
        log::info!("   Pre-Silence: {:.2}", query.pre_phoneme_length);
        log::info!("  Post-Silence: {:.2}", query.post_phoneme_length);

        let request = InferenceRequest {
            text,
            phonemes,
            tones,
            speaker_id: reference.speaker_local_id,
            style_name,
            style_weight: params.style_weight,
            sdp_ratio: params.sdp_ratio,
            length: params.length,
            pitch_scale: params.pitch_scale,
        };
        let start = Instant::now();
        let raw = model.infer(&request)?;
        log::info!(
            "Inference done. Elapsed time: {:.2} sec.",
            start.elapsed().as_secs_f64()
        );

        let samples = pad_silence(
            &raw.to_f32(),
            raw.sample_rate,
            query.pre_phoneme_length,
            query.post_phoneme_length,
        )?;
        self.post_processor.process(query, samples, raw.sample_rate)
    }

    /// Loads the model for `style_id`. Loaded models are never reloaded, so
    /// `skip_reinit` changes nothing.
    fn initialize_synthesis(
        &self,
        style_id: StyleId,
        _skip_reinit: bool,
    ) -> Result<(), Self::Error> {
        let reference = self.manager.resolve_style(style_id)?;
        self.load_model(&reference.model_id)?;
        Ok(())
    }

    fn is_synthesis_initialized(&self, style_id: StyleId) -> Result<bool, Self::Error> {
        let reference = self.manager.resolve_style(style_id)?;
        Ok(self.is_model_loaded(&reference.model_id))
    }

    fn default_sampling_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn supported_devices(&self) -> Option<DeviceSupport> {
        Some(self.device.supported_devices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::style_bert_vits2::device::{Accelerator, CpuOnly, Device};
    use crate::engines::style_bert_vits2::model::RawWave;
    use crate::engines::style_bert_vits2::test_support::{
        catalog, RecordingLoader, ScriptedFrontEnd,
    };
    use std::collections::HashMap;
    use std::thread;
    use std::time::Duration;

    fn front_end() -> ScriptedFrontEnd {
        ScriptedFrontEnd::default()
            .with(
                "テスト",
                &[("t", 1), ("e", 1), ("s", 0), ("u", 0), ("t", 0), ("o", 0)],
            )
            .with(
                "ネコガ",
                &[("n", 1), ("e", 1), ("k", 0), ("o", 0), ("g", 0), ("a", 0)],
            )
            .with("猫", &[("n", 1), ("e", 1), ("k", 0), ("o", 0)])
            .with(
                "猫が",
                &[("n", 1), ("e", 1), ("k", 0), ("o", 0), ("g", 0), ("a", 0)],
            )
    }

    fn engine_with(loader: &Arc<RecordingLoader>, params: EngineParams) -> StyleBertVits2Engine {
        StyleBertVits2Engine::with_probe(
            Arc::new(catalog()),
            Arc::new(front_end()),
            loader.clone(),
            params,
            &CpuOnly,
        )
        .unwrap()
    }

    fn engine(loader: &Arc<RecordingLoader>) -> StyleBertVits2Engine {
        engine_with(loader, EngineParams::default())
    }

    fn texts(accent_phrases: &[AccentPhrase]) -> Vec<Vec<&str>> {
        accent_phrases
            .iter()
            .map(|p| p.moras.iter().map(|m| m.text.as_str()).collect())
            .collect()
    }

    struct Found(Accelerator);

    impl AcceleratorProbe for Found {
        fn probe(&self) -> Option<Accelerator> {
            Some(self.0)
        }
    }

    #[test]
    fn creates_accent_phrases_with_dummy_values() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let accent_phrases = engine.create_accent_phrases("テスト", 1).unwrap();
        assert_eq!(texts(&accent_phrases), vec![vec!["テ", "ス", "ト"]]);
        assert_eq!(accent_phrases[0].accent, 1);
        assert!(accent_phrases[0].pause_mora.is_none());
        for mora in &accent_phrases[0].moras {
            assert_eq!(mora.consonant_length, Some(0.0));
            assert_eq!(mora.vowel_length, 0.0);
            assert_eq!(mora.pitch, 0.0);
        }

        let json = serde_json::to_value(&accent_phrases).unwrap();
        assert_eq!(json[0]["moras"][1]["consonant"], "s");
        assert_eq!(json[0]["moras"][1]["vowel"], "u");
        // Analysis needs no model.
        assert_eq!(loader.load_count(), 0);
    }

    #[test]
    fn unreadable_text_is_a_client_error() {
        let loader = Arc::new(RecordingLoader::default());
        let err = engine(&loader).create_accent_phrases("???", 1).unwrap_err();
        assert!(matches!(err, StyleBertVits2Error::UnreadableText { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn synthesizes_kana_override_with_phonemes_from_accent_phrases() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let mut query =
            AudioQuery::from_accent_phrases(engine.create_accent_phrases("テスト", 1).unwrap());
        query.kana = Some("  テスト ".to_string());
        query.speed_scale = 2.0;
        let result = engine.synthesize_wave(&query, 1, true).unwrap();

        let requests = loader.model("model-a").requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.text, "テスト");
        assert_eq!(
            request.phonemes.as_deref().unwrap(),
            ["_", "t", "e", "s", "u", "t", "o", "_"]
        );
        assert_eq!(request.tones.as_deref().unwrap(), [0, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(request.speaker_id, 0);
        assert_eq!(request.style_name, "ノーマル");
        assert_eq!(request.length, 0.5);
        assert_eq!(request.style_weight, 1.0);
        assert!((request.sdp_ratio - 0.2).abs() < 1e-12);
        assert_eq!(request.pitch_scale, 1.0);

        // 0.1 s of silence on each side at the fake model's 100 Hz.
        assert_eq!(result.sample_rate, 100);
        assert_eq!(result.samples.len(), 22);
        assert!(result.samples[..10].iter().all(|&s| s == 0.0));
        assert_eq!(result.samples[10..12], [0.5f32, -0.5]);
        assert!(result.samples[12..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn falls_back_to_hiragana_reading() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let query =
            AudioQuery::from_accent_phrases(engine.create_accent_phrases("テスト", 1).unwrap());
        engine.synthesize_wave(&query, 1, false).unwrap();

        let request = &loader.model("model-a").requests()[0];
        assert_eq!(request.text, "てすと。");
        assert!(request.phonemes.is_some());
    }

    #[test]
    fn empty_kana_falls_back_to_reading() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let mut query =
            AudioQuery::from_accent_phrases(engine.create_accent_phrases("テスト", 1).unwrap());
        query.kana = Some(String::new());
        engine.synthesize_wave(&query, 1, false).unwrap();

        let request = &loader.model("model-a").requests()[0];
        assert_eq!(request.text, "てすと。");
        assert_eq!(
            request.phonemes.as_deref().unwrap(),
            ["_", "t", "e", "s", "u", "t", "o", "_"]
        );
    }

    #[test]
    fn blank_kana_passes_no_phonemes() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let mut query =
            AudioQuery::from_accent_phrases(engine.create_accent_phrases("テスト", 1).unwrap());
        query.kana = Some("  \t ".to_string());
        engine.synthesize_wave(&query, 1, false).unwrap();

        let request = &loader.model("model-a").requests()[0];
        assert_eq!(request.text, "");
        assert!(request.phonemes.is_none());
        assert!(request.tones.is_none());
    }

    struct FailingLoader;

    impl VoiceModelLoader for FailingLoader {
        fn load(
            &self,
            _model_id: &str,
            _device: Device,
        ) -> Result<Arc<dyn VoiceModel>, StyleBertVits2Error> {
            Ok(Arc::new(FailingModel))
        }
    }

    struct FailingModel;

    impl VoiceModel for FailingModel {
        fn infer(&self, _request: &InferenceRequest) -> Result<RawWave, StyleBertVits2Error> {
            Err(StyleBertVits2Error::Inference("out of memory".to_string()))
        }
    }

    #[test]
    fn inference_failure_is_a_server_error() {
        let engine = StyleBertVits2Engine::with_probe(
            Arc::new(catalog()),
            Arc::new(front_end()),
            Arc::new(FailingLoader),
            EngineParams::default(),
            &CpuOnly,
        )
        .unwrap();

        let err = engine
            .synthesize_wave(&AudioQuery::default(), 1, false)
            .unwrap_err();
        assert!(matches!(err, StyleBertVits2Error::Inference(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn oversized_silence_is_a_client_error() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let mut query = AudioQuery::default();
        query.pre_phoneme_length = 1e300;
        query.post_phoneme_length = 1e300;
        let err = engine.synthesize_wave(&query, 1, false).unwrap_err();
        assert!(matches!(err, StyleBertVits2Error::InvalidQuery(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn empty_query_passes_no_phonemes() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let result = engine
            .synthesize_wave(&AudioQuery::default(), 1, false)
            .unwrap();

        let request = &loader.model("model-a").requests()[0];
        assert_eq!(request.text, "");
        assert!(request.phonemes.is_none());
        assert!(request.tones.is_none());
        assert_eq!(result.samples.len(), 22);
    }

    #[test]
    fn restores_trailing_ga_dropped_from_kana() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);
        let accent_phrases = engine.create_accent_phrases("ネコガ", 1).unwrap();

        let mut query = AudioQuery::from_accent_phrases(accent_phrases.clone());
        query.kana = Some("猫".to_string());
        engine.synthesize_wave(&query, 1, false).unwrap();

        let mut query = AudioQuery::from_accent_phrases(accent_phrases);
        query.kana = Some("猫が".to_string());
        engine.synthesize_wave(&query, 1, false).unwrap();

        let requests = loader.model("model-a").requests();
        assert_eq!(requests[0].text, "猫ガ");
        assert_eq!(requests[1].text, "猫が");
    }

    #[test]
    fn unknown_style_is_a_client_error() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let err = engine
            .synthesize_wave(&AudioQuery::default(), 42, false)
            .unwrap_err();
        assert!(matches!(err, StyleBertVits2Error::StyleNotFound(42)));
        assert!(err.is_client_error());
        assert!(matches!(
            engine.is_synthesis_initialized(42),
            Err(StyleBertVits2Error::StyleNotFound(42))
        ));
        assert_eq!(loader.load_count(), 0);
    }

    #[test]
    fn failed_load_is_retried_on_next_use() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);
        loader.break_model("model-a");

        let err = engine
            .synthesize_wave(&AudioQuery::default(), 1, false)
            .unwrap_err();
        assert!(matches!(err, StyleBertVits2Error::ModelLoadFailure { .. }));
        assert!(!err.is_client_error());
        assert!(!engine.is_synthesis_initialized(1).unwrap());

        loader.repair_model("model-a");
        engine
            .synthesize_wave(&AudioQuery::default(), 1, false)
            .unwrap();
        assert!(engine.is_synthesis_initialized(1).unwrap());
        assert_eq!(loader.load_count(), 2);
    }

    #[test]
    fn styles_of_one_model_share_a_load() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        assert!(!engine.is_synthesis_initialized(1).unwrap());
        engine.initialize_synthesis(1, true).unwrap();
        engine.initialize_synthesis(2, false).unwrap();

        assert_eq!(loader.load_count(), 1);
        assert!(engine.is_synthesis_initialized(2).unwrap());
        assert!(!engine.is_synthesis_initialized(3).unwrap());
        assert!(engine.is_model_loaded("model-a"));
    }

    #[test]
    fn loads_all_models_up_front() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine_with(
            &loader,
            EngineParams {
                load_all_models: true,
                ..Default::default()
            },
        );

        assert_eq!(loader.load_count(), 2);
        assert!(engine.is_model_loaded("model-a"));
        assert!(engine.is_model_loaded("model-b"));
    }

    #[test]
    fn eager_load_failure_fails_construction() {
        let loader = Arc::new(RecordingLoader::default());
        loader.break_model("model-b");
        let result = StyleBertVits2Engine::with_probe(
            Arc::new(catalog()),
            Arc::new(front_end()),
            loader.clone(),
            EngineParams {
                load_all_models: true,
                ..Default::default()
            },
            &CpuOnly,
        );
        assert!(matches!(
            result,
            Err(StyleBertVits2Error::ModelLoadFailure { .. })
        ));
    }

    #[test]
    fn resolves_style_name_from_model_table() {
        let loader = Arc::new(RecordingLoader {
            style_table: Some(HashMap::from([
                ("Neutral".to_string(), 0),
                ("Joy".to_string(), 1),
            ])),
            ..Default::default()
        });
        let engine = engine(&loader);

        engine
            .synthesize_wave(&AudioQuery::default(), 2, false)
            .unwrap();
        assert_eq!(loader.model("model-a").requests()[0].style_name, "Joy");

        // Style 3 points at local style 2, which the table lacks.
        let err = engine
            .synthesize_wave(&AudioQuery::default(), 3, false)
            .unwrap_err();
        match err {
            StyleBertVits2Error::StyleNameNotFound {
                model_id,
                local_style_id,
            } => {
                assert_eq!(model_id, "model-b");
                assert_eq!(local_style_id, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn speaker_id_comes_from_the_style_reference() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        engine
            .synthesize_wave(&AudioQuery::default(), 3, false)
            .unwrap();
        let request = &loader.model("model-b").requests()[0];
        assert_eq!(request.speaker_id, 4);
        assert_eq!(request.style_name, "Calm");
    }

    #[test]
    fn reports_capabilities() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);
        assert_eq!(engine.default_sampling_rate(), 44100);
        assert_eq!(
            engine.supported_devices(),
            Some(DeviceSupport {
                cpu: true,
                cuda: false,
                dml: false
            })
        );
    }

    #[test]
    fn loads_models_on_the_selected_device() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = StyleBertVits2Engine::with_probe(
            Arc::new(catalog()),
            Arc::new(front_end()),
            loader.clone(),
            EngineParams {
                use_gpu: true,
                ..Default::default()
            },
            &Found(Accelerator::NvidiaCuda),
        )
        .unwrap();
        assert_eq!(engine.device().device, Device::Cuda);
        assert_eq!(engine.supported_devices().map(|d| d.cuda), Some(true));

        engine.initialize_synthesis(1, false).unwrap();
        assert_eq!(loader.devices(), vec![Device::Cuda]);

        let cpu_loader = Arc::new(RecordingLoader::default());
        let cpu_engine = engine_with(
            &cpu_loader,
            EngineParams {
                use_gpu: true,
                ..Default::default()
            },
        );
        cpu_engine.initialize_synthesis(1, false).unwrap();
        assert_eq!(cpu_loader.devices(), vec![Device::Cpu]);
    }

    #[test]
    fn leaves_caller_query_untouched() {
        let loader = Arc::new(RecordingLoader::default());
        let engine = engine(&loader);

        let mut query =
            AudioQuery::from_accent_phrases(engine.create_accent_phrases("ネコガ", 1).unwrap());
        query.kana = Some("猫".to_string());
        let before = query.clone();
        engine.synthesize_wave(&query, 1, true).unwrap();
        engine.synthesize_wave(&query, 1, true).unwrap();
        assert_eq!(query, before);
    }

    #[test]
    fn concurrent_synthesis_loads_model_once() {
        const THREADS: usize = 8;
        let loader = Arc::new(RecordingLoader {
            delay: Duration::from_millis(20),
            ..Default::default()
        });
        let engine = Arc::new(engine(&loader));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    engine
                        .synthesize_wave(&AudioQuery::default(), 1, false)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().samples.len(), 22);
        }

        assert_eq!(loader.load_count(), 1);
        assert_eq!(loader.model("model-a").requests().len(), THREADS);
    }

    #[test]
    fn converts_katakana_only() {
        assert_eq!(
            katakana_to_hiragana("テスト、ヴァイオリン。abc"),
            "てすと、ゔぁいおりん。abc"
        );
        assert_eq!(katakana_to_hiragana("ー"), "ー");
    }
}
