//! Drives the engine end to end with a katakana-only front-end and a
//! sine-wave "voice model", then writes `output.wav`.
//!
//! Run with `RUST_LOG=info cargo run --example synthesize`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sbv2_compat::engines::style_bert_vits2::mora_list::MoraTable;
use sbv2_compat::engines::style_bert_vits2::{
    Device, EngineParams, FrontEnd, InferenceRequest, RawWave, StyleBertVits2Engine,
    StyleBertVits2Error, StyleCatalog, VoiceModel, VoiceModelLoader,
};
use sbv2_compat::query::AudioQuery;
use sbv2_compat::SynthesisEngine;

const STYLES: &str = r#"{
    "styles": [
        { "style_id": 888753760, "model_id": "demo", "speaker_local_id": 0,
          "style_local_id": 0, "style_name": "ノーマル" },
        { "style_id": 888753761, "model_id": "demo", "speaker_local_id": 0,
          "style_local_id": 1, "style_name": "Happy" }
    ]
}"#;

/// Reads katakana with a flat (heiban) contour: low first mora, high after.
struct KanaFrontEnd {
    table: MoraTable,
}

impl FrontEnd for KanaFrontEnd {
    fn analyze(&self, text: &str) -> Result<Vec<(String, u8)>, StyleBertVits2Error> {
        let mut phone_tones = vec![("_".to_string(), 0)];
        for (i, c) in text.chars().enumerate() {
            let kana = c.to_string();
            let tone = u8::from(i > 0);
            if matches!(c, '、' | '，') {
                phone_tones.push((",".to_string(), 0));
                continue;
            }
            let (consonant, vowel) =
                self.table
                    .phonemes(&kana)
                    .ok_or_else(|| StyleBertVits2Error::UnreadableText {
                        text: text.to_string(),
                        reason: format!("{kana} is not katakana"),
                    })?;
            if let Some(consonant) = consonant {
                phone_tones.push((consonant.to_string(), tone));
            }
            phone_tones.push((vowel.to_string(), tone));
        }
        phone_tones.push(("_".to_string(), 0));
        Ok(phone_tones)
    }
}

/// Hums one 80 ms tone per phoneme, higher on high-tone phonemes.
struct SineModel {
    styles: HashMap<String, u32>,
}

impl VoiceModel for SineModel {
    fn style_table(&self) -> Option<&HashMap<String, u32>> {
        Some(&self.styles)
    }

    fn infer(&self, request: &InferenceRequest) -> Result<RawWave, StyleBertVits2Error> {
        const SAMPLE_RATE: u32 = 44100;
        if !request.length.is_finite() {
            return Err(StyleBertVits2Error::Inference(format!(
                "cannot speak at length {}",
                request.length
            )));
        }
        let tones = request.tones.clone().unwrap_or_default();
        let per_phoneme = (SAMPLE_RATE as f64 * 0.08 * request.length) as usize;

        let mut samples = Vec::with_capacity(tones.len() * per_phoneme);
        for tone in tones {
            let hz = 220.0 * request.pitch_scale * if tone == 1 { 1.5 } else { 1.0 };
            samples.extend((0..per_phoneme).map(|n| {
                let t = n as f64 / SAMPLE_RATE as f64;
                ((2.0 * std::f64::consts::PI * hz * t).sin() * 8000.0) as i16
            }));
        }
        Ok(RawWave {
            sample_rate: SAMPLE_RATE,
            samples,
        })
    }
}

struct SineLoader;

impl VoiceModelLoader for SineLoader {
    fn load(
        &self,
        model_id: &str,
        device: Device,
    ) -> Result<Arc<dyn VoiceModel>, StyleBertVits2Error> {
        println!("Loading {model_id} on {device}");
        let styles = HashMap::from([("Neutral".to_string(), 0), ("Happy".to_string(), 1)]);
        Ok(Arc::new(SineModel { styles }))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let engine = StyleBertVits2Engine::new(
        Arc::new(StyleCatalog::from_json(STYLES)?),
        Arc::new(KanaFrontEnd {
            table: MoraTable::new(),
        }),
        Arc::new(SineLoader),
        EngineParams::default(),
    )?;
    println!("Supported devices: {:?}", engine.supported_devices());

    let style_id = 888753760;
    let text = "コンニチワ、セカイ";
    let accent_phrases = engine.create_accent_phrases(text, style_id)?;
    println!("{}", serde_json::to_string_pretty(&accent_phrases)?);

    let mut query = AudioQuery::from_accent_phrases(accent_phrases);
    query.kana = Some(text.to_string());
    query.speed_scale = 1.2;

    let synth_start = Instant::now();
    let result = engine.synthesize_wave(&query, style_id, true)?;
    println!(
        "Synthesized {:.2}s audio in {:.2?}",
        result.duration_secs(),
        synth_start.elapsed()
    );

    result.write_wav(&PathBuf::from("output.wav"))?;
    println!("Saved to output.wav");
    Ok(())
}
