//! In-memory collaborators for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::device::Device;
use super::frontend::FrontEnd;
use super::manifest::{StyleCatalog, StyleReference};
use super::model::{InferenceRequest, RawWave, StyleBertVits2Error, VoiceModel, VoiceModelLoader};

/// Front-end answering from a fixed text → phoneme table.
#[derive(Default)]
pub struct ScriptedFrontEnd {
    readings: HashMap<String, Vec<(String, u8)>>,
}

impl ScriptedFrontEnd {
    pub fn with(mut self, text: &str, phone_tones: &[(&str, u8)]) -> Self {
        let framed = std::iter::once(("_".to_string(), 0))
            .chain(phone_tones.iter().map(|&(p, t)| (p.to_string(), t)))
            .chain(std::iter::once(("_".to_string(), 0)))
            .collect();
        self.readings.insert(text.to_string(), framed);
        self
    }
}

impl FrontEnd for ScriptedFrontEnd {
    fn analyze(&self, text: &str) -> Result<Vec<(String, u8)>, StyleBertVits2Error> {
        self.readings
            .get(text)
            .cloned()
            .ok_or_else(|| StyleBertVits2Error::UnreadableText {
                text: text.to_string(),
                reason: "no reading".to_string(),
            })
    }
}

/// Model that records its requests and answers with a fixed waveform.
pub struct RecordingModel {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
    pub style_table: Option<HashMap<String, u32>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl RecordingModel {
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl VoiceModel for RecordingModel {
    fn style_table(&self) -> Option<&HashMap<String, u32>> {
        self.style_table.as_ref()
    }

    fn infer(&self, request: &InferenceRequest) -> Result<RawWave, StyleBertVits2Error> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(RawWave {
            sample_rate: self.sample_rate,
            samples: self.samples.clone(),
        })
    }
}

/// Loader building [`RecordingModel`]s and counting how often it ran.
pub struct RecordingLoader {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
    pub style_table: Option<HashMap<String, u32>>,
    pub delay: Duration,
    pub(super) broken: Mutex<HashSet<String>>,
    pub(super) loads: AtomicUsize,
    pub(super) loaded: Mutex<HashMap<String, Arc<RecordingModel>>>,
    pub(super) devices: Mutex<Vec<Device>>,
}

impl Default for RecordingLoader {
    fn default() -> Self {
        Self {
            sample_rate: 100,
            samples: vec![16384, -16384],
            style_table: None,
            delay: Duration::ZERO,
            broken: Mutex::new(HashSet::new()),
            loads: AtomicUsize::new(0),
            loaded: Mutex::new(HashMap::new()),
            devices: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingLoader {
    pub fn break_model(&self, model_id: &str) {
        self.broken.lock().unwrap().insert(model_id.to_string());
    }

    pub fn repair_model(&self, model_id: &str) {
        self.broken.lock().unwrap().remove(model_id);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn model(&self, model_id: &str) -> Arc<RecordingModel> {
        Arc::clone(&self.loaded.lock().unwrap()[model_id])
    }

    pub fn devices(&self) -> Vec<Device> {
        self.devices.lock().unwrap().clone()
    }
}

impl VoiceModelLoader for RecordingLoader {
    fn load(
        &self,
        model_id: &str,
        device: Device,
    ) -> Result<Arc<dyn VoiceModel>, StyleBertVits2Error> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        if self.broken.lock().unwrap().contains(model_id) {
            return Err(StyleBertVits2Error::ModelLoadFailure {
                model_id: model_id.to_string(),
                reason: "corrupt package".to_string(),
            });
        }
        self.devices.lock().unwrap().push(device);

        let model = Arc::new(RecordingModel {
            sample_rate: self.sample_rate,
            samples: self.samples.clone(),
            style_table: self.style_table.clone(),
            requests: Mutex::new(Vec::new()),
        });
        self.loaded
            .lock()
            .unwrap()
            .insert(model_id.to_string(), Arc::clone(&model));
        Ok(model)
    }
}

/// Styles 1 and 2 live in `model-a`, style 3 in `model-b`.
pub fn catalog() -> StyleCatalog {
    let mut catalog = StyleCatalog::new();
    let style = |model_id: &str, speaker, local_style, name: &str| StyleReference {
        model_id: model_id.to_string(),
        speaker_local_id: speaker,
        style_local_id: local_style,
        style_name: name.to_string(),
    };
    catalog.insert(1, style("model-a", 0, 0, "ノーマル"));
    catalog.insert(2, style("model-a", 0, 1, "Happy"));
    catalog.insert(3, style("model-b", 4, 2, "Calm"));
    catalog
}
