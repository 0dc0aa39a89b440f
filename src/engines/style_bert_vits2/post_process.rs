use crate::query::AudioQuery;
use crate::SynthesisResult;

use super::model::StyleBertVits2Error;

/// Final adaptation of a synthesized waveform to the query's output settings
/// (volume, sample rate, channels).
pub trait PostProcessor: Send + Sync {
    fn process(
        &self,
        query: &AudioQuery,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<SynthesisResult, StyleBertVits2Error>;
}

/// Hands the waveform back unchanged at the model's sample rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl PostProcessor for Passthrough {
    fn process(
        &self,
        _query: &AudioQuery,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<SynthesisResult, StyleBertVits2Error> {
        Ok(SynthesisResult {
            samples,
            sample_rate,
        })
    }
}

/// Longest silence accepted on either side of a waveform.
pub const MAX_SILENCE_SECS: f64 = 600.0;

/// Surround `samples` with `pre_secs` and `post_secs` of silence.
///
/// Negative durations add nothing. Durations above [`MAX_SILENCE_SECS`] fail
/// with [`StyleBertVits2Error::InvalidQuery`].
pub fn pad_silence(
    samples: &[f32],
    sample_rate: u32,
    pre_secs: f64,
    post_secs: f64,
) -> Result<Vec<f32>, StyleBertVits2Error> {
    let pre = silence_samples(sample_rate, pre_secs, "prePhonemeLength")?;
    let post = silence_samples(sample_rate, post_secs, "postPhonemeLength")?;
    let total = pre
        .checked_add(samples.len())
        .and_then(|len| len.checked_add(post))
        .ok_or_else(|| {
            StyleBertVits2Error::InvalidQuery("padded waveform is too long".to_string())
        })?;

    let mut padded = Vec::with_capacity(total);
    padded.resize(pre, 0.0);
    padded.extend_from_slice(samples);
    padded.resize(total, 0.0);
    Ok(padded)
}

fn silence_samples(
    sample_rate: u32,
    secs: f64,
    field: &str,
) -> Result<usize, StyleBertVits2Error> {
    if secs > MAX_SILENCE_SECS {
        return Err(StyleBertVits2Error::InvalidQuery(format!(
            "{field} of {secs} s exceeds {MAX_SILENCE_SECS} s"
        )));
    }
    Ok((sample_rate as f64 * secs) as usize)
}
