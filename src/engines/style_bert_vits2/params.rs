//! Mapping of VOICEVOX style controls onto Style-Bert-VITS2 parameters.
//!
//! VOICEVOX scales are centred on 1.0 and practically range over `[0, 2]`.
//! Below 1.0 a scale shrinks the native default linearly towards zero; above
//! 1.0 it moves linearly from the default up to the native maximum.

use crate::query::AudioQuery;

pub const DEFAULT_STYLE_WEIGHT: f64 = 1.0;
pub const MAX_STYLE_WEIGHT: f64 = 10.0;
pub const DEFAULT_SDP_RATIO: f64 = 0.2;
pub const MAX_SDP_RATIO: f64 = 1.0;

/// Style-Bert-VITS2 parameters for one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    /// Inverse of the speaking rate. Infinite when the speed scale is 0.
    pub length: f64,
    pub style_weight: f64,
    pub sdp_ratio: f64,
    pub pitch_scale: f64,
}

impl SynthesisParams {
    pub fn from_query(query: &AudioQuery) -> Self {
        Self {
            length: speed_to_length(query.speed_scale),
            style_weight: piecewise(
                query.intonation_scale,
                DEFAULT_STYLE_WEIGHT,
                MAX_STYLE_WEIGHT,
            ),
            sdp_ratio: piecewise(query.tempo_dynamics_scale, DEFAULT_SDP_RATIO, MAX_SDP_RATIO),
            pitch_scale: pitch_to_scale(query.pitch_scale),
        }
    }
}

/// Two-segment linear map of `value` onto `[0, default]` and `(default, max]`.
///
/// Values outside `[0, 2]` fall back to `default`.
pub fn piecewise(value: f64, default: f64, max: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value * default
    } else if value > 1.0 && value <= 2.0 {
        default + (value - 1.0) * (max - default)
    } else {
        default
    }
}

/// `length = 1 / speed`. A speed of 0 gives an infinite length; callers are
/// expected to reject it before synthesis.
pub fn speed_to_length(speed_scale: f64) -> f64 {
    1.0 / speed_scale.max(0.0)
}

/// VOICEVOX pitch is an offset around 0; Style-Bert-VITS2 takes a ratio
/// around 1.
pub fn pitch_to_scale(pitch_scale: f64) -> f64 {
    (1.0 + pitch_scale).max(0.0)
}
