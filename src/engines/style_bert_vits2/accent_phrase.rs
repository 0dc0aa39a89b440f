//! Grouping of moras into accent phrases.
//!
//! Two independent rules put a boundary before a mora:
//!
//! - **Phrase boundary**: a spoken mora right after punctuation. Punctuation
//!   never opens a phrase; it stays with the phrase it follows.
//! - **Accent boundary**: within one phrase, a low mora followed by a high one,
//!   when the mora before it is also part of the phrase.
//!
//! Boundaries are computed in one pass over the flat sequence and the phrases
//! are cut afterwards.

use crate::query::{AccentPhrase, Mora};

use super::mora_list::is_punctuation;
use super::phone_tone::DUMMY_VALUE;

/// Geminate vowel as produced by the front-end and as clients expect it.
const FRONT_END_GEMINATE: &str = "q";
const ENGINE_GEMINATE: &str = "cl";

/// Whether a new phrase starts at `index` because punctuation just ended.
fn starts_phrase(moras: &[(Mora, u8)], index: usize) -> bool {
    index == 0
        || (!is_punctuation(&moras[index].0.text) && is_punctuation(&moras[index - 1].0.text))
}

/// Boundary flag for every mora: `true` when a new accent phrase starts there.
fn boundaries(mora_tones: &[(Mora, u8)]) -> Vec<bool> {
    (0..mora_tones.len())
        .map(|index| {
            if starts_phrase(mora_tones, index) {
                return true;
            }
            let previous = mora_tones[index - 1].1;
            let current = mora_tones[index].1;
            let next = (index + 1 < mora_tones.len() && !starts_phrase(mora_tones, index + 1))
                .then(|| mora_tones[index + 1].1);
            matches!(
                (previous, current, next),
                (1, 0, Some(1)) | (0, 0, Some(1))
            )
        })
        .collect()
}

/// 1-indexed accent nucleus: the first high mora followed by a low one, or
/// the last mora when the pitch never falls.
pub fn accent_nucleus(tones: &[u8]) -> usize {
    tones
        .windows(2)
        .position(|pair| pair[0] == 1 && pair[1] == 0)
        .map(|index| index + 1)
        .unwrap_or(tones.len())
}

/// Group `(mora, tone)` pairs into accent phrases and locate each nucleus.
pub fn mora_tone_to_accent_phrases(mora_tones: Vec<(Mora, u8)>) -> Vec<AccentPhrase> {
    let flags = boundaries(&mora_tones);

    let mut groups: Vec<Vec<(Mora, u8)>> = Vec::new();
    for (mora_tone, boundary) in mora_tones.into_iter().zip(flags) {
        if boundary {
            groups.push(vec![mora_tone]);
        } else if let Some(group) = groups.last_mut() {
            group.push(mora_tone);
        }
    }
    log::debug!("Split moras into {} accent phrases", groups.len());

    groups
        .into_iter()
        .map(|group| {
            let tones: Vec<u8> = group.iter().map(|(_, tone)| *tone).collect();
            let moras = group
                .into_iter()
                .map(|(mut mora, _)| {
                    if mora.vowel == FRONT_END_GEMINATE {
                        mora.vowel = ENGINE_GEMINATE.to_string();
                    }
                    mora
                })
                .collect();
            AccentPhrase {
                moras,
                accent: accent_nucleus(&tones),
                // Punctuation is kept as ordinary moras, so there is never a
                // separate pause mora.
                pause_mora: None,
                is_interrogative: false,
            }
        })
        .collect()
}

/// Overwrite phoneme lengths with the dummy value.
pub fn fill_dummy_lengths(mut accent_phrases: Vec<AccentPhrase>) -> Vec<AccentPhrase> {
    for mora in accent_phrases.iter_mut().flat_map(|p| p.moras.iter_mut()) {
        mora.consonant_length = mora.consonant.as_ref().map(|_| DUMMY_VALUE);
        mora.vowel_length = DUMMY_VALUE;
    }
    accent_phrases
}

/// Overwrite pitches with the dummy value.
pub fn fill_dummy_pitches(mut accent_phrases: Vec<AccentPhrase>) -> Vec<AccentPhrase> {
    for mora in accent_phrases.iter_mut().flat_map(|p| p.moras.iter_mut()) {
        mora.pitch = DUMMY_VALUE;
    }
    accent_phrases
}
