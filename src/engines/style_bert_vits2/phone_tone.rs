//! Conversion between the front-end's flat phoneme/tone sequence and moras.

use crate::query::{AccentPhrase, Mora};

use super::model::StyleBertVits2Error;
use super::mora_list::{is_punctuation, MoraTable, PAUSE_VOWEL, SILENCE_MARKER};

/// Placeholder for mora lengths and pitches, which Style-Bert-VITS2 cannot
/// report per mora.
pub const DUMMY_VALUE: f64 = 0.0;

/// Text contributed by a caller-supplied pause mora.
const PAUSE_MORA_TEXT: &str = ",";

/// A mora standing for a punctuation symbol.
pub fn punctuation_mora(glyph: &str) -> Mora {
    Mora {
        text: glyph.to_string(),
        consonant: None,
        consonant_length: None,
        vowel: PAUSE_VOWEL.to_string(),
        vowel_length: DUMMY_VALUE,
        pitch: DUMMY_VALUE,
    }
}

fn spoken_mora(kana: &str, consonant: Option<&str>, vowel: &str) -> Mora {
    Mora {
        text: kana.to_string(),
        consonant: consonant.map(str::to_string),
        consonant_length: consonant.map(|_| DUMMY_VALUE),
        vowel: vowel.to_string(),
        vowel_length: DUMMY_VALUE,
        pitch: DUMMY_VALUE,
    }
}

/// Strip the silence markers the front-end puts at both ends.
fn trim_markers<P: AsRef<str>>(phone_tones: &[(P, u8)]) -> &[(P, u8)] {
    let mut trimmed = phone_tones;
    if let Some(((first, _), rest)) = trimmed.split_first() {
        if first.as_ref() == SILENCE_MARKER {
            trimmed = rest;
        }
    }
    if let Some(((last, _), rest)) = trimmed.split_last() {
        if last.as_ref() == SILENCE_MARKER {
            trimmed = rest;
        }
    }
    trimmed
}

/// Convert `(phoneme, tone)` pairs into `(mora, tone)` pairs.
///
/// Punctuation becomes a mora of its own with the pause vowel. A consonant
/// is held until the next vowel (or `N`/`q`), and must carry the same tone
/// as that vowel.
pub fn phone_tone_to_mora_tone<P: AsRef<str>>(
    table: &MoraTable,
    phone_tones: &[(P, u8)],
) -> Result<Vec<(Mora, u8)>, StyleBertVits2Error> {
    let phone_tones = trim_markers(phone_tones);
    let mut result = Vec::with_capacity(phone_tones.len());
    let mut consonant: Option<&str> = None;

    for (i, (phone, tone)) in phone_tones.iter().enumerate() {
        let phone = phone.as_ref();
        let tone = *tone;

        if is_punctuation(phone) {
            result.push((punctuation_mora(phone), tone));
            continue;
        }

        if table.is_consonant(phone) {
            if let Some(held) = consonant {
                return Err(StyleBertVits2Error::MalformedPhoneSequence(format!(
                    "unexpected {phone} after {held}"
                )));
            }
            let (_, next_tone) = phone_tones.get(i + 1).ok_or_else(|| {
                StyleBertVits2Error::MalformedPhoneSequence(format!(
                    "consonant {phone} ends the sequence"
                ))
            })?;
            if tone != *next_tone {
                return Err(StyleBertVits2Error::ToneMismatch {
                    phoneme: phone.to_string(),
                    tone,
                    next_tone: *next_tone,
                });
            }
            consonant = Some(phone);
            continue;
        }

        let kana = table.kana(consonant, phone).ok_or_else(|| {
            StyleBertVits2Error::UnknownMora(format!("{}{phone}", consonant.unwrap_or("")))
        })?;
        result.push((spoken_mora(kana, consonant, phone), tone));
        consonant = None;
    }

    if let Some(held) = consonant {
        return Err(StyleBertVits2Error::MalformedPhoneSequence(format!(
            "consonant {held} is never followed by a vowel"
        )));
    }

    Ok(result)
}

/// Per-mora tones implied by an accent phrase's nucleus.
///
/// Moras up to and including the nucleus are high, the rest low, except that
/// the first mora is low unless the nucleus is on it.
pub fn accent_phrase_tones(accent_phrase: &AccentPhrase) -> Vec<u8> {
    let accent_index = accent_phrase.accent as i64 - 1;
    (0..accent_phrase.moras.len() as i64)
        .map(|index| {
            if index == 0 && accent_index != 0 {
                0
            } else if index <= accent_index {
                1
            } else {
                0
            }
        })
        .collect()
}

/// `(kana, tone)` pairs for every mora of `accent_phrases`.
///
/// A pause mora, when a caller supplied one, becomes a low `,`.
pub fn accent_phrases_to_kata_tone(accent_phrases: &[AccentPhrase]) -> Vec<(String, u8)> {
    let mut kata_tones = Vec::new();
    for accent_phrase in accent_phrases {
        let tones = accent_phrase_tones(accent_phrase);
        kata_tones.extend(
            accent_phrase
                .moras
                .iter()
                .zip(tones)
                .map(|(mora, tone)| (mora.text.clone(), tone)),
        );
        if accent_phrase.pause_mora.is_some() {
            kata_tones.push((PAUSE_MORA_TEXT.to_string(), 0));
        }
    }
    kata_tones
}

/// Expand `(kana, tone)` pairs to `(phoneme, tone)` pairs framed by silence
/// markers, the shape voice models expect for explicit phonemes.
pub fn kata_tone_to_phone_tone(
    table: &MoraTable,
    kata_tones: &[(String, u8)],
) -> Result<Vec<(String, u8)>, StyleBertVits2Error> {
    let mut phone_tones = vec![(SILENCE_MARKER.to_string(), 0)];
    for (kana, tone) in kata_tones {
        if is_punctuation(kana) {
            phone_tones.push((kana.clone(), *tone));
            continue;
        }
        let (consonant, vowel) = table
            .phonemes(kana)
            .ok_or_else(|| StyleBertVits2Error::UnknownMora(kana.clone()))?;
        if let Some(consonant) = consonant {
            phone_tones.push((consonant.to_string(), *tone));
        }
        phone_tones.push((vowel.to_string(), *tone));
    }
    phone_tones.push((SILENCE_MARKER.to_string(), 0));
    Ok(phone_tones)
}
