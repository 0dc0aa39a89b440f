use super::model::StyleBertVits2Error;

/// Japanese phonological front-end (grapheme-to-phoneme with pitch accent).
pub trait FrontEnd: Send + Sync {
    /// Phonemes of `text`, each with a tone of 0 (low) or 1 (high), framed by
    /// `_` silence markers.
    ///
    /// Text the front-end cannot read fails with
    /// [`StyleBertVits2Error::UnreadableText`].
    fn analyze(&self, text: &str) -> Result<Vec<(String, u8)>, StyleBertVits2Error>;
}
