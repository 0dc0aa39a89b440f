use std::collections::{HashMap, HashSet};

/// Vowel written on punctuation moras.
pub const PAUSE_VOWEL: &str = "pau";

/// Marker the front-end places at both ends of a phoneme sequence.
pub const SILENCE_MARKER: &str = "_";

/// Punctuation symbols that survive text normalization and are kept as moras.
pub const PUNCTUATIONS: &[&str] = &["!", "?", "…", ",", ".", "'", "-"];

/// Whether `text` is one of the kept punctuation symbols.
pub fn is_punctuation(text: &str) -> bool {
    PUNCTUATIONS.contains(&text)
}

/// `(kana, consonant, vowel)` for every mora the front-end can produce.
///
/// Later entries win when two kana share a phoneme pair.
const MORA_LIST_MINIMUM: &[(&str, Option<&str>, &str)] = &[
    ("ヴォ", Some("v"), "o"),
    ("ヴェ", Some("v"), "e"),
    ("ヴィ", Some("v"), "i"),
    ("ヴァ", Some("v"), "a"),
    ("ヴ", Some("v"), "u"),
    ("ン", None, "N"),
    ("ワ", Some("w"), "a"),
    ("ロ", Some("r"), "o"),
    ("レ", Some("r"), "e"),
    ("ル", Some("r"), "u"),
    ("リョ", Some("ry"), "o"),
    ("リュ", Some("ry"), "u"),
    ("リャ", Some("ry"), "a"),
    ("リェ", Some("ry"), "e"),
    ("リ", Some("r"), "i"),
    ("ラ", Some("r"), "a"),
    ("ヨ", Some("y"), "o"),
    ("ユ", Some("y"), "u"),
    ("ヤ", Some("y"), "a"),
    ("モ", Some("m"), "o"),
    ("メ", Some("m"), "e"),
    ("ム", Some("m"), "u"),
    ("ミョ", Some("my"), "o"),
    ("ミュ", Some("my"), "u"),
    ("ミャ", Some("my"), "a"),
    ("ミェ", Some("my"), "e"),
    ("ミ", Some("m"), "i"),
    ("マ", Some("m"), "a"),
    ("ポ", Some("p"), "o"),
    ("ボ", Some("b"), "o"),
    ("ホ", Some("h"), "o"),
    ("ペ", Some("p"), "e"),
    ("ベ", Some("b"), "e"),
    ("ヘ", Some("h"), "e"),
    ("プ", Some("p"), "u"),
    ("ブ", Some("b"), "u"),
    ("フォ", Some("f"), "o"),
    ("フェ", Some("f"), "e"),
    ("フィ", Some("f"), "i"),
    ("ファ", Some("f"), "a"),
    ("フ", Some("f"), "u"),
    ("ピョ", Some("py"), "o"),
    ("ピュ", Some("py"), "u"),
    ("ピャ", Some("py"), "a"),
    ("ピェ", Some("py"), "e"),
    ("ピ", Some("p"), "i"),
    ("ビョ", Some("by"), "o"),
    ("ビュ", Some("by"), "u"),
    ("ビャ", Some("by"), "a"),
    ("ビェ", Some("by"), "e"),
    ("ビ", Some("b"), "i"),
    ("ヒョ", Some("hy"), "o"),
    ("ヒュ", Some("hy"), "u"),
    ("ヒャ", Some("hy"), "a"),
    ("ヒェ", Some("hy"), "e"),
    ("ヒ", Some("h"), "i"),
    ("パ", Some("p"), "a"),
    ("バ", Some("b"), "a"),
    ("ハ", Some("h"), "a"),
    ("ノ", Some("n"), "o"),
    ("ネ", Some("n"), "e"),
    ("ヌ", Some("n"), "u"),
    ("ニョ", Some("ny"), "o"),
    ("ニュ", Some("ny"), "u"),
    ("ニャ", Some("ny"), "a"),
    ("ニェ", Some("ny"), "e"),
    ("ニ", Some("n"), "i"),
    ("ナ", Some("n"), "a"),
    ("ドゥ", Some("d"), "u"),
    ("ド", Some("d"), "o"),
    ("トゥ", Some("t"), "u"),
    ("ト", Some("t"), "o"),
    ("デョ", Some("dy"), "o"),
    ("デュ", Some("dy"), "u"),
    ("デャ", Some("dy"), "a"),
    ("ディ", Some("d"), "i"),
    ("デ", Some("d"), "e"),
    ("テョ", Some("ty"), "o"),
    ("テュ", Some("ty"), "u"),
    ("テャ", Some("ty"), "a"),
    ("ティ", Some("t"), "i"),
    ("テ", Some("t"), "e"),
    ("ツォ", Some("ts"), "o"),
    ("ツェ", Some("ts"), "e"),
    ("ツィ", Some("ts"), "i"),
    ("ツァ", Some("ts"), "a"),
    ("ツ", Some("ts"), "u"),
    ("ッ", None, "q"),
    ("チョ", Some("ch"), "o"),
    ("チュ", Some("ch"), "u"),
    ("チャ", Some("ch"), "a"),
    ("チェ", Some("ch"), "e"),
    ("チ", Some("ch"), "i"),
    ("ダ", Some("d"), "a"),
    ("タ", Some("t"), "a"),
    ("ゾ", Some("z"), "o"),
    ("ソ", Some("s"), "o"),
    ("ゼ", Some("z"), "e"),
    ("セ", Some("s"), "e"),
    ("ズィ", Some("z"), "i"),
    ("ズ", Some("z"), "u"),
    ("スィ", Some("s"), "i"),
    ("ス", Some("s"), "u"),
    ("ジョ", Some("j"), "o"),
    ("ジュ", Some("j"), "u"),
    ("ジャ", Some("j"), "a"),
    ("ジェ", Some("j"), "e"),
    ("ジ", Some("j"), "i"),
    ("ショ", Some("sh"), "o"),
    ("シュ", Some("sh"), "u"),
    ("シャ", Some("sh"), "a"),
    ("シェ", Some("sh"), "e"),
    ("シ", Some("sh"), "i"),
    ("ザ", Some("z"), "a"),
    ("サ", Some("s"), "a"),
    ("ゴ", Some("g"), "o"),
    ("コ", Some("k"), "o"),
    ("ゲ", Some("g"), "e"),
    ("ケ", Some("k"), "e"),
    ("グヮ", Some("gw"), "a"),
    ("グ", Some("g"), "u"),
    ("クヮ", Some("kw"), "a"),
    ("ク", Some("k"), "u"),
    ("ギョ", Some("gy"), "o"),
    ("ギュ", Some("gy"), "u"),
    ("ギャ", Some("gy"), "a"),
    ("ギェ", Some("gy"), "e"),
    ("ギ", Some("g"), "i"),
    ("キョ", Some("ky"), "o"),
    ("キュ", Some("ky"), "u"),
    ("キャ", Some("ky"), "a"),
    ("キェ", Some("ky"), "e"),
    ("キ", Some("k"), "i"),
    ("ガ", Some("g"), "a"),
    ("カ", Some("k"), "a"),
    ("オ", None, "o"),
    ("エ", None, "e"),
    ("ウ", None, "u"),
    ("イ", None, "i"),
    ("ア", None, "a"),
    ("ウォ", Some("w"), "o"),
    ("ウェ", Some("w"), "e"),
    ("ウィ", Some("w"), "i"),
    ("イェ", Some("y"), "e"),
];

/// Kana that only appear on the kana side (edited queries, small kana).
const MORA_LIST_ADDITIONAL: &[(&str, Option<&str>, &str)] = &[
    ("ィ", None, "i"),
    ("ェ", None, "e"),
    ("ャ", Some("y"), "a"),
    ("ュ", Some("y"), "u"),
    ("ョ", Some("y"), "o"),
    ("ヮ", Some("w"), "a"),
    ("ァ", None, "a"),
    ("ゥ", None, "u"),
    ("ォ", None, "o"),
    ("ヂ", Some("j"), "i"),
    ("ヅ", Some("z"), "u"),
    ("ヲ", None, "o"),
];

/// Phoneme tables used to move between phonemes and kana.
#[derive(Debug, Clone)]
pub struct MoraTable {
    phonemes_to_kana: HashMap<String, &'static str>,
    kana_to_phonemes: HashMap<&'static str, (Option<&'static str>, &'static str)>,
    consonants: HashSet<&'static str>,
}

impl Default for MoraTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MoraTable {
    pub fn new() -> Self {
        let mut phonemes_to_kana = HashMap::new();
        let mut kana_to_phonemes = HashMap::new();
        let mut consonants = HashSet::new();

        for &(kana, consonant, vowel) in MORA_LIST_MINIMUM {
            phonemes_to_kana.insert(format!("{}{vowel}", consonant.unwrap_or("")), kana);
            kana_to_phonemes.insert(kana, (consonant, vowel));
            if let Some(consonant) = consonant {
                consonants.insert(consonant);
            }
        }
        for &(kana, consonant, vowel) in MORA_LIST_ADDITIONAL {
            kana_to_phonemes.insert(kana, (consonant, vowel));
        }

        Self {
            phonemes_to_kana,
            kana_to_phonemes,
            consonants,
        }
    }

    /// Whether `phoneme` is a consonant that must be followed by a vowel.
    ///
    /// `N` (syllabic nasal) and `q` (geminate) are moras on their own and are
    /// not consonants.
    pub fn is_consonant(&self, phoneme: &str) -> bool {
        self.consonants.contains(phoneme)
    }

    /// Kana for a consonant/vowel pair.
    ///
    /// Devoiced vowels (`A I U E O`) read as their voiced counterpart.
    pub fn kana(&self, consonant: Option<&str>, vowel: &str) -> Option<&'static str> {
        let vowel = voiced(vowel);
        let key = format!("{}{vowel}", consonant.unwrap_or(""));
        self.phonemes_to_kana.get(&key).copied()
    }

    /// Consonant/vowel pair for a kana mora.
    pub fn phonemes(&self, kana: &str) -> Option<(Option<&'static str>, &'static str)> {
        self.kana_to_phonemes.get(kana).copied()
    }
}

fn voiced(vowel: &str) -> &str {
    match vowel {
        "A" => "a",
        "I" => "i",
        "U" => "u",
        "E" => "e",
        "O" => "o",
        other => other,
    }
}
