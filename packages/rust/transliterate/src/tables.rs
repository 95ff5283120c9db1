//! Devanagari code point tables with ITRANS and IAST renderings.
//!
//! Each row is `(devanagari, itrans, iast)`.

pub(crate) type Row = (char, &'static str, &'static str);

pub(crate) const VIRAMA: char = '\u{094D}';
pub(crate) const NUKTA: char = '\u{093C}';

/// Consonants; rendered with an inherent `a` unless followed by a vowel sign or virama.
pub(crate) const CONSONANTS: &[Row] = &[
    ('क', "k", "k"),
    ('ख', "kh", "kh"),
    ('ग', "g", "g"),
    ('घ', "gh", "gh"),
    ('ङ', "~N", "ṅ"),
    ('च', "ch", "c"),
    ('छ', "Ch", "ch"),
    ('ज', "j", "j"),
    ('झ', "jh", "jh"),
    ('ञ', "~n", "ñ"),
    ('ट', "T", "ṭ"),
    ('ठ', "Th", "ṭh"),
    ('ड', "D", "ḍ"),
    ('ढ', "Dh", "ḍh"),
    ('ण', "N", "ṇ"),
    ('त', "t", "t"),
    ('थ', "th", "th"),
    ('द', "d", "d"),
    ('ध', "dh", "dh"),
    ('न', "n", "n"),
    ('\u{0929}', "n", "ṉ"),
    ('प', "p", "p"),
    ('फ', "ph", "ph"),
    ('ब', "b", "b"),
    ('भ', "bh", "bh"),
    ('म', "m", "m"),
    ('य', "y", "y"),
    ('र', "r", "r"),
    ('\u{0931}', "r", "ṟ"),
    ('ल', "l", "l"),
    ('ळ', "L", "ḷ"),
    ('\u{0934}', "zh", "ḻ"),
    ('व', "v", "v"),
    ('श', "sh", "ś"),
    ('ष', "Sh", "ṣ"),
    ('स', "s", "s"),
    ('ह', "h", "h"),
    // Precomposed nukta forms.
    ('\u{0958}', "q", "q"),
    ('\u{0959}', "K", "k͟h"),
    ('\u{095A}', "G", "ġ"),
    ('\u{095B}', "z", "z"),
    ('\u{095C}', ".D", "ṛ"),
    ('\u{095D}', ".Dh", "ṛh"),
    ('\u{095E}', "f", "f"),
    ('\u{095F}', "Y", "ẏ"),
];

/// Base consonant followed by a combining nukta.
pub(crate) const NUKTA_FORMS: &[Row] = &[
    ('क', "q", "q"),
    ('ख', "K", "k͟h"),
    ('ग', "G", "ġ"),
    ('ज', "z", "z"),
    ('ड', ".D", "ṛ"),
    ('ढ', ".Dh", "ṛh"),
    ('फ', "f", "f"),
    ('य', "Y", "ẏ"),
];

pub(crate) const INDEPENDENT_VOWELS: &[Row] = &[
    ('अ', "a", "a"),
    ('आ', "A", "ā"),
    ('इ', "i", "i"),
    ('ई', "I", "ī"),
    ('उ', "u", "u"),
    ('ऊ', "U", "ū"),
    ('ऋ', "RRi", "ṛ"),
    ('ॠ', "RRI", "ṝ"),
    ('ऌ', "LLi", "ḷ"),
    ('ॡ', "LLI", "ḹ"),
    ('\u{090D}', "e", "ê"),
    ('ए', "e", "e"),
    ('ऐ', "ai", "ai"),
    ('\u{0911}', "o", "ô"),
    ('ओ', "o", "o"),
    ('औ', "au", "au"),
];

/// Dependent vowel signs (matras); replace the inherent `a`.
pub(crate) const VOWEL_SIGNS: &[Row] = &[
    ('\u{093E}', "A", "ā"),
    ('\u{093F}', "i", "i"),
    ('\u{0940}', "I", "ī"),
    ('\u{0941}', "u", "u"),
    ('\u{0942}', "U", "ū"),
    ('\u{0943}', "RRi", "ṛ"),
    ('\u{0944}', "RRI", "ṝ"),
    ('\u{0962}', "LLi", "ḷ"),
    ('\u{0945}', "e", "ê"),
    ('\u{0947}', "e", "e"),
    ('\u{0948}', "ai", "ai"),
    ('\u{0949}', "o", "ô"),
    ('\u{094B}', "o", "o"),
    ('\u{094C}', "au", "au"),
];

pub(crate) const SIGNS: &[Row] = &[
    ('\u{0901}', ".N", "m̐"),
    ('\u{0902}', "M", "ṃ"),
    ('\u{0903}', "H", "ḥ"),
    ('\u{093D}', ".a", "'"),
    ('\u{0950}', "OM", "oṃ"),
    ('\u{0964}', "|", "|"),
    ('\u{0965}', "||", "||"),
    ('\u{0970}', ".", "."),
];

/// Devanagari digit zero; the ten digits are contiguous.
pub(crate) const DIGIT_ZERO: u32 = 0x0966;
