//! Stored files.

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// A stored file with its content.
///
/// `metadata` is ciphertext; `name` is the normalized upload name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "file")]
    pub bytes: Vec<u8>,
    pub metadata: String,
}

/// Normalize an uploaded file name for storage.
///
/// Whitespace becomes `_`, and diacritics are removed by decomposing to NFD,
/// dropping combining marks, and recomposing to NFC.
pub fn normalize_file_name(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    spaced
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect()
}
