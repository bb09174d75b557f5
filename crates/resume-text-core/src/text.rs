/// Post-processing applied to the backend's text before it is written.
///
/// The default leaves the text untouched, so the output file holds exactly
/// what the backend returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Replace typographic ligatures (`ﬁ`, `ﬂ`, ...) with their letters.
    pub expand_ligatures: bool,
}

impl TextOptions {
    pub fn apply(&self, text: String) -> String {
        if self.expand_ligatures {
            expand_ligatures(&text)
        } else {
            text
        }
    }
}

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}
