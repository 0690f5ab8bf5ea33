//! Input clean-up applied while typing and before a record is built

/// Trim and collapse inner runs of whitespace to a single space
pub fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trimmed phone number, `None` when left blank
pub fn normalize_phone(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Upper-case the first letter of every word, leaving the rest untouched
///
/// Used on the name input as the visitor types.
pub fn capitalize_words(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
