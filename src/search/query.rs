use regex::Regex;

/// Split a raw query into normalized tokens.
///
/// The query is split on whitespace, then every non-word character is
/// stripped from each piece ("galette," becomes "galette"). A piece made
/// entirely of punctuation normalizes to the empty string and is kept:
/// its substring probe matches everything, and dropping it would change
/// which recipes are selected.
pub fn tokenize(raw: &str) -> Vec<String> {
    let non_word = Regex::new(r"[^\w]").unwrap();

    raw.split_whitespace()
        .map(|piece| non_word.replace_all(piece, "").into_owned())
        .collect()
}
