//! Text wrapping.

/// Wrap plain text to `width` terminal cells.
///
/// Embedded newlines always start a new row, and blank lines are kept as
/// empty rows. A zero width returns the text unwrapped.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}
