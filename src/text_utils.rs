use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Count user-visible grapheme clusters.
pub(crate) fn grapheme_count(content: &str) -> usize {
    UnicodeSegmentation::graphemes(content, true).count()
}

/// Convert a grapheme index to a byte index in a UTF-8 string.
pub(crate) fn grapheme_to_byte_idx(content: &str, grapheme_idx: usize) -> usize {
    if grapheme_idx == 0 {
        return 0;
    }
    match UnicodeSegmentation::grapheme_indices(content, true).nth(grapheme_idx) {
        Some((idx, _)) => idx,
        None => content.len(),
    }
}

/// Display width (in cells) of the first `grapheme_idx` graphemes.
pub(crate) fn prefix_width(content: &str, grapheme_idx: usize) -> usize {
    let end = grapheme_to_byte_idx(content, grapheme_idx);
    UnicodeWidthStr::width(&content[..end])
}

/// Remove every whitespace character, including ones inside the string.
pub(crate) fn strip_whitespace(content: &str) -> String {
    content.chars().filter(|c| !c.is_whitespace()).collect()
}
