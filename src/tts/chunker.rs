//! Fixed-size text chunking.

/// Maximum characters per synthesized chunk.
pub const MAX_CHUNK_CHARS: usize = 450;

/// Split text into consecutive chunks of at most `max_chars` characters.
///
/// Every chunk except possibly the last holds exactly `max_chars` characters,
/// and joining the chunks reproduces `text`. Splits ignore word and sentence
/// boundaries but always land on a character boundary.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    assert!(max_chars > 0, "chunk size must be positive");

    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_max_is_one_chunk() {
        let text = "a".repeat(MAX_CHUNK_CHARS);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert_eq!(chunks, vec![text.as_str()]);
    }

    #[test]
    fn test_one_over_max_is_two_chunks() {
        let text = "b".repeat(MAX_CHUNK_CHARS + 1);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 450);
        assert_eq!(chunks[1].chars().count(), 1);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_text("", MAX_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn test_splits_mid_word() {
        assert_eq!(chunk_text("hello world", 4), vec!["hell", "o wo", "rld"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "héllo wörld ñ 日本語テキスト";
        let chunks = chunk_text(text, 5);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[0], "héllo");
    }

    #[test]
    fn test_chunk_properties_hold_across_lengths() {
        let source: String = "The quick brown fox jumps over the lazy dog. Ünïcödé ✓ ".chars().cycle().take(2000).collect();

        for len in [1, 2, 449, 450, 451, 899, 900, 901, 1337, 2000] {
            let text: String = source.chars().take(len).collect();
            let chunks = chunk_text(&text, MAX_CHUNK_CHARS);

            assert_eq!(chunks.concat(), text, "len {len}");
            assert_eq!(chunks.len(), len.div_ceil(MAX_CHUNK_CHARS), "len {len}");

            let (last, full) = chunks.split_last().unwrap();
            assert!(full.iter().all(|c| c.chars().count() == MAX_CHUNK_CHARS), "len {len}");
            assert!((1..=MAX_CHUNK_CHARS).contains(&last.chars().count()), "len {len}");
        }
    }
}
