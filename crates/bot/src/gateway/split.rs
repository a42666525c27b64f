//! Splitting long replies into messages the chat service accepts.

/// Largest message body Telegram accepts, in UTF-16 code units.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Split `text` into chunks of at most `max_len` UTF-16 code units on line
/// boundaries.
///
/// Lines are packed greedily. A single line longer than `max_len` becomes
/// its own chunk. Joining the chunks with `'\n'` gives back `text`.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    // Current chunk and its length in UTF-16 code units.
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        let line_len = utf16_len(line);

        current = match current.take() {
            Some((mut chunk, len)) if len + 1 + line_len <= max_len => {
                chunk.push('\n');
                chunk.push_str(line);
                Some((chunk, len + 1 + line_len))
            }
            Some((chunk, _)) => {
                chunks.push(chunk);
                Some((line.to_string(), line_len))
            }
            None => Some((line.to_string(), line_len)),
        };
    }

    if let Some((chunk, _)) = current {
        chunks.push(chunk);
    }

    chunks
}

/// Length as Telegram counts it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_message("Hello\nworld", 4096), vec!["Hello\nworld"]);
    }

    #[test]
    fn test_lines_are_packed_greedily() {
        let chunks = split_message("aaa\nbbb\nccc\nd", 7);
        assert_eq!(chunks, vec!["aaa\nbbb", "ccc\nd"]);
    }

    #[test]
    fn test_overlong_line_is_its_own_chunk() {
        let long = "x".repeat(12);
        let text = format!("short\n{}\ntail", long);
        let chunks = split_message(&text, 10);

        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn test_join_reconstructs_text() {
        let text = "# Title\n\nFirst paragraph line.\n\n\n- item one\n- item two\n\nLast line";
        for max_len in [1, 5, 12, 20, 4096] {
            let chunks = split_message(text, max_len);
            assert_eq!(chunks.join("\n"), text, "max_len {}", max_len);
        }
    }

    #[test]
    fn test_chunks_respect_limit() {
        let text = (0..2000)
            .map(|i| format!("line number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = split_message(&text, MAX_MESSAGE_LENGTH);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| utf16_len(c) <= MAX_MESSAGE_LENGTH));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_length_counts_utf16_units() {
        // BMP characters are one unit each, whatever their UTF-8 width.
        assert_eq!(split_message("éééé", 4), vec!["éééé"]);
        // Emoji outside the BMP take two units.
        assert_eq!(split_message("😀😀\n😀", 4), vec!["😀😀", "😀"]);
    }

    #[test]
    fn test_emoji_lines_respect_limit() {
        let line = "😀".repeat(1500);
        let text = format!("{0}\n{0}", line);
        let chunks = split_message(&text, MAX_MESSAGE_LENGTH);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| utf16_len(c) <= MAX_MESSAGE_LENGTH));
        assert_eq!(chunks.join("\n"), text);
    }
}
