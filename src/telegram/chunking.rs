//! Text chunking for Telegram's message size limit
//!
//! Telegram enforces a 4096-character cap per message. Long answers are
//! split into ordered chunks that reassemble losslessly: no trimming, no
//! dropped or duplicated bytes. A boundary may land mid-word.

/// Default chunk size limit (Telegram's hard cap)
const DEFAULT_LIMIT: usize = 4096;

/// Split `text` into ordered chunks that each fit within `limit` bytes.
///
/// When `limit` is 0, the default limit ([`DEFAULT_LIMIT`]) is used.
/// Text at or under the limit comes back as a single chunk. Oversized text
/// is cut at exact offsets, backed off to the nearest `char` boundary;
/// every chunk of an oversized input is non-empty and concatenating the
/// chunks in order reproduces the input exactly.
#[must_use]
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::with_capacity(text.len().div_ceil(limit));
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= limit {
            chunks.push(remaining.to_string());
            break;
        }

        let mut split = limit;
        while split > 0 && !remaining.is_char_boundary(split) {
            split -= 1;
        }
        if split == 0 {
            // Limit smaller than the first char; emit the char whole rather
            // than lose it
            split = remaining
                .chars()
                .next()
                .map_or(remaining.len(), char::len_utf8);
        }

        chunks.push(remaining[..split].to_string());
        remaining = &remaining[split..];
    }

    chunks
}
