use regex::Regex;
use std::sync::OnceLock;

fn sentence_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"([.!?]+\s+)").ok())
        .as_ref()
}

/// Split plain text into pieces of at most `max_bytes`, preferring sentence ends.
pub fn split_text(text: &str, max_bytes: usize) -> Vec<String> {
    let max_bytes = max_bytes.max(1);
    if text.len() <= max_bytes {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    if let Some(pattern) = sentence_pattern() {
        for mat in pattern.find_iter(text) {
            let sentence = &text[last_end..mat.end()];
            last_end = mat.end();
            push_piece(&mut batches, &mut current_batch, sentence, max_bytes);
        }
    }

    if last_end < text.len() {
        push_piece(&mut batches, &mut current_batch, &text[last_end..], max_bytes);
    }

    flush(&mut batches, &mut current_batch);
    batches
}

fn push_piece(batches: &mut Vec<String>, current_batch: &mut String, piece: &str, max_bytes: usize) {
    if !current_batch.is_empty() && current_batch.len() + piece.len() > max_bytes {
        flush(batches, current_batch);
    }

    if piece.len() > max_bytes {
        // Sentence-less run: cut at character boundaries
        let mut start = 0;
        while start < piece.len() {
            let mut end = (start + max_bytes).min(piece.len());
            while end > start && !piece.is_char_boundary(end) {
                end -= 1;
            }
            if end == start {
                end = piece[start..]
                    .char_indices()
                    .nth(1)
                    .map(|(i, _)| start + i)
                    .unwrap_or(piece.len());
            }
            current_batch.push_str(&piece[start..end]);
            flush(batches, current_batch);
            start = end;
        }
    } else {
        current_batch.push_str(piece);
    }
}

fn flush(batches: &mut Vec<String>, current_batch: &mut String) {
    let trimmed = current_batch.trim();
    if !trimmed.is_empty() {
        batches.push(trimmed.to_string());
    }
    current_batch.clear();
}
