//! Splits oversized SSML into request-sized, independently valid documents.
//!
//! Each chunk is re-wrapped in the document's own `<speak>` open tag (and XML
//! header, when there was one). Elements that straddle a chunk boundary are
//! closed at the end of the chunk that opened them and re-opened bare at the
//! start of the chunk that closes them. That keeps every chunk well-formed but
//! may change which styling applies to straddling text.

use super::model::Chunk;
use regex::Regex;
use std::sync::OnceLock;

/// Room first left for the header, root wrapper and re-balanced tags when splitting at boundaries.
pub const BOUNDARY_OVERHEAD_BYTES: usize = 200;
/// Room first left when falling back to fixed-size slicing, which may also re-apply a prosody wrapper.
pub const SLICE_OVERHEAD_BYTES: usize = 300;

// Chunks that still come out too large once wrapped are halved until they fit.

const MIN_PAUSE_SECONDS: f64 = 0.5;

struct Patterns {
    header: Regex,
    root_open: Regex,
    root_close: Regex,
    break_tag: Regex,
    break_time: Regex,
    boundaries: Vec<Regex>,
    root_prosody_open: Regex,
    root_prosody_close: Regex,
    any_tag: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            header: Regex::new(r"(?s)<\?xml.*?\?>")?,
            root_open: Regex::new(r"<speak(?:\s[^>]*)?>")?,
            root_close: Regex::new(r"</speak\s*>")?,
            break_tag: Regex::new(r"<break\b[^>]*>")?,
            break_time: Regex::new(r#"time\s*=\s*"(\d+(?:\.\d+)?)\s*(ms|s)""#)?,
            boundaries: vec![
                Regex::new(r"</prosody\s*>\s*(<prosody\b)")?,
                Regex::new(r"</emphasis\s*>\s*(<emphasis\b)")?,
                Regex::new(r"</p\s*>\s*(<p\b)")?,
                Regex::new(r"</s\s*>\s*(<s\b)")?,
            ],
            root_prosody_open: Regex::new(r"^\s*<prosody(?:\s[^>]*)?>")?,
            root_prosody_close: Regex::new(r"</prosody\s*>\s*$")?,
            any_tag: Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:_-]*)(?:\s[^>]*?)?(/?)>")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, regex::Error> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(Clone::clone)
}

/// Split `markup` into chunks that each fit in `max_request_bytes`.
///
/// Always returns at least one chunk; if nothing usable comes out of the split,
/// the whole input is returned as the only chunk.
pub fn chunk_markup(markup: &str, max_request_bytes: usize) -> Vec<Chunk> {
    let bodies = match patterns() {
        Ok(p) => split_bodies(p, markup, max_request_bytes),
        Err(e) => {
            tracing::warn!(error = %e, "SSML chunk patterns unavailable");
            Vec::new()
        }
    };

    if bodies.is_empty() {
        tracing::warn!(
            markup_length = markup.len(),
            "SSML chunking produced nothing, sending the document whole"
        );
        return vec![Chunk {
            index: 0,
            ssml: markup.to_string(),
        }];
    }

    tracing::info!(
        chunk_count = bodies.len(),
        markup_length = markup.len(),
        "Split SSML into chunks"
    );

    bodies
        .into_iter()
        .enumerate()
        .map(|(index, ssml)| Chunk { index, ssml })
        .collect()
}

fn split_bodies(p: &Patterns, markup: &str, max_request_bytes: usize) -> Vec<String> {
    let header = p.header.find(markup).map(|m| m.as_str().to_string());
    let root_open = p
        .root_open
        .find(markup)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "<speak>".to_string());

    let content = p.header.replace_all(markup, "");
    let content = p.root_open.replace_all(&content, "");
    let content = p.root_close.replace_all(&content, "");
    let content = content.trim();

    let points = split_points(p, content);
    let mut chunks = Vec::new();

    if points.is_empty() {
        tracing::warn!("No natural SSML boundaries, slicing by size - speech quality may be affected");
        let (prosody_open, prosody_close, inner) = root_prosody(p, content);
        let render = |raw: &str| {
            let body = format!("{prosody_open}{}{prosody_close}", balance_tags(p, raw));
            wrap(header.as_deref(), &root_open, &body)
        };
        for raw in slice_fixed(inner, max_request_bytes.saturating_sub(SLICE_OVERHEAD_BYTES)) {
            fit(&raw, max_request_bytes, &render, &mut chunks);
        }
    } else {
        let render = |raw: &str| wrap(header.as_deref(), &root_open, &balance_tags(p, raw));
        let budget = max_request_bytes.saturating_sub(BOUNDARY_OVERHEAD_BYTES);
        for raw in accumulate(content, &points, budget) {
            fit(&raw, max_request_bytes, &render, &mut chunks);
        }
    }

    chunks
}

/// Render `raw` as a chunk, halving it until the rendered chunk fits in `max_bytes`.
///
/// Repair tags grow with the number of unclosed elements, so a body that fit the
/// first-guess budget can still overflow once balanced and wrapped.
fn fit(raw: &str, max_bytes: usize, render: &dyn Fn(&str) -> String, chunks: &mut Vec<String>) {
    let chunk = render(raw);
    if chunk.len() <= max_bytes {
        chunks.push(chunk);
        return;
    }

    let halves = slice_fixed(raw, raw.len() / 2);
    if halves.len() < 2 {
        tracing::warn!(
            chunk_length = chunk.len(),
            max_bytes,
            "SSML chunk cannot be split further, sending it over budget"
        );
        chunks.push(chunk);
        return;
    }

    for half in halves {
        fit(&half, max_bytes, render, chunks);
    }
}

/// Byte offsets in `content` where a chunk may end.
fn split_points(p: &Patterns, content: &str) -> Vec<usize> {
    let mut points = Vec::new();

    for m in p.break_tag.find_iter(content) {
        points.push(m.start());
        if pause_seconds(p, m.as_str()).is_some_and(|s| s >= MIN_PAUSE_SECONDS) {
            points.push(m.end());
        }
    }

    for boundary in &p.boundaries {
        for caps in boundary.captures_iter(content) {
            if let Some(next_open) = caps.get(1) {
                points.push(next_open.start());
            }
        }
    }

    points.retain(|&point| point > 0 && point < content.len());
    points.sort_unstable();
    points.dedup();
    points
}

fn pause_seconds(p: &Patterns, break_tag: &str) -> Option<f64> {
    let caps = p.break_time.captures(break_tag)?;
    let value: f64 = caps[1].parse().ok()?;
    match &caps[2] {
        "ms" => Some(value / 1000.0),
        _ => Some(value),
    }
}

/// Greedily pack the segments between split points into bodies of at most `budget` bytes.
fn accumulate(content: &str, points: &[usize], budget: usize) -> Vec<String> {
    let mut bodies = Vec::new();
    let mut current = String::new();
    let mut start = 0;

    for end in points.iter().copied().chain(std::iter::once(content.len())) {
        let segment = &content[start..end];
        start = end;

        if current.len() + segment.len() <= budget {
            current.push_str(segment);
            continue;
        }

        if !current.trim().is_empty() {
            bodies.push(std::mem::take(&mut current));
        }
        current.clear();

        if segment.len() > budget {
            bodies.extend(slice_fixed(segment, budget));
        } else {
            current.push_str(segment);
        }
    }

    if !current.trim().is_empty() {
        bodies.push(current);
    }

    bodies
}

/// A document-wide `<prosody>` wrapper, to be re-applied on every slice, and the content inside it.
fn root_prosody<'a>(p: &Patterns, content: &'a str) -> (&'a str, &'static str, &'a str) {
    match (
        p.root_prosody_open.find(content),
        p.root_prosody_close.find(content),
    ) {
        (Some(open), Some(close)) if open.end() <= close.start() => (
            open.as_str().trim_start(),
            "</prosody>",
            &content[open.end()..close.start()],
        ),
        _ => ("", "", content),
    }
}

/// Cut `content` into pieces of at most `size` bytes, never inside a tag.
///
/// A single tag longer than `size` is kept whole rather than split.
fn slice_fixed(content: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let mut slices = Vec::new();
    let mut pos = 0;

    while pos < content.len() {
        let mut end = floor_char_boundary(content, (pos + size).min(content.len()));

        if end < content.len() {
            let window = &content[pos..end];
            if let Some(lt) = window.rfind('<') {
                if !window[lt..].contains('>') {
                    end = pos + lt;
                }
            }
            if end == pos {
                end = if content[pos..].starts_with('<') {
                    content[pos..]
                        .find('>')
                        .map(|gt| pos + gt + 1)
                        .unwrap_or(content.len())
                } else {
                    next_char_boundary(content, pos)
                };
            }
        }

        let slice = &content[pos..end];
        if !slice.trim().is_empty() {
            slices.push(slice.to_string());
        }
        pos = end;
    }

    slices
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn next_char_boundary(s: &str, index: usize) -> usize {
    let mut next = index + 1;
    while next < s.len() && !s.is_char_boundary(next) {
        next += 1;
    }
    next.min(s.len())
}

/// Close whatever the body left open and re-open whatever it closes without opening.
fn balance_tags(p: &Patterns, body: &str) -> String {
    let mut open: Vec<&str> = Vec::new();
    let mut orphaned: Vec<&str> = Vec::new();

    for caps in p.any_tag.captures_iter(body) {
        let (Some(slash), Some(name), Some(self_closing)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        if !self_closing.as_str().is_empty() {
            continue;
        }
        let name = name.as_str();
        if slash.as_str().is_empty() {
            open.push(name);
        } else if let Some(idx) = open.iter().rposition(|n| *n == name) {
            open.remove(idx);
        } else {
            orphaned.push(name);
        }
    }

    if open.is_empty() && orphaned.is_empty() {
        return body.to_string();
    }

    let reopened: String = orphaned.iter().rev().map(|n| format!("<{n}>")).collect();
    let closed: String = open.iter().rev().map(|n| format!("</{n}>")).collect();
    format!("{reopened}{body}{closed}")
}

fn wrap(header: Option<&str>, root_open: &str, body: &str) -> String {
    match header {
        Some(header) => format!("{header}\n{root_open}\n{body}\n</speak>"),
        None => format!("{root_open}\n{body}\n</speak>"),
    }
}
