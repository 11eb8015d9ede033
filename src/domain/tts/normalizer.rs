//! Rewrites SSML into the shape the long-audio validator accepts.
//!
//! The long-audio endpoint rejects documents the short-form endpoint tolerates:
//! nested or repeated `<speak>` roots, attributes on the root, relative
//! percentage deltas on `pitch`/`volume`, and any `<prosody>` element left
//! unbalanced. Scripts coming out of the generator regularly contain all of
//! these, so every document is passed through [`normalize_markup`] before it is
//! submitted.

use super::model::{NormalizationResult, NormalizeTarget};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const ROOT_OPEN: &str = "<speak>";
const ROOT_CLOSE: &str = "</speak>";

struct Patterns {
    preamble: Regex,
    root_open: Regex,
    root_close: Regex,
    whitespace: Regex,
    rate_percent: Regex,
    pitch_up: Regex,
    pitch_down: Regex,
    volume_up: Regex,
    volume_down: Regex,
    prosody_open: Regex,
    prosody_close: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            preamble: Regex::new(r"(?s)<\?xml.*?\?>\s*|<!DOCTYPE[^>]*>\s*")?,
            root_open: Regex::new(r"<speak(?:\s[^>]*)?>")?,
            root_close: Regex::new(r"</speak\s*>")?,
            whitespace: Regex::new(r"\s{2,}")?,
            rate_percent: Regex::new(r#"rate="(\d+(?:\.\d+)?)%""#)?,
            pitch_up: Regex::new(r#"pitch="\+\d+(?:\.\d+)?%""#)?,
            pitch_down: Regex::new(r#"pitch="-\d+(?:\.\d+)?%""#)?,
            volume_up: Regex::new(r#"volume="\+\d+(?:\.\d+)?%""#)?,
            volume_down: Regex::new(r#"volume="-\d+(?:\.\d+)?%""#)?,
            prosody_open: Regex::new(r"<prosody(?:\s[^>]*)?>")?,
            prosody_close: Regex::new(r"</prosody\s*>")?,
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

/// Normalize a markup document for the given backend.
///
/// Never fails: if the rewrite itself faults, the input is returned unchanged
/// with `fell_back` set, and the backend call is left to reject it.
pub fn normalize_markup(markup: &str, target: NormalizeTarget) -> NormalizationResult {
    match try_normalize(markup, target) {
        Ok(ssml) => NormalizationResult {
            ssml,
            fell_back: false,
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                markup_length = markup.len(),
                "SSML normalization failed, using original markup"
            );
            NormalizationResult {
                ssml: markup.to_string(),
                fell_back: true,
            }
        }
    }
}

fn try_normalize(markup: &str, target: NormalizeTarget) -> Result<String, regex::Error> {
    let p = patterns()?;

    // 1. Drop the XML declaration / doctype
    let ssml = p.preamble.replace_all(markup, "").into_owned();

    // 2. Exactly one bare root
    let root_count = p.root_open.find_iter(&ssml).count();
    let ssml = match root_count {
        0 => wrap_root(&collapse(p, &ssml)),
        1 => p.root_open.replace(&ssml, ROOT_OPEN).into_owned(),
        _ => {
            tracing::debug!(root_count, "Flattening repeated <speak> roots");
            wrap_root(&collapse(p, &strip_roots(p, &ssml)))
        }
    };

    // 3. Whitespace runs
    let ssml = collapse(p, &ssml);

    // 4. rate="95%" -> rate="0.95"
    let ssml = p
        .rate_percent
        .replace_all(&ssml, |caps: &Captures| match caps[1].parse::<f64>() {
            Ok(percent) => format!("rate=\"{}\"", percent / 100.0),
            Err(_) => caps[0].to_string(),
        })
        .into_owned();

    // 5. Relative pitch/volume deltas -> categorical values
    let ssml = p.pitch_up.replace_all(&ssml, r#"pitch="high""#);
    let ssml = p.pitch_down.replace_all(&ssml, r#"pitch="low""#);
    let ssml = p.volume_up.replace_all(&ssml, r#"volume="loud""#);
    let mut ssml = p.volume_down.replace_all(&ssml, r#"volume="soft""#).into_owned();

    // 6. The strict validator gets no styling wrappers at all
    if target == NormalizeTarget::LongAudio {
        ssml = strip_prosody(p, &ssml);
    }

    // 7. Re-validate the root
    let opens = p.root_open.find_iter(&ssml).count();
    let closes = p.root_close.find_iter(&ssml).count();
    let trimmed = ssml.trim();
    ssml = if opens == 1
        && closes == 1
        && trimmed.starts_with(ROOT_OPEN)
        && trimmed.ends_with(ROOT_CLOSE)
    {
        trimmed.to_string()
    } else {
        tracing::debug!(opens, closes, "Root still malformed, re-wrapping");
        wrap_root(&strip_roots(p, &ssml))
    };

    // 8. Unbalanced prosody left over: drop it rather than guess
    let prosody_opens = p.prosody_open.find_iter(&ssml).count();
    let prosody_closes = p.prosody_close.find_iter(&ssml).count();
    if prosody_opens != prosody_closes {
        tracing::debug!(
            prosody_opens,
            prosody_closes,
            "Unbalanced <prosody> tags, stripping them"
        );
        ssml = strip_prosody(p, &ssml);
    }

    Ok(collapse(p, &ssml))
}

fn collapse(p: &Patterns, s: &str) -> String {
    p.whitespace.replace_all(s, " ").into_owned()
}

fn strip_roots(p: &Patterns, s: &str) -> String {
    let without_open = p.root_open.replace_all(s, " ");
    p.root_close.replace_all(&without_open, " ").into_owned()
}

fn strip_prosody(p: &Patterns, s: &str) -> String {
    let without_open = p.prosody_open.replace_all(s, "");
    p.prosody_close.replace_all(&without_open, "").into_owned()
}

fn wrap_root(inner: &str) -> String {
    format!("{ROOT_OPEN}{}{ROOT_CLOSE}", inner.trim())
}
