//! Field extraction from recognized label lines.
//!
//! Each field owns an ordered list of named strategies, evaluated in
//! one forward pass over the lines. The first strategy hit freezes the
//! field — later candidates never overwrite it — and fields are
//! extracted independently, so one line may feed several fields.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::lines::normalize_for_matching;
use crate::types::{LabelFields, RecognizedLine};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Anchored shapes, checked against the preprocessed (uppercased) line.
re!(re_pid_standalone, r"^(?:PID|P)[- ]?\d+$");
re!(re_sku_standalone, r"^(?:SKU|ELEC)[- ]?[A-Z0-9-]*\d[A-Z0-9-]*$");
re!(re_id_candidate, r"^(?:(?:PID|P|SKU|ELEC)-\S+|[A-Z]{1,6}-?\d+)$");
re!(re_bare_color, r"^(?:RED|BLUE|GREEN|BLACK|WHITE|YELLOW|SILVER|GREY)$");

// Unanchored shapes, searched in the raw line; the match itself is the value.
re!(re_weight_shape, r"(?i)\b\d+(?:\.\d+)?\s*(?:kg|g|lbs?|oz)\b");
re!(re_dims_shape, r"(?i)\d+\s*x\s*\d+\s*x\s*\d+");
re!(re_location_shape, r"(?i)\b(?:LOC|ZONE|Z)[-:\s]*[A-Z0-9]+-[A-Z0-9]+\b");

re!(re_brand_prefix, r"(?i)brand[:\s]*");

// ── Trigger tokens ───────────────────────────────────────────────────────────

const PID_TRIGGERS: &[&str] = &["PID", "PRODUCT ID", "P-CODE", "PROD", "PRODUCT"];
const SKU_TRIGGERS: &[&str] = &["SKU", "ELEC"];
const COLOR_TRIGGERS: &[&str] = &["COLOR", "COLOUR"];
const WEIGHT_TRIGGERS: &[&str] = &["WEIGHT", "WT"];

/// Lines carrying any of these are the "key" indicators the aggregate
/// confidence score is computed over.
const KEY_TRIGGERS: &[&[&str]] = &[SKU_TRIGGERS, PID_TRIGGERS, WEIGHT_TRIGGERS];

const LOOK_AHEAD_LINES: usize = 3;

// ── Extraction context ───────────────────────────────────────────────────────

/// The raw lines plus their preprocessed forms. Normalized text drives
/// trigger and shape decisions; values always come out of the raw text.
struct Context<'a> {
    lines: &'a [RecognizedLine],
    norm: Vec<String>,
}

impl<'a> Context<'a> {
    fn new(lines: &'a [RecognizedLine]) -> Self {
        let norm = lines.iter().map(|l| normalize_for_matching(&l.text)).collect();
        Self { lines, norm }
    }
}

/// One extraction heuristic: inspect line `i` (and, for look-ahead,
/// the lines after it) and produce the field value if it applies.
type Strategy = fn(&Context, usize) -> Option<String>;

/// Forward pass with first-match-wins: for each line, the field's
/// strategies are tried in declared order and the first hit anywhere
/// settles the field.
fn first_match(ctx: &Context, field: &str, strategies: &[Strategy]) -> Option<String> {
    for i in 0..ctx.lines.len() {
        for try_extract in strategies {
            if let Some(value) = try_extract(ctx, i) {
                debug!(field, line = i, value = %value, "field extracted");
                return Some(value);
            }
        }
    }
    None
}

// ── Generic strategy building blocks ─────────────────────────────────────────

fn contains_any(norm: &str, triggers: &[&str]) -> bool {
    triggers.iter().any(|t| norm.contains(t))
}

/// Inline `key: value` — trigger plus colon on the same line; the raw
/// substring after the first colon is the value.
fn inline_value(ctx: &Context, i: usize, triggers: &[&str]) -> Option<String> {
    if !contains_any(&ctx.norm[i], triggers) {
        return None;
    }
    let (_, value) = ctx.lines[i].text.split_once(':')?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Inline value for identifier-like fields: additionally rejects
/// values with internal whitespace, which distinguishes a code like
/// `PID-1804` from a free-text product name.
fn inline_identifier(ctx: &Context, i: usize, triggers: &[&str]) -> Option<String> {
    inline_value(ctx, i, triggers).filter(|v| !v.contains(char::is_whitespace))
}

/// Look-ahead: the trigger is present but the line gave no usable
/// inline value (the inline strategy has already run and failed). Scan
/// the next few lines, skipping anything that looks like another label
/// (contains a colon), and accept the first line matching `shape`.
fn look_ahead_line(ctx: &Context, i: usize, triggers: &[&str], shape: &Regex) -> Option<String> {
    if !contains_any(&ctx.norm[i], triggers) {
        return None;
    }
    let end = (i + 1 + LOOK_AHEAD_LINES).min(ctx.lines.len());
    for j in i + 1..end {
        if ctx.norm[j].contains(':') {
            continue;
        }
        if shape.is_match(ctx.norm[j].trim()) {
            return Some(ctx.lines[j].text.trim().to_string());
        }
    }
    None
}

/// Standalone fallback for whole-line shapes: no trigger needed, the
/// line itself must match.
fn standalone_line(ctx: &Context, i: usize, shape: &Regex) -> Option<String> {
    shape
        .is_match(ctx.norm[i].trim())
        .then(|| ctx.lines[i].text.trim().to_string())
}

/// Standalone fallback for in-line shapes: the first match found in
/// the raw text is the value.
fn standalone_find(ctx: &Context, i: usize, shape: &Regex) -> Option<String> {
    shape.find(&ctx.lines[i].text).map(|m| m.as_str().to_string())
}

// ── Per-field strategies ─────────────────────────────────────────────────────

fn pid_inline(ctx: &Context, i: usize) -> Option<String> {
    inline_identifier(ctx, i, PID_TRIGGERS)
}

fn pid_look_ahead(ctx: &Context, i: usize) -> Option<String> {
    look_ahead_line(ctx, i, PID_TRIGGERS, re_id_candidate())
}

fn pid_standalone(ctx: &Context, i: usize) -> Option<String> {
    standalone_line(ctx, i, re_pid_standalone())
}

fn sku_inline(ctx: &Context, i: usize) -> Option<String> {
    inline_identifier(ctx, i, SKU_TRIGGERS)
}

fn sku_look_ahead(ctx: &Context, i: usize) -> Option<String> {
    look_ahead_line(ctx, i, SKU_TRIGGERS, re_id_candidate())
}

fn sku_standalone(ctx: &Context, i: usize) -> Option<String> {
    standalone_line(ctx, i, re_sku_standalone())
}

fn weight_inline(ctx: &Context, i: usize) -> Option<String> {
    inline_value(ctx, i, WEIGHT_TRIGGERS)
}

fn weight_look_ahead(ctx: &Context, i: usize) -> Option<String> {
    if !contains_any(&ctx.norm[i], WEIGHT_TRIGGERS) {
        return None;
    }
    let end = (i + 1 + LOOK_AHEAD_LINES).min(ctx.lines.len());
    for j in i + 1..end {
        if ctx.norm[j].contains(':') {
            continue;
        }
        if let Some(m) = re_weight_shape().find(&ctx.lines[j].text) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

fn weight_standalone(ctx: &Context, i: usize) -> Option<String> {
    standalone_find(ctx, i, re_weight_shape())
}

fn color_inline(ctx: &Context, i: usize) -> Option<String> {
    inline_value(ctx, i, COLOR_TRIGGERS)
}

fn color_look_ahead(ctx: &Context, i: usize) -> Option<String> {
    look_ahead_line(ctx, i, COLOR_TRIGGERS, re_bare_color())
}

fn color_bare(ctx: &Context, i: usize) -> Option<String> {
    standalone_line(ctx, i, re_bare_color())
}

fn dims_standalone(ctx: &Context, i: usize) -> Option<String> {
    standalone_find(ctx, i, re_dims_shape())
}

fn location_standalone(ctx: &Context, i: usize) -> Option<String> {
    standalone_find(ctx, i, re_location_shape())
}

fn brand_strip(ctx: &Context, i: usize) -> Option<String> {
    if !ctx.norm[i].contains("BRAND") {
        return None;
    }
    let value = re_brand_prefix()
        .replace_all(&ctx.lines[i].text, "")
        .trim()
        .to_string();
    (!value.is_empty()).then_some(value)
}

const PID_STRATEGIES: &[Strategy] = &[pid_inline, pid_look_ahead, pid_standalone];
const SKU_STRATEGIES: &[Strategy] = &[sku_inline, sku_look_ahead, sku_standalone];
const WEIGHT_STRATEGIES: &[Strategy] = &[weight_inline, weight_look_ahead, weight_standalone];
const COLOR_STRATEGIES: &[Strategy] = &[color_inline, color_look_ahead, color_bare];
const DIMS_STRATEGIES: &[Strategy] = &[dims_standalone];
const LOCATION_STRATEGIES: &[Strategy] = &[location_standalone];
const BRAND_STRATEGIES: &[Strategy] = &[brand_strip];

// ── Public extraction API ────────────────────────────────────────────────────

pub struct LabelExtractor;

impl LabelExtractor {
    /// Run every field's strategy chain over the recognized lines and
    /// assemble the structured result.
    pub fn extract(lines: &[RecognizedLine]) -> LabelFields {
        let ctx = Context::new(lines);
        LabelFields {
            sku: first_match(&ctx, "sku", SKU_STRATEGIES),
            pid: first_match(&ctx, "pid", PID_STRATEGIES),
            weight: first_match(&ctx, "weight", WEIGHT_STRATEGIES),
            color: first_match(&ctx, "color", COLOR_STRATEGIES),
            dimensions: first_match(&ctx, "dimensions", DIMS_STRATEGIES),
            location: first_match(&ctx, "location", LOCATION_STRATEGIES),
            brand: first_match(&ctx, "brand", BRAND_STRATEGIES),
            confidence_score: confidence_score(&ctx),
            raw_lines: lines.iter().map(|l| l.text.clone()).collect(),
        }
    }
}

/// Average confidence over the lines carrying key field indicators;
/// falls back to the overall average when no key line exists, and to
/// 0.95 for an empty scan — "nothing to disagree with" rather than
/// total failure, so keyless labels are not penalized.
fn confidence_score(ctx: &Context) -> f32 {
    if ctx.lines.is_empty() {
        return 0.95;
    }
    let key_scores: Vec<f32> = ctx
        .lines
        .iter()
        .zip(&ctx.norm)
        .filter(|(_, norm)| KEY_TRIGGERS.iter().any(|t| contains_any(norm, t)))
        .map(|(line, _)| line.confidence)
        .collect();
    let avg = if key_scores.is_empty() {
        ctx.lines.iter().map(|l| l.confidence).sum::<f32>() / ctx.lines.len() as f32
    } else {
        key_scores.iter().sum::<f32>() / key_scores.len() as f32
    };
    (avg * 100.0).round() / 100.0
}

// ── Tests ────────────────────────────────────────────────────────────────────
