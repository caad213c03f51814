//! Best-effort GS1-128 scan decoding.
//!
//! Scanners in the field emit anything from clean GS-delimited AI fields to
//! bare digit runs with the separators eaten by the keyboard wedge, so this
//! is an order-dependent heuristic rather than a full GS1 grammar: GTIN
//! (AI 01) detection runs first, lot (AI 10) detection second, and lot
//! values are truncated at the next recognizable fixed-length AI. A digit
//! run inside a lot that happens to look like `01` + 14 digits will be taken
//! for a field boundary; that mis-read is accepted behavior.

use serde::{Deserialize, Serialize};

/// ASCII Group Separator, the AI field delimiter when the scanner keeps it.
pub const GS: char = '\u{1d}';

/// Result of decoding one raw scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPayload {
    pub raw: String,
    pub gtin: Option<String>,
    pub lot: Option<String>,
}

/// Decodes a raw scanned string into GTIN and lot. Never fails; fields the
/// payload does not carry come back as `None`.
pub fn parse_scan(raw: &str) -> ScanPayload {
    if raw.is_empty() {
        return ScanPayload {
            raw: String::new(),
            gtin: None,
            lot: None,
        };
    }

    // Normalize: drop parentheses and whitespace, keep embedded GS bytes.
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
        .collect();

    if s.contains(GS) {
        return parse_tokens(raw, &s);
    }

    // No separators: look for an explicit AI 01 anywhere.
    if let Some((start, gtin)) = find_gtin(&s) {
        let after = start + 16;
        let (gtin, lot) = parse_tail(gtin, &s, after);
        return ScanPayload {
            raw: raw.to_string(),
            gtin: Some(gtin),
            lot,
        };
    }

    // No AI 01: a leading bare 14-digit run is still treated as the GTIN.
    // Here only a tail that starts with "10" counts as a tagged lot.
    let bytes = s.as_bytes();
    if bytes.len() >= 14 && bytes[..14].iter().all(u8::is_ascii_digit) {
        let gtin = s[..14].to_string();
        let tail = &s[14..];
        let lot = match tail.strip_prefix("10") {
            Some(value) => tidy_lot(truncate_at_next_ai(value)),
            None => tidy_lot(truncate_at_next_ai(tail)),
        };
        return ScanPayload {
            raw: raw.to_string(),
            gtin: Some(gtin),
            lot,
        };
    }

    // Last resort: anything after a literal "10" is the lot.
    let lot = s
        .find("10")
        .and_then(|pos| tidy_lot(truncate_at_next_ai(&s[pos + 2..])));

    ScanPayload {
        raw: raw.to_string(),
        gtin: None,
        lot,
    }
}

/// GS-delimited input: each token is one AI field.
fn parse_tokens(raw: &str, s: &str) -> ScanPayload {
    let tokens: Vec<&str> = s.split(GS).filter(|t| !t.is_empty()).collect();

    let mut gtin = None;
    let mut lot = None;
    let mut saw_lot_token = false;

    for token in &tokens {
        if let Some(digits) = gtin_of_token(token) {
            gtin = Some(digits);
        } else if let Some(value) = token.strip_prefix("10") {
            saw_lot_token = true;
            lot = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        // Other AIs are ignored for now.
    }

    if lot.is_none() && !saw_lot_token {
        // Scanners sometimes emit the lot as a bare trailing token.
        if let Some(last) = tokens.last() {
            let b = last.as_bytes();
            let looks_like_ai = b.len() >= 2 && b[0] == b'0' && b[1].is_ascii_digit();
            if !looks_like_ai {
                lot = Some((*last).to_string());
            }
        }
    }

    ScanPayload {
        raw: raw.to_string(),
        gtin,
        lot: lot.as_deref().and_then(tidy_lot),
    }
}

/// Lot extraction for undelimited input with an explicit AI 01, starting
/// just past the GTIN. The "10" tag may sit anywhere in the tail.
fn parse_tail(gtin: String, s: &str, after: usize) -> (String, Option<String>) {
    if let Some(rel) = s[after..].find("10") {
        let candidate = truncate_at_next_ai(&s[after + rel + 2..]);
        return (gtin, tidy_lot(candidate));
    }

    // No AI 10; the remaining tail may be an untagged lot.
    let tail = truncate_at_next_ai(&s[after..]);
    (gtin, tidy_lot(tail))
}

/// `01` + 14 digits at the start of a token. Extra trailing characters are
/// ignored, matching what wedge scanners produce for fixed-length AIs.
fn gtin_of_token(token: &str) -> Option<String> {
    let b = token.as_bytes();
    if b.len() >= 16 && b[0] == b'0' && b[1] == b'1' && b[2..16].iter().all(u8::is_ascii_digit) {
        Some(token[2..16].to_string())
    } else {
        None
    }
}

/// First `01` + 14-digit run anywhere in the string.
fn find_gtin(s: &str) -> Option<(usize, String)> {
    let b = s.as_bytes();
    if b.len() < 16 {
        return None;
    }
    for i in 0..=b.len() - 16 {
        if b[i] == b'0' && b[i + 1] == b'1' && b[i + 2..i + 16].iter().all(u8::is_ascii_digit) {
            return Some((i, s[i + 2..i + 16].to_string()));
        }
    }
    None
}

/// Cuts a candidate lot at the start of the next recognizable AI:
/// `01`+14, `17`+6, `00`+18, or `21`+digits.
fn truncate_at_next_ai(tail: &str) -> &str {
    let b = tail.as_bytes();
    for i in 0..b.len() {
        let rest = &b[i..];
        let hit = (rest.len() >= 16
            && rest[0] == b'0'
            && rest[1] == b'1'
            && rest[2..16].iter().all(u8::is_ascii_digit))
            || (rest.len() >= 8
                && rest[0] == b'1'
                && rest[1] == b'7'
                && rest[2..8].iter().all(u8::is_ascii_digit))
            || (rest.len() >= 20
                && rest[0] == b'0'
                && rest[1] == b'0'
                && rest[2..20].iter().all(u8::is_ascii_digit))
            || (rest.len() >= 3 && rest[0] == b'2' && rest[1] == b'1' && rest[2].is_ascii_digit());
        if hit {
            return &tail[..i];
        }
    }
    tail
}

/// Strips residual GS bytes, trims, and maps an empty value to `None`.
fn tidy_lot(value: &str) -> Option<String> {
    let cleaned: String = value.chars().filter(|c| *c != GS).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
