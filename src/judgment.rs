//! Parsing of judge-model output into structured verdict records.
//!
//! Judge models are asked for JSON but return it wrapped in markdown fences,
//! prose, or with small syntax slips (trailing commas, smart quotes). The
//! parser tries a strict parse first, applies one repair pass, and otherwise
//! reports a typed failure. Callers map that failure to an undefined score;
//! there is no path on which garbage input turns into an empty-but-valid
//! judgment list.

use serde_json::Value;
use thiserror::Error;

/// A judge model's classification of one statement or passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The claim is supported / the passage is useful.
    Affirmative,
    /// The claim is unsupported / the passage is not useful.
    Negative,
    /// The judge could not decide, or the token was not recognized.
    Undeterminable,
}

impl Verdict {
    /// Normalize a verdict token, case-insensitively.
    ///
    /// English and German affirmative/negative tokens are both recognized;
    /// judge models echo whichever localization the prompt examples used.
    /// Anything else (including the literal `NULL`) is undeterminable.
    pub fn parse(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "yes" | "ja" => Verdict::Affirmative,
            "no" | "nein" => Verdict::Negative,
            _ => Verdict::Undeterminable,
        }
    }
}

/// One parsed verdict record.
#[derive(Debug, Clone)]
pub struct Judgment {
    /// The statement or label the verdict applies to.
    pub statement: String,
    /// The judge's explanation. Not used in scoring.
    pub reason: String,
    /// The verdict itself.
    pub verdict: Verdict,
}

/// The judge output could not be turned into verdict records.
///
/// Distinguishable from an empty judgment list: callers must branch on this
/// and record an undefined score rather than guessing 0.
#[derive(Error, Debug)]
#[error("Unparseable judgment output: {0}")]
pub struct JudgmentParseError(pub String);

/// Parse raw judge output into a list of verdict records.
///
/// Accepts a JSON array of records or a single record object. Statement
/// text is read from a `statement`/`statement_N` key, the verdict from a
/// `verdict` or `Attributed` key (case-insensitive); a record without a
/// verdict key yields [`Verdict::Undeterminable`].
pub fn parse_judgment_list(raw: &str) -> Result<Vec<Judgment>, JudgmentParseError> {
    let value = parse_lenient(raw)?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(JudgmentParseError(format!(
                "expected an array or object, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut judgments = Vec::with_capacity(records.len());
    for record in records {
        let Value::Object(map) = record else {
            return Err(JudgmentParseError(
                "expected each record to be an object".to_string(),
            ));
        };

        let mut statement = String::new();
        let mut reason = String::new();
        let mut verdict = Verdict::Undeterminable;

        for (key, value) in &map {
            let key_lower = key.to_lowercase();
            if key_lower.starts_with("statement") {
                statement = value.as_str().unwrap_or_default().to_string();
            } else if key_lower == "reason" {
                reason = value.as_str().unwrap_or_default().to_string();
            } else if key_lower == "verdict" || key_lower == "attributed" {
                verdict = match value.as_str() {
                    Some(token) => Verdict::parse(token),
                    None => Verdict::Undeterminable,
                };
            }
        }

        judgments.push(Judgment {
            statement,
            reason,
            verdict,
        });
    }

    Ok(judgments)
}

/// Parse statement-extraction output: `{"statements": ["...", ...]}`.
pub fn parse_statements(raw: &str) -> Result<Vec<String>, JudgmentParseError> {
    let value = parse_lenient(raw)?;

    let statements = value
        .get("statements")
        .and_then(Value::as_array)
        .ok_or_else(|| JudgmentParseError("missing 'statements' array".to_string()))?;

    Ok(statements
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Strict parse of the extracted JSON span, with one repair-and-retry pass.
fn parse_lenient(raw: &str) -> Result<Value, JudgmentParseError> {
    let extracted = extract_json(raw);

    if let Ok(value) = serde_json::from_str(&extracted) {
        return Ok(value);
    }

    let repaired = repair_json(&extracted);
    serde_json::from_str(&repaired)
        .map_err(|e| JudgmentParseError(format!("{} in: {}", e, truncate(raw, 200))))
}

/// Extract the JSON span from a completion: peel markdown fences, then take
/// the outermost array or object.
fn extract_json(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```json") {
        if let Some(end) = response.rfind("```") {
            let start = "```json".len();
            if end > start {
                return extract_json(response[start..end].trim());
            }
        }
    }

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
            if end > start {
                return extract_json(response[start..end].trim());
            }
        }
    }

    // Prefer whichever bracket opens first so prose around the JSON is
    // dropped without cutting an array short at an inner object.
    let array_start = response.find('[');
    let object_start = response.find('{');

    let span = match (array_start, object_start) {
        (Some(a), Some(o)) if a < o => response.rfind(']').map(|end| (a, end)),
        (Some(a), None) => response.rfind(']').map(|end| (a, end)),
        (_, Some(o)) => response.rfind('}').map(|end| (o, end)),
        (None, None) => None,
    };

    if let Some((start, end)) = span {
        if end > start {
            return response[start..=end].to_string();
        }
    }

    response.to_string()
}

/// Best-effort repair: normalize smart quotes and drop trailing commas.
/// String contents are left untouched.
fn repair_json(text: &str) -> String {
    let normalized: String = text
        .chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let mut result = String::with_capacity(normalized.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in normalized.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            result.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            ',' => {
                let next = normalized[i + c.len_utf8()..]
                    .chars()
                    .find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    result.push(c);
                }
            }
            other => result.push(other),
        }
    }

    result
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
