use serde::{Deserialize, Serialize};

use super::report::ReportSummary;

/// Envelope of `GET /api/v1/reports/public`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicReports {
    #[serde(default)]
    pub reports: Vec<ReportSummary>,
}

/// Longest server detail carried into a user-facing message.
const MAX_DETAIL_CHARS: usize = 300;

/// Pull a human-readable detail out of an error response body.
///
/// Understands `{"error": "..."}`, `{"error": {"message": "..."}}`,
/// `{"errors": {...}}`, `{"message": "..."}` and falls back to the raw text.
pub fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => detail_from_json(&value).unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    };

    Some(truncate(&detail, MAX_DETAIL_CHARS))
}

fn detail_from_json(value: &serde_json::Value) -> Option<String> {
    let obj = value.as_object()?;
    if let Some(error) = obj.get("error") {
        match error {
            serde_json::Value::String(s) => return Some(s.clone()),
            serde_json::Value::Object(inner) => {
                if let Some(msg) = inner.get("message").and_then(|m| m.as_str()) {
                    return Some(msg.to_string());
                }
            }
            _ => {}
        }
    }
    if let Some(errors) = obj.get("errors") {
        return Some(flatten_errors(errors));
    }
    obj.get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// `{"title": ["Shorter than minimum length 2."]}` -> `title: Shorter than minimum length 2.`
fn flatten_errors(errors: &serde_json::Value) -> String {
    match errors {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(field, problems)| {
                let text = match problems {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join(" "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{field}: {text}")
            })
            .collect::<Vec<_>>()
            .join("; "),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_flat_error() {
        assert_eq!(error_detail(r#"{"error":"Forbidden"}"#).as_deref(), Some("Forbidden"));
    }

    #[test]
    fn detail_from_nested_error() {
        assert_eq!(
            error_detail(r#"{"success":false,"error":{"code":"E0002","message":"bad title"}}"#).as_deref(),
            Some("bad title")
        );
    }

    #[test]
    fn detail_from_field_errors() {
        assert_eq!(
            error_detail(r#"{"errors":{"title":["Shorter than minimum length 2."]}}"#).as_deref(),
            Some("title: Shorter than minimum length 2.")
        );
    }

    #[test]
    fn detail_from_plain_text_and_empty() {
        assert_eq!(error_detail("Bad Gateway\n").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_detail("   "), None);
    }

    #[test]
    fn long_detail_is_truncated() {
        let detail = error_detail(&"x".repeat(1000)).unwrap();
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS + 1);
    }

    #[test]
    fn empty_public_list() {
        let list: PublicReports = serde_json::from_str(r#"{"reports":[]}"#).unwrap();
        assert!(list.reports.is_empty());
        let missing: PublicReports = serde_json::from_str("{}").unwrap();
        assert!(missing.reports.is_empty());
    }
}
