use gloo_net::http::Request;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::state::Action;

// -- Request payload --

/// Form values sent with a check, keyed by input element id.
/// Keeps document order; a repeated id overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    fields: IndexMap<String, String>,
}

impl Submission {
    pub fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// -- Check response --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldResult {
    Correct,
    Incorrect,
    /// Any other value. Left alone when rendering.
    Unrecognized,
}

impl FieldResult {
    fn from_json(value: &Value) -> Self {
        match value.as_str() {
            Some("correct") => FieldResult::Correct,
            Some("incorrect") => FieldResult::Incorrect,
            _ => FieldResult::Unrecognized,
        }
    }

    /// Status icon class for this result, if it changes anything.
    pub fn icon_class<'a>(&self, config: &'a WidgetConfig) -> Option<&'a str> {
        match self {
            FieldResult::Correct => Some(&config.correct_class),
            FieldResult::Incorrect => Some(&config.incorrect_class),
            FieldResult::Unrecognized => None,
        }
    }
}

/// Per-field grading returned by `problem_check`, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResponse {
    pub fields: Vec<(String, FieldResult)>,
}

impl CheckResponse {
    pub fn parse(body: &str) -> Result<Self, WidgetError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| WidgetError::Decode(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(WidgetError::Decode(format!(
                "expected a JSON object, got: {}",
                truncate(body, 80)
            )));
        };
        Ok(Self {
            fields: map
                .iter()
                .map(|(field, result)| (field.clone(), FieldResult::from_json(result)))
                .collect(),
        })
    }

    /// `(field, class)` for every field whose status icon should change.
    pub fn marks<'a>(&'a self, config: &'a WidgetConfig) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.fields
            .iter()
            .filter_map(move |(field, result)| result.icon_class(config).map(|c| (field.as_str(), c)))
    }
}

/// Markup from `problem_reset`: a JSON string, or the raw body when it is not one.
pub fn parse_reset_markup(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(markup)) => markup,
        _ => body.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// -- Endpoints --

/// Query string of a reset request.
pub fn reset_query(id: &str) -> [(&str, &str); 1] {
    [("id", id)]
}

pub fn endpoint_url(base: &str, id: &str, action: Action) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(id),
        action.endpoint()
    )
}

async fn get_text<'a>(
    url: &str,
    query: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<String, WidgetError> {
    let response = Request::get(url)
        .header("Accept", "application/json")
        .header("X-Requested-With", "XMLHttpRequest")
        .query(query)
        .send()
        .await?;

    if !response.ok() {
        return Err(WidgetError::Status {
            code: response.status(),
            text: response.status_text(),
        });
    }

    Ok(response.text().await?)
}

pub async fn problem_check(
    config: &WidgetConfig,
    id: &str,
    submission: &Submission,
) -> Result<CheckResponse, WidgetError> {
    let url = endpoint_url(&config.endpoint_base, id, Action::Check);
    debug!("GET {} with {} field(s)", url, submission.len());
    let body = get_text(&url, submission.pairs()).await?;
    CheckResponse::parse(&body)
}

pub async fn problem_reset(config: &WidgetConfig, id: &str) -> Result<String, WidgetError> {
    let url = endpoint_url(&config.endpoint_base, id, Action::Reset);
    debug!("GET {}", url);
    let body = get_text(&url, reset_query(id)).await?;
    Ok(parse_reset_markup(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            endpoint_url("/modx/problem", "42", Action::Check),
            "/modx/problem/42/problem_check"
        );
        assert_eq!(
            endpoint_url("/modx/problem/", "42", Action::Reset),
            "/modx/problem/42/problem_reset"
        );
    }

    #[test]
    fn test_endpoint_url_encodes_id_segment() {
        assert_eq!(
            endpoint_url("/modx/problem", "a b/c", Action::Check),
            "/modx/problem/a%20b%2Fc/problem_check"
        );
    }

    #[test]
    fn test_reset_query_carries_widget_id() {
        assert_eq!(reset_query("42"), [("id", "42")]);
    }

    #[test]
    fn test_submission_keeps_order_and_overwrites_duplicates() {
        let mut submission = Submission::default();
        assert!(submission.is_empty());
        submission.insert("input_42_a".to_string(), "5".to_string());
        submission.insert("input_42_b".to_string(), "7".to_string());
        submission.insert("input_42_a".to_string(), "6".to_string());

        let pairs: Vec<_> = submission.pairs().collect();
        assert_eq!(pairs, vec![("input_42_a", "6"), ("input_42_b", "7")]);
        assert_eq!(submission.len(), 2);
    }

    #[test]
    fn test_check_response_marks_correct_and_incorrect() {
        let config = WidgetConfig::default();
        let response = CheckResponse::parse(r#"{"42_a":"correct","42_b":"incorrect"}"#)
            .expect("valid response should parse");

        let marks: Vec<_> = response.marks(&config).collect();
        assert_eq!(
            marks,
            vec![
                ("42_a", "ui-icon ui-icon-check"),
                ("42_b", "ui-icon ui-icon-close"),
            ]
        );
    }

    #[test]
    fn test_check_response_ignores_other_values() {
        let config = WidgetConfig::default();
        let response = CheckResponse::parse(
            r#"{"42_a":"partially-correct","42_b":true,"42_c":null,"42_d":"incorrect"}"#,
        )
        .expect("valid response should parse");

        assert_eq!(response.fields.len(), 4);
        assert_eq!(response.fields[0].1, FieldResult::Unrecognized);
        assert_eq!(response.fields[1].1, FieldResult::Unrecognized);

        let marks: Vec<_> = response.marks(&config).collect();
        assert_eq!(marks, vec![("42_d", "ui-icon ui-icon-close")]);
    }

    #[test]
    fn test_check_response_empty_object() {
        let response = CheckResponse::parse("{}").expect("empty object is valid");
        assert!(response.fields.is_empty());
    }

    #[test]
    fn test_check_response_rejects_non_objects() {
        let err = CheckResponse::parse(r#"["42_a"]"#).unwrap_err();
        assert!(matches!(err, WidgetError::Decode(_)), "Expected Decode, got {:?}", err);

        let err = CheckResponse::parse("<html>Server Error</html>").unwrap_err();
        assert!(matches!(err, WidgetError::Decode(_)), "Expected Decode, got {:?}", err);
    }

    #[test]
    fn test_reset_markup_json_string() {
        let markup = parse_reset_markup(r#""<form id=\"f\">...</form>""#);
        assert_eq!(markup, r#"<form id="f">...</form>"#);
    }

    #[test]
    fn test_reset_markup_raw_body_kept_verbatim() {
        let body = "<form>...</form>";
        assert_eq!(parse_reset_markup(body), body);

        // Valid JSON that is not a string is injected as sent
        assert_eq!(parse_reset_markup("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
