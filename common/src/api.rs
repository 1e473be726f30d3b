//! Interpretation of the JSON bodies returned by the recruitment backend services. Every service
//! reports errors FastAPI style, so the same few shapes cover the whole backend.

use serde::Deserialize;

/// Error payload returned by the backend services. Only one of the fields is expected to be
/// populated but all are checked, in order, when extracting a message.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    detail: Option<ErrorDetail>,
    message: Option<String>,
    error: Option<String>,
}

/// `detail` value of an [ErrorBody]. Raised HTTP exceptions carry text while request validation
/// failures carry a list of items, each with their own message.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Items(Vec<ErrorDetailItem>),
}

/// Single request validation failure within an [ErrorDetail::Items] list
#[derive(Deserialize, Debug)]
pub struct ErrorDetailItem {
    msg: String,
}

impl ErrorBody {
    /// Consume the body and return the first non-blank message found
    pub fn into_message(self) -> Option<String> {
        let detail = self.detail.and_then(|detail| match detail {
            ErrorDetail::Text(text) => Some(text),
            ErrorDetail::Items(items) => {
                let joined = items
                    .into_iter()
                    .map(|item| item.msg)
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(joined)
            }
        });
        [detail, self.message, self.error]
            .into_iter()
            .flatten()
            .map(|message| message.trim().to_owned())
            .find(|message| !message.is_empty())
    }
}

/// Extract a user facing message from a raw response `body`. Returns [None] when the body is
/// empty, is not JSON or does not contain any known message field.
pub fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => error_body.into_message(),
        Err(error) => {
            log::debug!("Response body is not a known error shape. {error}");
            None
        }
    }
}

/// Status envelope used by the registration endpoint and by the health endpoints,
/// e.g. `{"status": "success", "message": "..."}` or `{"status": "unhealthy", "error": "..."}`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusBody {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl StatusBody {
    /// Parse the `body` into a [StatusBody]. Any body that is not a JSON object results in the
    /// default (empty) envelope.
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// A response is successful when it does not declare a status or declares `success`
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| status.eq_ignore_ascii_case("success"))
    }

    /// A health response is unhealthy only when it explicitly declares so
    pub fn is_unhealthy(&self) -> bool {
        self.status
            .as_deref()
            .map_or(false, |status| status.eq_ignore_ascii_case("unhealthy"))
    }
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::{error_message, StatusBody};

    #[rstest]
    #[case::detail_text(r#"{"detail": "Invalid credentials"}"#, Some("Invalid credentials"))]
    #[case::detail_items(
        r#"{"detail": [{"loc": ["body", "username"], "msg": "field required", "type": "value_error.missing"},
                       {"loc": ["body", "password"], "msg": "field required", "type": "value_error.missing"}]}"#,
        Some("field required; field required")
    )]
    #[case::message(r#"{"status": "error", "message": "Registration failed"}"#, Some("Registration failed"))]
    #[case::error(r#"{"status": "unhealthy", "error": "Database check failed"}"#, Some("Database check failed"))]
    #[case::blank_detail_falls_through(r#"{"detail": " ", "message": "Use this"}"#, Some("Use this"))]
    #[case::no_known_field(r#"{"token": "abc"}"#, None)]
    #[case::not_json("<html>Bad Gateway</html>", None)]
    #[case::empty("", None)]
    fn error_message_should_extract(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(error_message(body).as_deref(), expected);
    }

    #[rstest]
    #[case::success(r#"{"status": "success", "message": "User registered successfully"}"#, true)]
    #[case::missing_status(r#"{"message": "ok"}"#, true)]
    #[case::error_status(r#"{"status": "error", "message": "nope"}"#, false)]
    #[case::not_json("created", true)]
    fn status_body_success(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(StatusBody::parse(body).is_success(), expected);
    }

    #[rstest]
    #[case::healthy(r#"{"status": "healthy", "service": "auth"}"#, false)]
    #[case::unhealthy(r#"{"status": "unhealthy", "error": "Database check failed"}"#, true)]
    #[case::plain("OK", false)]
    fn status_body_unhealthy(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(StatusBody::parse(body).is_unhealthy(), expected);
    }
}
