//! # Test Outcome Classifier
//!
//! Maps a raw `(status_code, error_type)` pair from a test dispatch into a
//! fixed, user-facing diagnosis. The mapping is total and deterministic:
//! every outcome, including ones no table row names, produces a diagnosis,
//! so the UI is never left without a message to show.

use trustflow_shared::{Diagnosis, Severity, TestErrorType};

/// Classify a test outcome. Rows are evaluated in order; the first match
/// wins. Transport-level failures (`error_type` present) take precedence over
/// any status code.
pub fn classify(status_code: Option<u16>, error_type: Option<TestErrorType>) -> Diagnosis {
    match error_type {
        Some(TestErrorType::Timeout) => {
            return diagnosis(
                "Connection Timed Out",
                "The server did not respond within 5 seconds.",
                "Check that your endpoint responds quickly, or move heavy processing off the request path and acknowledge immediately.",
                Severity::Warning,
            );
        }
        Some(TestErrorType::Connection) => {
            return diagnosis(
                "Connection Failed",
                "We could not reach a server at this URL.",
                "Verify the URL is correct and the server is reachable from the public internet.",
                Severity::Error,
            );
        }
        None => {}
    }

    match status_code {
        Some(code) if (200..300).contains(&code) => diagnosis(
            "Connection Successful",
            "Your endpoint accepted the test event.",
            "You're all set. Real events will be delivered to this URL as they happen.",
            Severity::Success,
        ),
        Some(400) => diagnosis(
            "Format Rejected",
            "The server received the request but rejected the payload format.",
            "Make sure your endpoint accepts JSON POST bodies with a Content-Type of application/json.",
            Severity::Warning,
        ),
        Some(401) | Some(403) => diagnosis(
            "Permission Denied",
            "The server refused the request due to missing or invalid credentials.",
            "Configure the endpoint to accept unauthenticated posts, or verify requests using the endpoint's signing secret instead.",
            Severity::Error,
        ),
        Some(404) => diagnosis(
            "URL Not Found",
            "The server responded, but nothing is listening at this path.",
            "Double-check the URL path for typos against your receiver's route configuration.",
            Severity::Error,
        ),
        Some(408) => diagnosis(
            "Request Timeout",
            "The server took too long to accept the request.",
            "The endpoint is up but slow. Acknowledge deliveries immediately and process them asynchronously.",
            Severity::Warning,
        ),
        Some(429) => diagnosis(
            "Rate Limited",
            "The server is temporarily rejecting requests because of rate limiting.",
            "Wait a moment and run the test again.",
            Severity::Warning,
        ),
        Some(code) if code >= 500 => diagnosis(
            "External Server Error",
            "The server encountered an internal error while handling the request.",
            "The problem is on the receiving side. Check your endpoint's server logs.",
            Severity::Error,
        ),
        other => {
            let shown = match other {
                Some(code) => code.to_string(),
                None => "Unknown".to_string(),
            };
            Diagnosis {
                title: "Request Failed".to_string(),
                message: format!("The request failed with status {}.", shown),
                advice: "Inspect the response details and your endpoint's logs for more information."
                    .to_string(),
                severity: Severity::Error,
            }
        }
    }
}

fn diagnosis(title: &str, message: &str, advice: &str, severity: Severity) -> Diagnosis {
    Diagnosis {
        title: title.to_string(),
        message: message.to_string(),
        advice: advice.to_string(),
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some(TestErrorType::Timeout), "Connection Timed Out", Severity::Warning)]
    #[case(None, Some(TestErrorType::Connection), "Connection Failed", Severity::Error)]
    #[case(Some(200), None, "Connection Successful", Severity::Success)]
    #[case(Some(201), None, "Connection Successful", Severity::Success)]
    #[case(Some(299), None, "Connection Successful", Severity::Success)]
    #[case(Some(400), None, "Format Rejected", Severity::Warning)]
    #[case(Some(401), None, "Permission Denied", Severity::Error)]
    #[case(Some(403), None, "Permission Denied", Severity::Error)]
    #[case(Some(404), None, "URL Not Found", Severity::Error)]
    #[case(Some(408), None, "Request Timeout", Severity::Warning)]
    #[case(Some(429), None, "Rate Limited", Severity::Warning)]
    #[case(Some(500), None, "External Server Error", Severity::Error)]
    #[case(Some(503), None, "External Server Error", Severity::Error)]
    #[case(Some(301), None, "Request Failed", Severity::Error)]
    #[case(Some(418), None, "Request Failed", Severity::Error)]
    #[case(None, None, "Request Failed", Severity::Error)]
    fn classifies_each_outcome(
        #[case] status_code: Option<u16>,
        #[case] error_type: Option<TestErrorType>,
        #[case] expected_title: &str,
        #[case] expected_severity: Severity,
    ) {
        let result = classify(status_code, error_type);
        assert_eq!(result.title, expected_title);
        assert_eq!(result.severity, expected_severity);
        assert!(!result.message.is_empty());
        assert!(!result.advice.is_empty());
    }

    #[test]
    fn transport_errors_win_over_status_codes() {
        // A timeout that somehow carries a status still classifies as timeout.
        let result = classify(Some(200), Some(TestErrorType::Timeout));
        assert_eq!(result.title, "Connection Timed Out");
    }

    #[test]
    fn fallback_shows_the_literal_status() {
        let result = classify(Some(418), None);
        assert!(result.message.contains("418"), "message: {}", result.message);
    }

    #[test]
    fn fallback_without_status_shows_unknown() {
        let result = classify(None, None);
        assert!(
            result.message.contains("Unknown"),
            "message: {}",
            result.message
        );
    }

    #[test]
    fn classification_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify(Some(404), None), classify(Some(404), None));
            assert_eq!(
                classify(None, Some(TestErrorType::Connection)),
                classify(None, Some(TestErrorType::Connection))
            );
        }
    }

    #[test]
    fn severity_serializes_lowercase() {
        let result = classify(Some(200), None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["severity"], "success");
    }
}
