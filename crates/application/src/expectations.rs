//! Expectation evaluation against a received response.

use dratt_domain::{
    Expectation, ExpectationContext, ExpectationReport, Mismatch, RequestSpec, ResponseSpec,
    VariableStore,
};
use tracing::debug;

use crate::comparator::{evaluate_mismatch, filter_mismatches};

/// Checks every expectation against the response, in declaration order.
#[must_use]
pub fn check_expectations(
    request: &RequestSpec,
    response: &ResponseSpec,
    expectations: &[Expectation],
    variables: &VariableStore,
) -> Vec<ExpectationReport> {
    debug!(
        method = %request.method,
        url = %request.url,
        status = response.status,
        count = expectations.len(),
        "checking expectations"
    );
    expectations
        .iter()
        .map(|expectation| check_expectation(response, expectation, variables))
        .collect()
}

/// Checks a single expectation.
#[must_use]
pub fn check_expectation(
    response: &ResponseSpec,
    expectation: &Expectation,
    variables: &VariableStore,
) -> ExpectationReport {
    match expectation {
        Expectation::StatusEquals { expected_status } => ExpectationReport {
            expectation: expectation.clone(),
            met: response.status == *expected_status,
            context: ExpectationContext::Status {
                actual_status: response.status,
            },
        },
        Expectation::BodyEquals { expected_body } => {
            let mismatch = evaluate_mismatch(expected_body, response.body.as_ref(), variables);
            ExpectationReport {
                expectation: expectation.clone(),
                met: mismatch.is_empty(),
                context: ExpectationContext::Body {
                    body: response.body.clone(),
                    mismatch,
                },
            }
        }
        Expectation::BodyIncludes { expected_body } => {
            let mismatch = evaluate_mismatch(expected_body, response.body.as_ref(), variables);
            let met = filter_mismatches(&mismatch, &|m: &Mismatch| !m.is_extra()).is_empty();
            ExpectationReport {
                expectation: expectation.clone(),
                met,
                context: ExpectationContext::Body {
                    body: response.body.clone(),
                    mismatch,
                },
            }
        }
    }
}

/// Returns true if every report was met.
#[must_use]
pub fn all_met(reports: &[ExpectationReport]) -> bool {
    reports.iter().all(|report| report.met)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dratt_domain::{JsonType, Matcher, Template};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response() -> ResponseSpec {
        ResponseSpec::json(200, json!({"id": 1, "title": "x", "tags": ["a", "b"]}))
    }

    #[test]
    fn test_status_reports_actual_status() {
        let reports = check_expectations(
            &RequestSpec::get("http://localhost"),
            &response(),
            &[Expectation::status(201)],
            &VariableStore::new(),
        );
        assert!(!reports[0].met);
        assert_eq!(
            reports[0].context,
            ExpectationContext::Status { actual_status: 200 }
        );
    }

    #[test]
    fn test_includes_tolerates_extra_but_equals_does_not() {
        let expected = Template::object()
            .with_field("id", Matcher::of_type(JsonType::Number))
            .with_field("tags", Matcher::array_includes(["b"]));
        let expectations = [
            Expectation::body_includes(expected.clone()),
            Expectation::body_equals(expected),
        ];

        let reports = check_expectations(
            &RequestSpec::get("http://localhost"),
            &response(),
            &expectations,
            &VariableStore::new(),
        );

        assert!(reports[0].met);
        assert!(!reports[1].met);
        assert!(!all_met(&reports));

        // The includes report keeps the extra leaves for diagnostics.
        let extra_paths: Vec<String> = reports[0]
            .mismatch()
            .map(|m| m.paths().into_iter().map(|(p, _)| p).collect())
            .unwrap_or_default();
        assert_eq!(extra_paths, vec!["title".to_string()]);
    }

    #[test]
    fn test_body_equals_with_absent_body() {
        let report = check_expectation(
            &ResponseSpec::new(204, None),
            &Expectation::body_equals(json!({})),
            &VariableStore::new(),
        );
        assert!(!report.met);
    }

    #[test]
    fn test_all_expectations_met() {
        let reports = check_expectations(
            &RequestSpec::get("http://localhost"),
            &response(),
            &[
                Expectation::status(200),
                Expectation::body_equals(json!({"id": 1, "title": "x", "tags": ["a", "b"]})),
            ],
            &VariableStore::new(),
        );
        assert!(all_met(&reports));
    }
}
