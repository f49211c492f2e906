use serde::Serialize;

/// One assertion against a captured text stream (stdout or stderr).
///
/// Exactly one field is expected to be set per entry; `success:`/`failure:`
/// blocks parse one of these per assertion line (`contains "..."`,
/// `matches /regex/`, …).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamExpectation {
    pub contains: Option<String>,
    pub not_contains: Option<String>,
    pub equals: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    pub matches: Option<String>,
    pub not_matches: Option<String>,
}

/// The full set of expectations for one branch (`success:` or `failure:`)
/// of a `test:` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub exit_code: Option<i32>,
    pub stdout: Vec<StreamExpectation>,
    pub stderr: Vec<StreamExpectation>,
}

/// Evaluate a single stream assertion against captured output.
///
/// Returns `None` if the assertion passes, or `Some(failure message)`
/// otherwise.
pub fn evaluate(expect: &StreamExpectation, output: &str) -> Option<String> {
    if let Some(s) = &expect.contains {
        if !output.contains(s.as_str()) {
            return Some(format!("expected output to contain {s:?}\ngot:\n{output}"));
        }
    }
    if let Some(s) = &expect.not_contains {
        if output.contains(s.as_str()) {
            return Some(format!(
                "expected output NOT to contain {s:?}\ngot:\n{output}"
            ));
        }
    }
    if let Some(s) = &expect.equals {
        if output != s.as_str() {
            return Some(format!("expected output to equal {s:?}\ngot:\n{output}"));
        }
    }
    if let Some(s) = &expect.starts_with {
        if !output.starts_with(s.as_str()) {
            return Some(format!(
                "expected output to start with {s:?}\ngot:\n{output}"
            ));
        }
    }
    if let Some(s) = &expect.ends_with {
        if !output.ends_with(s.as_str()) {
            return Some(format!("expected output to end with {s:?}\ngot:\n{output}"));
        }
    }
    if let Some(pattern) = &expect.matches {
        let re = match regex::Regex::new(pattern) {
            Ok(r) => r,
            Err(e) => return Some(format!("invalid regex {pattern:?}: {e}")),
        };
        if !re.is_match(output) {
            return Some(format!(
                "expected output to match regex {pattern:?}\ngot:\n{output}"
            ));
        }
    }
    if let Some(pattern) = &expect.not_matches {
        let re = match regex::Regex::new(pattern) {
            Ok(r) => r,
            Err(e) => return Some(format!("invalid regex {pattern:?}: {e}")),
        };
        if re.is_match(output) {
            return Some(format!(
                "expected output NOT to match regex {pattern:?}\ngot:\n{output}"
            ));
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contains(s: &str) -> StreamExpectation {
        StreamExpectation {
            contains: Some(s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn contains_pass() {
        assert!(evaluate(&contains("hello"), "hello world").is_none());
    }

    #[test]
    fn contains_fail() {
        assert!(evaluate(&contains("missing"), "hello world").is_some());
    }

    #[test]
    fn equals_pass_and_fail() {
        let e = StreamExpectation {
            equals: Some("exact".to_string()),
            ..Default::default()
        };
        assert!(evaluate(&e, "exact").is_none());
        assert!(evaluate(&e, "not exact").is_some());
    }

    #[test]
    fn matches_regex() {
        let e = StreamExpectation {
            matches: Some(r"\d+ errors?".to_string()),
            ..Default::default()
        };
        assert!(evaluate(&e, "3 errors found").is_none());
        assert!(evaluate(&e, "no errors").is_some());
    }

    #[test]
    fn invalid_regex_reports_as_failure() {
        let e = StreamExpectation {
            matches: Some("[invalid".to_string()),
            ..Default::default()
        };
        let msg = evaluate(&e, "anything").unwrap();
        assert!(msg.contains("invalid regex"));
    }

    #[test]
    fn not_contains_and_affixes() {
        let mut e = StreamExpectation {
            not_contains: Some("error".to_string()),
            starts_with: Some("ok".to_string()),
            ends_with: Some("done".to_string()),
            ..Default::default()
        };
        assert!(evaluate(&e, "ok all done").is_none());
        e.not_contains = Some("all".to_string());
        assert!(evaluate(&e, "ok all done").is_some());
    }
}
