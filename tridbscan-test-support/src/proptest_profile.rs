//! Environment-driven case counts for property tests.

use std::env;

/// Environment variable overriding the number of proptest cases.
pub const PROPTEST_CASES_ENV_KEY: &str = "TRIDBSCAN_PROPTEST_CASES";

/// Number of cases each property should run.
///
/// Reads [`PROPTEST_CASES_ENV_KEY`]; missing, unparsable or zero values
/// fall back to `default_cases` with a warning.
///
/// # Examples
/// ```
/// use tridbscan_test_support::proptest_profile::case_count;
///
/// assert!(case_count(32) > 0);
/// ```
#[must_use]
pub fn case_count(default_cases: u32) -> u32 {
    let Ok(raw) = env::var(PROPTEST_CASES_ENV_KEY) else {
        return default_cases;
    };
    match parse_cases(&raw) {
        Ok(cases) => cases,
        Err(reason) => {
            tracing::warn!(
                env = PROPTEST_CASES_ENV_KEY,
                raw = %raw,
                reason = %reason,
                "invalid proptest case override; using default",
            );
            default_cases
        }
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("cases must be > 0".to_owned()),
        Ok(cases) => Ok(cases),
        Err(error) => Err(format!("parse error: {error}")),
    }
}
