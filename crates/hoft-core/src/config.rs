//! Analysis policy and reserved option names.

use serde::{Deserialize, Serialize};

/// Option name for the fail-fast flag.
pub const FAIL_FAST: &str = "_fail_fast_";
/// Option name for the custom error handler.
pub const ON_ERROR: &str = "_on_error_";
/// Option name for strict completeness checking (signature analysis only).
pub const STRICT: &str = "_strict_";
/// Option name for the fallback validator (signature analysis only).
pub const DEFAULT: &str = "_default_";

/// Names the call-argument analyser never treats as parameter names.
pub const RESERVED_IN: &[&str] = &[FAIL_FAST, ON_ERROR];
/// Names the signature analyser never treats as parameter names.
pub const RESERVED_SIG: &[&str] = &[FAIL_FAST, ON_ERROR, STRICT, DEFAULT];

/// Policy flags shared by both analysers.
///
/// Plain data so it can come from a configuration file:
///
/// ```ignore
/// let policy: Policy = serde_json::from_str(r#"{"fail_fast": true}"#)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Escalate on the first failure instead of after the full pass.
    pub fail_fast: bool,
    /// Report declared parameters that nothing analysed.
    /// Ignored by the call-argument analyser.
    pub strict: bool,
}

impl Policy {
    /// Escalate on the first failure.
    pub fn fail_fast() -> Self {
        Self {
            fail_fast: true,
            strict: false,
        }
    }

    /// Require every declared parameter to be analysed.
    pub fn strict() -> Self {
        Self {
            fail_fast: false,
            strict: true,
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
