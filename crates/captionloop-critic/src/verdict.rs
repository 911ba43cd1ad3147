use serde::Serialize;
use std::collections::BTreeMap;

/// String-to-string attributes attached to a verdict
pub type Attributes = BTreeMap<String, String>;

pub const STATUS: &str = "status";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const LENGTH: &str = "length";
pub const WORD_COUNT: &str = "word_count";
pub const BRAND_SAFETY_CHECK: &str = "brand_safety_check";
pub const EXHAUSTED: &str = "exhausted";

/// Brand safety outcomes recorded under [`BRAND_SAFETY_CHECK`]
pub const BRAND_SAFETY_PASSED: &str = "passed";
pub const BRAND_SAFETY_FAILED: &str = "failed";
pub const BRAND_SAFETY_UNKNOWN: &str = "unknown";

/// An evaluator's decision on one candidate.
///
/// Built only through [`Verdict::approved`] and [`Verdict::rejected`], so the
/// `status` attribute always agrees with [`Verdict::accepted`] and the reasons
/// are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    accepted: bool,
    reasons: String,
    attributes: Attributes,
}

impl Verdict {
    pub fn approved(reasons: impl Into<String>, attributes: Attributes) -> Self {
        Self::build(true, reasons.into(), attributes)
    }

    pub fn rejected(reasons: impl Into<String>, attributes: Attributes) -> Self {
        Self::build(false, reasons.into(), attributes)
    }

    fn build(accepted: bool, reasons: String, mut attributes: Attributes) -> Self {
        let (status, fallback) = if accepted {
            (STATUS_APPROVED, "Approved")
        } else {
            (STATUS_REJECTED, "Rejected")
        };
        attributes.insert(STATUS.to_string(), status.to_string());

        let reasons = if reasons.trim().is_empty() {
            fallback.to_string()
        } else {
            reasons
        };

        Self {
            accepted,
            reasons,
            attributes,
        }
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn reasons(&self) -> &str {
        &self.reasons
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn status(&self) -> &str {
        self.attributes
            .get(STATUS)
            .map(String::as_str)
            .unwrap_or(STATUS_REJECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_accepted() {
        let mut attrs = Attributes::new();
        attrs.insert(STATUS.into(), STATUS_APPROVED.into());

        let verdict = Verdict::rejected("nope", attrs);
        assert!(!verdict.accepted());
        assert_eq!(verdict.status(), STATUS_REJECTED);

        let verdict = Verdict::approved("Approved", Attributes::new());
        assert_eq!(verdict.status(), STATUS_APPROVED);
    }

    #[test]
    fn test_blank_reasons_fall_back() {
        assert_eq!(Verdict::rejected("  ", Attributes::new()).reasons(), "Rejected");
        assert_eq!(Verdict::approved("", Attributes::new()).reasons(), "Approved");
    }
}
