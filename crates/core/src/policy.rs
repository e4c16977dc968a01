use crate::error::InspectionError;
use crate::models::{InspectionPolicy, InspectionReport};
use crate::quality::check_quality_with;
use crate::secrets::find_secrets;

#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    policy: InspectionPolicy,
}

impl PolicyEngine {
    pub fn new(policy: InspectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &InspectionPolicy {
        &self.policy
    }

    /// Runs secret detection and quality checks and turns the findings into
    /// a verdict. Unparseable text fails the call, but the error still
    /// carries every secret found in it.
    pub fn inspect(&self, text: &str) -> Result<InspectionReport, InspectionError> {
        let secrets = find_secrets(text);

        let mut quality = match check_quality_with(text, self.policy.strict) {
            Ok(quality) => quality,
            Err(format) => return Err(InspectionError { format, secrets }),
        };
        quality.retain(|finding| !self.policy.disabled_rules.contains(&finding.rule));
        let mut notes = Vec::new();

        if self.policy.block_on_secrets && !secrets.is_empty() {
            notes.push(format!(
                "{} hardcoded secret(s) found; move them behind templated references.",
                secrets.len()
            ));
        }

        if self.policy.block_on_quality && !quality.is_empty() {
            notes.push(format!(
                "{} quality finding(s) must be resolved before this script is accepted.",
                quality.len()
            ));
        }

        Ok(InspectionReport {
            blocked: !notes.is_empty(),
            secrets,
            quality,
            notes,
        })
    }
}

/// Inspects `text` under the default policy.
pub fn inspect(text: &str) -> Result<InspectionReport, InspectionError> {
    PolicyEngine::default().inspect(text)
}
