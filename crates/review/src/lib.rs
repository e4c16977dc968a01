use std::sync::Arc;
use std::time::Instant;

use playforge_core::{
    classify, InspectionError, InspectionPolicy, InspectionReport, PolicyEngine, RequestContext,
};
use playforge_observability::InspectionMetrics;
use tracing::{info, instrument, warn};

/// Entry point for callers that own the request lifecycle: classify the
/// prompt, generate a script elsewhere, then review it before it is stored
/// or executed.
#[derive(Debug, Clone)]
pub struct ScriptReviewer {
    policy_engine: PolicyEngine,
    metrics: Arc<InspectionMetrics>,
}

impl ScriptReviewer {
    pub fn new(policy: InspectionPolicy, metrics: Arc<InspectionMetrics>) -> Self {
        Self {
            policy_engine: PolicyEngine::new(policy),
            metrics,
        }
    }

    pub fn policy(&self) -> &InspectionPolicy {
        self.policy_engine.policy()
    }

    pub fn metrics(&self) -> &Arc<InspectionMetrics> {
        &self.metrics
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub fn classify(&self, text: &str) -> RequestContext {
        self.metrics.inc_classification();
        let context = classify(text);

        info!(
            category = context.category.as_str(),
            environment = context.environment.as_str(),
            requirements = context.requirements.len(),
            tags = context.tags.len(),
            "request classified"
        );

        context
    }

    #[instrument(skip(self, text), fields(bytes = text.len(), strict = self.policy().strict))]
    pub fn review(&self, text: &str) -> Result<InspectionReport, InspectionError> {
        let started = Instant::now();
        self.metrics.inc_inspection();

        let report = match self.policy_engine.inspect(text) {
            Ok(report) => report,
            Err(err) => {
                self.metrics.inc_format_error();
                self.metrics.add_secrets(err.secrets.len());
                self.metrics.observe_latency(started.elapsed());
                warn!(
                    error = %err,
                    secrets = err.secrets.len(),
                    "script could not be parsed for quality checks"
                );
                return Err(err);
            }
        };

        self.metrics.add_secrets(report.secrets.len());
        self.metrics.add_quality_findings(report.quality.len());
        if report.blocked {
            self.metrics.inc_blocked();
        }
        self.metrics.observe_latency(started.elapsed());

        // Counts only: secret values must never reach the log stream.
        info!(
            secrets = report.secrets.len(),
            quality = report.quality.len(),
            blocked = report.blocked,
            "script reviewed"
        );

        Ok(report)
    }
}

impl Default for ScriptReviewer {
    fn default() -> Self {
        Self::new(InspectionPolicy::default(), InspectionMetrics::shared())
    }
}
