//! Validation rules grouped by context

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::TokenValidationRule;

/// Validation rules grouped by context name (e.g. `"dsp-request"`)
///
/// Rules of a context are returned in registration order.
#[derive(Default)]
pub struct TokenValidationRulesRegistry {
    rules: DashMap<String, Vec<Arc<dyn TokenValidationRule>>>,
}

impl std::fmt::Debug for TokenValidationRulesRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contexts: Vec<(String, usize)> = self
            .rules
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect();
        f.debug_struct("TokenValidationRulesRegistry")
            .field("contexts", &contexts)
            .finish()
    }
}

impl TokenValidationRulesRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `rule` to `context`
    pub fn add_rule<R>(&self, context: &str, rule: R)
    where
        R: TokenValidationRule + 'static,
    {
        self.add_shared_rule(context, Arc::new(rule));
    }

    /// Append an already shared rule to `context`
    pub fn add_shared_rule(&self, context: &str, rule: Arc<dyn TokenValidationRule>) {
        debug!(context, "Registering token validation rule");
        self.rules.entry(context.to_string()).or_default().push(rule);
    }

    /// Rules of `context`; empty if none were registered
    pub fn rules(&self, context: &str) -> Vec<Arc<dyn TokenValidationRule>> {
        self.rules
            .get(context)
            .map(|rules| rules.value().clone())
            .unwrap_or_default()
    }
}
