// Partial-Result Validator
// Re-parses accumulated output and decides whether the probe must stop

use std::sync::Arc;

use crate::parser;
use crate::port::AddressClassifier;

/// Private-address policy check, side-effect free
#[derive(Clone)]
pub struct PartialResultValidator {
    classifier: Arc<dyn AddressClassifier>,
}

impl PartialResultValidator {
    pub fn new(classifier: Arc<dyn AddressClassifier>) -> Self {
        Self { classifier }
    }

    /// true iff the output so far resolves to a private address
    ///
    /// No resolved address yet means no verdict, so never abort.
    pub fn should_abort(&self, accumulated: &str) -> bool {
        parser::parse(accumulated)
            .resolved_address
            .as_deref()
            .is_some_and(|address| self.classifier.is_private(address))
    }
}
