// Address Classifier Port
// Decides whether a resolved address is off-limits for probing

/// Address classification policy
///
/// Implementations must return `false` for anything that is not a
/// parsable IP address.
#[cfg_attr(test, mockall::automock)]
pub trait AddressClassifier: Send + Sync {
    /// true if `address` belongs to a private/internal range
    fn is_private(&self, address: &str) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;

    /// Classifier with a fixed set of private addresses
    #[derive(Debug, Default, Clone)]
    pub struct StaticAddressClassifier {
        private: HashSet<String>,
    }

    impl StaticAddressClassifier {
        pub fn new<I, S>(private: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                private: private.into_iter().map(Into::into).collect(),
            }
        }

        /// Nothing is private
        pub fn permissive() -> Self {
            Self::default()
        }
    }

    impl AddressClassifier for StaticAddressClassifier {
        fn is_private(&self, address: &str) -> bool {
            self.private.contains(address)
        }
    }
}
