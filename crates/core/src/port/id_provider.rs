// Id Provider Port (for testability)

/// Generates opaque, unique job identifiers.
pub trait IdProvider: Send + Sync {
    fn new_id(&self) -> String;
}

/// UUID v4 id provider (production)
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
pub mod mocks {
    use super::IdProvider;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Sequential ids for deterministic assertions in tests.
    pub struct SequentialIdProvider {
        counter: AtomicU64,
    }

    impl SequentialIdProvider {
        pub fn new() -> Self {
            Self {
                counter: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn new_id(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            format!("test-job-{n}")
        }
    }
}
