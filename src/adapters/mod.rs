// Adapters layer: concrete implementations for external systems (source trees, rules files, storage).

pub mod gitleaks;
pub mod go_literals;
pub mod storage;
pub mod trufflehog;
