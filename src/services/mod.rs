pub mod hash_service;

// Re-export commonly used services
pub use hash_service::*;
