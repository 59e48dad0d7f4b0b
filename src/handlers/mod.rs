// Declares the hash handlers and re-exports them, so routes can write
// `use crate::handlers::submit_hash` instead of `crate::handlers::hash::submit_hash`

pub mod hash;

pub use hash::*;
