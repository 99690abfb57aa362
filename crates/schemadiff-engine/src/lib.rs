//! schemadiff engine
//!
//! The two operations over schema snapshots:
//! - Structural comparison of a source and target snapshot
//! - Order-independent fingerprinting of a single snapshot
//!
//! Both are synchronous and never modify their inputs.

pub mod comparer;
pub mod fingerprint;

pub use comparer::{compare, Comparer};
pub use fingerprint::{fingerprint, FingerprintOptions};
