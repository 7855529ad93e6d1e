//! Analysis modules.
//!
//! Group-by-sum, top-N selection and name resolution over scored messages.

pub mod aggregator;

pub use aggregator::*;
