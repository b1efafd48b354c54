//! Signal generation on top of the filtered price estimate.

pub mod decision;

pub use decision::{decide, Decision};
