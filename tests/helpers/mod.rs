//! Test helper modules for checkpoint and resume testing

pub mod checkpoint_helpers;
pub mod workflow_helpers;
pub mod test_fixture;

pub use checkpoint_helpers::*;
pub use workflow_helpers::*;
pub use test_fixture::*;
