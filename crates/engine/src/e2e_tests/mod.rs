//! End-to-end episode tests.
//!
//! Each test builds a level into a [`Session`](crate::session::Session) and
//! drives it only through agent commands and observations, the way an
//! orchestrator would.

mod e2e_helpers;
mod perception_flow_tests;

pub use e2e_helpers::*;
