//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - An in-memory waitlist repository mirroring the store's constraints
//! - Identity mocks and a signer for Cognito-shaped test tokens
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod identity_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use identity_mocks::*;
pub use waitlist_mocks::*;
