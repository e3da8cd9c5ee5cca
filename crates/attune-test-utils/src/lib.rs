// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for attune integration tests.
//!
//! Provider doubles (`MockProvider`, `SpyProvider`), storage doubles
//! (`MemoryStorage`, `FailingStorage`) and a `TestHarness` that wires a
//! full conversation pipeline for end-to-end tests without network access.

pub mod harness;
pub mod mock_provider;
pub mod storage;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockProvider, MockReply, SpyProvider};
pub use storage::{FailingStorage, MemoryStorage};
