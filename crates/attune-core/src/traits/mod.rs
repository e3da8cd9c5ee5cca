// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Providers and stores extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. Emotion sources are
//! owned by a single sampler task and need no identity beyond a name.

pub mod adapter;
pub mod provider;
pub mod source;
pub mod storage;

pub use adapter::PluginAdapter;
pub use provider::ProviderAdapter;
pub use source::EmotionSource;
pub use storage::StorageAdapter;
