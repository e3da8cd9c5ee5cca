// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the attune companion.
//!
//! This crate provides the trait definitions, error types, and domain types
//! used throughout the workspace. Every provider, store and emotion source
//! implements a trait defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AttuneError, ErrorKind, PersistenceWarning};
pub use types::{
    AdapterType, Annotation, ChatMessage, CompletionRequest, CompletionResponse,
    ConversationTurn, EmotionLabel, EmotionSample, EmotionVocabulary, HealthStatus,
    PromptPayload, Role, SessionId, TokenUsage, check_intensity,
};

pub use traits::{EmotionSource, PluginAdapter, ProviderAdapter, StorageAdapter};
