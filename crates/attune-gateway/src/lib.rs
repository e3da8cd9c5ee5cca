// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for the attune conversation pipeline.
//!
//! `POST /v1/chat` is the one submission operation and `POST /v1/interpret`
//! explains a single reading. The remaining routes read sessions, the
//! emotion history, a subject's recorded samples and reviewer notes.
//! Everything under `/v1` requires a bearer token.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use handlers::{ChatRequest, ChatResponse, InterpretRequest};
pub use server::{GatewayState, build_router, start_server};
