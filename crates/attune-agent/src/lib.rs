// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The emotion-aware conversation pipeline.
//!
//! A submission reads the current emotion, asks the [`PromptComposer`] for a
//! payload, hands it to the [`CompletionGateway`] and appends the reply (or
//! an apology) to the [`ConversationSession`]. [`ChatPipeline`] ties the
//! three together for one session.

pub mod composer;
pub mod gateway;
pub mod interpret;
pub mod pipeline;
pub mod session;
pub mod shutdown;

pub use composer::{DEFAULT_PERSONA, DIRECTIVES, PromptComposer, intensity_percent};
pub use gateway::{CompletionGateway, CompletionSettings, CompletionState};
pub use interpret::{EmotionInterpreter, Interpretation, parse_interpretation};
pub use pipeline::{APOLOGY, ChatPipeline, SubmitOutcome};
pub use session::ConversationSession;
