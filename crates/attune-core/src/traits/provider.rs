// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-generation services.

use async_trait::async_trait;

use crate::error::AttuneError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for a remote text-generation service.
///
/// Implementations make exactly one network attempt per [`complete`] call.
///
/// [`complete`]: ProviderAdapter::complete
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Checks that credentials and endpoint settings are present.
    ///
    /// Called before any request is built; a failure here means no network
    /// traffic happens at all.
    fn ensure_configured(&self) -> Result<(), AttuneError> {
        Ok(())
    }

    /// Sends a completion request and returns the parsed response.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, AttuneError>;
}
