//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use valet_scheduling::Scheduling;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<C>
where
    C: Scheduling,
{
    /// The scheduling service behind every endpoint.
    pub scheduling: Arc<C>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<C> GatewayState<C>
where
    C: Scheduling,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(scheduling: Arc<C>, config: GatewayConfig) -> Self {
        Self { scheduling, config }
    }
}

impl<C> Clone for GatewayState<C>
where
    C: Scheduling,
{
    fn clone(&self) -> Self {
        Self {
            scheduling: Arc::clone(&self.scheduling),
            config: self.config.clone(),
        }
    }
}
