//! State-keyed event dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::flow::FlowState;
use crate::session::SessionContext;

/// Error raised inside a dispatched handler. The router logs it and
/// propagates it unchanged.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A step handler, invoked when an event arrives for a session in the
/// handler's registered state.
#[async_trait]
pub trait FlowHandler<E: Sync>: Send + Sync {
    async fn handle(&self, event: &E, ctx: &mut SessionContext) -> Result<(), HandlerError>;
}

/// What dispatch did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Handled,
    /// No handler was registered for the session's state.
    Unhandled,
}

/// Routes inbound events to the handlers registered for the session's
/// current state.
///
/// The routing table is assembled once, at wiring time, through
/// [`FlowRouterBuilder`]; the full set of reachable states and handlers is
/// inspectable via [`routes`](Self::routes). There is no runtime
/// registration.
pub struct FlowRouter<E: Sync> {
    routes: HashMap<FlowState, Vec<Arc<dyn FlowHandler<E>>>>,
    fallback: Option<Arc<dyn FlowHandler<E>>>,
}

impl<E: Sync> FlowRouter<E> {
    pub fn builder() -> FlowRouterBuilder<E> {
        FlowRouterBuilder::new()
    }

    /// Registered states with their handler counts.
    pub fn routes(&self) -> impl Iterator<Item = (FlowState, usize)> + '_ {
        self.routes
            .iter()
            .map(|(state, handlers)| (*state, handlers.len()))
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Dispatch an event against the session's current state.
    ///
    /// An idle session (no stored state) goes to the fallback handler when
    /// one is registered. A non-idle state goes to the first handler
    /// registered for exactly that state, then to the fallback. Handler
    /// errors are logged and propagated, never swallowed: a broken flow
    /// should surface, not silently stall its user.
    pub async fn dispatch(
        &self,
        event: &E,
        ctx: &mut SessionContext,
    ) -> Result<DispatchOutcome, HandlerError> {
        let state = ctx.get_state().await;

        let handler = match state {
            None => self.fallback.as_ref(),
            Some(state) => self
                .routes
                .get(&state)
                .and_then(|handlers| handlers.first())
                .or(self.fallback.as_ref()),
        };

        let Some(handler) = handler else {
            debug!(
                session = %ctx.key(),
                state = %state.map(|s| s.to_string()).unwrap_or_else(|| "Idle".into()),
                "no handler registered, event unhandled"
            );
            return Ok(DispatchOutcome::Unhandled);
        };

        if let Err(e) = handler.handle(event, ctx).await {
            error!(
                session = %ctx.key(),
                state = %state.map(|s| s.to_string()).unwrap_or_else(|| "Idle".into()),
                error = %e,
                "handler failed"
            );
            return Err(e);
        }
        Ok(DispatchOutcome::Handled)
    }
}

/// Build-time assembly of the routing table.
pub struct FlowRouterBuilder<E: Sync> {
    routes: HashMap<FlowState, Vec<Arc<dyn FlowHandler<E>>>>,
    fallback: Option<Arc<dyn FlowHandler<E>>>,
}

impl<E: Sync> FlowRouterBuilder<E> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: None,
        }
    }

    /// Register a handler for `state`. Handlers for the same state keep
    /// registration order; only the first runs per dispatch.
    pub fn on(mut self, state: FlowState, handler: Arc<dyn FlowHandler<E>>) -> Self {
        self.routes.entry(state).or_default().push(handler);
        self
    }

    /// Register the handler for idle sessions and states with no exact
    /// match.
    pub fn fallback(mut self, handler: Arc<dyn FlowHandler<E>>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn build(self) -> FlowRouter<E> {
        FlowRouter {
            routes: self.routes,
            fallback: self.fallback,
        }
    }
}

impl<E: Sync> Default for FlowRouterBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
