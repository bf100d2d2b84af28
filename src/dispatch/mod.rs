//! Event dispatch pipeline: identity resolution and state-keyed routing.

mod event;
mod middleware;
mod router;

pub use event::{session_key_of, HasConversation, HasUser, RequestBag, SESSION_CONTEXT_KEY};
pub use middleware::SessionMiddleware;
pub use router::{DispatchOutcome, FlowHandler, FlowRouter, FlowRouterBuilder, HandlerError};
