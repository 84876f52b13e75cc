pub mod context;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod waiter;

pub use context::ConnectionContext;
pub use coordinator::Coordinator;
pub use dispatcher::{DispatcherState, FrameDispatcher};
pub use error::{ApplicationError, Result};
