pub mod dispatcher;
pub mod handlers;
pub mod session;

pub use dispatcher::ToolDispatcher;
pub use handlers::{DelegatedHandler, HandlerTable};
pub use session::{OnboardingGate, SessionState, TurnState};
