pub mod context;
pub mod store;

pub use context::{ChatTurn, DebugEvent, Flash, FlashLevel, Role, SessionContext, SessionView};
pub use store::{SessionHandle, SessionStore, SessionSummary};
