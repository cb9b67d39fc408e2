//! RAG chat: retrieval over the selected vector DBs, prompt assembly and the
//! completion call.

pub mod dispatcher;
pub mod prompt;

pub use dispatcher::answer;
pub use prompt::build_prompt;
