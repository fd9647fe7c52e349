//! Command implementations.

mod document;
mod publish;
mod validate;

pub use document::run_fetch;
pub use publish::run_publish;
pub use validate::run_validate;
