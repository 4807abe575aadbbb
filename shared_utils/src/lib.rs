//! Process-boundary helpers shared by the workspace binaries.
//!
//! Nothing in here is called from computation code: credentials and
//! subscriber setup are resolved once in `main` and handed down as values.

pub mod env;
pub mod logging;
