//! Scene rendering: the per-scene frame orchestrator and the multi-scene session.

pub(crate) mod orchestrator;
pub(crate) mod session;
pub(crate) mod spool;
