//! Process-level helpers shared by the library and the node binary.

pub mod bootstrap;
pub mod retry;
