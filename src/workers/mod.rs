//! Built-in workers.

mod echo;

pub use echo::EchoWorker;
