//! Subcommand implementations.

mod decode;
mod encode;

pub use decode::cmd_decode;
pub use encode::cmd_encode;
