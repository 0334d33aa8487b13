use async_trait::async_trait;
use std::io;

mod pipe;

pub use pipe::*;

/// Trait for line-oriented text interfaces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Io {
    /// Receive a line.
    async fn recv(&mut self) -> io::Result<String>;

    /// Send a line.
    async fn send(&mut self, msg: &str) -> io::Result<()>;

    /// Show a prompt on the current line.
    async fn prompt(&mut self, msg: &str) -> io::Result<()>;
}
