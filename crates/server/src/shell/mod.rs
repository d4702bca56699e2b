//! The interactive shop shell.

pub mod command;
pub mod dispatch;
pub mod line;
pub mod render;
pub mod session;

pub use command::{Command, ParseError};
pub use dispatch::{Dispatcher, Reply};
pub use session::{SessionEnd, Terminal, TransportError, run_session};
