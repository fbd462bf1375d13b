//! Account email notices.

pub mod dispatcher;
pub mod sender;

pub use dispatcher::EmailDispatcher;
pub use sender::{EmailMessage, EmailSender, LogEmailSender, MemoryEmailSender};
