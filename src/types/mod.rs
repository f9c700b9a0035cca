pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod terminal;
pub(crate) mod user;

pub(crate) use terminal::{AnnotatedTerminal, Terminal, TerminalId};
pub(crate) use user::{AuthenticatedUser, Claims, Identity, UserId};
