use serde::Serialize;

pub(crate) type TerminalId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Terminal {
    pub(crate) id: TerminalId,
    pub(crate) name: String,
    pub(crate) status: String,
}

#[cfg(test)]
impl Terminal {
    pub(crate) fn new(id: TerminalId, name: &str, status: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            status: status.to_owned(),
        }
    }
}

/// Catalog entry tagged with the caller's favorite membership. Computed per
/// request and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct AnnotatedTerminal {
    pub(crate) id: TerminalId,
    pub(crate) name: String,
    pub(crate) status: String,
    pub(crate) is_favorite: bool,
}

impl AnnotatedTerminal {
    pub(crate) fn new(terminal: Terminal, is_favorite: bool) -> Self {
        Self {
            id: terminal.id,
            name: terminal.name,
            status: terminal.status,
            is_favorite,
        }
    }
}
