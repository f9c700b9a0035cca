use serde::Serialize;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) message: &'static str,
}

impl Message {
    pub(crate) fn new(message: &'static str) -> Self {
        Self { message }
    }
}
