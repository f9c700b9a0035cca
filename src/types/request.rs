use serde::Deserialize;

use crate::types::TerminalId;

#[derive(Deserialize)]
pub(crate) struct Credentials {
    pub(crate) name: String,
    pub(crate) password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FavoriteIntent {
    #[serde(alias = "true")]
    Add,
    #[serde(alias = "false")]
    Remove,
    #[serde(alias = "nil")]
    None,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub(crate) struct FavoritesRequest {
    #[serde(default)]
    pub(crate) terminal_id: TerminalId,
    #[serde(alias = "is_favorite")]
    pub(crate) favorite_intent: FavoriteIntent,
}
