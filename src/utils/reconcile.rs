use std::collections::HashSet;

use crate::types::{AnnotatedTerminal, Terminal, TerminalId};

/// Tags every catalog entry with favorite membership and moves favorites to
/// the front. Catalog order is kept within both groups, and ids missing from
/// the catalog are ignored.
pub(crate) fn reconcile(
    catalog: Vec<Terminal>,
    favorite_ids: &[TerminalId],
) -> Vec<AnnotatedTerminal> {
    let favorites: HashSet<TerminalId> = favorite_ids.iter().copied().collect();

    let (mut favorited, rest): (Vec<_>, Vec<_>) = catalog
        .into_iter()
        .map(|terminal| {
            let is_favorite = favorites.contains(&terminal.id);
            AnnotatedTerminal::new(terminal, is_favorite)
        })
        .partition(|terminal| terminal.is_favorite);

    favorited.extend(rest);
    favorited
}
