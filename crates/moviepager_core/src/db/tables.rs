//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Movie rows keyed by their position in the current snapshot (`Movie`, bincode-encoded).
pub const MOVIES: TableDefinition<u32, &[u8]> = TableDefinition::new("movies");
/// The list-info singleton, keyed by `LIST_INFO_KEY` (`ListInfo`, bincode-encoded).
pub const LIST_INFO: TableDefinition<u32, &[u8]> = TableDefinition::new("list_info");
