// Exit code registry (single source of truth)

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_IO: u8 = 3;
/// Every file in the batch failed to ingest.
pub const EXIT_PARSE: u8 = 4;
/// Merge or plan rejected (empty selection, bad sheet, duplicate target).
pub const EXIT_MERGE: u8 = 5;
