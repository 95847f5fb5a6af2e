pub mod join;
pub mod medline;
pub mod slug;
pub mod table;

pub use join::{apply_predicates, semi_join, sort_by_title, JoinKeys, KeyPair, Predicate, TITLE_COLUMN};
pub use medline::{parse_records, JournalRecord};
pub use slug::{rename_columns, slugify};
pub use table::{csv_to_batch, records_to_batch};
