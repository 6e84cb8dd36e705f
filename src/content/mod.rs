// Site content module.
// Content keys, editable records and collections, typed accessors, and the admin session.

pub mod accessors;
pub mod collection;
pub mod keys;
pub mod records;
pub mod session;

pub use collection::Collection;
pub use keys::ContentKey;
pub use records::{NewsItem, Promotion, Record, generate_id, parse_tags};
pub use session::AdminSession;
