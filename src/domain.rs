//! Domain module - catalog data model and error taxonomy
//!
//! Companies come in, raw records flow through, canonical products get
//! persisted. Nothing in here performs I/O.

pub mod company;
pub mod error;
pub mod platform;
pub mod product;
pub mod raw_record;

pub use company::Company;
pub use error::{CrawlError, CrawlResult};
pub use platform::PlatformType;
pub use product::{CANONICAL_SCHEMA, CanonicalProduct, FieldKind, FieldMap, PRIMARY_KEY};
pub use raw_record::RawRecord;
