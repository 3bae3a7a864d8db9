//! # DocDB Key Codec
//!
//! Order-preserving binary encoding for the keys of a document store built
//! on an ordered key-value store.
//!
//! ## Core idea
//! The store only compares raw bytes. Every structured key (table id,
//! partition hash, hashed and range components, subkeys, version) is
//! encoded so that comparing the bytes gives the same answer as comparing
//! the structures. Point reads, range scans and "newest version first"
//! all fall out of that one property.
//!
//! ```text
//! DocKey    ::= [~ uuid]? [} hash hashed* !]? range* !
//! SubDocKey ::= DocKey subkey* [# hybrid_time]?
//! ```

pub mod bloom;
pub mod bounds;
pub mod doc_key;
pub mod doc_path;
pub mod error;
pub mod hybrid_time;
pub mod iterator;
pub mod key_bytes;
pub mod memtable;
pub mod options;
pub mod schema;
pub mod sub_doc_key;
pub mod types;
pub mod util;
pub mod value;

// Public re-exports for the top-level API
pub use bounds::{KeyBounds, NO_BOUNDS};
pub use doc_key::DocKey;
pub use doc_path::DocPath;
pub use error::{Error, Result};
pub use hybrid_time::{DocHybridTime, HybridTime};
pub use key_bytes::KeyBytes;
pub use options::Options;
pub use schema::Schema;
pub use sub_doc_key::SubDocKey;
pub use types::{AllowSpecial, DocKeyHash, DocKeyPart, HybridTimeRequired};
pub use value::{PrimitiveValue, ValueType};
