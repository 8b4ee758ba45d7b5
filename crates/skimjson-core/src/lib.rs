//! # skimjson
//!
//! Zero-copy extraction of individual values from JSON buffers by dotted path.
//! Lookups never build a document tree: the scanner finds the byte span and
//! kind of the requested value and hands back a borrowed [`Node`]. Compiled
//! paths and recently seen paths are kept in small lock-free caches, and
//! statically known record types get a layout-resolved accessor through
//! [`record!`].
//!
//! ```
//! use skimjson::Getter;
//!
//! let getter = Getter::new();
//! let buf = br#"{"user":{"name":"ann","roles":["admin","dev"]},"count":3}"#;
//!
//! assert_eq!(getter.get(buf, "user.name").unwrap().as_str(), Some("ann"));
//! assert_eq!(getter.get_as::<i64>(buf, "count").unwrap(), 3);
//! assert_eq!(getter.get_as::<&str>(buf, "user.roles.1").unwrap(), "dev");
//! assert!(getter.get(buf, "user.email").unwrap_err().is_absent());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod getter;
pub mod materialize;
pub mod parser;
pub mod path;
pub mod picker;

// Core exports
pub use cache::{CacheStats, PlanCache, PopularityCache};
pub use config::{GetterConfig, MAX_INPUT_SIZE};
pub use error::{Error, Result};
pub use fallback::{FallbackOracle, SerdeOracle};
pub use getter::{Getter, GetterBuilder, get, get_str};
pub use materialize::{MAX_DEPTH, materialize};
pub use parser::{FromNode, Node, NodeKind, parse};
pub use path::{Plan, Segment, compile, compile_many};
pub use picker::{pick_node, pick_record, pick_value};

// Record accessor exports
pub use skimjson_record as record;
pub use skimjson_record::{FieldValue, FromField, Record, SchemaRegistry, record};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        Error, FieldValue, FromNode, Getter, GetterConfig, Node, NodeKind, Plan, Record, Result,
        Segment, parse, record,
    };
}
