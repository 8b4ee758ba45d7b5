//! Layout-resolved field access for statically known record types
//!
//! A record type opts in through the [`record!`] macro, which generates one
//! accessor per field at compile time. The first lookup against a type derives
//! its [`Schema`] (field names, tag aliases, byte offsets, value kinds and
//! nested schemas) and publishes it in a [`SchemaRegistry`]. Every later
//! lookup replays the cached layout with no further derivation work.
//!
//! ```
//! use skimjson_record::{record, resolve, resolve_as, FieldValue};
//!
//! #[derive(Default)]
//! struct Inner {
//!     value: i64,
//! }
//!
//! #[derive(Default)]
//! struct Outer {
//!     inner: Inner,
//!     name: String,
//! }
//!
//! record!(Inner { value });
//! record!(Outer { inner, name => "name,omitempty" });
//!
//! let outer = Outer { inner: Inner { value: 42 }, name: "x".into() };
//! assert_eq!(resolve_as::<_, i64>(&outer, "Inner.Value"), Some(42));
//! assert_eq!(resolve(&outer, "name"), Some(FieldValue::Str("x")));
//! assert!(resolve(&outer, "Name.Nope").is_none());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod field;
mod macros;
pub mod registry;
pub mod resolve;
pub mod schema;

pub use error::{RecordError, RecordResult};
pub use field::{FieldType, FromField, ValueKind};
pub use field::FieldValue;
pub use registry::SchemaRegistry;
pub use resolve::{
    is_struct_path, resolve, resolve_as, resolve_offsets, try_resolve, try_resolve_as,
};
pub use schema::{FieldDescriptor, FieldSpec, Record, Schema};

#[doc(hidden)]
pub mod __private {
    pub use core::mem::offset_of;
}
