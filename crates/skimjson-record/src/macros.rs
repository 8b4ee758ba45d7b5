//! Record declaration macro
//!
//! ```ignore
//! record! {
//!     Inner { value }
//!     Outer { inner, user_id => "user_id,omitempty", maybe }
//! }
//! ```
//!
//! Expands, per record, to a [`Record`](crate::Record) impl whose field table
//! carries one accessor, byte offset and optional tag per listed field, plus a
//! [`FieldType`](crate::FieldType) impl so the record can itself be used as a
//! field of another record.

/// Declare one or more record types for path resolution
///
/// Each listed field must implement [`FieldType`](crate::FieldType). An
/// optional `=> "tag"` gives the serialization tag; the part before the first
/// `,` becomes a lookup alias, `"-"` means none.
///
/// Fields left out of the list are invisible to resolution.
#[macro_export]
macro_rules! record {
    (
        $(
            $name:ident {
                $( $field:ident $( => $tag:literal )? ),* $(,)?
            }
        )+
    ) => {
        $(
            impl $crate::Record for $name {
                fn field_specs() -> ::std::vec::Vec<$crate::FieldSpec> {
                    ::std::vec![
                        $(
                            $crate::FieldSpec::new::<$name, _>(
                                ::core::stringify!($field),
                                $crate::__record_tag!($($tag)?),
                                $crate::__private::offset_of!($name, $field),
                                |record: &$name| &record.$field,
                            ),
                        )*
                    ]
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }
            }

            impl $crate::FieldType for $name {
                const KIND: $crate::ValueKind = $crate::ValueKind::Record;

                fn nested_schema(
                    registry: &$crate::SchemaRegistry,
                ) -> ::core::option::Option<::std::sync::Arc<$crate::Schema>> {
                    ::core::option::Option::Some(registry.schema_for::<Self>())
                }

                fn field_value(&self) -> $crate::FieldValue<'_> {
                    $crate::FieldValue::Record(self)
                }
            }
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ::core::option::Option::None
    };
    ($tag:literal) => {
        ::core::option::Option::Some($tag)
    };
}
