//! Record schemas and field descriptors
//!
//! A [`Schema`] is derived once per record type from the [`FieldSpec`] table
//! generated by [`record!`](crate::record). After publication it is never
//! mutated, so any number of threads can resolve against it concurrently.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::field::{FieldType, FieldValue, ValueKind};
use crate::registry::SchemaRegistry;

/// Type-erased field reader generated per field at compile time
pub type Accessor = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>> + Send + Sync>;

/// A statically known record type whose fields can be resolved by path
///
/// Implement through [`record!`](crate::record) rather than by hand.
pub trait Record: Any {
    /// Compile-time field table
    fn field_specs() -> Vec<FieldSpec>
    where
        Self: Sized;

    /// Upcast for accessor dispatch
    fn as_any(&self) -> &dyn Any;

    /// Rust type name, for diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({})", self.type_name())
    }
}

/// One field of a record as declared in source
pub struct FieldSpec {
    ident: &'static str,
    tag: Option<&'static str>,
    offset: usize,
    kind: ValueKind,
    pointer: bool,
    nested: fn(&SchemaRegistry) -> Option<Arc<Schema>>,
    access: Accessor,
}

impl FieldSpec {
    /// Describe field `ident` of `R`, projected by `project`
    ///
    /// `tag` is a serialization tag such as `"user_id,omitempty"`; only the
    /// part before the first `,` is used as an alias.
    pub fn new<R: Record, T: FieldType>(
        ident: &'static str,
        tag: Option<&'static str>,
        offset: usize,
        project: for<'r> fn(&'r R) -> &'r T,
    ) -> Self {
        Self {
            ident,
            tag,
            offset,
            kind: T::KIND,
            pointer: T::POINTER,
            nested: T::nested_schema,
            access: Box::new(accessor(move |record: &dyn Any| {
                record
                    .downcast_ref::<R>()
                    .map(|record| project(record).field_value())
            })),
        }
    }

    /// Source identifier of the field
    pub fn ident(&self) -> &'static str {
        self.ident
    }
}

fn accessor<F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>>,
{
    f
}

/// Pre-resolved layout information for one field
pub struct FieldDescriptor {
    name: String,
    alias: Option<String>,
    offset: usize,
    kind: ValueKind,
    pointer: bool,
    nested: fn(&SchemaRegistry) -> Option<Arc<Schema>>,
    access: Accessor,
}

impl FieldDescriptor {
    /// Exported name (`user_id` is exported as `UserId`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias carried by the serialization tag
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Byte offset of the field within its record
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Declared value kind (of the pointee, for pointer-like fields)
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the field is pointer-like and may be null
    pub fn is_pointer(&self) -> bool {
        self.pointer
    }

    /// Schema of the nested record in `registry`, for descendable fields
    ///
    /// Looked up by type identity on each call, so a record type can refer to
    /// itself or to a type that refers back to it.
    pub fn nested(&self, registry: &SchemaRegistry) -> Option<Arc<Schema>> {
        if self.is_descendable() {
            (self.nested)(registry)
        } else {
            None
        }
    }

    /// Whether resolution may continue through this field
    pub fn is_descendable(&self) -> bool {
        self.kind.is_descendable()
    }

    /// Read the field out of `record`
    ///
    /// Returns `None` if `record` is not the type this descriptor was
    /// derived for.
    pub fn read<'a>(&self, record: &'a dyn Record) -> Option<FieldValue<'a>> {
        (self.access)(record.as_any())
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("offset", &self.offset)
            .field("kind", &self.kind)
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

/// Field layout of one record type
pub struct Schema {
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub(crate) fn derive<R: Record>() -> Self {
        let fields: Vec<_> = R::field_specs()
            .into_iter()
            .map(|spec| FieldDescriptor {
                name: exported_name(spec.ident),
                alias: spec.tag.and_then(tag_alias).map(str::to_owned),
                offset: spec.offset,
                kind: spec.kind,
                pointer: spec.pointer,
                nested: spec.nested,
                access: spec.access,
            })
            .collect();

        // Declared names take precedence over aliases
        let mut index = HashMap::with_capacity(fields.len() * 2);
        for (i, field) in fields.iter().enumerate() {
            index.insert(field.name.clone(), i);
        }
        for (i, field) in fields.iter().enumerate() {
            if let Some(alias) = &field.alias {
                index.entry(alias.clone()).or_insert(i);
            }
        }

        let type_name = std::any::type_name::<R>();
        tracing::debug!(record = type_name, fields = fields.len(), "derived record schema");

        Self {
            type_name,
            type_id: TypeId::of::<R>(),
            fields,
            index,
        }
    }

    /// Look up a field by exported name, then by alias
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rust type name of the record
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type identity of the record
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Exported form of a field identifier: `user_id` becomes `UserId`
pub(crate) fn exported_name(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut out = String::with_capacity(ident.len());
    for part in ident.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn tag_alias(tag: &'static str) -> Option<&'static str> {
    let name = tag.split(',').next().unwrap_or("").trim();
    match name {
        "" | "-" => None,
        name => Some(name),
    }
}
