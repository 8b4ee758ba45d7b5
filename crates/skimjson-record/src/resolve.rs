//! Path resolution against record schemas
//!
//! A path is a `.`-separated list of field names. Each segment is looked up
//! in the current schema; record-valued fields (direct or behind `Option`,
//! `Box`, `Arc`) are descended into, everything else must be the final
//! segment. The field accessors recorded in the schema do the reads, so no
//! layout work happens here.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{RecordError, RecordResult};
use crate::field::{FieldValue, FromField};
use crate::registry::SchemaRegistry;
use crate::schema::{Record, Schema};

/// Check if every segment follows the exported field-naming rule
///
/// Paths that fail this check (lowercase or tag-style segments) are meant for
/// a general JSON accessor, not for record resolution.
pub fn is_struct_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('.')
            .all(|segment| segment.chars().next().is_some_and(char::is_uppercase))
}

impl Schema {
    /// Resolve `path` starting at `record`, which must be of this schema's type
    ///
    /// Nested schemas are taken from `registry`.
    pub fn resolve<'a>(
        self: &Arc<Self>,
        registry: &SchemaRegistry,
        record: &'a dyn Record,
        path: &str,
    ) -> RecordResult<FieldValue<'a>> {
        let mut schema = Arc::clone(self);
        let mut current = record;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                return Err(RecordError::EmptySegment(path.to_string()));
            }
            let field = schema
                .field(segment)
                .ok_or_else(|| RecordError::UnknownField {
                    field: segment.to_string(),
                    record: schema.type_name(),
                })?;
            let Some(value) = field.read(current) else {
                return Err(RecordError::WrongRecord {
                    expected: schema.type_name(),
                    found: current.type_name(),
                });
            };

            if segments.peek().is_none() {
                return match value {
                    FieldValue::Null => Err(RecordError::NullPointer(segment.to_string())),
                    value => Ok(value),
                };
            }

            let Some(nested) = field.nested(registry) else {
                return Err(RecordError::NotDescendable(segment.to_string()));
            };
            match value {
                FieldValue::Record(next) => {
                    current = next;
                    schema = nested;
                }
                FieldValue::Null => return Err(RecordError::NullPointer(segment.to_string())),
                _ => return Err(RecordError::NotDescendable(segment.to_string())),
            }
        }

        Err(RecordError::EmptySegment(path.to_string()))
    }

    /// Byte-offset chain `path` resolves to, one offset per segment
    pub fn offsets(
        self: &Arc<Self>,
        registry: &SchemaRegistry,
        path: &str,
    ) -> RecordResult<SmallVec<[usize; 8]>> {
        let mut schema = Arc::clone(self);
        let mut offsets = SmallVec::new();
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let field = schema
                .field(segment)
                .ok_or_else(|| RecordError::UnknownField {
                    field: segment.to_string(),
                    record: schema.type_name(),
                })?;
            offsets.push(field.offset());

            if segments.peek().is_some() {
                let nested = field
                    .nested(registry)
                    .ok_or_else(|| RecordError::NotDescendable(segment.to_string()))?;
                schema = nested;
            }
        }

        Ok(offsets)
    }
}

impl SchemaRegistry {
    /// Resolve `path` on `record`, reporting why resolution failed
    pub fn try_resolve<'a, R: Record>(
        &self,
        record: &'a R,
        path: &str,
    ) -> RecordResult<FieldValue<'a>> {
        let result = self.schema_for::<R>().resolve(self, record, path);
        if let Err(err) = &result {
            tracing::trace!(path, error = %err, "record path not resolved");
        }
        result
    }

    /// Resolve `path` on `record`
    pub fn resolve<'a, R: Record>(&self, record: &'a R, path: &str) -> Option<FieldValue<'a>> {
        self.try_resolve(record, path).ok()
    }

    /// Resolve `path` on `record` and convert to `T`, reporting failures
    ///
    /// Conversion is exact; a kind mismatch is [`RecordError::TypeMismatch`].
    pub fn try_resolve_as<R: Record, T: FromField>(
        &self,
        record: &R,
        path: &str,
    ) -> RecordResult<T> {
        let value = self.try_resolve(record, path)?;
        T::from_field(value).ok_or_else(|| RecordError::TypeMismatch {
            field: path.rsplit('.').next().unwrap_or(path).to_string(),
            requested: std::any::type_name::<T>(),
        })
    }

    /// Resolve `path` on `record` and convert to `T`
    ///
    /// Conversion is exact; a kind mismatch yields `None`.
    pub fn resolve_as<R: Record, T: FromField>(&self, record: &R, path: &str) -> Option<T> {
        self.try_resolve_as(record, path).ok()
    }

    /// Byte-offset chain of `path` within `R`
    pub fn resolve_offsets<R: Record>(&self, path: &str) -> Option<SmallVec<[usize; 8]>> {
        self.schema_for::<R>().offsets(self, path).ok()
    }
}

/// Resolve against the global registry, reporting failures
pub fn try_resolve<'a, R: Record>(record: &'a R, path: &str) -> RecordResult<FieldValue<'a>> {
    SchemaRegistry::global().try_resolve(record, path)
}

/// Resolve against the global registry
pub fn resolve<'a, R: Record>(record: &'a R, path: &str) -> Option<FieldValue<'a>> {
    SchemaRegistry::global().resolve(record, path)
}

/// Resolve against the global registry and convert to `T`, reporting failures
pub fn try_resolve_as<R: Record, T: FromField>(record: &R, path: &str) -> RecordResult<T> {
    SchemaRegistry::global().try_resolve_as(record, path)
}

/// Resolve against the global registry and convert to `T`
pub fn resolve_as<R: Record, T: FromField>(record: &R, path: &str) -> Option<T> {
    SchemaRegistry::global().resolve_as(record, path)
}

/// Byte-offset chain of `path` within `R`, from the global registry
pub fn resolve_offsets<R: Record>(path: &str) -> Option<SmallVec<[usize; 8]>> {
    SchemaRegistry::global().resolve_offsets::<R>(path)
}
