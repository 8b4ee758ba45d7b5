//! Path lookups over JSON buffers and records
//!
//! [`Getter`] is the entry point that ties the scanner, the plan and
//! popularity caches, the fallback oracle and the record registry together.
//! Every lookup runs the same pipeline:
//!
//! 1. size guard ([`Error::Oversize`])
//! 2. UTF-8 validation when enabled ([`Error::InvalidEncoding`])
//! 3. extended syntax or legacy mode: hand the path to the [`FallbackOracle`]
//! 4. popular simple top-level key: a single member scan of the root
//! 5. otherwise: record the path as seen, compile it (cached) and walk it
//!
//! A lookup that resolves to nothing is reported as [`Error::NotFound`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use skimjson_record::{FromField, Record, SchemaRegistry, is_struct_path};
use tracing::{debug, trace, warn};

use crate::cache::{PlanCache, PopularityCache};
use crate::config::{DEFAULT_PLAN_CACHE_SLOTS, GetterConfig};
use crate::fallback::{FallbackOracle, SerdeOracle, uses_extended_syntax};
use crate::materialize::materialize;
use crate::parser::{FromNode, Node, NodeKind, parse};
use crate::path::Plan;
use crate::picker::pick_node;
use crate::{Error, Result};

static DEFAULT_GETTER: Lazy<Getter> = Lazy::new(Getter::new);

/// Look up `path` in `buf` with the process-wide default getter
pub fn get<'a>(buf: &'a [u8], path: &str) -> Result<Node<'a>> {
    DEFAULT_GETTER.get(buf, path)
}

/// Look up `path` in `text` with the process-wide default getter
pub fn get_str<'a>(text: &'a str, path: &str) -> Result<Node<'a>> {
    DEFAULT_GETTER.get_str(text, path)
}

/// Path lookup engine
///
/// Cheap to clone; clones share caches, oracle and registry.
#[derive(Clone)]
pub struct Getter {
    config: Arc<GetterConfig>,
    plans: Arc<PlanCache>,
    popularity: Arc<PopularityCache>,
    oracle: Arc<dyn FallbackOracle>,
    registry: Arc<SchemaRegistry>,
}

impl Getter {
    /// Getter with default configuration and the process-wide caches
    pub fn new() -> Self {
        Self {
            config: Arc::new(GetterConfig::default()),
            plans: PlanCache::global(),
            popularity: PopularityCache::global(),
            oracle: Arc::new(SerdeOracle),
            registry: SchemaRegistry::global(),
        }
    }

    /// Start building a getter
    pub fn builder() -> GetterBuilder {
        GetterBuilder::default()
    }

    /// Active configuration
    pub fn config(&self) -> &GetterConfig {
        &self.config
    }

    /// Plan cache used by this getter
    pub fn plan_cache(&self) -> &Arc<PlanCache> {
        &self.plans
    }

    /// Popularity ring used by this getter
    pub fn popularity(&self) -> &Arc<PopularityCache> {
        &self.popularity
    }

    /// Look up `path` in `buf`
    ///
    /// The empty path returns the root value.
    pub fn get<'a>(&self, buf: &'a [u8], path: &str) -> Result<Node<'a>> {
        self.check_input(buf)?;
        self.found(self.locate(buf, parse(buf), path), path)
    }

    /// Look up `path` in `text`
    ///
    /// The text is already known to be UTF-8, so only the size guard runs.
    pub fn get_str<'a>(&self, text: &'a str, path: &str) -> Result<Node<'a>> {
        let buf = text.as_bytes();
        self.check_size(buf)?;
        self.found(self.locate(buf, parse(buf), path), path)
    }

    /// Walk a precompiled plan over `buf`
    pub fn get_plan<'a>(&self, buf: &'a [u8], plan: &Plan) -> Result<Node<'a>> {
        self.check_input(buf)?;
        let node = plan.resolve(parse(buf));
        if node.is_valid() {
            Ok(node)
        } else {
            Err(Error::not_found(plan.to_string()))
        }
    }

    /// Look up each of `paths` in `buf`
    ///
    /// The input is checked once. Paths that resolve to nothing yield invalid
    /// nodes in their position rather than failing the batch.
    pub fn get_many<'a, S: AsRef<str>>(&self, buf: &'a [u8], paths: &[S]) -> Result<Vec<Node<'a>>> {
        self.check_input(buf)?;
        let root = parse(buf);
        Ok(paths
            .iter()
            .map(|path| self.locate(buf, root, path.as_ref()))
            .collect())
    }

    /// Look up `path` and convert the value to `T`
    ///
    /// A value of the wrong kind is reported as not found.
    pub fn get_as<'a, T: FromNode<'a>>(&self, buf: &'a [u8], path: &str) -> Result<T> {
        let node = self.get(buf, path)?;
        T::from_node(node).ok_or_else(|| Error::not_found(path))
    }

    /// Look up `path` and materialize the value into an owned tree
    pub fn get_value(&self, buf: &[u8], path: &str) -> Result<Value> {
        let node = self.get(buf, path)?;
        materialize(node).ok_or_else(|| Error::malformed(node.span().start))
    }

    /// Look up `path` below the payload of an envelope
    ///
    /// The payload is the first configured drill key present at the root
    /// (as given, then capitalized), or the root itself.
    pub fn get_data<'a>(&self, buf: &'a [u8], path: &str) -> Result<Node<'a>> {
        self.check_input(buf)?;
        let payload = pick_node(parse(buf), &self.config.drill_keys);
        self.found(self.locate(buf, payload, path), path)
    }

    /// Kind name of the value at `path`
    ///
    /// One of `int`, `float`, `string`, `bool`, `array`, `object` or `null`.
    pub fn type_of(&self, buf: &[u8], path: &str) -> Result<&'static str> {
        let node = self.get(buf, path)?;
        Ok(match node.kind() {
            NodeKind::Number if node.is_integer() => "int",
            NodeKind::Number => "float",
            kind => kind.as_str(),
        })
    }

    /// Visit the members of the object at `path` until `f` returns `false`
    ///
    /// Returns the number of members visited. A value that is not an object
    /// has no members.
    pub fn each_object<'a, F>(&self, buf: &'a [u8], path: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(&'a [u8], Node<'a>) -> bool,
    {
        let node = self.get(buf, path)?;
        let mut members = node.members();
        let mut visited = 0;
        for (key, value) in members.by_ref() {
            visited += 1;
            if !f(key, value) {
                return Ok(visited);
            }
        }
        if members.is_malformed() {
            return Err(Error::malformed(node.span().start));
        }
        Ok(visited)
    }

    /// Visit the elements of the array at `path` until `f` returns `false`
    ///
    /// Returns the number of elements visited.
    pub fn each_array<'a, F>(&self, buf: &'a [u8], path: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(usize, Node<'a>) -> bool,
    {
        let node = self.get(buf, path)?;
        let mut elements = node.elements();
        let mut visited = 0;
        for value in elements.by_ref() {
            visited += 1;
            if !f(visited - 1, value) {
                return Ok(visited);
            }
        }
        if elements.is_malformed() {
            return Err(Error::malformed(node.span().start));
        }
        Ok(visited)
    }

    /// Read `path` from a record
    ///
    /// Paths of capitalized field names go through the layout-resolved
    /// accessor first. Any other path, or an accessor miss, serializes the
    /// record to JSON and runs the buffer lookup.
    pub fn get_record<R, T>(&self, record: &R, path: &str) -> Result<T>
    where
        R: Record + Serialize,
        T: FromField + DeserializeOwned,
    {
        if is_struct_path(path) {
            if let Some(value) = self.registry.resolve_as::<R, T>(record, path) {
                return Ok(value);
            }
            trace!(path, record = std::any::type_name::<R>(), "record accessor missed");
        }

        let encoded = serde_json::to_vec(record)?;
        let node = self.get(&encoded, path)?;
        Ok(serde_json::from_slice(node.raw())?)
    }

    fn check_size(&self, buf: &[u8]) -> Result<()> {
        let max = self.config.max_input_size;
        if buf.len() > max {
            warn!(size = buf.len(), max, "input rejected by size guard");
            return Err(Error::Oversize {
                size: buf.len(),
                max,
            });
        }
        Ok(())
    }

    fn check_input(&self, buf: &[u8]) -> Result<()> {
        self.check_size(buf)?;
        if self.config.validate_utf8 {
            std::str::from_utf8(buf)?;
        }
        Ok(())
    }

    fn found<'a>(&self, node: Node<'a>, path: &str) -> Result<Node<'a>> {
        if node.is_valid() {
            Ok(node)
        } else {
            Err(Error::not_found(path))
        }
    }

    /// Resolve `path` below `root`, a value of `buf`
    fn locate<'a>(&self, buf: &'a [u8], root: Node<'a>, path: &str) -> Node<'a> {
        if self.config.legacy_fallback || uses_extended_syntax(path) {
            debug!(path, legacy = self.config.legacy_fallback, "path routed to fallback oracle");
            return self.fallback(buf, root, path);
        }

        let hot = self.popularity.probe(path);
        if hot && self.config.top_key_shortcut && is_simple_top_key(path) {
            return root.object_get(path);
        }
        if !hot {
            self.popularity.record(path);
        }
        self.plans.compile(path).resolve(root)
    }

    /// Run the oracle on the span of `root` and rebase its answer onto `buf`
    fn fallback<'a>(&self, buf: &'a [u8], root: Node<'a>, path: &str) -> Node<'a> {
        if !root.is_valid() {
            return Node::invalid();
        }
        let found = self.oracle.lookup(root.raw(), path);
        if !found.is_valid() {
            return Node::invalid();
        }
        Node::at(buf, root.span().start + found.span().start)
    }
}

impl Default for Getter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Getter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Getter")
            .field("config", &self.config)
            .field("plans", &self.plans)
            .field("popularity", &self.popularity)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Getter`] with its own configuration or collaborators
///
/// Unset caches default to the process-wide ones, except that a configured
/// `plan_cache_slots` other than the default gets a private plan cache of
/// that size.
#[derive(Default)]
pub struct GetterBuilder {
    config: GetterConfig,
    plans: Option<Arc<PlanCache>>,
    popularity: Option<Arc<PopularityCache>>,
    oracle: Option<Arc<dyn FallbackOracle>>,
    registry: Option<Arc<SchemaRegistry>>,
}

impl GetterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: GetterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the input size limit
    pub fn max_input_size(mut self, max: usize) -> Self {
        self.config.max_input_size = max;
        self
    }

    /// Enable or disable UTF-8 validation
    pub fn validate_utf8(mut self, enabled: bool) -> Self {
        self.config.validate_utf8 = enabled;
        self
    }

    /// Use a specific plan cache
    pub fn plan_cache(mut self, plans: Arc<PlanCache>) -> Self {
        self.plans = Some(plans);
        self
    }

    /// Use a specific popularity ring
    pub fn popularity_cache(mut self, popularity: Arc<PopularityCache>) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// Use a specific fallback oracle
    pub fn oracle(mut self, oracle: Arc<dyn FallbackOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Use a specific schema registry for record lookups
    pub fn registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate the configuration and build the getter
    pub fn build(self) -> Result<Getter> {
        self.config.validate()?;
        let slots = self.config.plan_cache_slots;
        let plans = self.plans.unwrap_or_else(|| {
            if slots == DEFAULT_PLAN_CACHE_SLOTS {
                PlanCache::global()
            } else {
                Arc::new(PlanCache::with_capacity(slots))
            }
        });

        Ok(Getter {
            config: Arc::new(self.config),
            plans,
            popularity: self.popularity.unwrap_or_else(PopularityCache::global),
            oracle: self.oracle.unwrap_or_else(|| Arc::new(SerdeOracle)),
            registry: self.registry.unwrap_or_else(SchemaRegistry::global),
        })
    }
}

/// Check if `path` names a single top-level member the shortcut may answer
///
/// All-digit paths are excluded: they compile to an index, which the
/// shortcut's plain member scan would not honour on arrays.
fn is_simple_top_key(path: &str) -> bool {
    !path.is_empty()
        && path
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        && !path.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated() -> Getter {
        Getter::builder()
            .plan_cache(Arc::new(PlanCache::new()))
            .popularity_cache(Arc::new(PopularityCache::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_simple_top_key() {
        assert!(is_simple_top_key("user_id"));
        assert!(is_simple_top_key("x-trace"));
        assert!(!is_simple_top_key(""));
        assert!(!is_simple_top_key("a.b"));
        assert!(!is_simple_top_key("0"));
        assert!(!is_simple_top_key("123"));
    }

    #[test]
    fn test_get_nested_and_index() {
        let getter = isolated();
        let buf = br#"{"users":[{"name":"ann"},{"name":"bob"}]}"#;
        assert_eq!(getter.get(buf, "users.1.name").unwrap().as_str(), Some("bob"));
        assert!(matches!(
            getter.get(buf, "users.2.name"),
            Err(Error::NotFound { path }) if path == "users.2.name"
        ));
    }

    #[test]
    fn test_shortcut_matches_plan_walk() {
        let getter = isolated();
        let buf = br#"{"id":7,"name":"x"}"#;
        let cold = getter.get(buf, "id").unwrap();
        assert!(getter.popularity().probe("id"));
        let hot = getter.get(buf, "id").unwrap();
        assert_eq!(cold.span(), hot.span());
    }

    #[test]
    fn test_fallback_span_rebased() {
        let getter = isolated();
        let buf = br#"  {"data":{"a.b":[1,2]}}"#;
        let direct = getter.get(buf, "data.a\\.b[1]").unwrap();
        assert_eq!(direct.as_i64(), Some(2));
        assert_eq!(&buf[direct.span()], b"2");

        let picked = getter.get_data(buf, "a\\.b[0]").unwrap();
        assert_eq!(picked.as_i64(), Some(1));
        assert_eq!(&buf[picked.span()], b"1");
    }

    #[test]
    fn test_type_of() {
        let getter = isolated();
        let buf = br#"{"i":1,"f":1.5,"s":"x","b":false,"a":[],"o":{},"n":null}"#;
        let kinds: Vec<_> = ["i", "f", "s", "b", "a", "o", "n"]
            .iter()
            .map(|p| getter.type_of(buf, p).unwrap())
            .collect();
        assert_eq!(
            kinds,
            ["int", "float", "string", "bool", "array", "object", "null"]
        );
    }

    #[test]
    fn test_builder_private_plan_cache() {
        let getter = Getter::builder()
            .with_config(GetterConfig {
                plan_cache_slots: 64,
                ..GetterConfig::default()
            })
            .build()
            .unwrap();
        assert_eq!(getter.plan_cache().capacity(), 64);
        assert!(!Arc::ptr_eq(getter.plan_cache(), &PlanCache::global()));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = Getter::builder().max_input_size(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
