//! Pending-set key derivation
//!
//! The descriptor is stored under the caller's id verbatim. The pending set
//! lives under `key_mapper(id)`, which defaults to `"deferred-job:" + id`.

use std::fmt;
use std::sync::Arc;

/// Default prefix for pending-set keys
pub const DEFAULT_KEY_PREFIX: &str = "deferred-job:";

/// Maps a barrier id to the key of its pending set
///
/// Cheap to clone; the mapping function is shared.
///
/// # Examples
///
/// ```
/// use deferred_core::KeyMapper;
///
/// assert_eq!(KeyMapper::default().set_key("job1"), "deferred-job:job1");
/// assert_eq!(KeyMapper::identity().set_key("job1"), "job1");
/// ```
#[derive(Clone)]
pub struct KeyMapper(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl KeyMapper {
    /// Create a mapper from an arbitrary function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyMapper(Arc::new(f))
    }

    /// Prefix every id with a fixed string
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(move |id| format!("{}{}", prefix, id))
    }

    /// Use the id itself as the pending-set key
    pub fn identity() -> Self {
        Self::new(|id| id.to_string())
    }

    /// Derive the pending-set key for `id`
    pub fn set_key(&self, id: &str) -> String {
        (self.0)(id)
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::prefixed(DEFAULT_KEY_PREFIX)
    }
}

impl fmt::Debug for KeyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyMapper")
            .field(&self.set_key("{id}"))
            .finish()
    }
}
