//! Persisted key-value collaborator backing the selection.

/// String-list storage keyed by name.
///
/// An absent key is a defined state ("nothing persisted yet") and is reported
/// as `Ok(None)`, distinct from a stored empty list.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use std::convert::Infallible;
/// use ecotour_core::KeyValueStore;
///
/// #[derive(Default)]
/// struct MapStore(HashMap<String, Vec<String>>);
///
/// impl KeyValueStore for MapStore {
///     type Error = Infallible;
///
///     fn put_string_list(&mut self, key: &str, values: &[String]) -> Result<(), Infallible> {
///         self.0.insert(key.to_owned(), values.to_vec());
///         Ok(())
///     }
///
///     fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, Infallible> {
///         Ok(self.0.get(key).cloned())
///     }
/// }
///
/// let mut store = MapStore::default();
/// assert_eq!(store.get_string_list("k"), Ok(None));
/// store.put_string_list("k", &["v".to_owned()]).unwrap();
/// assert_eq!(store.get_string_list("k"), Ok(Some(vec!["v".to_owned()])));
/// ```
pub trait KeyValueStore {
    /// Failure reported by the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replace the list stored under `key`.
    fn put_string_list(&mut self, key: &str, values: &[String]) -> Result<(), Self::Error>;

    /// Read the list stored under `key`, or `None` if nothing was stored.
    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, Self::Error>;

    /// Write several lists in the given order.
    ///
    /// The default writes sequentially and stops at the first failure.
    /// Stores that support transactions should override this so readers
    /// observe all of the writes or none of them.
    fn put_string_lists(&mut self, entries: &[(&str, &[String])]) -> Result<(), Self::Error> {
        for (key, values) in entries {
            self.put_string_list(key, values)?;
        }
        Ok(())
    }
}
