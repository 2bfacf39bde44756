//! Ordered, immutable renderer registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistryError, RenderError};
use crate::renderer::{Renderer, RendererEntry};

/// Immutable mapping from markup type key to renderer.
///
/// Entries keep their registration order, which is the order used for
/// type selection controls. Lookup by key is a hash map access.
///
/// Built once through [`RegistryBuilder`] and shared read-only afterwards
/// (typically behind an `Arc`).
#[derive(Clone, Debug)]
pub struct RendererRegistry {
    entries: Vec<RendererEntry>,
    index: HashMap<String, usize>,
}

impl RendererRegistry {
    /// Start building an empty registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry containing every default renderer available in this build.
    ///
    /// See [`crate::defaults`] for the priority order and which engines are
    /// left out.
    #[must_use]
    pub fn with_defaults() -> Self {
        crate::defaults::default_builder().build()
    }

    /// Look up the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMarkupType`] if `key` is not registered.
    pub fn resolve(&self, key: &str) -> Result<&RendererEntry, RegistryError> {
        self.get(key)
            .ok_or_else(|| RegistryError::UnknownMarkupType {
                key: key.to_owned(),
                allowed: self.keys().map(str::to_owned).collect(),
            })
    }

    /// Look up the entry for `key`, if registered.
    pub fn get(&self, key: &str) -> Option<&RendererEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(RendererEntry::key)
    }

    /// `(key, label)` pairs in registration order.
    pub fn choices(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|e| (e.key(), e.label()))
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[RendererEntry] {
        &self.entries
    }

    /// Number of registered renderers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no renderer is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a builder seeded with this registry's entries.
    ///
    /// Used to derive a customized registry (restricted, relabeled, aliased)
    /// without touching the original.
    #[must_use]
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            entries: self.entries.clone(),
        }
    }
}

/// Builder for [`RendererRegistry`].
///
/// All methods reject conflicting input instead of overwriting, so a
/// registry never silently changes which renderer a key maps to.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<RendererEntry>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` under `key`, labeled with the key itself.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyKey`] if `key` is empty, or
    /// [`RegistryError::DuplicateKey`] if `key` is already registered.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        renderer: impl Renderer + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.push(RendererEntry::new(key, renderer))
    }

    /// Register `renderer` under `key` with a display label.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyKey`] if `key` is empty, or
    /// [`RegistryError::DuplicateKey`] if `key` is already registered.
    pub fn register_with_label(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        renderer: impl Renderer + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.push(RendererEntry::new(key, renderer).with_label(label))
    }

    /// Append a prepared entry.
    ///
    /// Keys must be non-empty, since an empty selection reads as unset.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyKey`] if the entry's key is empty, or
    /// [`RegistryError::DuplicateKey`] if it is already registered.
    pub fn push(&mut self, entry: RendererEntry) -> Result<&mut Self, RegistryError> {
        if entry.key().is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        if self.position(entry.key()).is_some() {
            return Err(RegistryError::DuplicateKey {
                key: entry.key().to_owned(),
            });
        }
        self.entries.push(entry);
        Ok(self)
    }

    /// Register the renderer produced by `init`, if it initializes.
    ///
    /// Initialization errors and key conflicts are logged and swallowed so
    /// that a missing optional engine never prevents startup. Returns whether
    /// the renderer was registered.
    pub fn try_register<F>(&mut self, key: &str, label: &str, init: F) -> bool
    where
        F: FnOnce() -> Result<Arc<dyn Renderer>, RenderError>,
    {
        let renderer = match init() {
            Ok(renderer) => renderer,
            Err(e) => {
                tracing::debug!(key, error = %e, "Rendering engine unavailable, skipping");
                return false;
            }
        };

        match self.push(RendererEntry::from_shared(key, renderer).with_label(label)) {
            Ok(_) => {
                tracing::debug!(key, "Registered rendering engine");
                true
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Rendering engine not registered");
                false
            }
        }
    }

    /// Register `alias` as an additional key sharing `target`'s renderer.
    ///
    /// The alias is appended at the end and labeled with its own key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMarkupType`] if `target` is not registered,
    /// [`RegistryError::EmptyKey`] if `alias` is empty, or
    /// [`RegistryError::DuplicateKey`] if `alias` already is.
    pub fn alias(
        &mut self,
        alias: impl Into<String>,
        target: &str,
    ) -> Result<&mut Self, RegistryError> {
        let i = self.require(target)?;
        let renderer = Arc::clone(self.entries[i].renderer());
        self.push(RendererEntry::from_shared(alias, renderer))
    }

    /// Change the display label of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMarkupType`] if `key` is not registered.
    pub fn relabel(
        &mut self,
        key: &str,
        label: impl Into<String>,
    ) -> Result<&mut Self, RegistryError> {
        let i = self.require(key)?;
        let entry = self.entries.remove(i).with_label(label);
        self.entries.insert(i, entry);
        Ok(self)
    }

    /// Keep only `keys`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMarkupType`] for the first key that is
    /// not registered, or [`RegistryError::DuplicateKey`] if a key is listed twice.
    pub fn retain_ordered<S: AsRef<str>>(&mut self, keys: &[S]) -> Result<&mut Self, RegistryError> {
        let mut selected = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            let i = self.require(key)?;
            if selected.iter().any(|e: &RendererEntry| e.key() == key) {
                return Err(RegistryError::DuplicateKey {
                    key: key.to_owned(),
                });
            }
            selected.push(self.entries[i].clone());
        }
        self.entries = selected;
        Ok(self)
    }

    /// Whether `key` has been registered so far.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> RendererRegistry {
        let index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key().to_owned(), i))
            .collect();
        tracing::debug!(count = self.entries.len(), "Renderer registry built");
        RendererRegistry {
            entries: self.entries,
            index,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    fn require(&self, key: &str) -> Result<usize, RegistryError> {
        self.position(key)
            .ok_or_else(|| RegistryError::UnknownMarkupType {
                key: key.to_owned(),
                allowed: self.entries.iter().map(|e| e.key().to_owned()).collect(),
            })
    }
}
