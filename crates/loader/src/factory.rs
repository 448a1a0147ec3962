use std::{collections::HashMap, hash::Hash};

use shared::{domain::LoadState, surface::Element};
use tracing::debug;

use crate::{controller::Loader, error::LoaderError, options::LoaderOptions};

/// Binds at most one [`Loader`] per root element and looks them up by root.
pub struct LoaderFactory<E: Element + Eq + Hash> {
    defaults: LoaderOptions<E>,
    loaders: Vec<Loader<E>>,
    index: HashMap<E, usize>,
}

impl<E: Element + Eq + Hash> LoaderFactory<E> {
    pub fn new(defaults: LoaderOptions<E>) -> Self {
        Self {
            defaults,
            loaders: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    pub fn get(&self, root: &E) -> Option<&Loader<E>> {
        self.index.get(root).map(|i| &self.loaders[*i])
    }

    pub fn get_mut(&mut self, root: &E) -> Option<&mut Loader<E>> {
        self.index.get(root).map(|i| &mut self.loaders[*i])
    }

    /// Loaders in the order they were bound.
    pub fn iter(&self) -> impl Iterator<Item = &Loader<E>> {
        self.loaders.iter()
    }

    /// Binds a loader to `root` with the defaults adjusted by `overrides`.
    ///
    /// An already bound root returns its existing loader untouched.
    pub fn create(
        &mut self,
        root: E,
        overrides: impl FnOnce(&mut LoaderOptions<E>),
    ) -> Result<&mut Loader<E>, LoaderError> {
        if let Some(i) = self.index.get(&root).copied() {
            debug!("loader: root already bound; reusing loader");
            return Ok(&mut self.loaders[i]);
        }

        let mut options = self.defaults.clone();
        overrides(&mut options);
        let loader = Loader::new(root.clone(), options)?;

        let i = self.loaders.len();
        self.loaders.push(loader);
        self.index.insert(root, i);
        Ok(&mut self.loaders[i])
    }

    /// Binds every unbound root matching the root selector in `scope`,
    /// `scope` itself included. Returns how many loaders were created.
    pub fn init_all(&mut self, scope: &E) -> Result<usize, LoaderError> {
        let selector = self
            .defaults
            .root_selector
            .clone()
            .ok_or_else(|| LoaderError::configuration("root_selector option is empty"))?;

        let mut roots = Vec::new();
        if scope.matches(&selector) {
            roots.push(scope.clone());
        }
        roots.extend(scope.query_selector_all(&selector));

        let mut created = 0;
        for root in roots {
            if self.index.contains_key(&root) {
                continue;
            }
            self.create(root, |_| {})?;
            created += 1;
        }
        debug!(created, total = self.loaders.len(), "loader: roots bound");
        Ok(created)
    }

    /// Loads every bound loader in bind order, one after another.
    pub async fn load_all(&mut self) -> Result<Vec<LoadState>, LoaderError> {
        let mut states = Vec::with_capacity(self.loaders.len());
        for loader in &mut self.loaders {
            states.push(loader.load().await?);
        }
        Ok(states)
    }
}
