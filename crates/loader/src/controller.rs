use std::{sync::Arc, time::Duration};

use shared::{
    domain::{parse_binary_attr, LoadState},
    protocol::CustomEvent,
    surface::Element,
};
use tracing::{debug, info, warn};

use crate::{error::LoaderError, options::LoaderOptions, strategy::Fetcher};

/// Lifecycle controller bound to one root element.
///
/// Only configuration problems come back as `Err` from [`Loader::load`] and
/// [`Loader::reload`]; fetch and apply failures end in
/// [`LoadState::LoadError`], are rendered into the error targets and stay
/// readable through [`Loader::last_error`].
pub struct Loader<E: Element> {
    root: E,
    options: LoaderOptions<E>,
    state: LoadState,
    plain_text: bool,
    last_error: Option<LoaderError>,
}

impl<E: Element> Loader<E> {
    pub fn new(root: E, options: LoaderOptions<E>) -> Result<Self, LoaderError> {
        if options.url_attr.as_deref().map_or(true, str::is_empty) {
            return Err(LoaderError::configuration("url_attr option is empty"));
        }

        let plain_text_attr = options.plain_text_attr.as_deref();
        let plain_text = parse_binary_attr(
            plain_text_attr,
            plain_text_attr.and_then(|attr| root.attribute(attr)).as_deref(),
            options.plain_text,
        );

        let loader = Self {
            root,
            options,
            state: LoadState::NotLoaded,
            plain_text,
            last_error: None,
        };
        loader.sync_classes();
        Ok(loader)
    }

    pub fn root(&self) -> &E {
        &self.root
    }

    pub fn options(&self) -> &LoaderOptions<E> {
        &self.options
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn plain_text(&self) -> bool {
        self.plain_text
    }

    /// Error that ended the most recent attempt, if it failed.
    pub fn last_error(&self) -> Option<&LoaderError> {
        self.last_error.as_ref()
    }

    pub fn url(&self) -> Option<String> {
        let attr = self.options.url_attr.as_deref()?;
        self.root.attribute(attr).filter(|url| !url.is_empty())
    }

    /// `None` or an empty string removes the attribute.
    pub fn set_url(&self, value: Option<&str>) {
        let Some(attr) = self.options.url_attr.as_deref() else {
            return;
        };
        match value.filter(|v| !v.is_empty()) {
            Some(url) => self.root.set_attribute(attr, url),
            None => self.root.remove_attribute(attr),
        }
    }

    /// The content selector's match within this widget, else the root.
    pub fn content_element(&self) -> E {
        self.options
            .content_selector
            .as_deref()
            .and_then(|selector| self.owned_matches(selector).into_iter().next())
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn apply_content(&self, content: &str) {
        let target = self.content_element();
        if self.plain_text {
            target.set_text_content(content);
        } else {
            target.set_inner_html(content);
        }
    }

    /// Starts loading unless a load is running or already finished.
    ///
    /// With a non-zero instant-load timeout the loading state is entered only
    /// if the fetch is still unresolved when the timer fires, so fast loads
    /// go straight to their terminal state.
    pub async fn load(&mut self) -> Result<LoadState, LoaderError> {
        let fetcher = self.fetcher()?;

        if matches!(self.state, LoadState::Loading | LoadState::Loaded) {
            debug!(state = %self.state, "loader: load ignored");
            return Ok(self.state);
        }

        let Some(url) = self.url() else {
            self.set_state(LoadState::Loaded);
            return Ok(self.state);
        };

        let defer = self.options.instant_load_timeout;
        Ok(self.run(fetcher, url, defer).await)
    }

    /// Fetches again from whatever state the widget is in, entering the
    /// loading state immediately.
    pub async fn reload(&mut self) -> Result<LoadState, LoaderError> {
        let fetcher = self.fetcher()?;

        let Some(url) = self.url() else {
            self.set_state(LoadState::Loaded);
            return Ok(self.state);
        };

        Ok(self.run(fetcher, url, Duration::ZERO).await)
    }

    fn fetcher(&self) -> Result<Arc<dyn Fetcher>, LoaderError> {
        self.options
            .fetcher
            .clone()
            .ok_or_else(|| LoaderError::configuration("cannot load content: fetcher option is empty"))
    }

    async fn run(&mut self, fetcher: Arc<dyn Fetcher>, url: String, defer: Duration) -> LoadState {
        let previous_error = self.last_error.take();
        let mut attempt = Attempt {
            previous: self.state,
            previous_error,
            loader: self,
            finished: false,
        };
        let state = attempt.loader.fetch_and_apply(fetcher, url, defer).await;
        attempt.finished = true;
        state
    }

    async fn fetch_and_apply(&mut self, fetcher: Arc<dyn Fetcher>, url: String, defer: Duration) -> LoadState {
        info!(url = %url, defer = ?defer, "loader: load started");

        let fetched = if defer.is_zero() {
            self.set_state(LoadState::Loading);
            fetcher.fetch(&url).await
        } else {
            let fetch = fetcher.fetch(&url);
            tokio::pin!(fetch);
            tokio::select! {
                biased;
                result = &mut fetch => result,
                _ = tokio::time::sleep(defer) => {
                    self.set_state(LoadState::Loading);
                    fetch.await
                }
            }
        };

        let content = match fetched {
            Ok(content) => content,
            Err(err) => {
                warn!(url = %url, error = %err, "loader: fetch failed");
                self.set_error(err.into());
                return self.state;
            }
        };

        match self.options.applier.clone() {
            Some(applier) => {
                let applied = applier.apply(self, &content).await;
                match applied {
                    Ok(()) => self.set_state(LoadState::Loaded),
                    Err(err) => {
                        warn!(url = %url, error = %err, "loader: apply failed");
                        self.set_error(err.into());
                    }
                }
            }
            None => {
                self.apply_content(&content);
                self.set_state(LoadState::Loaded);
            }
        }

        info!(url = %url, state = %self.state, "loader: load finished");
        self.state
    }

    fn set_state(&mut self, state: LoadState) {
        let previous = std::mem::replace(&mut self.state, state);
        debug!(from = %previous, to = %state, "loader: state changed");

        self.sync_classes();

        if let Some(name) = self.options.load_state_changed_event.as_deref() {
            self.root
                .dispatch_event(&CustomEvent::state_changed(name, state));
        }
    }

    /// Renders the message into this widget's error targets, then enters
    /// [`LoadState::LoadError`] so listeners observe the text.
    fn set_error(&mut self, err: LoaderError) {
        if let Some(selector) = self.options.error_selector.as_deref() {
            let message = err.to_string();
            for target in self.owned_matches(selector) {
                target.set_text_content(&message);
            }
        }
        self.last_error = Some(err);
        self.set_state(LoadState::LoadError);
    }

    fn sync_classes(&self) {
        for state in LoadState::ALL {
            if let Some(class) = self.options.state_class(state) {
                self.root.toggle_class(class, state == self.state);
            }
        }
    }

    /// Descendants matching `selector` that are not inside a nested widget.
    fn owned_matches(&self, selector: &str) -> Vec<E> {
        let matches = self.root.query_selector_all(selector);
        let Some(root_selector) = self.options.root_selector.as_deref() else {
            return matches;
        };
        matches
            .into_iter()
            .filter(|el| self.owns(el, root_selector))
            .collect()
    }

    fn owns(&self, el: &E, root_selector: &str) -> bool {
        let mut current = el.parent();
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            if node.matches(root_selector) {
                return false;
            }
            current = node.parent();
        }
        false
    }
}

/// Puts the loader back where it was when a load future is dropped before
/// finishing, so a later `load` starts a fresh attempt.
struct Attempt<'a, E: Element> {
    loader: &'a mut Loader<E>,
    previous: LoadState,
    previous_error: Option<LoaderError>,
    finished: bool,
}

impl<E: Element> Drop for Attempt<'_, E> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!(state = %self.loader.state, restored = %self.previous, "loader: load abandoned");
        self.loader.last_error = self.previous_error.take();
        if self.loader.state != self.previous {
            self.loader.set_state(self.previous);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
