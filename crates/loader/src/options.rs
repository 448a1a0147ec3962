use std::{rc::Rc, sync::Arc, time::Duration};

use shared::{domain::LoadState, surface::Element};

use crate::{
    config::LoaderSettings,
    http::HttpFetcher,
    strategy::{Applier, Fetcher},
};

/// Per-instance configuration of a [`crate::Loader`].
///
/// `None` disables an optional behaviour; `url_attr` and `fetcher` are
/// required and checked at construction and load time respectively.
pub struct LoaderOptions<E: Element> {
    pub fetcher: Option<Arc<dyn Fetcher>>,
    pub applier: Option<Rc<dyn Applier<E>>>,
    /// Delay before an unresolved load shows the loading state. Zero enters
    /// it immediately.
    pub instant_load_timeout: Duration,
    pub not_loaded_class: Option<String>,
    pub loading_class: Option<String>,
    pub loaded_class: Option<String>,
    pub load_error_class: Option<String>,
    pub error_selector: Option<String>,
    pub content_selector: Option<String>,
    /// Marks widget roots; used to keep a widget out of nested widgets.
    pub root_selector: Option<String>,
    pub load_state_changed_event: Option<String>,
    pub url_attr: Option<String>,
    pub plain_text_attr: Option<String>,
    pub plain_text: bool,
}

impl<E: Element> Clone for LoaderOptions<E> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            applier: self.applier.clone(),
            instant_load_timeout: self.instant_load_timeout,
            not_loaded_class: self.not_loaded_class.clone(),
            loading_class: self.loading_class.clone(),
            loaded_class: self.loaded_class.clone(),
            load_error_class: self.load_error_class.clone(),
            error_selector: self.error_selector.clone(),
            content_selector: self.content_selector.clone(),
            root_selector: self.root_selector.clone(),
            load_state_changed_event: self.load_state_changed_event.clone(),
            url_attr: self.url_attr.clone(),
            plain_text_attr: self.plain_text_attr.clone(),
            plain_text: self.plain_text,
        }
    }
}

impl<E: Element> Default for LoaderOptions<E> {
    fn default() -> Self {
        Self::from_settings(&LoaderSettings::default())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl<E: Element> LoaderOptions<E> {
    /// Options with an [`HttpFetcher`] using the settings' request timeout.
    pub fn from_settings(settings: &LoaderSettings) -> Self {
        let request_timeout = Duration::from_millis(settings.request_timeout_ms);
        Self {
            fetcher: Some(Arc::new(HttpFetcher::new(request_timeout))),
            applier: None,
            instant_load_timeout: Duration::from_millis(settings.instant_load_timeout_ms),
            not_loaded_class: non_empty(&settings.not_loaded_class),
            loading_class: non_empty(&settings.loading_class),
            loaded_class: non_empty(&settings.loaded_class),
            load_error_class: non_empty(&settings.load_error_class),
            error_selector: non_empty(&settings.error_selector),
            content_selector: non_empty(&settings.content_selector),
            root_selector: non_empty(&settings.root_selector),
            load_state_changed_event: non_empty(&settings.load_state_changed_event),
            url_attr: non_empty(&settings.url_attr),
            plain_text_attr: non_empty(&settings.plain_text_attr),
            plain_text: settings.plain_text,
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn with_applier(mut self, applier: impl Applier<E> + 'static) -> Self {
        self.applier = Some(Rc::new(applier));
        self
    }

    pub fn with_instant_load_timeout(mut self, timeout: Duration) -> Self {
        self.instant_load_timeout = timeout;
        self
    }

    /// Class reflecting `state`, if one is configured.
    pub fn state_class(&self, state: LoadState) -> Option<&str> {
        match state {
            LoadState::NotLoaded => self.not_loaded_class.as_deref(),
            LoadState::Loading => self.loading_class.as_deref(),
            LoadState::Loaded => self.loaded_class.as_deref(),
            LoadState::LoadError => self.load_error_class.as_deref(),
        }
    }
}
