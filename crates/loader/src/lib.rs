//! Lazily fetches remote content into a document element and mirrors the
//! load lifecycle as state classes and `load-state-changed` events.

pub mod config;
pub mod controller;
pub mod error;
pub mod factory;
pub mod http;
pub mod options;
pub mod strategy;

pub use config::{load_settings, LoaderSettings};
pub use controller::Loader;
pub use error::{ApplyError, FetchError, LoaderError};
pub use factory::LoaderFactory;
pub use http::HttpFetcher;
pub use options::LoaderOptions;
pub use shared::{
    domain::LoadState,
    protocol::{CustomEvent, StateChangeDetail},
    surface::Element,
};
pub use strategy::{Applier, Fetcher};
