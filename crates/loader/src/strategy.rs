use async_trait::async_trait;
use shared::surface::Element;

use crate::{
    controller::Loader,
    error::{ApplyError, FetchError},
};

/// Resolves a URL into text. Each call completes exactly once.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Puts fetched content into the document in place of
/// [`Loader::apply_content`].
///
/// Appliers work on element handles, which are thread-confined, so their
/// futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait Applier<E: Element> {
    async fn apply(&self, loader: &Loader<E>, content: &str) -> Result<(), ApplyError>;
}
