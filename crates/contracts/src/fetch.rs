//! Fetch / render boundary contracts
//!
//! The concurrency core only ever sees these two callable types.

use std::sync::Arc;

use crate::Content;

/// Fetch callable executed on a channel's isolated worker
///
/// Arguments are bound by closure capture when the callable is built.
/// It may block (process spawn, HTTP) and must convert its own transport
/// failures into empty `Content`.
pub type FetchFunction = Arc<dyn Fn() -> Content + Send + Sync>;

/// Render callable invoked on the consumer task with the latest non-empty `Content`
///
/// Should return quickly: it only delays its own channel's freshness.
pub type RenderFunction = Arc<dyn Fn(&Content) + Send + Sync>;

/// Named content source
///
/// Implemented by every built-in provider; turned into a `FetchFunction`
/// once at startup.
pub trait ContentProvider: Send + Sync {
    /// Provider name (used for logging)
    fn name(&self) -> &str;

    /// Fetch the current content, blocking as long as needed
    fn fetch(&self) -> Content;
}

/// Wrap a provider into the callable handed to the producer
pub fn into_fetch_function<P>(provider: P) -> FetchFunction
where
    P: ContentProvider + 'static,
{
    let provider = Arc::new(provider);
    Arc::new(move || provider.fetch())
}
