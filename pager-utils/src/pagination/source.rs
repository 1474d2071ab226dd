//! Page retrieval: pre-rendered pages or pages fetched on demand.
//!
//! Bounds are checked by the session before a page is requested, so sources
//! assume the index is valid.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use super::{error::PaginationError, page::Page};

type FetchFn = dyn Fn(usize) -> BoxFuture<'static, anyhow::Result<Page>> + Send + Sync;

/// Where a session gets its pages from.
pub enum PageSource {
    Static(StaticPageSource),
    Lazy(LazyPageSource),
}

impl PageSource {
    /// Retrieve the page at `index`.
    pub async fn get_page(&self, index: usize) -> Result<Page, PaginationError> {
        match self {
            PageSource::Static(source) => source.get_page(index),
            PageSource::Lazy(source) => source.get_page(index).await,
        }
    }

    /// Highest valid index, or `None` for an unbounded lazy source.
    pub fn max_page_index(&self) -> Option<usize> {
        match self {
            PageSource::Static(source) => Some(source.max_page_index()),
            PageSource::Lazy(source) => source.max_page_index,
        }
    }
}

impl fmt::Debug for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSource::Static(source) => f
                .debug_struct("Static")
                .field("pages", &source.pages.len())
                .finish(),
            PageSource::Lazy(source) => f
                .debug_struct("Lazy")
                .field("max_page_index", &source.max_page_index)
                .field("cache_loaded_pages", &source.cache_loaded_pages)
                .finish(),
        }
    }
}

impl From<StaticPageSource> for PageSource {
    fn from(source: StaticPageSource) -> Self {
        PageSource::Static(source)
    }
}

impl From<LazyPageSource> for PageSource {
    fn from(source: LazyPageSource) -> Self {
        PageSource::Lazy(source)
    }
}

/// A fixed list of pages.
pub struct StaticPageSource {
    pages: Vec<Page>,
}

impl StaticPageSource {
    /// Fails with [`PaginationError::EmptyPages`] when `pages` is empty.
    pub fn new(pages: Vec<Page>) -> Result<Self, PaginationError> {
        if pages.is_empty() {
            return Err(PaginationError::EmptyPages);
        }

        Ok(Self { pages })
    }

    pub fn max_page_index(&self) -> usize {
        self.pages.len() - 1
    }

    fn get_page(&self, index: usize) -> Result<Page, PaginationError> {
        let max = self.max_page_index();
        self.pages
            .get(index)
            .cloned()
            .ok_or(PaginationError::OutOfRange {
                requested: index,
                max,
            })
    }
}

/// Pages produced on demand by a caller-supplied fetch function.
///
/// With caching enabled, loads are single-flight per index: concurrent
/// requests for the same uncached page share one call to the fetch function,
/// and the first successful result is kept. A failed load caches nothing; a
/// request waiting on it retries the fetch itself. With caching disabled,
/// every request calls the fetch function.
pub struct LazyPageSource {
    fetch: Arc<FetchFn>,
    max_page_index: Option<usize>,
    cache_loaded_pages: bool,
    cache: Mutex<HashMap<usize, Arc<OnceCell<Page>>>>,
}

impl LazyPageSource {
    /// Build an unbounded source with caching enabled.
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Page>> + Send + 'static,
    {
        Self {
            fetch: Arc::new(move |index| -> BoxFuture<'static, anyhow::Result<Page>> {
                Box::pin(fetch(index))
            }),
            max_page_index: None,
            cache_loaded_pages: true,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Declare the highest valid index (`None` keeps the source unbounded).
    pub fn max_page_index(mut self, max_page_index: Option<usize>) -> Self {
        self.max_page_index = max_page_index;
        self
    }

    /// Whether successfully loaded pages are memoized.
    pub fn cache_loaded_pages(mut self, enabled: bool) -> Self {
        self.cache_loaded_pages = enabled;
        self
    }

    /// Number of pages currently memoized.
    pub fn cached_pages(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    async fn get_page(&self, index: usize) -> Result<Page, PaginationError> {
        if !self.cache_loaded_pages {
            return self.load(index).await;
        }

        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(index).or_default())
        };

        cell.get_or_try_init(|| self.load(index)).await.cloned()
    }

    async fn load(&self, index: usize) -> Result<Page, PaginationError> {
        (self.fetch)(index)
            .await
            .map_err(|source| PaginationError::Retrieval {
                index,
                source: source.into(),
            })
    }
}
