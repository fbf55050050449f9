//! Lazy pagination over list operations.
//!
//! A [`Pageable<T>`] fetches one page per request, only when the consumer
//! asks for more. Items are yielded in server order; the `nextLink` of each
//! page is followed verbatim (it already carries every query parameter the
//! server needs, including `api-version`).
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//!
//! let mut skus = deployment.get_skus(None, None)?;
//! while let Some(sku) = skus.try_next().await? {
//!     println!("{:?}", sku.sku);
//! }
//!
//! // or page by page, keeping continuation tokens
//! let mut pages = deployment.get_skus(None, None)?.into_pages();
//! while let Some(page) = pages.try_next().await? {
//!     println!("{} items, next: {:?}", page.items().len(), page.continuation_token());
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

use crate::arm::errors::ArmError;
use crate::arm::models::ListResult;
use crate::arm::response::parse_body;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// One page of a list response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    next_link: Option<String>,
    raw: HttpResponse,
}

impl<T> Page<T> {
    /// Creates a page. An empty `next_link` is treated as absent.
    #[must_use]
    pub fn new(items: Vec<T>, next_link: Option<String>, raw: HttpResponse) -> Self {
        Self {
            items,
            next_link: next_link.filter(|link| !link.is_empty()),
            raw,
        }
    }

    /// Returns the items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the link to the next page, if any.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    /// Returns the token to resume iteration after this page.
    ///
    /// This is the same value as [`next_link`](Self::next_link); pass it to
    /// [`Pageable::resume`] or a list operation's `continuation_token`.
    #[must_use]
    pub fn continuation_token(&self) -> Option<&str> {
        self.next_link()
    }

    /// Returns the raw response this page was read from.
    #[must_use]
    pub const fn raw_response(&self) -> &HttpResponse {
        &self.raw
    }

    /// Consumes the page and returns its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

enum PageState<T> {
    First(BoxFuture<'static, Result<Page<T>, ArmError>>),
    Next(String),
    Done,
}

/// A lazy, single-consumer sequence of pages.
///
/// `Pageable<T>` implements [`Stream<Item = Result<T, ArmError>>`](Stream)
/// over the items of every page. A failing fetch is yielded once and ends
/// the stream; items already yielded are unaffected.
pub struct Pageable<T> {
    pages: BoxStream<'static, Result<Page<T>, ArmError>>,
    buffer: std::vec::IntoIter<T>,
}

impl<T: Send + 'static> Pageable<T> {
    /// Creates a pager from a first-page fetch and a next-page fetch.
    ///
    /// `fetch_first` runs when the first item or page is requested.
    /// `fetch_next` receives the previous page's `next_link`.
    pub fn new<F, N, NF>(fetch_first: F, fetch_next: N) -> Self
    where
        F: Future<Output = Result<Page<T>, ArmError>> + Send + 'static,
        N: Fn(String) -> NF + Send + Sync + 'static,
        NF: Future<Output = Result<Page<T>, ArmError>> + Send + 'static,
    {
        Self::from_state(PageState::First(fetch_first.boxed()), fetch_next)
    }

    /// Creates a pager that starts at a continuation token.
    pub fn resume<N, NF>(continuation_token: impl Into<String>, fetch_next: N) -> Self
    where
        N: Fn(String) -> NF + Send + Sync + 'static,
        NF: Future<Output = Result<Page<T>, ArmError>> + Send + 'static,
    {
        let token: String = continuation_token.into();
        let state = if token.is_empty() {
            PageState::Done
        } else {
            PageState::Next(token)
        };
        Self::from_state(state, fetch_next)
    }

    fn from_state<N, NF>(state: PageState<T>, fetch_next: N) -> Self
    where
        N: Fn(String) -> NF + Send + Sync + 'static,
        NF: Future<Output = Result<Page<T>, ArmError>> + Send + 'static,
    {
        let fetch_next = Arc::new(fetch_next);
        let pages = stream::try_unfold(state, move |state| {
            let fetch_next = Arc::clone(&fetch_next);
            async move {
                let page = match state {
                    PageState::First(first) => first.await?,
                    PageState::Next(link) => fetch_next(link).await?,
                    PageState::Done => return Ok::<_, ArmError>(None),
                };
                let next = match page.next_link() {
                    Some(link) => PageState::Next(link.to_string()),
                    None => PageState::Done,
                };
                Ok(Some((page, next)))
            }
        })
        .boxed();

        Self {
            pages,
            buffer: Vec::new().into_iter(),
        }
    }

    /// Converts the pager into a stream of pages.
    ///
    /// Items already buffered from a partially consumed page are dropped.
    pub fn into_pages(self) -> BoxStream<'static, Result<Page<T>, ArmError>> {
        self.pages
    }

    /// Converts the pager into a boxed stream of items.
    pub fn into_stream(self) -> BoxStream<'static, Result<T, ArmError>> {
        self.boxed()
    }

    /// Fetches every remaining page and returns all items in order.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error encountered.
    pub async fn collect_all(self) -> Result<Vec<T>, ArmError> {
        self.try_collect().await
    }
}

impl<T> Stream for Pageable<T> {
    type Item = Result<T, ArmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.buffer.next() {
                return Poll::Ready(Some(Ok(item)));
            }
            match this.pages.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(page))) => this.buffer = page.into_items().into_iter(),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<T> Unpin for Pageable<T> {}

impl<T> fmt::Debug for Pageable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pageable")
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Builds a pager over a `{ value, nextLink }` list endpoint.
///
/// The first request is sent as given (with its `api-version`), or the
/// continuation token is fetched instead when one is supplied. Later pages
/// are plain GETs on the absolute `nextLink`.
pub(crate) fn from_list_request<T>(
    pipeline: Arc<HttpClient>,
    first: HttpRequest,
    continuation_token: Option<String>,
) -> Pageable<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let next_pipeline = Arc::clone(&pipeline);
    let fetch_next = move |link: String| fetch_list_page::<T>(Arc::clone(&next_pipeline), link);

    match continuation_token {
        Some(token) => Pageable::resume(token, fetch_next),
        None => Pageable::new(
            async move {
                let response = pipeline.request(first).await?;
                parse_list_page(response)
            },
            fetch_next,
        ),
    }
}

async fn fetch_list_page<T: DeserializeOwned>(
    pipeline: Arc<HttpClient>,
    link: String,
) -> Result<Page<T>, ArmError> {
    tracing::debug!("Fetching next page {}", link);
    let request = HttpRequest::builder(HttpMethod::Get, link).build()?;
    let response = pipeline.request(request).await?;
    parse_list_page(response)
}

fn parse_list_page<T: DeserializeOwned>(response: HttpResponse) -> Result<Page<T>, ArmError> {
    if !response.has_content() {
        return Ok(Page::new(Vec::new(), None, response));
    }
    let list: ListResult<T> = parse_body(&response, "list page")?;
    Ok(Page::new(list.value, list.next_link, response))
}
