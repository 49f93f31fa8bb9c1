use serde_json::Value;
use tracing::{debug, info};

use crate::domain::SourceKind;
use crate::error::CollectorError;

/// Position of the next page to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Opaque server cursor; `None` requests the first page.
    Cursor(Option<String>),
    /// 1-based page number.
    Number(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// Ends on an empty page or a missing next cursor.
    Cursor,
    /// Ends on a page shorter than `batch_size`.
    Numbered { batch_size: usize },
}

impl PaginationStyle {
    fn first_request(&self) -> PageRequest {
        match self {
            PaginationStyle::Cursor => PageRequest::Cursor(None),
            PaginationStyle::Numbered { .. } => PageRequest::Number(1),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_cursor: Option<String>,
}

/// A collection listing endpoint: one call per page.
pub trait ListingSource {
    fn kind(&self) -> SourceKind;
    fn style(&self) -> PaginationStyle;
    fn fetch_page(&self, request: &PageRequest) -> Result<Page, CollectorError>;
}

impl<T: ListingSource + ?Sized> ListingSource for &T {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn style(&self) -> PaginationStyle {
        (**self).style()
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Page, CollectorError> {
        (**self).fetch_page(request)
    }
}

/// Drives a [`ListingSource`] to exhaustion, one page per `next()`.
///
/// Yielding whole pages lets the caller pace requests between fetches. After the
/// first error the iterator is exhausted; pages already yielded stay yielded.
pub struct Paginator<'a, S: ListingSource + ?Sized> {
    source: &'a S,
    next: Option<PageRequest>,
    pages_fetched: usize,
}

impl<'a, S: ListingSource + ?Sized> Paginator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            next: Some(source.style().first_request()),
            source,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn follow_up(&self, request: &PageRequest, page: &Page) -> Option<PageRequest> {
        match (self.source.style(), request) {
            (PaginationStyle::Cursor, _) => page
                .next_cursor
                .as_ref()
                .filter(|cursor| !cursor.is_empty())
                .map(|cursor| PageRequest::Cursor(Some(cursor.clone()))),
            (PaginationStyle::Numbered { batch_size }, PageRequest::Number(number)) => {
                (page.items.len() >= batch_size).then(|| PageRequest::Number(number + 1))
            }
            (PaginationStyle::Numbered { .. }, PageRequest::Cursor(_)) => None,
        }
    }
}

impl<S: ListingSource + ?Sized> Iterator for Paginator<'_, S> {
    type Item = Result<Vec<Value>, CollectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = self.next.take()?;
        debug!(?request, "fetching listing page");
        let page = match self.source.fetch_page(&request) {
            Ok(page) => page,
            Err(err) => return Some(Err(err)),
        };
        self.pages_fetched += 1;
        if page.items.is_empty() {
            info!("no NFTs in this page, end of collection reached");
            return None;
        }
        self.next = self.follow_up(&request, &page);
        info!(
            page = self.pages_fetched,
            items = page.items.len(),
            more = self.next.is_some(),
            "fetched listing page"
        );
        Some(Ok(page.items))
    }
}
