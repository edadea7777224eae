//! Page slicing for filtered lead lists

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

/// Page cursor
///
/// `page_index` is 0-based. An index past the end clamps to the last page
/// whenever a slice is taken, and the clamped value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_index: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn check_size(page_size: usize) -> ClientResult<()> {
    if page_size == 0 {
        return Err(ClientError::Validation("page size must be positive".into()));
    }
    Ok(())
}

impl Paginator {
    pub fn new(page_size: usize) -> ClientResult<Self> {
        check_size(page_size)?;
        Ok(Self {
            page_index: 0,
            page_size,
        })
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// 1-based page number for display
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Change the page size and go back to the first page
    pub fn set_page_size(&mut self, page_size: usize) -> ClientResult<()> {
        check_size(page_size)?;
        self.page_size = page_size;
        self.page_index = 0;
        Ok(())
    }

    pub fn go_to(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    pub fn next(&mut self) {
        self.page_index = self.page_index.saturating_add(1);
    }

    pub fn previous(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.page_index = 0;
    }

    /// Number of pages for `total_items`; an empty list still has one (empty) page
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size).max(1)
    }

    /// Slice `items` at the current page, clamping the index first
    pub fn slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        let last = self.total_pages(items.len()) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
        let start = (self.page_index * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn page<T: Clone>(&mut self, items: &[T]) -> Page<T> {
        let slice = self.slice(items).to_vec();
        Page {
            items: slice,
            page_number: self.page_number(),
            total_pages: self.total_pages(items.len()),
            total_items: items.len(),
        }
    }
}
