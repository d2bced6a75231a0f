use quiz_core::model::{Page, Pagination};

use super::CacheError;

/// Ordered, append-only sequence of pages fetched for one filter set.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSequence<T> {
    pages: Vec<Page<T>>,
}

impl<T> Default for PageSequence<T> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<T: Clone> PageSequence<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_first(page: Page<T>) -> Self {
        Self { pages: vec![page] }
    }

    /// Append the next page, returning an extended copy.
    ///
    /// A page that is already loaded is ignored so two overlapping
    /// "load more" requests cannot duplicate rows.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NonContiguousPage` if `page` would leave a gap.
    pub fn appended(&self, page: Page<T>) -> Result<Self, CacheError> {
        let expected = self.loaded_pages() + 1;
        let got = page.pagination.current_page;
        if got < expected {
            return Ok(self.clone());
        }
        if got > expected {
            return Err(CacheError::NonContiguousPage { expected, got });
        }
        let mut pages = self.pages.clone();
        pages.push(page);
        Ok(Self { pages })
    }

    #[must_use]
    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    /// Items of every loaded page, in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    #[must_use]
    pub fn loaded_pages(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn last_pagination(&self) -> Option<Pagination> {
        self.pages.last().map(|page| page.pagination)
    }

    /// Page number to request for "load more", if any remain.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        match self.last_pagination() {
            Some(pagination) => pagination.next_page(),
            None => Some(1),
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.last_pagination()
            .is_some_and(|pagination| pagination.has_next())
    }
}
