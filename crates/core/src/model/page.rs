use serde::{Deserialize, Serialize};

/// Server pagination cursor. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
}

impl Pagination {
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then_some(self.current_page + 1)
    }
}

/// One fetched page of a list resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, current_page: u32, last_page: u32) -> Self {
        Self {
            items,
            pagination: Pagination {
                current_page,
                last_page: last_page.max(current_page),
            },
        }
    }
}
