//! Page arithmetic for the sentence browser

/// Sentences per page
pub const PAGE_SIZE: i64 = 20;

/// A requested page resolved against the number of matching rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-indexed page actually served
    pub page: i64,
    pub total_pages: i64,
    /// Rows to skip before this page
    pub offset: i64,
}

impl PageWindow {
    /// Clamp `requested` into `1..=total_pages`
    ///
    /// An empty listing is served as page 1 of 0.
    ///
    /// ```
    /// use esl_server::pagination::PageWindow;
    ///
    /// let window = PageWindow::resolve(26, 7);
    /// assert_eq!((window.page, window.total_pages, window.offset), (2, 2, 20));
    /// ```
    pub fn resolve(total_rows: i64, requested: i64) -> Self {
        let total_pages = (total_rows.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
        let page = requested.clamp(1, total_pages.max(1));

        Self {
            page,
            total_pages,
            offset: (page - 1) * PAGE_SIZE,
        }
    }
}
