//! Windowing for long choice lists.

/// Rows shown at once when the caller gives no page size.
pub(crate) const DEFAULT_PAGE_SIZE: usize = 7;

/// Scroll state that keeps the active row visible across renders.
#[derive(Debug, Default)]
pub(crate) struct Paginator {
    scroll: usize,
}

/// The visible slice of a list.
pub(crate) struct Window<T> {
    pub(crate) rows: Vec<T>,
    /// More rows exist above or below the window.
    pub(crate) truncated: bool,
}

impl Paginator {
    /// Cut `rows` down to `page_size`, scrolling only as far as needed to
    /// keep `active` on screen.
    pub(crate) fn window<T>(&mut self, rows: Vec<T>, active: usize, page_size: usize) -> Window<T> {
        let height = page_size.max(1);
        if rows.len() <= height {
            self.scroll = 0;
            return Window {
                rows,
                truncated: false,
            };
        }

        let max_scroll = rows.len() - height;
        self.scroll = self.scroll.min(max_scroll);

        let active = active.min(rows.len() - 1);
        if active < self.scroll {
            self.scroll = active;
        } else if active >= self.scroll + height {
            self.scroll = active + 1 - height;
        }

        Window {
            rows: rows.into_iter().skip(self.scroll).take(height).collect(),
            truncated: true,
        }
    }
}
