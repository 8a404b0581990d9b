use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("startIndex must not be negative (got {0})")]
    NegativeStart(i64),

    #[error("amount must be a positive integer (got {0})")]
    NonPositiveAmount(i64),
}

/// Offset + limit slice over a result set ordered newest first.
///
/// `start_index` is an offset, not a cursor: a row inserted between two page
/// requests shifts every later page by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    start_index: i64,
    amount: i64,
}

impl PageWindow {
    pub fn new(start_index: i64, amount: i64) -> Result<Self, PageError> {
        if start_index < 0 {
            return Err(PageError::NegativeStart(start_index));
        }
        if amount <= 0 {
            return Err(PageError::NonPositiveAmount(amount));
        }
        Ok(Self { start_index, amount })
    }

    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// True when rows remain past the end of this window.
    pub fn has_more(&self, total_count: i64) -> bool {
        self.start_index.saturating_add(self.amount) < total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_windows() {
        assert_eq!(PageWindow::new(-1, 10), Err(PageError::NegativeStart(-1)));
        assert_eq!(PageWindow::new(0, 0), Err(PageError::NonPositiveAmount(0)));
        assert_eq!(PageWindow::new(3, -5), Err(PageError::NonPositiveAmount(-5)));
    }

    #[test]
    fn has_more_is_strict() {
        let window = PageWindow::new(0, 2).unwrap();
        assert!(window.has_more(5));
        assert!(!window.has_more(2));
        assert!(!window.has_more(0));

        let tail = PageWindow::new(4, 2).unwrap();
        assert!(!tail.has_more(5));

        let past_end = PageWindow::new(10, 2).unwrap();
        assert!(!past_end.has_more(5));
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let window = PageWindow::new(i64::MAX, i64::MAX).unwrap();
        assert!(!window.has_more(i64::MAX));
    }
}
