pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A window over rides ordered by ascending id. `number` and `size` are
/// both at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(number: i64, size: i64) -> Self {
        Self { number, size }
    }

    // saturates: a page past i64::MAX rows is just empty
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

#[test]
fn default_page_is_first_ten() {
    let page = Page::default();

    assert_eq!(page.offset(), 0);
    assert_eq!(page.limit(), 10);
}

#[test]
fn offset_skips_previous_pages() {
    assert_eq!(Page::new(1, 5).offset(), 0);
    assert_eq!(Page::new(2, 5).offset(), 5);
    assert_eq!(Page::new(4, 25).offset(), 75);
    assert_eq!(Page::new(i64::MAX, i64::MAX).offset(), i64::MAX);
}
