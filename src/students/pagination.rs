//! Which page buttons the directory footer shows.

const WINDOW: u32 = 5;
const HALF: u32 = WINDOW / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub current: u32,
    pub total_pages: u32,
    pub items: Vec<PageItem>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageControls {
    pub fn new(current: u32, total_pages: u32) -> Self {
        Self {
            current,
            total_pages,
            items: page_window(current, total_pages),
            prev_enabled: current > 1,
            next_enabled: current < total_pages,
        }
    }
}

/// Page 1, a run of up to five pages around `current`, and the last page,
/// with ellipses where pages are skipped.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let (start, end) = if total_pages <= WINDOW {
        (1, total_pages)
    } else if current <= HALF + 1 {
        (1, WINDOW)
    } else if current >= total_pages - HALF {
        (total_pages - WINDOW + 1, total_pages)
    } else {
        (current - HALF, current + HALF)
    };

    let mut items = Vec::with_capacity(WINDOW as usize + 4);
    if start > 1 {
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total_pages));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::PageItem::{Ellipsis, Page};
    use super::*;

    #[test]
    fn first_page_of_ten() {
        assert_eq!(
            page_window(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn last_page_of_ten() {
        assert_eq!(
            page_window(10, 10),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn middle_page_of_ten() {
        assert_eq!(
            page_window(5, 10),
            vec![
                Page(1),
                Ellipsis,
                Page(3),
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Ellipsis,
                Page(10)
            ]
        );
    }

    #[test]
    fn no_ellipsis_when_window_touches_the_ends() {
        assert_eq!(
            page_window(4, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7)]
        );
        assert_eq!(
            page_window(3, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6)]
        );
    }

    #[test]
    fn small_and_empty_results() {
        assert!(page_window(1, 0).is_empty());
        assert_eq!(page_window(1, 1), vec![Page(1)]);
        assert_eq!(page_window(2, 3), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn prev_and_next_disable_at_the_edges() {
        let first = PageControls::new(1, 4);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);

        let last = PageControls::new(4, 4);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);

        let only = PageControls::new(1, 1);
        assert!(!only.prev_enabled && !only.next_enabled);
    }
}
