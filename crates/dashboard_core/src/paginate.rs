/// Returns page `page_number` (1-based) of `items`.
///
/// Does not clamp: page 0, a zero page size or a page past the end yield an
/// empty slice. Callers clamp with [`clamp_page`] first.
pub fn paginate<T>(items: &[T], page_size: usize, page_number: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let Some(start) = page_number
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
    else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `len` items; an empty list still has one page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

pub fn clamp_page(page_number: usize, len: usize, page_size: usize) -> usize {
    page_number.clamp(1, page_count(len, page_size))
}

#[cfg(test)]
mod tests {
    use super::{clamp_page, page_count, paginate};

    #[test]
    fn slices_full_and_partial_pages() {
        let items: Vec<usize> = (0..12).collect();
        assert_eq!(paginate(&items, 5, 1), &[0, 1, 2, 3, 4]);
        assert_eq!(paginate(&items, 5, 2), &[5, 6, 7, 8, 9]);
        assert_eq!(paginate(&items, 5, 3), &[10, 11]);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<usize> = (0..12).collect();
        assert!(paginate(&items, 5, 0).is_empty());
        assert!(paginate(&items, 5, 4).is_empty());
        assert!(paginate(&items, 0, 1).is_empty());
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn clamping_keeps_page_in_range() {
        assert_eq!(page_count(12, 5), 3);
        assert_eq!(page_count(0, 5), 1);
        assert_eq!(clamp_page(0, 12, 5), 1);
        assert_eq!(clamp_page(9, 12, 5), 3);
        assert_eq!(clamp_page(2, 12, 5), 2);
    }
}
