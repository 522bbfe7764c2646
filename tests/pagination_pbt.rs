//! Property-based tests for the pagination helper shared by every list
//! endpoint:
//! - total_pages matches the ceiling division, 0 when there are no items
//! - the last page is never empty and never overshoots
//! - offset skips exactly the preceding pages
//! - out-of-range page/per_page values are always rejected

use proptest::prelude::*;

use lang_portal_backend::pagination::{total_pages, ListQuery, PageWindow, MAX_PER_PAGE};

fn query(page: Option<i64>, per_page: Option<i64>) -> ListQuery {
    ListQuery {
        page,
        per_page,
        sort_by: None,
        order: None,
    }
}

proptest! {
    #[test]
    fn total_pages_matches_ceiling_division(
        total in 0i64..1_000_000,
        per_page in 1i64..=MAX_PER_PAGE,
    ) {
        let expected = (total as f64 / per_page as f64).ceil() as i64;
        prop_assert_eq!(total_pages(total, per_page), expected);
    }

    #[test]
    fn last_page_covers_the_remainder(
        total in 1i64..1_000_000,
        per_page in 1i64..=MAX_PER_PAGE,
    ) {
        let pages = total_pages(total, per_page);
        prop_assert!(pages * per_page >= total);
        prop_assert!((pages - 1) * per_page < total);
    }

    #[test]
    fn offset_skips_exactly_the_preceding_pages(
        page in 1i64..100_000,
        per_page in 1i64..=MAX_PER_PAGE,
    ) {
        let window = PageWindow::from_query(&query(Some(page), Some(per_page)), 10).unwrap();
        prop_assert_eq!(window.offset(), (page - 1) * per_page);
    }

    #[test]
    fn out_of_range_page_is_rejected(page in i64::MIN..1) {
        prop_assert!(PageWindow::from_query(&query(Some(page), None), 10).is_err());
    }

    #[test]
    fn out_of_range_per_page_is_rejected(per_page in prop_oneof![
        i64::MIN..1,
        (MAX_PER_PAGE + 1)..i64::MAX,
    ]) {
        prop_assert!(PageWindow::from_query(&query(None, Some(per_page)), 10).is_err());
    }

    #[test]
    fn in_range_values_are_accepted(
        page in 1i64..100_000,
        per_page in 1i64..=MAX_PER_PAGE,
    ) {
        let window = PageWindow::from_query(&query(Some(page), Some(per_page)), 10).unwrap();
        prop_assert_eq!(window.page, page);
        prop_assert_eq!(window.per_page, per_page);
    }
}

#[test]
fn empty_collection_has_zero_pages() {
    assert_eq!(total_pages(0, 1), 0);
    assert_eq!(total_pages(0, MAX_PER_PAGE), 0);
}
