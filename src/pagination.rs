use serde::Deserialize;

use crate::response::AppError;

pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters shared by every list endpoint. `sort_by` and
/// `order` are ignored by endpoints with a fixed ordering.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
}

impl PageWindow {
    /// Out-of-range values are rejected here, before any query runs.
    pub fn from_query(query: &ListQuery, default_per_page: i64) -> Result<Self, AppError> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::validation("page must be greater than or equal to 1"));
        }

        let per_page = query.per_page.unwrap_or(default_per_page);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::validation(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }

        Ok(Self { page, per_page })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

pub fn total_pages(total_items: i64, per_page: i64) -> i64 {
    if total_items <= 0 {
        return 0;
    }
    (total_items + per_page - 1) / per_page
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Allow-list of sort keys for one endpoint, mapping each accepted key
/// to a safe column reference. Unknown keys and orders fall back to the
/// endpoint defaults instead of erroring; caller text never reaches the
/// SQL.
pub struct SortSpec {
    columns: &'static [(&'static str, &'static str)],
    default_column: &'static str,
    default_order: SortOrder,
}

impl SortSpec {
    pub const fn new(
        columns: &'static [(&'static str, &'static str)],
        default_column: &'static str,
        default_order: SortOrder,
    ) -> Self {
        Self {
            columns,
            default_column,
            default_order,
        }
    }

    pub fn resolve(&self, sort_by: Option<&str>, order: Option<&str>) -> (&'static str, &'static str) {
        let column = sort_by
            .and_then(|key| {
                self.columns
                    .iter()
                    .find(|(candidate, _)| *candidate == key)
                    .map(|(_, column)| *column)
            })
            .unwrap_or(self.default_column);

        let order = order.and_then(SortOrder::parse).unwrap_or(self.default_order);

        (column, order.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORD_SORT: SortSpec = SortSpec::new(
        &[("spanish", "w.spanish"), ("correct_count", "correct_count")],
        "w.spanish",
        SortOrder::Asc,
    );

    fn query(page: Option<i64>, per_page: Option<i64>) -> ListQuery {
        ListQuery {
            page,
            per_page,
            sort_by: None,
            order: None,
        }
    }

    #[test]
    fn defaults_apply_when_params_absent() {
        let window = PageWindow::from_query(&query(None, None), 50).unwrap();
        assert_eq!(window.page, 1);
        assert_eq!(window.per_page, 50);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let window = PageWindow::from_query(&query(Some(3), Some(25)), 10).unwrap();
        assert_eq!(window.offset(), 50);
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(PageWindow::from_query(&query(Some(0), None), 10).is_err());
    }

    #[test]
    fn per_page_out_of_range_is_rejected() {
        assert!(PageWindow::from_query(&query(None, Some(0)), 10).is_err());
        assert!(PageWindow::from_query(&query(None, Some(101)), 10).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(100, 100), 1);
    }

    #[test]
    fn known_sort_key_resolves_to_mapped_column() {
        assert_eq!(
            WORD_SORT.resolve(Some("correct_count"), Some("desc")),
            ("correct_count", "DESC")
        );
    }

    #[test]
    fn unknown_sort_key_falls_back_to_default() {
        assert_eq!(
            WORD_SORT.resolve(Some("nonexistent_column"), Some("desc")),
            ("w.spanish", "DESC")
        );
        assert_eq!(WORD_SORT.resolve(Some("1; DROP TABLE words"), None), ("w.spanish", "ASC"));
    }

    #[test]
    fn unknown_order_falls_back_to_default() {
        assert_eq!(WORD_SORT.resolve(None, Some("sideways")), ("w.spanish", "ASC"));
        assert_eq!(WORD_SORT.resolve(None, Some("DESC")), ("w.spanish", "DESC"));
    }
}
