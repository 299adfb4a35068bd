use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
}

/// Listing filters; all compose conjunctively.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_to_sane_bounds() {
        let (page, per_page, offset) = Pagination {
            page: Some(0),
            per_page: Some(1000),
        }
        .normalize();
        assert_eq!((page, per_page, offset), (1, 100, 0));

        let (page, per_page, offset) = Pagination {
            page: Some(3),
            per_page: None,
        }
        .normalize();
        assert_eq!((page, per_page, offset), (3, 20, 40));
    }
}
