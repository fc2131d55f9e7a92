//! Product route handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use tracing::instrument;

use solebox_core::catalog::{ColorBucket, ProductGroup, group_variants};
use solebox_core::{Gender, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::ProductDetail;
use crate::state::AppState;

/// Listing filters. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub gender: Option<String>,
    pub color: Option<String>,
}

/// Parsed listing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub gender: Option<Gender>,
    pub color: Option<ColorBucket>,
}

fn parse_filter<T: std::str::FromStr>(raw: Option<&str>, name: &str) -> Result<Option<T>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("unknown {name} filter: {value}"))),
    }
}

impl TryFrom<&ProductQuery> for ProductFilter {
    type Error = AppError;

    fn try_from(query: &ProductQuery) -> Result<Self> {
        Ok(Self {
            gender: parse_filter(query.gender.as_deref(), "gender")?,
            color: parse_filter(query.color.as_deref(), "color")?,
        })
    }
}

/// Grouped product listing.
///
/// Gender is filtered in SQL; the color filter applies to the grouped
/// products, since a group matches when any of its variants does.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductGroup>>> {
    let Query(query) = query?;
    let filter = ProductFilter::try_from(&query)?;

    let rows = ProductRepository::new(state.pool())
        .list_variants(filter.gender)
        .await?;

    let mut groups = group_variants(rows);
    if let Some(color) = filter.color {
        groups.retain(|group| group.has_color(color));
    }

    Ok(Json(groups))
}

/// Product detail with every variant and its stock.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ProductDetail>> {
    let Path(id) = path?;
    ProductRepository::new(state.pool())
        .get_detail(ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(gender: Option<&str>, color: Option<&str>) -> ProductQuery {
        ProductQuery {
            gender: gender.map(String::from),
            color: color.map(String::from),
        }
    }

    #[test]
    fn test_empty_filters_are_absent() {
        let filter = ProductFilter::try_from(&query(Some(""), Some("  "))).unwrap();
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_known_filters_parse() {
        let filter = ProductFilter::try_from(&query(Some("women"), Some("gray"))).unwrap();
        assert_eq!(filter.gender, Some(Gender::Women));
        assert_eq!(filter.color, Some(ColorBucket::Grey));
    }

    #[test]
    fn test_unknown_filters_rejected() {
        assert!(matches!(
            ProductFilter::try_from(&query(Some("aliens"), None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            ProductFilter::try_from(&query(None, Some("chartreuse"))),
            Err(AppError::BadRequest(_))
        ));
    }
}
