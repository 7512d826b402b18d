use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    domain::status::OrderStatus,
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
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

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// `all`, `received`, `preparing` or `ready`.
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// `None` means every status.
    pub fn status_filter(&self) -> AppResult<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => raw
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|err| AppError::BadRequest(err.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LanguageQuery {
    /// `en` (default) or `fi`.
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TableQuery {
    /// Table number carried by the QR link.
    pub table: Option<String>,
}
