//! Offset pagination and sort options shared by listing reads.
//!
//! Listing results are cached, so every field here also participates in
//! cache key construction; see `cache::keys`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {size}")]
    InvalidSize { size: u32 },
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, PaginationError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidSize { size });
        }
        Ok(Self { page, size })
    }

    pub fn first() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    Name,
    Price,
    CreatedAt,
    AverageRating,
}

impl ProductSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSortField::Name => "name",
            ProductSortField::Price => "price",
            ProductSortField::CreatedAt => "created_at",
            ProductSortField::AverageRating => "average_rating",
        }
    }

    /// Column name used in ORDER BY clauses. Restricted to this enum so
    /// sort input never reaches SQL as free text.
    pub fn as_column(self) -> &'static str {
        match self {
            ProductSortField::Name => "name",
            ProductSortField::Price => "price_cents",
            ProductSortField::CreatedAt => "created_at",
            ProductSortField::AverageRating => "average_rating",
        }
    }
}

impl FromStr for ProductSortField {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(ProductSortField::Name),
            "price" => Ok(ProductSortField::Price),
            "created_at" => Ok(ProductSortField::CreatedAt),
            "average_rating" => Ok(ProductSortField::AverageRating),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
    pub field: ProductSortField,
    pub direction: SortDirection,
}

impl Default for ProductSort {
    fn default() -> Self {
        Self {
            field: ProductSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// A page of results together with the pagination metadata callers need to
/// render further requests. Serializable so it can live in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let size = u64::from(request.size());
        let total_pages = total_items.div_ceil(size).min(u64::from(u32::MAX)) as u32;
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_items,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
