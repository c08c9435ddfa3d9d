use crate::descriptor::{CustomFilterDescriptor, CustomSortDescriptor};
use crate::types::{FilterCondition, FilterOperator, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured filter on one entity property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub property_path: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl FilterDescriptor {
    pub fn new(property_path: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            property_path: property_path.into(),
            operator,
            value,
        }
    }
}

/// Structured sort on one entity property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub property_path: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn new(property_path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property_path: property_path.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    Custom(CustomFilterDescriptor),
    Structured(FilterDescriptor),
}

impl Filter {
    pub fn condition(&self) -> FilterCondition {
        match self {
            Filter::Custom(custom) => custom.condition(),
            Filter::Structured(_) => FilterCondition::And,
        }
    }
}

impl From<FilterDescriptor> for Filter {
    fn from(filter: FilterDescriptor) -> Self {
        Filter::Structured(filter)
    }
}

impl From<CustomFilterDescriptor> for Filter {
    fn from(filter: CustomFilterDescriptor) -> Self {
        Filter::Custom(filter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sort {
    Custom(CustomSortDescriptor),
    Structured(SortDescriptor),
}

impl Sort {
    pub fn direction(&self) -> SortDirection {
        match self {
            Sort::Custom(custom) => custom.direction,
            Sort::Structured(sort) => sort.direction,
        }
    }
}

impl From<SortDescriptor> for Sort {
    fn from(sort: SortDescriptor) -> Self {
        Sort::Structured(sort)
    }
}

impl From<CustomSortDescriptor> for Sort {
    fn from(sort: CustomSortDescriptor) -> Self {
        Sort::Custom(sort)
    }
}

/// Row window applied to a select
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

/// Filters (AND-combined), sorts and an optional page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicQuery {
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default)]
    sorts: Vec<Sort>,
    #[serde(default)]
    page: Option<Page>,
}

impl DynamicQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn add_filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Filter>,
    {
        self.filters.extend(filters.into_iter().map(Into::into));
        self
    }

    pub fn add_sort(mut self, sort: impl Into<Sort>) -> Self {
        self.sorts.push(sort.into());
        self
    }

    pub fn add_sorts<I>(mut self, sorts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Sort>,
    {
        self.sorts.extend(sorts.into_iter().map(Into::into));
        self
    }

    pub fn with_page(mut self, limit: u64, offset: u64) -> Self {
        self.page = Some(Page { limit, offset });
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }
}
