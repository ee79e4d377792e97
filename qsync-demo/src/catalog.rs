//! Catalog fixture data and the query state that filters it

use qsync_ui::{
    ArrayFormat, ParseOptions, QueryData, QueryStringConfig, QueryStringOptions, StringifyOptions,
};
use serde::Serialize;
use serde_json::Value;

pub const PAGE_SIZE: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub name: &'static str,
    pub price_cents: u32,
    pub tags: &'static [&'static str],
}

pub fn products() -> Vec<Product> {
    vec![
        Product { name: "Desk Lamp", price_cents: 3900, tags: &["lighting", "office"] },
        Product { name: "Floor Lamp", price_cents: 8900, tags: &["lighting"] },
        Product { name: "Standing Desk", price_cents: 45900, tags: &["office", "furniture"] },
        Product { name: "Task Chair", price_cents: 21900, tags: &["office", "furniture"] },
        Product { name: "Bookshelf", price_cents: 12900, tags: &["furniture"] },
        Product { name: "Pendant Light", price_cents: 6400, tags: &["lighting"] },
        Product { name: "Monitor Arm", price_cents: 7900, tags: &["office"] },
        Product { name: "Side Table", price_cents: 5900, tags: &["furniture"] },
        Product { name: "Cable Tray", price_cents: 1900, tags: &["office"] },
        Product { name: "Reading Light", price_cents: 2900, tags: &["lighting"] },
    ]
}

pub fn all_tags() -> Vec<&'static str> {
    let mut tags: Vec<&'static str> = products()
        .iter()
        .flat_map(|p| p.tags.iter().copied())
        .collect();
    tags.sort_unstable();
    tags.dedup();
    tags
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Name,
    Price,
}

impl SortOrder {
    fn from_query(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("price") => SortOrder::Price,
            _ => SortOrder::Name,
        }
    }
}

/// Everything about the catalog view that is kept in the URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CatalogQuery {
    pub q: String,
    pub sort: SortOrder,
    /// Zero-based
    pub page: u32,
    pub tags: Vec<String>,
}

impl CatalogQuery {
    /// Lenient conversion: unknown or malformed values fall back to defaults.
    pub fn from_query(data: QueryData) -> Self {
        // Numeric searches arrive as numbers when parse_numbers is on
        let q = match data.get("q") {
            Some(Value::String(q)) => q.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let page = match data.get("page") {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        }
        .unwrap_or(0);
        let tags = match data.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(tag)) => vec![tag.clone()],
            _ => Vec::new(),
        };

        Self {
            q,
            sort: SortOrder::from_query(data.get("sort")),
            page,
            tags,
        }
    }

    pub fn with_tag_toggled(&self, tag: &str) -> Self {
        let mut next = self.clone();
        if let Some(at) = next.tags.iter().position(|t| t == tag) {
            next.tags.remove(at);
        } else {
            next.tags.push(tag.to_string());
            next.tags.sort();
        }
        next.page = 0;
        next
    }
}

pub fn catalog_config() -> QueryStringConfig<CatalogQuery> {
    QueryStringConfig::with_transform(CatalogQuery::from_query).options(QueryStringOptions {
        parse: ParseOptions {
            array_format: ArrayFormat::Bracket,
            parse_numbers: true,
            parse_booleans: false,
        },
        stringify: StringifyOptions {
            array_format: ArrayFormat::Bracket,
            sort: true,
            skip_empty_string: true,
        },
    })
}

/// Products matching the query, sorted, before paging.
pub fn filter_products(query: &CatalogQuery) -> Vec<Product> {
    let needle = query.q.to_lowercase();
    let mut matching: Vec<Product> = products()
        .into_iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| query.tags.iter().all(|t| p.tags.contains(&t.as_str())))
        .collect();

    match query.sort {
        SortOrder::Name => matching.sort_by(|a, b| a.name.cmp(b.name)),
        SortOrder::Price => matching.sort_by_key(|p| p.price_cents),
    }
    matching
}

pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE).max(1)
}

pub fn page_of(products: &[Product], page: u32) -> &[Product] {
    let start = (page as usize).saturating_mul(PAGE_SIZE).min(products.len());
    let end = (start + PAGE_SIZE).min(products.len());
    &products[start..end]
}
