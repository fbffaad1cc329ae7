//! Book search example
//!
//! Declares a filter-set over a `books` index, renders the search body for a few requests
//! and runs the same requests against an in-memory index.
//!
//! ```bash
//! cargo run --example books
//! ```

use searchset::{
    CharFilter, Criteria, DateFilter, DocumentFilterSet, FilterRegistryBuilder,
    FilterSetDefinition, Lookup, MemoryIndex, NumericFilter, Precedence, SearchIndex, SortOptions,
};
use serde_json::json;

struct BookFilters;

impl FilterSetDefinition for BookFilters {
    fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
        filters
            .filter("title", CharFilter::new("title"))
            .filter("author", CharFilter::new("author"))
            .filter("publication_date", DateFilter::new("publication_date"))
            .filter("price_exact", NumericFilter::new("price"))
            .filter("price_min_value", NumericFilter::new("price").lookup(Lookup::Gte))
            .filter("price_max_value", NumericFilter::new("price").lookup(Lookup::Lte))
    }

    fn precedence() -> Vec<Precedence> {
        vec![Precedence::exact("price_exact").over(["price_min_value", "price_max_value"])]
    }

    fn sort_options() -> SortOptions {
        SortOptions::new()
            .field("title_keyword", "title.keyword")
            .field("price", "price")
            .field("publication_date", "publication_date")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let index = MemoryIndex::new(
        "books",
        [
            json!({"title": "Python Programming", "author": "John Doe", "publication_date": "2023-01-01", "price": 29.99}),
            json!({"title": "Django Web Development", "author": "Jane Smith", "publication_date": "2023-02-01", "price": 39.99}),
            json!({"title": "Advanced Python", "author": "Bob Johnson", "publication_date": "2023-03-01", "price": 49.99}),
            json!({"title": "Python Advanced", "author": "Jane Smith", "publication_date": "2023-03-01", "price": 49.99}),
        ],
    );

    let requests = [
        r#"{"title": "Python", "sort": "-title_keyword"}"#,
        r#"{"price_min_value": 35, "price_max_value": 45}"#,
        r#"{"price_exact": 29.99, "price_min_value": 35}"#,
        r#"{"sort": "price", "page": 2, "page_size": 2, "utm_source": "newsletter"}"#,
    ];

    for raw in requests {
        let criteria = Criteria::from_json(raw)?;
        println!("criteria: {raw}");

        let body = DocumentFilterSet::<BookFilters, _>::new(SearchIndex::new("books"), criteria.clone())?
            .build_query()
            .to_body();
        println!("body:     {body}");

        let hits = DocumentFilterSet::<BookFilters, _>::new(index.clone(), criteria)?
            .search(&index)
            .await?;
        for hit in hits {
            println!("  - {} ({})", hit["title"], hit["price"]);
        }
        println!();
    }

    Ok(())
}
