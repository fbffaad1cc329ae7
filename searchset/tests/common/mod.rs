#![allow(dead_code)]

use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::prelude::*;
use searchset::{
    CharFilter, Criteria, DateFilter, DocumentFilterSet, FilterRegistryBuilder,
    FilterSetDefinition, Lookup, MemoryIndex, NumericFilter, Precedence, SortOptions,
};
use serde_json::{Value, json};

pub mod book_entity;

/// Filters over the `books` index.
pub struct BookFilters;

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

pub const BOOKS: [(&str, &str, &str, f64); 4] = [
    ("Python Programming", "John Doe", "2023-01-01", 29.99),
    ("Django Web Development", "Jane Smith", "2023-02-01", 39.99),
    ("Advanced Python", "Bob Johnson", "2023-03-01", 49.99),
    ("Python Advanced", "Jane Smith", "2023-03-01", 49.99),
];

pub fn book_documents() -> Vec<Value> {
    BOOKS
        .iter()
        .map(|(title, author, publication_date, price)| {
            json!({
                "title": title,
                "author": author,
                "publication_date": publication_date,
                "price": price,
            })
        })
        .collect()
}

pub fn memory_index() -> MemoryIndex {
    MemoryIndex::new("books", book_documents())
}

/// Run `criteria` against the in-memory index.
pub async fn search_memory(criteria: Criteria) -> Vec<Value> {
    let filter_set = DocumentFilterSet::<BookFilters, _>::new(memory_index(), criteria)
        .expect("book filters are valid");
    filter_set
        .search(&memory_index())
        .await
        .expect("memory search should succeed")
}

pub fn titles(hits: &[Value]) -> Vec<&str> {
    hits.iter()
        .map(|hit| hit["title"].as_str().expect("every book has a title"))
        .collect()
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub async fn setup_test_db_with_books() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    for (title, author, publication_date, price) in BOOKS {
        book_entity::ActiveModel {
            title: Set(title.to_string()),
            author: Set(author.to_string()),
            publication_date: Set(publication_date
                .parse()
                .expect("fixture dates are ISO 8601")),
            price: Set(price),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    Ok(db)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateBookTable)]
    }
}

pub struct CreateBookTable;

#[async_trait::async_trait]
impl MigrationName for CreateBookTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_book_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBookTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Books::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Books::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Books::Title).string().not_null())
            .col(ColumnDef::new(Books::Author).string().not_null())
            .col(ColumnDef::new(Books::PublicationDate).date().not_null())
            .col(ColumnDef::new(Books::Price).double().not_null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Books {
    Table,
    Id,
    Title,
    Author,
    PublicationDate,
    Price,
}
