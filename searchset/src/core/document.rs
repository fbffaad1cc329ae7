use std::marker::PhantomData;

use super::filter_set::{FilterSet, FilterSetDefinition};
use crate::errors::ConfigurationError;
use crate::filtering::{Criteria, PAGE_KEY, PAGE_SIZE_KEY, PageWindow, PaginationPolicy, SORT_KEY};
use crate::query::{SearchExecutor, SearchQuery, SortDirection};

/// A searchable index a filter-set is bound to.
pub trait Document {
    /// The query accumulator this index is searched with.
    type Query: SearchQuery;

    fn index_name(&self) -> &str;

    /// A fresh, unfiltered search over every document of the index.
    fn search(&self) -> Self::Query;
}

/// A filter-set bound to a document, adding sorting and pagination.
///
/// ```rust,ignore
/// let filter_set = DocumentFilterSet::<BookFilters, _>::new(
///     SearchIndex::new("books"),
///     Criteria::new().with("title", "Python").with("sort", "-title_keyword"),
/// )?;
/// let body = filter_set.build_query().to_body();
/// ```
pub struct DocumentFilterSet<S, D> {
    filter_set: FilterSet<S>,
    document: D,
    pagination: PaginationPolicy,
}

impl<S: FilterSetDefinition, D: Document> DocumentFilterSet<S, D> {
    /// # Errors
    ///
    /// Fails when the definition of `S` is invalid.
    pub fn new(document: D, criteria: Criteria) -> Result<Self, ConfigurationError> {
        Self::builder().document(document).criteria(criteria).build()
    }

    #[must_use]
    pub fn builder() -> DocumentFilterSetBuilder<S, D> {
        DocumentFilterSetBuilder {
            document: None,
            criteria: Criteria::new(),
            pagination: None,
            _definition: PhantomData,
        }
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        self.filter_set.criteria()
    }

    #[must_use]
    pub fn filter_set(&self) -> &FilterSet<S> {
        &self.filter_set
    }

    #[must_use]
    pub const fn pagination(&self) -> PaginationPolicy {
        self.pagination
    }

    /// The page requested by the criteria, after normalization.
    #[must_use]
    pub fn page_window(&self) -> PageWindow {
        let criteria = self.criteria();
        self.pagination
            .resolve(criteria.get(PAGE_KEY), criteria.get(PAGE_SIZE_KEY))
    }

    /// Index fields and directions the criteria sort by, unknown keys dropped.
    #[must_use]
    pub fn sort_keys(&self) -> Vec<(&str, SortDirection)> {
        self.filter_set
            .schema()
            .sort_options()
            .resolve_all(self.criteria().get(SORT_KEY))
    }

    /// Build the search for the current criteria: filters, then sorting, then the page.
    ///
    /// Nothing is executed and nothing is cached; every call builds the same query.
    #[must_use]
    pub fn build_query(&self) -> D::Query {
        let query = self.filter_set.apply(self.document.search());
        let query = self
            .sort_keys()
            .into_iter()
            .fold(query, |query, (field, direction)| query.sort(field, direction));

        let window = self.page_window();
        tracing::debug!(
            index = self.document.index_name(),
            page = window.page,
            page_size = window.page_size,
            start = window.start,
            end = window.end,
            "built search query"
        );
        window.apply(query)
    }

    /// Build the query and run it.
    ///
    /// # Errors
    ///
    /// Returns whatever the executor fails with.
    pub async fn search<E>(&self, executor: &E) -> Result<Vec<E::Hit>, E::Error>
    where
        E: SearchExecutor<D::Query>,
        D::Query: Send,
    {
        executor.execute(self.build_query()).await
    }
}

impl<S, D: Clone> Clone for DocumentFilterSet<S, D> {
    fn clone(&self) -> Self {
        Self {
            filter_set: self.filter_set.clone(),
            document: self.document.clone(),
            pagination: self.pagination,
        }
    }
}

impl<S, D: std::fmt::Debug> std::fmt::Debug for DocumentFilterSet<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFilterSet")
            .field("filter_set", &self.filter_set)
            .field("document", &self.document)
            .field("pagination", &self.pagination)
            .finish()
    }
}

/// Builder for [`DocumentFilterSet`]; a document is required.
pub struct DocumentFilterSetBuilder<S, D> {
    document: Option<D>,
    criteria: Criteria,
    pagination: Option<PaginationPolicy>,
    _definition: PhantomData<fn() -> S>,
}

impl<S: FilterSetDefinition, D: Document> DocumentFilterSetBuilder<S, D> {
    #[must_use]
    pub fn document(mut self, document: D) -> Self {
        self.document = Some(document);
        self
    }

    #[must_use]
    pub fn criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Override the page size defaults declared by `S`.
    #[must_use]
    pub fn pagination(mut self, pagination: PaginationPolicy) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// # Errors
    ///
    /// - [`ConfigurationError::MissingDocument`] when no document was bound
    /// - any error in the definition of `S` or in the pagination override
    pub fn build(self) -> Result<DocumentFilterSet<S, D>, ConfigurationError> {
        let document = self.document.ok_or(ConfigurationError::MissingDocument {
            filter_set: std::any::type_name::<S>(),
        })?;

        let filter_set = FilterSet::<S>::new(self.criteria)?;
        let pagination = match self.pagination {
            Some(pagination) => {
                pagination.validate()?;
                pagination
            }
            None => filter_set.schema().pagination(),
        };

        Ok(DocumentFilterSet {
            filter_set,
            document,
            pagination,
        })
    }
}
