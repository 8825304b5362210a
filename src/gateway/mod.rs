//! Seams between the console and the remote REST API.
//!
//! Controllers and services only see these traits; [`http`] implements them
//! over `reqwest`, tests substitute fakes.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::filter::FilterState;
use crate::domain::item::ResourceItem;
use crate::domain::mock_test::MockTestDetail;
use crate::domain::options::FilterOptions;
use crate::domain::paginator::{DEFAULT_ITEMS_PER_PAGE, Paginator};
use crate::domain::types::{ResourceId, StoredFile, UploadFile};
use crate::gateway::errors::GatewayResult;

pub mod errors;
#[cfg(feature = "server")]
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub pagination: Pagination,
    /// Filters the list endpoint evaluates.
    pub filters: FilterState,
}

impl ListQuery {
    pub fn new() -> Self {
        Self {
            pagination: Pagination {
                page: 1,
                per_page: DEFAULT_ITEMS_PER_PAGE,
            },
            filters: FilterState::new(),
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Pagination {
            page: page.max(1),
            per_page: per_page.max(1),
        };
        self
    }

    pub fn filters(mut self, filters: &FilterState) -> Self {
        self.filters = filters.clone();
        self
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// One fetched page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub items: Vec<ResourceItem>,
    pub paginator: Paginator,
}

/// Credentials granted by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub user_name: String,
}

#[async_trait(?Send)]
pub trait ResourceReader {
    async fn list(&self, query: &ListQuery) -> GatewayResult<ListPage>;
    /// Option lists for filters and selects, merged over every source.
    async fn filter_options(&self) -> GatewayResult<FilterOptions>;
}

#[async_trait(?Send)]
pub trait ResourceWriter {
    /// Creates a record; the API does not always echo it back.
    async fn create(&self, payload: &Map<String, Value>) -> GatewayResult<Option<ResourceItem>>;
    async fn update(
        &self,
        id: &ResourceId,
        payload: &Map<String, Value>,
    ) -> GatewayResult<Option<ResourceItem>>;
}

#[async_trait(?Send)]
pub trait FileUploader {
    /// Stores `file` under the API's `destination` directory.
    async fn upload_file(&self, file: &UploadFile, destination: &str)
    -> GatewayResult<StoredFile>;
    /// Directly fetchable URL of a stored file reference; absolute URLs pass
    /// through unchanged.
    fn file_url(&self, reference: &str) -> String;
}

/// Everything a resource list screen needs from the API.
pub trait ResourceGateway: ResourceReader + ResourceWriter + FileUploader {}

impl<T: ResourceReader + ResourceWriter + FileUploader + ?Sized> ResourceGateway for T {}

#[async_trait(?Send)]
pub trait AuthGateway {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<LoginGrant>;
}

/// Question management of a single mock test.
#[async_trait(?Send)]
pub trait QuestionBank {
    async fn mock_test_detail(&self, id: &ResourceId) -> GatewayResult<MockTestDetail>;
    async fn upload_questions(&self, id: &ResourceId, file: &UploadFile) -> GatewayResult<()>;
    async fn clear_questions(&self, id: &ResourceId) -> GatewayResult<()>;
    async fn delete_question(&self, question_id: &ResourceId) -> GatewayResult<()>;
}
