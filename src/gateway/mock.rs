//! Mock gateway implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Map, Value};

use crate::domain::item::ResourceItem;
use crate::domain::mock_test::MockTestDetail;
use crate::domain::options::FilterOptions;
use crate::domain::types::{ResourceId, StoredFile, UploadFile};
use crate::gateway::errors::GatewayResult;
use crate::gateway::{
    AuthGateway, FileUploader, ListPage, ListQuery, LoginGrant, QuestionBank, ResourceReader,
    ResourceWriter,
};

mock! {
    pub Gateway {}

    #[async_trait(?Send)]
    impl ResourceReader for Gateway {
        async fn list(&self, query: &ListQuery) -> GatewayResult<ListPage>;
        async fn filter_options(&self) -> GatewayResult<FilterOptions>;
    }

    #[async_trait(?Send)]
    impl ResourceWriter for Gateway {
        async fn create(&self, payload: &Map<String, Value>) -> GatewayResult<Option<ResourceItem>>;
        async fn update(
            &self,
            id: &ResourceId,
            payload: &Map<String, Value>,
        ) -> GatewayResult<Option<ResourceItem>>;
    }

    #[async_trait(?Send)]
    impl FileUploader for Gateway {
        async fn upload_file(&self, file: &UploadFile, destination: &str) -> GatewayResult<StoredFile>;
        fn file_url(&self, reference: &str) -> String;
    }

    #[async_trait(?Send)]
    impl AuthGateway for Gateway {
        async fn login(&self, email: &str, password: &str) -> GatewayResult<LoginGrant>;
    }

    #[async_trait(?Send)]
    impl QuestionBank for Gateway {
        async fn mock_test_detail(&self, id: &ResourceId) -> GatewayResult<MockTestDetail>;
        async fn upload_questions(&self, id: &ResourceId, file: &UploadFile) -> GatewayResult<()>;
        async fn clear_questions(&self, id: &ResourceId) -> GatewayResult<()>;
        async fn delete_question(&self, question_id: &ResourceId) -> GatewayResult<()>;
    }
}
