#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use admin_console::domain::item::ResourceItem;
use admin_console::domain::options::FilterOptions;
use admin_console::domain::paginator::Paginator;
use admin_console::domain::types::{ResourceId, StoredFile, UploadFile};
use admin_console::gateway::errors::{GatewayError, GatewayResult};
use admin_console::gateway::{FileUploader, ListPage, ListQuery, ResourceReader, ResourceWriter};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// In-memory gateway with scripted answers that records every call.
#[derive(Default)]
pub struct FakeGateway {
    pub pages: RefCell<VecDeque<GatewayResult<ListPage>>>,
    pub writes: RefCell<VecDeque<GatewayResult<Option<ResourceItem>>>>,
    pub uploads: RefCell<VecDeque<GatewayResult<StoredFile>>>,
    pub options_unauthorized: Cell<bool>,
    pub list_queries: RefCell<Vec<ListQuery>>,
    pub created: RefCell<Vec<Map<String, Value>>>,
    pub updated: RefCell<Vec<(ResourceId, Map<String, Value>)>>,
    pub option_calls: Cell<usize>,
    pub upload_calls: RefCell<Vec<(String, String)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: GatewayResult<ListPage>) {
        self.pages.borrow_mut().push_back(page);
    }

    pub fn push_write(&self, result: GatewayResult<Option<ResourceItem>>) {
        self.writes.borrow_mut().push_back(result);
    }

    pub fn push_upload(&self, result: GatewayResult<StoredFile>) {
        self.uploads.borrow_mut().push_back(result);
    }

    pub fn list_calls(&self) -> usize {
        self.list_queries.borrow().len()
    }

    pub fn last_query(&self) -> ListQuery {
        self.list_queries
            .borrow()
            .last()
            .cloned()
            .expect("no list request was made")
    }

    pub fn write_calls(&self) -> usize {
        self.created.borrow().len() + self.updated.borrow().len()
    }
}

#[async_trait(?Send)]
impl ResourceReader for FakeGateway {
    async fn list(&self, query: &ListQuery) -> GatewayResult<ListPage> {
        self.list_queries.borrow_mut().push(query.clone());
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(page(Vec::new(), 1, 1)))
    }

    async fn filter_options(&self) -> GatewayResult<FilterOptions> {
        self.option_calls.set(self.option_calls.get() + 1);
        if self.options_unauthorized.get() {
            return Err(GatewayError::Unauthorized);
        }
        Ok(FilterOptions::new())
    }
}

#[async_trait(?Send)]
impl ResourceWriter for FakeGateway {
    async fn create(&self, payload: &Map<String, Value>) -> GatewayResult<Option<ResourceItem>> {
        self.created.borrow_mut().push(payload.clone());
        self.writes.borrow_mut().pop_front().unwrap_or(Ok(None))
    }

    async fn update(
        &self,
        id: &ResourceId,
        payload: &Map<String, Value>,
    ) -> GatewayResult<Option<ResourceItem>> {
        self.updated
            .borrow_mut()
            .push((id.clone(), payload.clone()));
        self.writes.borrow_mut().pop_front().unwrap_or(Ok(None))
    }
}

#[async_trait(?Send)]
impl FileUploader for FakeGateway {
    async fn upload_file(
        &self,
        file: &UploadFile,
        destination: &str,
    ) -> GatewayResult<StoredFile> {
        self.upload_calls
            .borrow_mut()
            .push((file.file_name.clone(), destination.to_string()));
        self.uploads.borrow_mut().pop_front().unwrap_or_else(|| {
            let path = format!("{destination}{}", file.file_name);
            Ok(StoredFile {
                url: format!("https://api.example.com/{path}"),
                path,
            })
        })
    }

    fn file_url(&self, reference: &str) -> String {
        if reference.starts_with("http") {
            reference.to_string()
        } else {
            format!("https://api.example.com/{}", reference.trim_start_matches('/'))
        }
    }
}

pub fn item(value: Value) -> ResourceItem {
    ResourceItem::from_json(value).expect("valid record")
}

pub fn page(items: Vec<ResourceItem>, current_page: usize, total_pages: usize) -> ListPage {
    let count = items.len();
    ListPage {
        items,
        paginator: Paginator {
            current_page,
            total_pages,
            records_per_page: 10,
            current_page_item_count: count,
            total_count: total_pages * 10,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        },
    }
}

pub fn upload(file_name: &str) -> UploadFile {
    UploadFile {
        file_name: file_name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![1, 2, 3],
    }
}
