//! `reqwest` implementation of the gateway traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::domain::item::ResourceItem;
use crate::domain::mock_test::MockTestDetail;
use crate::domain::options::FilterOptions;
use crate::domain::paginator::{Paginator, WirePaginator};
use crate::domain::types::{ResourceId, StoredFile, UploadFile};
use crate::gateway::errors::{GatewayError, GatewayResult};
use crate::gateway::{
    AuthGateway, FileUploader, ListPage, ListQuery, LoginGrant, QuestionBank, ResourceReader,
    ResourceWriter,
};
use crate::models::config::ApiConfig;
use crate::resources::{FileReference, HttpMethod, ListStyle, ResourceDescriptor};
use crate::session::SessionContext;

const LOGIN_PATH: &str = "/api/v1/login";
const FILE_UPLOAD_PATH: &str = "/api/v1/file/file-upload";
const MOCK_TEST_DETAIL_PATH: &str = "/api/v1/mock-test/single-data";
const ADD_QUESTIONS_PATH: &str = "/api/v1/mock-test/add-questions";
const CLEAR_QUESTIONS_PATH: &str = "/api/v1/mock-test/questions-clear";
const DELETE_QUESTION_PATH: &str = "/api/v1/mock-test/single-question-delete";

/// `{status, message, data}` wrapper around every API response.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Builds the shared HTTP client with the configured timeout.
pub fn build_http_client(config: &ApiConfig) -> GatewayResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()
        .map_err(|e| GatewayError::Transport(e.to_string()))
}

/// Connection to the API on behalf of the current session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(http: Client, config: ApiConfig, session: SessionContext) -> Self {
        Self {
            http,
            config,
            session,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base(), path.trim_start_matches('/'))
    }

    fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder {
        let url = self.url(path);
        match method {
            HttpMethod::Get => self.http.get(url),
            HttpMethod::Post => self.http.post(url),
            HttpMethod::Put => self.http.put(url),
        }
    }

    /// Sends an authenticated request and unwraps the envelope's `data`.
    /// Without a token nothing is sent.
    async fn send(&self, request: RequestBuilder) -> GatewayResult<Value> {
        let token = self.session.auth_token().ok_or(GatewayError::Unauthorized)?;
        let response = request.bearer_auth(token).send().await?;
        read_envelope(response).await
    }

    /// Stored path for an upload response; the API may answer with an
    /// absolute URL, a rooted path or a bare file name.
    fn normalize_stored_path(&self, raw: &str, destination: &str) -> Option<String> {
        let raw = raw.trim();
        let without_base = raw.strip_prefix(self.config.base()).unwrap_or(raw);
        let path = without_base.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        if path.contains('/') {
            Some(path.to_string())
        } else {
            let destination = destination.trim_start_matches('/');
            let separator = if destination.is_empty() || destination.ends_with('/') {
                ""
            } else {
                "/"
            };
            Some(format!("{destination}{separator}{path}"))
        }
    }

    fn stored_file(&self, path: String) -> StoredFile {
        let url = self.absolute_url(&path);
        StoredFile { path, url }
    }

    fn absolute_url(&self, reference: &str) -> String {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            self.url(reference)
        }
    }

    /// Inverse of [`ApiClient::absolute_url`] for files served by this API.
    fn relative_path(&self, reference: &str) -> String {
        let reference = reference.trim();
        reference
            .strip_prefix(self.config.base())
            .unwrap_or(reference)
            .trim_start_matches('/')
            .to_string()
    }

    pub async fn upload(&self, file: &UploadFile, destination: &str) -> GatewayResult<StoredFile> {
        let part = file_part(file)?;
        let request = self
            .request(HttpMethod::Post, FILE_UPLOAD_PATH)
            .query(&[("file_name", file.stem()), ("file_path", destination)])
            .multipart(Form::new().part("file", part));

        let data = self.send(request).await.map_err(|err| match err {
            GatewayError::Api { message, .. } | GatewayError::Decode(message) => {
                GatewayError::Upload(message)
            }
            other => other,
        })?;

        let raw = data
            .get("file_path")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Upload("response has no file_path".to_string()))?;
        let path = self
            .normalize_stored_path(raw, destination)
            .ok_or_else(|| GatewayError::Upload("response has an empty file_path".to_string()))?;

        log::debug!("Uploaded {} to {path}", file.file_name);
        Ok(self.stored_file(path))
    }
}

fn file_part(file: &UploadFile) -> GatewayResult<Part> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match file.content_type.as_deref() {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|e| GatewayError::Upload(e.to_string())),
        None => Ok(part),
    }
}

async fn read_envelope(response: Response) -> GatewayResult<Value> {
    let status = response.status();
    let body = response.text().await?;
    let envelope: Option<Envelope> = serde_json::from_str(&body).ok();

    if !status.is_success() {
        let message = envelope
            .as_ref()
            .and_then(Envelope::message_text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        return Err(GatewayError::from_status(status.as_u16(), message));
    }

    let envelope = envelope.ok_or_else(|| GatewayError::Decode(truncate(&body)))?;
    match envelope.status.as_deref() {
        Some("success") | None => Ok(envelope.data),
        Some(_) => Err(GatewayError::Api {
            status: status.as_u16(),
            message: envelope
                .message_text()
                .unwrap_or_else(|| "request failed".to_string()),
        }),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Decodes list data: `{data: [...], paginator}` or a bare array.
pub(crate) fn decode_list(data: Value) -> GatewayResult<ListPage> {
    let (rows, wire) = match data {
        Value::Array(rows) => (rows, None),
        Value::Object(mut object) => {
            let rows = match object.remove("data") {
                Some(Value::Array(rows)) => rows,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(GatewayError::Decode(format!(
                        "list data is not an array: {}",
                        truncate(&other.to_string())
                    )));
                }
            };
            let wire = match object.remove("paginator") {
                Some(Value::Null) | None => None,
                Some(value) => Some(
                    serde_json::from_value::<WirePaginator>(value)
                        .map_err(|e| GatewayError::Decode(e.to_string()))?,
                ),
            };
            (rows, wire)
        }
        Value::Null => (Vec::new(), None),
        other => {
            return Err(GatewayError::Decode(format!(
                "unexpected list data: {}",
                truncate(&other.to_string())
            )));
        }
    };

    let items = rows
        .into_iter()
        .map(ResourceItem::from_json)
        .collect::<Result<Vec<_>, _>>()
        .map_err(GatewayError::Decode)?;

    let paginator = match wire {
        Some(wire) => Paginator::from_wire(wire),
        None => Paginator::single_page(items.len()),
    };

    Ok(ListPage { items, paginator })
}

fn decode_record(data: Value) -> Option<ResourceItem> {
    match data {
        Value::Object(_) => ResourceItem::from_json(data).ok(),
        _ => None,
    }
}

#[async_trait(?Send)]
impl AuthGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<LoginGrant> {
        let response = self
            .request(HttpMethod::Post, LOGIN_PATH)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let data = read_envelope(response).await?;

        let user = data
            .get("user")
            .ok_or_else(|| GatewayError::Decode("login response has no user".to_string()))?;
        let token = user
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GatewayError::Decode("login response has no token".to_string()))?;
        let user_name = user
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(email);

        Ok(LoginGrant {
            token: token.to_string(),
            user_name: user_name.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl QuestionBank for ApiClient {
    async fn mock_test_detail(&self, id: &ResourceId) -> GatewayResult<MockTestDetail> {
        let path = format!("{MOCK_TEST_DETAIL_PATH}/{id}");
        let data = self.send(self.request(HttpMethod::Get, &path)).await?;
        serde_json::from_value(data).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn upload_questions(&self, id: &ResourceId, file: &UploadFile) -> GatewayResult<()> {
        let form = Form::new()
            .part("question_file", file_part(file)?)
            .text("mock_test_id", id.to_string());
        let request = self
            .request(HttpMethod::Post, ADD_QUESTIONS_PATH)
            .multipart(form);
        self.send(request).await.map(|_| ())
    }

    async fn clear_questions(&self, id: &ResourceId) -> GatewayResult<()> {
        let request = self
            .request(HttpMethod::Post, CLEAR_QUESTIONS_PATH)
            .json(&json!({ "mock_test_id": id.to_json() }));
        self.send(request).await.map(|_| ())
    }

    async fn delete_question(&self, question_id: &ResourceId) -> GatewayResult<()> {
        let request = self
            .request(HttpMethod::Post, DELETE_QUESTION_PATH)
            .json(&json!({ "mock_test_ques_id": question_id.to_json() }));
        self.send(request).await.map(|_| ())
    }
}

/// Gateway of one resource screen.
#[derive(Clone)]
pub struct HttpGateway {
    api: ApiClient,
    descriptor: &'static ResourceDescriptor,
}

impl HttpGateway {
    pub fn new(api: ApiClient, descriptor: &'static ResourceDescriptor) -> Self {
        Self { api, descriptor }
    }

    /// Rewrites file fields into the form the resource stores.
    fn encode_files(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        let mut payload = payload.clone();
        for spec in self.descriptor.file_fields() {
            if let Some(Value::String(reference)) = payload.get_mut(spec.name) {
                *reference = match self.descriptor.file_reference {
                    FileReference::Relative => self.api.relative_path(reference),
                    FileReference::Absolute => self.api.absolute_url(reference),
                };
            }
        }
        payload
    }
}

#[async_trait(?Send)]
impl ResourceReader for HttpGateway {
    async fn list(&self, query: &ListQuery) -> GatewayResult<ListPage> {
        let endpoints = &self.descriptor.endpoints;
        let page = query.pagination.page.to_string();
        let per_page = query.pagination.per_page.to_string();

        let request = match endpoints.list_style {
            ListStyle::Query => {
                let mut params = vec![("page", page.as_str()), ("per_page", per_page.as_str())];
                params.extend(query.filters.iter());
                self.api
                    .request(HttpMethod::Get, endpoints.list)
                    .query(&params)
            }
            ListStyle::JsonBody => {
                let body: Map<String, Value> = query
                    .filters
                    .iter()
                    .map(|(field, value)| (field.to_string(), Value::String(value.to_string())))
                    .collect();
                self.api
                    .request(HttpMethod::Post, endpoints.list)
                    .query(&[("page", page.as_str()), ("per_page", per_page.as_str())])
                    .json(&body)
            }
        };

        let data = self.api.send(request).await?;
        decode_list(data)
    }

    async fn filter_options(&self) -> GatewayResult<FilterOptions> {
        let mut options = FilterOptions::new();
        for source in self.descriptor.endpoints.option_sources {
            let request = match source.method {
                HttpMethod::Get => self.api.request(HttpMethod::Get, source.path),
                method => self.api.request(method, source.path).json(&json!({})),
            };
            match self.api.send(request).await? {
                Value::Object(data) => options.merge(FilterOptions::from_data(&data)),
                other => log::warn!(
                    "Ignoring option data from {} that is not an object: {}",
                    source.path,
                    truncate(&other.to_string())
                ),
            }
        }
        Ok(options)
    }
}

#[async_trait(?Send)]
impl ResourceWriter for HttpGateway {
    async fn create(&self, payload: &Map<String, Value>) -> GatewayResult<Option<ResourceItem>> {
        let path = self.descriptor.endpoints.create.ok_or_else(|| GatewayError::Api {
            status: 405,
            message: format!("{} cannot be created", self.descriptor.title),
        })?;
        let request = self
            .api
            .request(HttpMethod::Post, path)
            .json(&self.encode_files(payload));
        Ok(decode_record(self.api.send(request).await?))
    }

    async fn update(
        &self,
        id: &ResourceId,
        payload: &Map<String, Value>,
    ) -> GatewayResult<Option<ResourceItem>> {
        let endpoints = &self.descriptor.endpoints;
        let path = endpoints.update.ok_or_else(|| GatewayError::Api {
            status: 405,
            message: format!("{} cannot be updated", self.descriptor.title),
        })?;
        let mut body = self.encode_files(payload);
        body.insert("id".to_string(), id.to_json());

        let request = self.api.request(endpoints.update_method, path).json(&body);
        Ok(decode_record(self.api.send(request).await?))
    }
}

#[async_trait(?Send)]
impl FileUploader for HttpGateway {
    async fn upload_file(
        &self,
        file: &UploadFile,
        destination: &str,
    ) -> GatewayResult<StoredFile> {
        self.api.upload(file, destination).await
    }

    fn file_url(&self, reference: &str) -> String {
        self.api.absolute_url(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::catalog::SLIDERS;

    fn api() -> ApiClient {
        let config = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            timeout_secs: 30,
            per_page: 10,
        };
        ApiClient::new(Client::new(), config, SessionContext::in_memory())
    }

    #[test]
    fn upload_paths_are_normalized() {
        let api = api();
        let dest = "uploads/modules/events/";

        assert_eq!(
            api.normalize_stored_path("https://api.example.com/uploads/modules/events/a.png", dest),
            Some("uploads/modules/events/a.png".to_string())
        );
        assert_eq!(
            api.normalize_stored_path("/uploads/modules/events/a.png", dest),
            Some("uploads/modules/events/a.png".to_string())
        );
        assert_eq!(
            api.normalize_stored_path("a.png", dest),
            Some("uploads/modules/events/a.png".to_string())
        );
        assert_eq!(api.normalize_stored_path(" / ", dest), None);
    }

    #[test]
    fn file_urls_are_absolute_and_idempotent() {
        let api = api();
        let url = api.absolute_url("uploads/a.png");
        assert_eq!(url, "https://api.example.com/uploads/a.png");
        assert_eq!(api.absolute_url(&url), url);
        assert_eq!(api.relative_path(&url), "uploads/a.png");
    }

    #[test]
    fn absolute_resources_send_full_urls() {
        let gateway = HttpGateway::new(api(), &SLIDERS);
        let mut payload = Map::new();
        payload.insert("file_path".into(), json!("uploads/modules/home-main-slider/a.png"));
        payload.insert("file_name".into(), json!("a"));

        let encoded = gateway.encode_files(&payload);

        assert_eq!(
            encoded["file_path"],
            json!("https://api.example.com/uploads/modules/home-main-slider/a.png")
        );
        assert_eq!(encoded["file_name"], json!("a"));
    }

    #[test]
    fn list_data_with_and_without_paginator() {
        let page = decode_list(json!({
            "data": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}],
            "paginator": {
                "current_page": 2,
                "total_pages": "3",
                "record_per_page": 2,
                "current_page_items_count": 2,
                "total_count": 6,
                "previous_page_url": "https://api.example.com/x?page=1",
                "next_page_url": "https://api.example.com/x?page=3"
            }
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.paginator.current_page, 2);
        assert_eq!(page.paginator.total_pages, 3);
        assert!(page.paginator.has_previous && page.paginator.has_next);

        let bare = decode_list(json!([{"id": 1}])).unwrap();
        assert_eq!(bare.paginator, Paginator::single_page(1));

        assert!(matches!(
            decode_list(json!({"data": [{"title": "no id"}]})),
            Err(GatewayError::Decode(_))
        ));
    }

    #[actix_web::test]
    async fn missing_token_fails_before_any_request() {
        let gateway = HttpGateway::new(api(), &SLIDERS);
        let result = gateway.list(&ListQuery::new()).await;
        assert!(matches!(result, Err(GatewayError::Unauthorized)));
    }
}
