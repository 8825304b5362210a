//! Generic list/filter/form controller shared by every resource screen.
//!
//! The controller owns the screen state; the host (a route handler) feeds it
//! operator actions and renders whatever state it ends up in. All network
//! work goes through a [`ResourceGateway`].

use serde::Serialize;

use crate::domain::filter::FilterState;
use crate::domain::item::ResourceItem;
use crate::domain::options::FilterOptions;
use crate::domain::paginator::Paginator;
use crate::domain::types::{ResourceId, StoredFile, UploadFile};
use crate::forms::draft::DraftState;
use crate::gateway::errors::{GatewayError, GatewayResult};
use crate::gateway::{ListPage, ListQuery, ResourceGateway};
use crate::resources::{FieldKind, FilterMode, ResourceDescriptor};
use crate::services::{ServiceError, ServiceResult};
use crate::session::{SessionContext, SessionEnd};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Loading,
    Loaded,
    /// The session was rejected; nothing else is accepted until remount.
    AuthFailed,
    Submitting,
}

/// A list request handed out by [`ResourceListController::begin_load`].
/// Only the most recently issued ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    pub query: ListQuery,
}

pub struct ResourceListController<G: ResourceGateway> {
    descriptor: &'static ResourceDescriptor,
    gateway: G,
    session: SessionContext,
    state: ControllerState,
    current_page: usize,
    per_page: usize,
    /// Selections being edited in the filter bar.
    filters: FilterState,
    /// Selections the current items were fetched with.
    applied_filters: FilterState,
    items: Vec<ResourceItem>,
    paginator: Paginator,
    options: FilterOptions,
    /// The open form; `None` while the form is hidden.
    draft: Option<DraftState>,
    notice: Option<String>,
    issued: u64,
}

impl<G: ResourceGateway> ResourceListController<G> {
    pub fn new(
        descriptor: &'static ResourceDescriptor,
        gateway: G,
        session: SessionContext,
        per_page: usize,
    ) -> Self {
        Self {
            descriptor,
            gateway,
            session,
            state: ControllerState::Idle,
            current_page: 1,
            per_page: per_page.max(1),
            filters: FilterState::new(),
            applied_filters: FilterState::new(),
            items: Vec::new(),
            paginator: Paginator::empty(),
            options: FilterOptions::new(),
            draft: None,
            notice: None,
            issued: 0,
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items(&self) -> &[ResourceItem] {
        &self.items
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn applied_filters(&self) -> &FilterState {
        &self.applied_filters
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn draft(&self) -> Option<&DraftState> {
        self.draft.as_ref()
    }

    pub fn is_form_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Non-fatal error to show next to the table or form.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Restores page and filters carried over from a previous view, e.g. a
    /// query string, without fetching anything.
    pub fn restore_view(&mut self, page: usize, filters: FilterState) {
        self.current_page = page.max(1);
        self.filters = filters.clone();
        self.applied_filters = filters;
    }

    /// Issues a ticket for fetching the current page with the applied
    /// filters. After an auth failure no more tickets are issued.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.state == ControllerState::AuthFailed {
            return None;
        }

        self.issued += 1;
        self.state = ControllerState::Loading;

        let descriptor = self.descriptor;
        let server_filters = self.applied_filters.retain(|field| {
            descriptor
                .filter(field)
                .is_none_or(|f| f.mode == FilterMode::Server)
        });

        Some(LoadTicket {
            seq: self.issued,
            query: ListQuery::new()
                .paginate(self.current_page, self.per_page)
                .filters(&server_filters),
        })
    }

    /// Applies the outcome of a ticket. Returns `false` when the result was
    /// discarded because a newer ticket was issued or the session failed.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: GatewayResult<ListPage>) -> bool {
        if self.state == ControllerState::AuthFailed || ticket.seq != self.issued {
            log::debug!(
                "Discarding stale {} page response #{}",
                self.descriptor.key,
                ticket.seq
            );
            return false;
        }

        match result {
            Ok(page) => {
                let descriptor = self.descriptor;
                let client_filters = self.applied_filters.retain(|field| {
                    descriptor
                        .filter(field)
                        .is_some_and(|f| f.mode == FilterMode::Client)
                });

                self.items = page
                    .items
                    .into_iter()
                    .filter(|item| client_filters.matches(item))
                    .collect();
                self.paginator = page.paginator;
                self.current_page = self.paginator.current_page;
                self.notice = None;
                self.state = ControllerState::Loaded;
            }
            Err(GatewayError::Unauthorized) => self.fail_auth(),
            Err(err) => {
                log::error!("Failed to load {}: {err}", self.descriptor.key);
                self.notice = Some(err.to_string());
                self.state = ControllerState::Loaded;
            }
        }

        true
    }

    fn fail_auth(&mut self) {
        if self.state != ControllerState::AuthFailed {
            self.state = ControllerState::AuthFailed;
            self.session.end(SessionEnd::Expired);
        }
    }

    fn ensure_active(&self) -> ServiceResult<()> {
        match self.state {
            ControllerState::AuthFailed => Err(ServiceError::Unauthorized),
            _ => Ok(()),
        }
    }

    /// Fetches the current page; resolves to `Loaded` or `AuthFailed`.
    pub async fn reload(&mut self) -> ServiceResult<()> {
        let ticket = self.begin_load().ok_or(ServiceError::Unauthorized)?;
        let result = self.gateway.list(&ticket.query).await;
        self.complete_load(ticket, result);
        self.ensure_active()
    }

    /// Loads the option lists for filters and selects. Failures other than
    /// an auth failure leave the lists empty.
    pub async fn load_options(&mut self) -> ServiceResult<()> {
        self.ensure_active()?;
        if self.descriptor.endpoints.option_sources.is_empty() {
            return Ok(());
        }

        match self.gateway.filter_options().await {
            Ok(options) => self.options = options,
            Err(GatewayError::Unauthorized) => {
                self.fail_auth();
                return Err(ServiceError::Unauthorized);
            }
            Err(err) => {
                log::warn!("Failed to load {} options: {err}", self.descriptor.key);
            }
        }
        Ok(())
    }

    /// Loads the option lists, then the current page.
    pub async fn mount(&mut self) -> ServiceResult<()> {
        self.load_options().await?;
        self.reload().await
    }

    /// Edits the filter bar; nothing is fetched until [`Self::apply_filter`].
    pub fn set_filter(&mut self, field: impl Into<String>, value: Option<String>) {
        self.filters.set(field, value);
    }

    pub async fn apply_filter(&mut self) -> ServiceResult<()> {
        self.applied_filters = self.filters.clone();
        self.current_page = 1;
        self.reload().await
    }

    pub async fn clear_filter(&mut self) -> ServiceResult<()> {
        self.filters.clear();
        self.applied_filters.clear();
        self.current_page = 1;
        self.reload().await
    }

    /// Moves to `page`, clamped to the last known page range.
    pub async fn change_page(&mut self, page: usize) -> ServiceResult<()> {
        self.current_page = self.paginator.clamp_page(page);
        self.reload().await
    }

    pub fn open_create(&mut self) -> ServiceResult<()> {
        self.ensure_active()?;
        if !self.descriptor.can_create() {
            return Err(ServiceError::Form(format!(
                "{} cannot be created here",
                self.descriptor.title
            )));
        }
        self.draft = Some(DraftState::empty());
        Ok(())
    }

    pub fn open_edit(&mut self, item: &ResourceItem) -> ServiceResult<()> {
        self.ensure_active()?;
        if !self.descriptor.can_update() {
            return Err(ServiceError::Form(format!(
                "{} cannot be edited",
                self.descriptor.title
            )));
        }
        let gateway = &self.gateway;
        self.draft = Some(DraftState::from_item(item, self.descriptor, |reference| {
            gateway.file_url(reference)
        }));
        Ok(())
    }

    /// Opens the form for a record of the loaded page.
    pub fn open_edit_by_id(&mut self, id: &ResourceId) -> ServiceResult<()> {
        let item = self
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or(ServiceError::NotFound)?;
        self.open_edit(&item)
    }

    /// Puts a draft back into the form, e.g. when re-rendering a submission.
    pub fn open_draft(&mut self, draft: DraftState) {
        self.draft = Some(draft);
    }

    pub fn close_form(&mut self) {
        self.draft = None;
    }

    /// Uploads a file picked for `field` of the open form and stores the
    /// returned reference in the draft. A failed upload blocks submission
    /// until the field receives a new value.
    pub async fn upload_file(&mut self, field: &str, file: UploadFile) -> ServiceResult<StoredFile> {
        self.ensure_active()?;
        if self.draft.is_none() {
            return Err(ServiceError::Form("no form is open".to_string()));
        }
        if self
            .descriptor
            .field(field)
            .is_none_or(|spec| spec.kind != FieldKind::File)
        {
            return Err(ServiceError::Form(format!("{field} does not accept files")));
        }

        let destination = self.descriptor.upload_dir.unwrap_or_default();
        let result = self.gateway.upload_file(&file, destination).await;

        match result {
            Ok(stored) => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.set(field, stored.url.clone());
                    if self.descriptor.field("file_name").is_some()
                        && draft.get("file_name").is_none_or(|name| name.trim().is_empty())
                    {
                        draft.set("file_name", file.stem());
                    }
                }
                Ok(stored)
            }
            Err(GatewayError::Unauthorized) => {
                self.fail_auth();
                Err(ServiceError::Unauthorized)
            }
            Err(err) => {
                log::error!("Failed to upload {} for {field}: {err}", file.file_name);
                if let Some(draft) = self.draft.as_mut() {
                    draft.mark_upload_failed(field);
                }
                self.notice = Some(err.to_string());
                Err(ServiceError::Upload(err.to_string()))
            }
        }
    }

    /// Validates and sends the draft: update when it has an id, create
    /// otherwise. On success the form closes and the page is fetched again.
    pub async fn submit(&mut self, draft: DraftState) -> ServiceResult<()> {
        self.ensure_active()?;

        let mut draft = draft;
        let prepared = draft.validate(self.descriptor).and_then(|()| {
            match self.descriptor.prepare {
                Some(prepare) => prepare(&mut draft),
                None => Ok(()),
            }
        });
        if let Err(err) = prepared {
            self.notice = Some(err.to_string());
            self.draft = Some(draft);
            return Err(err.into());
        }

        self.state = ControllerState::Submitting;

        let payload = draft.clone().into_payload(self.descriptor);
        let result = match &draft.id {
            Some(id) => self.gateway.update(id, &payload).await,
            None => self.gateway.create(&payload).await,
        };

        match result {
            Ok(_) => {
                log::info!("Saved {} record", self.descriptor.key);
                self.draft = None;
                self.notice = None;
                self.reload().await
            }
            Err(GatewayError::Unauthorized) => {
                self.fail_auth();
                Err(ServiceError::Unauthorized)
            }
            Err(err) => {
                log::error!("Failed to save {} record: {err}", self.descriptor.key);
                self.state = ControllerState::Loaded;
                self.notice = Some(err.to_string());
                self.draft = Some(draft);
                Err(err.into())
            }
        }
    }
}
