//! Data-driven descriptions of the resources managed by the console.
//!
//! Every list screen is the same controller configured with one of these
//! descriptors; adding a screen means adding a descriptor to [`catalog`].

use serde::Serialize;

use crate::domain::item::ResourceItem;
use crate::domain::order::OrderLine;
use crate::forms::FormError;
use crate::forms::draft::DraftState;

pub mod catalog;

/// HTTP method used for an endpoint.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

/// How the list endpoint expects its parameters.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum ListStyle {
    /// `GET` with `page`, `per_page` and filters in the query string.
    Query,
    /// `POST` with `page` in the query string and filters in a JSON body.
    JsonBody,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Endpoints {
    pub list: &'static str,
    pub list_style: ListStyle,
    pub create: Option<&'static str>,
    pub update: Option<&'static str>,
    pub update_method: HttpMethod,
    /// Endpoints returning option lists for filters and selects; their
    /// `data` objects are merged.
    pub option_sources: &'static [OptionSource],
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct OptionSource {
    pub path: &'static str,
    pub method: HttpMethod,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Date,
    Email,
    Password,
    Url,
    /// Value picked from an option list served by the filter-data endpoint.
    Select,
    /// Several values from an option list, sent as an array.
    MultiSelect,
    /// Reference to an uploaded file.
    File,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum Required {
    Always,
    /// Only when creating a record (e.g. a user's initial password).
    OnCreate,
    Never,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldSpec {
    /// Wire name of the field in payloads and list rows.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: Required,
    /// Field is shown as a column in the list table.
    pub listed: bool,
    /// Field can be changed after creation.
    pub editable: bool,
    /// Field appears in the create/update form.
    pub form: bool,
    /// Key of the option list in the filter-data response, for selects.
    pub options: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: Required::Never,
            listed: true,
            editable: true,
            form: true,
            options: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = Required::Always;
        self
    }

    pub const fn required_on_create(mut self) -> Self {
        self.required = Required::OnCreate;
        self
    }

    pub const fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }

    pub const fn fixed(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Shown in the table only; never part of a payload.
    pub const fn display_only(mut self) -> Self {
        self.form = false;
        self
    }

    pub const fn options(mut self, key: &'static str) -> Self {
        self.options = Some(key);
        self
    }

    /// Whether the field must be filled for a draft with or without an id.
    pub fn is_required(&self, creating: bool) -> bool {
        match self.required {
            Required::Always => true,
            Required::OnCreate => creating,
            Required::Never => false,
        }
    }
}

/// Where a filter is evaluated.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum FilterMode {
    /// Sent to the list endpoint as a request parameter.
    Server,
    /// Applied to the fetched page in memory.
    Client,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct FilterSpec {
    pub param: &'static str,
    pub label: &'static str,
    pub mode: FilterMode,
    /// Key of the option list in the filter-data response.
    pub options: Option<&'static str>,
    /// Free-form date input instead of a select.
    pub date: bool,
}

impl FilterSpec {
    pub const fn server(param: &'static str, label: &'static str) -> Self {
        Self {
            param,
            label,
            mode: FilterMode::Server,
            options: None,
            date: false,
        }
    }

    pub const fn client(mut self) -> Self {
        self.mode = FilterMode::Client;
        self
    }

    pub const fn options(mut self, key: &'static str) -> Self {
        self.options = Some(key);
        self
    }

    pub const fn date(mut self) -> Self {
        self.date = true;
        self
    }
}

/// Whether file fields travel as API-relative paths or absolute URLs.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum FileReference {
    Relative,
    Absolute,
}

/// Resource-specific adjustment applied to a draft before it is submitted.
pub type PrepareDraft = fn(&mut DraftState) -> Result<(), FormError>;

/// Adds derived display columns to a fetched record.
pub type DecorateItem = fn(&mut ResourceItem);

/// Read-only lines listed under the edit form of a record.
pub type LineItems = fn(&ResourceItem) -> Vec<OrderLine>;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResourceDescriptor {
    /// URL slug of the screen.
    pub key: &'static str,
    pub title: &'static str,
    /// Singular noun used in form titles.
    pub singular: &'static str,
    pub endpoints: Endpoints,
    pub fields: &'static [FieldSpec],
    pub filters: &'static [FilterSpec],
    /// Upload directory hint passed to the file endpoint.
    pub upload_dir: Option<&'static str>,
    pub file_reference: FileReference,
    #[serde(skip)]
    pub prepare: Option<PrepareDraft>,
    #[serde(skip)]
    pub decorate: Option<DecorateItem>,
    #[serde(skip)]
    pub line_items: Option<LineItems>,
}

impl ResourceDescriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn filter(&self, param: &str) -> Option<&'static FilterSpec> {
        self.filters.iter().find(|f| f.param == param)
    }

    pub fn can_create(&self) -> bool {
        self.endpoints.create.is_some()
    }

    pub fn can_update(&self) -> bool {
        self.endpoints.update.is_some()
    }

    pub fn file_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.kind == FieldKind::File)
    }

    pub fn listed_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.listed)
    }

    pub fn form_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.form)
    }

    /// Filters evaluated by the list endpoint.
    pub fn is_server_filter(&self, param: &str) -> bool {
        self.filter(param)
            .is_some_and(|f| f.mode == FilterMode::Server)
    }
}

/// Looks a descriptor up by its URL slug.
pub fn find(key: &str) -> Option<&'static ResourceDescriptor> {
    catalog::ALL.iter().copied().find(|d| d.key == key)
}

/// Every resource screen, in menu order.
pub fn all() -> &'static [&'static ResourceDescriptor] {
    catalog::ALL
}
