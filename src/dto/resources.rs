//! Template-facing view of a resource screen.

use serde::Serialize;

use crate::domain::item::ResourceItem;
use crate::domain::options::{FilterOptions, SelectOption};
use crate::domain::order::OrderLine;
use crate::forms::draft::DraftState;
use crate::gateway::ResourceGateway;
use crate::pagination::Paginated;
use crate::resources::{FieldKind, FieldSpec, ResourceDescriptor};
use crate::services::controller::{ControllerState, ResourceListController};

#[derive(Debug, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Serialize)]
pub struct Cell {
    pub text: String,
    /// Link target for file cells.
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Serialize)]
pub struct FilterView {
    pub param: &'static str,
    pub label: &'static str,
    pub date: bool,
    pub value: String,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Locked when editing an existing record.
    pub readonly: bool,
    pub value: String,
    /// Values selected in a multi-select.
    pub selected: Vec<String>,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub title: String,
    pub id: Option<String>,
    pub fields: Vec<FieldView>,
    /// Read-only lines of the edited record, such as an order's products.
    pub lines: Vec<OrderLine>,
}

/// Everything `resources/index.html` and `resources/form.html` render.
#[derive(Debug, Serialize)]
pub struct ResourcePageData {
    pub key: &'static str,
    pub title: &'static str,
    pub singular: &'static str,
    pub can_create: bool,
    pub can_update: bool,
    pub has_questions: bool,
    pub state: ControllerState,
    pub columns: Vec<Column>,
    pub page: Paginated<Row>,
    pub filters: Vec<FilterView>,
    /// Applied filters as a query string, for page links.
    pub filter_query: String,
    pub notice: Option<String>,
    pub form: Option<FormView>,
}

impl ResourcePageData {
    pub fn from_controller<G: ResourceGateway>(controller: &ResourceListController<G>) -> Self {
        let descriptor = controller.descriptor();
        let options = controller.options();
        let gateway = controller.gateway();

        let columns = descriptor
            .listed_fields()
            .map(|spec| Column {
                name: spec.name,
                label: spec.label,
                kind: spec.kind,
            })
            .collect();

        let rows = controller
            .items()
            .iter()
            .map(|item| row(item, descriptor, options, |r| gateway.file_url(r)))
            .collect();

        let filters = descriptor
            .filters
            .iter()
            .map(|spec| FilterView {
                param: spec.param,
                label: spec.label,
                date: spec.date,
                value: controller
                    .filters()
                    .get(spec.param)
                    .unwrap_or_default()
                    .to_string(),
                options: spec
                    .options
                    .map(|key| options.get(key).to_vec())
                    .unwrap_or_default(),
            })
            .collect();

        let applied: Vec<(&str, &str)> = controller.applied_filters().iter().collect();
        let filter_query = serde_html_form::to_string(&applied).unwrap_or_default();

        Self {
            key: descriptor.key,
            title: descriptor.title,
            singular: descriptor.singular,
            can_create: descriptor.can_create(),
            can_update: descriptor.can_update(),
            has_questions: descriptor.key == "mock-tests",
            state: controller.state(),
            columns,
            page: Paginated::new(rows, controller.paginator()),
            filters,
            filter_query,
            notice: controller.notice().map(str::to_string),
            form: controller
                .draft()
                .map(|draft| form_view(draft, descriptor, options, controller.items())),
        }
    }
}

fn row(
    item: &ResourceItem,
    descriptor: &ResourceDescriptor,
    options: &FilterOptions,
    file_url: impl Fn(&str) -> String,
) -> Row {
    let decorated;
    let item = match descriptor.decorate {
        Some(decorate) => {
            let mut copy = item.clone();
            decorate(&mut copy);
            decorated = copy;
            &decorated
        }
        None => item,
    };

    let cells = descriptor
        .listed_fields()
        .map(|spec| {
            let text = item.text(spec.name);
            match (spec.kind, spec.options) {
                (FieldKind::File, _) if !text.trim().is_empty() => Cell {
                    url: Some(file_url(&text)),
                    text,
                },
                (FieldKind::Select, Some(key)) => Cell {
                    text: options.label_for(key, &text).to_string(),
                    url: None,
                },
                _ => Cell { text, url: None },
            }
        })
        .collect();

    Row {
        id: item.id.to_string(),
        cells,
    }
}

fn form_view(
    draft: &DraftState,
    descriptor: &ResourceDescriptor,
    options: &FilterOptions,
    items: &[ResourceItem],
) -> FormView {
    let creating = draft.is_new();
    let title = if creating {
        format!("New {}", descriptor.singular)
    } else {
        format!("Edit {}", descriptor.singular)
    };

    let lines = match (descriptor.line_items, &draft.id) {
        (Some(lines_of), Some(id)) => items
            .iter()
            .find(|item| &item.id == id)
            .map(lines_of)
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    FormView {
        title,
        id: draft.id.as_ref().map(ToString::to_string),
        lines,
        fields: descriptor
            .form_fields()
            .map(|spec| field_view(spec, draft, options, creating))
            .collect(),
    }
}

fn field_view(
    spec: &'static FieldSpec,
    draft: &DraftState,
    options: &FilterOptions,
    creating: bool,
) -> FieldView {
    let value = draft.get(spec.name).unwrap_or_default().to_string();
    let selected = match spec.kind {
        FieldKind::MultiSelect => value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    FieldView {
        name: spec.name,
        label: spec.label,
        kind: spec.kind,
        required: spec.is_required(creating),
        readonly: !creating && !spec.editable,
        value,
        selected,
        options: spec
            .options
            .map(|key| options.get(key).to_vec())
            .unwrap_or_default(),
    }
}
