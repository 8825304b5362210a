use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::filter::FilterState;
use crate::domain::types::ResourceId;
use crate::dto::resources::ResourcePageData;
use crate::forms::draft::DraftState;
use crate::forms::multipart::SaveResourceForm;
use crate::gateway::http::HttpGateway;
use crate::models::config::ServerConfig;
use crate::resources::{self, ResourceDescriptor};
use crate::routes::{
    api_client, base_context, redirect, render_template, service_error_response, unauthorized,
};
use crate::services::ServiceError;
use crate::services::controller::ResourceListController;
use crate::session::SessionContext;

type Controller = ResourceListController<HttpGateway>;

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

/// Page and filter selections carried in a list URL.
struct ListParams {
    page: usize,
    filters: FilterState,
}

impl ListParams {
    /// Unknown parameters are ignored so stale links keep working.
    fn parse(descriptor: &ResourceDescriptor, query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_html_form::from_str(query).unwrap_or_default();

        let mut page = 1;
        let mut filters = FilterState::new();
        for (key, value) in pairs {
            if key == "page" {
                page = value.trim().parse().unwrap_or(1);
            } else if descriptor.filter(&key).is_some() {
                filters.set(key, Some(value));
            }
        }

        Self { page, filters }
    }
}

fn list_url(descriptor: &ResourceDescriptor, page: usize) -> String {
    format!("/r/{}?page={page}", descriptor.key)
}

fn controller(
    descriptor: &'static ResourceDescriptor,
    http: &web::Data<reqwest::Client>,
    server_config: &web::Data<ServerConfig>,
    session: &SessionContext,
) -> Controller {
    let api = api_client(http, server_config, session);
    ResourceListController::new(
        descriptor,
        HttpGateway::new(api, descriptor),
        session.clone(),
        server_config.api.per_page,
    )
}

fn render_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    session: &SessionContext,
    controller: &Controller,
    template: &str,
) -> HttpResponse {
    let data = ResourcePageData::from_controller(controller);

    let mut context = base_context(flash_messages, session, controller.descriptor().key);
    context.insert("resource", &data);

    render_template(tera, template, &context)
}

#[get("/r/{resource}")]
pub async fn show_resources(
    resource: web::Path<String>,
    req: HttpRequest,
    session: SessionContext,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(descriptor) = resources::find(&resource) else {
        return HttpResponse::NotFound().finish();
    };
    if !session.is_active() {
        return unauthorized();
    }

    let params = ListParams::parse(descriptor, req.query_string());
    let mut controller = controller(descriptor, &http, &server_config, &session);
    controller.restore_view(params.page, params.filters);

    if let Err(err) = controller.mount().await {
        return service_error_response(err, "/");
    }

    render_page(
        &tera,
        &flash_messages,
        &session,
        &controller,
        "resources/index.html",
    )
}

#[get("/r/{resource}/new")]
pub async fn new_resource(
    resource: web::Path<String>,
    query: web::Query<PageQuery>,
    session: SessionContext,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(descriptor) = resources::find(&resource) else {
        return HttpResponse::NotFound().finish();
    };
    if !session.is_active() {
        return unauthorized();
    }

    let page = query.page.unwrap_or(1);
    let mut controller = controller(descriptor, &http, &server_config, &session);
    controller.restore_view(page, FilterState::new());

    if let Err(err) = controller.load_options().await {
        return service_error_response(err, &list_url(descriptor, page));
    }
    if let Err(err) = controller.open_create() {
        return service_error_response(err, &list_url(descriptor, page));
    }

    render_page(
        &tera,
        &flash_messages,
        &session,
        &controller,
        "resources/form.html",
    )
}

#[get("/r/{resource}/{id}/edit")]
pub async fn edit_resource(
    path: web::Path<(String, String)>,
    req: HttpRequest,
    session: SessionContext,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (resource, id) = path.into_inner();
    let Some(descriptor) = resources::find(&resource) else {
        return HttpResponse::NotFound().finish();
    };
    if !session.is_active() {
        return unauthorized();
    }

    let params = ListParams::parse(descriptor, req.query_string());
    let back = list_url(descriptor, params.page);
    let mut controller = controller(descriptor, &http, &server_config, &session);
    controller.restore_view(params.page, params.filters);

    // The record is taken from the page it was listed on.
    if let Err(err) = controller.mount().await {
        return service_error_response(err, &back);
    }

    let opened = ResourceId::new(id)
        .map_err(ServiceError::from)
        .and_then(|id| controller.open_edit_by_id(&id));
    if let Err(err) = opened {
        return match err {
            ServiceError::NotFound => {
                FlashMessage::error(format!("{} not found.", descriptor.singular)).send();
                redirect(&back)
            }
            err => service_error_response(err, &back),
        };
    }

    render_page(
        &tera,
        &flash_messages,
        &session,
        &controller,
        "resources/form.html",
    )
}

#[post("/r/{resource}/save")]
pub async fn save_resource(
    resource: web::Path<String>,
    payload: Multipart,
    session: SessionContext,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(descriptor) = resources::find(&resource) else {
        return HttpResponse::NotFound().finish();
    };
    if !session.is_active() {
        return unauthorized();
    }

    let form = match SaveResourceForm::from_multipart(payload).await {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected {} form: {err}", descriptor.key);
            return service_error_response(err.into(), &list_url(descriptor, 1));
        }
    };
    let page = form.page.unwrap_or(1);
    let back = list_url(descriptor, page);

    let mut draft = DraftState::empty();
    if let Some(id) = form.id.as_deref() {
        match ResourceId::new(id) {
            Ok(id) => draft.id = Some(id),
            Err(err) => return service_error_response(err.into(), &back),
        }
    }
    for spec in descriptor.form_fields() {
        let value = form.values.get(spec.name).cloned().unwrap_or_default();
        draft.set(spec.name, value);
    }

    let mut controller = controller(descriptor, &http, &server_config, &session);
    controller.restore_view(page, FilterState::new());
    controller.open_draft(draft);

    // Files go up first; their references end up in the draft.
    for (field, file) in form.files {
        match controller.upload_file(&field, file).await {
            Ok(stored) => log::debug!("Stored {field} at {}", stored.path),
            Err(ServiceError::Unauthorized) => return unauthorized(),
            Err(err) => log::warn!("Upload for {} failed: {err}", descriptor.key),
        }
    }

    let Some(draft) = controller.draft().cloned() else {
        return redirect(&back);
    };

    match controller.submit(draft).await {
        Ok(()) => {
            FlashMessage::success(format!("{} saved.", descriptor.singular)).send();
            redirect(&back)
        }
        Err(ServiceError::Unauthorized) => unauthorized(),
        Err(err) => {
            log::warn!("Failed to save {}: {err}", descriptor.key);
            if let Err(ServiceError::Unauthorized) = controller.load_options().await {
                return unauthorized();
            }
            render_page(
                &tera,
                &flash_messages,
                &session,
                &controller,
                "resources/form.html",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::catalog::ORDERS;

    #[test]
    fn list_params_keep_known_filters_only() {
        let params = ListParams::parse(
            &ORDERS,
            "page=3&order_status_id=2&start_date=2024-01-01&bogus=1&payment_method_id=",
        );

        assert_eq!(params.page, 3);
        assert_eq!(params.filters.get("order_status_id"), Some("2"));
        assert_eq!(params.filters.get("start_date"), Some("2024-01-01"));
        assert_eq!(params.filters.get("bogus"), None);
        assert_eq!(params.filters.get("payment_method_id"), None);
    }

    #[test]
    fn garbage_page_falls_back_to_first() {
        let params = ListParams::parse(&ORDERS, "page=abc");
        assert_eq!(params.page, 1);
        assert!(params.filters.is_empty());
    }
}
