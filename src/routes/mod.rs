//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web::web;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::gateway::http::ApiClient;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;
use crate::session::SessionContext;

pub mod auth;
pub mod main;
pub mod resources;

/// Maps flash message levels to Bootstrap alert classes.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Empty `401`; the redirect middleware turns it into a trip to `/login`.
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context every page starts from: alerts, operator name and menu marker.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    session: &SessionContext,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &session.user_name());
    context.insert("current_page", current_page);
    context
}

/// API connection for the request's session.
pub fn api_client(
    http: &web::Data<reqwest::Client>,
    server_config: &web::Data<ServerConfig>,
    session: &SessionContext,
) -> ApiClient {
    ApiClient::new(
        http.get_ref().clone(),
        server_config.api.clone(),
        session.clone(),
    )
}

/// Auth failures go to the login screen; everything else is flashed and
/// the operator is sent to `fallback`.
pub fn service_error_response(err: ServiceError, fallback: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => unauthorized(),
        err => {
            FlashMessage::error(err.to_string()).send();
            redirect(fallback)
        }
    }
}
