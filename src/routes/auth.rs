use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::login::LoginForm;
use crate::models::config::ServerConfig;
use crate::routes::{api_client, base_context, redirect, render_template};
use crate::services::{ServiceError, auth as auth_service};
use crate::session::SessionContext;

#[get("/login")]
pub async fn show_login(
    session: SessionContext,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if session.is_active() {
        return redirect("/");
    }

    let context = base_context(&flash_messages, &session, "login");
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn login(
    session: SessionContext,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let api = api_client(&http, &server_config, &session);

    match auth_service::login(&api, &session, form).await {
        Ok(user_name) => {
            FlashMessage::success(format!("Welcome, {user_name}.")).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/login")
        }
        Err(err) => {
            log::error!("Failed to log in: {err}");
            FlashMessage::error("Login is unavailable right now, try again later.").send();
            redirect("/login")
        }
    }
}

#[post("/logout")]
pub async fn logout(session: SessionContext) -> impl Responder {
    auth_service::logout(&session);
    redirect("/login")
}
