use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::dto::main::IndexPageData;
use crate::routes::{base_context, render_template, unauthorized};
use crate::session::SessionContext;

#[get("/")]
pub async fn show_index(
    session: SessionContext,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !session.is_active() {
        return unauthorized();
    }

    let data = IndexPageData::new();

    let mut context = base_context(&flash_messages, &session, "index");
    context.insert("resources", &data.resources);

    render_template(&tera, "main/index.html", &context)
}
