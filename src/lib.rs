//! Administrative console for the mock test platform's REST API.
//!
//! The `data` feature builds the reusable core: pagination windowing,
//! resource descriptors, the session context, gateway traits and the
//! generic list controller. The `server` feature adds the Actix-web host,
//! the `reqwest` gateway and the HTML routes.

#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::middleware::{Compress, Logger};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::routes::auth::{login, logout, show_login};
#[cfg(feature = "server")]
use crate::routes::main::show_index;
#[cfg(feature = "server")]
use crate::routes::mock_tests::{
    clear_questions, delete_question, show_questions, upload_questions,
};
#[cfg(feature = "server")]
use crate::routes::resources::{edit_resource, new_resource, save_resource, show_resources};

pub mod domain;
pub mod error_conversions;
pub mod forms;
pub mod gateway;
pub mod pagination;
pub mod resources;
pub mod services;
pub mod session;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod routes;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let http_client = gateway::http::build_http_client(&server_config.api)
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;

    // Keys and stores for sessions and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Serving the console on {}:{} for {}",
        bind_address.0,
        bind_address.1,
        server_config.api.base()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(show_login)
            .service(login)
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(logout)
                    .service(show_resources)
                    .service(new_resource)
                    .service(edit_resource)
                    .service(save_resource)
                    .service(show_questions)
                    .service(upload_questions)
                    .service(clear_questions)
                    .service(delete_question),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(http_client.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
