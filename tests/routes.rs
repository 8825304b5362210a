use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, Level};
use tera::Tera;

use admin_console::middleware::RedirectUnauthorized;
use admin_console::models::config::{ApiConfig, ServerConfig};
use admin_console::routes::alert_level_to_str;
use admin_console::routes::main::show_index;
use admin_console::routes::resources::show_resources;

#[::core::prelude::v1::test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

fn server_config() -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".to_string(),
        port: 8080,
        templates_dir: "templates/**/*".to_string(),
        secret: "s".repeat(64),
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            per_page: 10,
        },
    }
}

#[actix_web::test]
async fn anonymous_visitors_are_sent_to_login() {
    let key = Key::from(&[7u8; 64][..]);
    let messages =
        FlashMessagesFramework::builder(CookieMessageStore::builder(key.clone()).build()).build();

    let app = test::init_service(
        App::new()
            .wrap(messages)
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key))
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(show_resources),
            )
            .app_data(web::Data::new(Tera::default()))
            .app_data(web::Data::new(reqwest::Client::new()))
            .app_data(web::Data::new(server_config())),
    )
    .await;

    for path in ["/", "/r/orders"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }
}
