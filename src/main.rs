use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use worklog::config::Config;
use worklog::db::init_db;
use worklog::docs::ApiDoc;
use worklog::routes::AppServices;
use worklog::store::{self, AccountStore, EntryStore, MemoryStore, MySqlStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(env = %config.app_env, "Server starting...");
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development secret");
    }

    let (entries, accounts): (Arc<dyn EntryStore>, Arc<dyn AccountStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = init_db(url).await.context("connecting to MySQL")?;
                let mysql = Arc::new(MySqlStore::new(pool));
                (mysql.clone(), mysql)
            }
            None => {
                warn!("DATABASE_URL not set, entries are kept in memory only");
                let memory = Arc::new(MemoryStore::new());
                (memory.clone(), memory)
            }
        };

    if config.seed_demo_account {
        if let Err(e) = store::seed_demo_account(accounts.as_ref()).await {
            error!(error = %e, "Failed to seed demo account");
        }
    }

    let server_addr = config.server_addr.clone();
    let services = AppServices::new(config, entries, accounts);

    info!(addr = %server_addr, store = services.entries.backend(), "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| services.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
