use crate::{
    api::{entries, health, worktime},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    store::{AccountStore, EntryStore, MemoryStore},
    utils::name_cache::NameCache,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;
use std::time::Duration;

/// Everything handlers pull out of app data.
#[derive(Clone)]
pub struct AppServices {
    pub config: Config,
    pub entries: Arc<dyn EntryStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub names: NameCache,
}

impl AppServices {
    pub fn new(
        config: Config,
        entries: Arc<dyn EntryStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        let names = NameCache::new(Duration::from_secs(config.name_cache_ttl));
        Self {
            config,
            entries,
            accounts,
            names,
        }
    }

    /// Both stores backed by one [`MemoryStore`].
    pub fn in_memory(config: Config) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let services = Self::new(config, store.clone(), store.clone());
        (services, store)
    }

    /// Registers app data and all routes.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::from(Arc::clone(&self.entries)))
            .app_data(web::Data::from(Arc::clone(&self.accounts)))
            .app_data(web::Data::new(self.names.clone()));
        configure(cfg, &self.config);
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("limiter period and burst are non-zero");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.route("/health", web::get().to(health::health));

    // Form helpers, no account needed
    cfg.service(
        web::scope("/worktime")
            .route("/options", web::get().to(worktime::time_options))
            .route("/duration", web::get().to(worktime::duration_preview)),
    );

    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(web::resource("/logout").route(web::post().to(handlers::logout)))
            // AuthUser extractor rejects bad tokens here
            .service(web::resource("/account").route(web::get().to(handlers::account))),
    );

    // Protected routes
    cfg.service(
        web::scope("/entries")
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            // /entries
            .service(
                web::resource("")
                    .route(web::get().to(entries::list_entries))
                    .route(web::post().to(entries::create_entry)),
            )
            // static paths before /{id}
            .service(web::resource("/names").route(web::get().to(entries::list_names)))
            .service(web::resource("/periods").route(web::get().to(entries::entry_periods)))
            .service(web::resource("/export").route(web::get().to(entries::export_entries)))
            // /entries/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(entries::update_entry))
                    .route(web::delete().to(entries::delete_entry)),
            ),
    );
}

// LOGIN
//  └─ token (24h), claims: company id + name

// API REQUEST
//  └─ Authorization: Bearer token

// TOKEN EXPIRED
//  └─ 401 {"code": "token_expired"} → client clears session, logs in again
