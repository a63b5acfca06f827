//! Application Startup
//!
//! Wires stores, collaborators and services into the shared state, builds the
//! router and runs the server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    EntityOperations, EntityService, OtpService, OtpServiceImpl, TokenService, UserService,
    UserServiceImpl,
};
use crate::application::validators::TokenValidator;
use crate::config::{OtpCacheBackend, Settings, StorageBackend};
use crate::domain::{
    AccessToken, CaptchaVerifier, EmailSender, LogSink, OtpStore, Session, Store, User, UserStore,
};
use crate::infrastructure::cache::{self, InMemoryOtpStore, RedisOtpStore};
use crate::infrastructure::database;
use crate::infrastructure::external::{
    HttpEmailSender, HttpLogShipper, RecaptchaVerifier, TracingLogSink,
};
use crate::infrastructure::repositories::{
    InMemoryRepository, PgTokenRepository, PgUserRepository,
};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    /// Same service as `users`, seen through the generic entity interface
    pub user_entities: Arc<dyn EntityOperations<User>>,
    pub sessions: Arc<dyn EntityOperations<Session>>,
    pub access_tokens: Arc<dyn EntityOperations<AccessToken>>,
    pub otp: Arc<dyn OtpService>,
    pub tokens: Arc<TokenService>,
    pub settings: Arc<Settings>,
    pub probes: Probes,
}

/// Backends the readiness probe checks, when they are in use.
#[derive(Clone, Default)]
pub struct Probes {
    pub db: Option<PgPool>,
    pub otp_cache: Option<RedisOtpStore>,
}

/// Outbound collaborators of the services.
#[derive(Clone)]
pub struct Collaborators {
    pub otp_store: Arc<dyn OtpStore>,
    pub email_sender: Arc<dyn EmailSender>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub log_sink: Arc<dyn LogSink>,
}

impl AppState {
    /// Build the state from settings, connecting to whichever backends they
    /// select.
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let log_sink: Arc<dyn LogSink> = if settings.log_shipping.endpoint.is_some() {
            Arc::new(HttpLogShipper::new(settings.log_shipping.clone())?)
        } else {
            Arc::new(TracingLogSink)
        };

        let mut probes = Probes::default();
        let otp_store: Arc<dyn OtpStore> = match settings.storage.otp_cache {
            OtpCacheBackend::Redis => {
                let redis = cache::create_redis_client(&settings.redis).await?;
                let store = RedisOtpStore::new(redis, &settings.redis.otp_prefix);
                probes.otp_cache = Some(store.clone());
                Arc::new(store)
            }
            OtpCacheBackend::Memory => Arc::new(InMemoryOtpStore::new()),
        };

        let collaborators = Collaborators {
            otp_store,
            email_sender: Arc::new(HttpEmailSender::new(settings.email.clone())?),
            captcha: Arc::new(RecaptchaVerifier::new(settings.captcha.clone())?),
            log_sink,
        };

        match settings.storage.backend {
            StorageBackend::Postgres => {
                let pool = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");
                if settings.database.run_migrations {
                    database::run_migrations(&pool).await?;
                }
                probes.db = Some(pool.clone());

                Ok(Self::assemble(
                    settings,
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgTokenRepository::sessions(pool.clone())),
                    Arc::new(PgTokenRepository::access_tokens(pool)),
                    collaborators,
                    probes,
                ))
            }
            StorageBackend::Memory => {
                Ok(Self::in_memory(settings, collaborators).with_probes(probes))
            }
        }
    }

    /// State over the in-memory stores, with the given collaborators.
    pub fn in_memory(settings: Settings, collaborators: Collaborators) -> Self {
        tracing::warn!("Using in-memory stores; data is lost on restart");
        let sessions = Arc::new(InMemoryRepository::<Session>::tokens());
        let access_tokens = Arc::new(InMemoryRepository::<AccessToken>::tokens());
        let users = InMemoryRepository::users()
            .cascade_to(sessions.clone())
            .cascade_to(access_tokens.clone());

        Self::assemble(
            settings,
            Arc::new(users),
            sessions,
            access_tokens,
            collaborators,
            Probes::default(),
        )
    }

    fn with_probes(mut self, probes: Probes) -> Self {
        self.probes = probes;
        self
    }

    fn assemble<U>(
        settings: Settings,
        users: Arc<U>,
        sessions: Arc<dyn Store<Session>>,
        access_tokens: Arc<dyn Store<AccessToken>>,
        collaborators: Collaborators,
        probes: Probes,
    ) -> Self
    where
        U: UserStore + 'static,
    {
        let log_sink = collaborators.log_sink;
        let tokens = Arc::new(TokenService::new(&settings.jwt));
        let user_rows: Arc<dyn Store<User>> = users.clone();

        let session_service = EntityService::<Session>::new(
            sessions.clone(),
            Arc::new(TokenValidator::new(sessions, user_rows.clone())),
            log_sink.clone(),
        );
        let access_token_service = EntityService::<AccessToken>::new(
            access_tokens.clone(),
            Arc::new(TokenValidator::new(access_tokens, user_rows)),
            log_sink.clone(),
        );
        let sessions: Arc<dyn EntityOperations<Session>> = Arc::new(session_service);
        let access_tokens: Arc<dyn EntityOperations<AccessToken>> =
            Arc::new(access_token_service);
        let otp: Arc<dyn OtpService> = Arc::new(OtpServiceImpl::new(
            collaborators.otp_store,
            collaborators.email_sender,
            log_sink.clone(),
            &settings.otp,
        ));
        let user_service = Arc::new(UserServiceImpl::new(
            users,
            sessions.clone(),
            otp.clone(),
            collaborators.captcha,
            tokens.clone(),
            log_sink,
        ));

        Self {
            users: user_service.clone(),
            user_entities: user_service,
            sessions,
            access_tokens,
            otp,
            tokens,
            settings: Arc::new(settings),
            probes,
        }
    }
}

/// Router with request tracing, metrics and CORS applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(middleware::from_fn(logging::track_metrics))
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let addr = settings.server.socket_addr()?;
        let state = AppState::from_settings(settings).await?;
        crate::presentation::http::handlers::health::init_server_start();
        let router = build_router(state);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
