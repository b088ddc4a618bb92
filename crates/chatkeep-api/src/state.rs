//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and the
//! REST API. Services are generic over repository/hasher/codec traits; AppState
//! pins them to the SQLite and crypto implementations from chatkeep-infra.

use std::path::Path;
use std::sync::Arc;

use chatkeep_core::chat::service::ChatService;
use chatkeep_core::retention::RetentionEngine;
use chatkeep_core::retention::scheduler::SweepScheduler;
use chatkeep_core::service::auth::AuthService;
use chatkeep_core::service::clock::{SharedClock, SystemClock};
use chatkeep_core::service::session::SessionIssuer;
use chatkeep_core::service::settings::SettingsService;
use chatkeep_infra::config::resolve_database_url;
use chatkeep_infra::crypto::password::Argon2CredentialHasher;
use chatkeep_infra::crypto::token::HmacTokenCodec;
use chatkeep_infra::sqlite::chat::SqliteChatRepository;
use chatkeep_infra::sqlite::pool::DatabasePool;
use chatkeep_infra::sqlite::settings::SqliteSettingsRepository;
use chatkeep_infra::sqlite::user::SqliteUserRepository;
use chatkeep_types::config::ServerConfig;
use chatkeep_types::settings::default_settings;

pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2CredentialHasher>;

pub type ConcreteSessionIssuer = SessionIssuer<SqliteUserRepository, HmacTokenCodec>;

pub type ConcreteSettingsService = SettingsService<SqliteSettingsRepository>;

pub type ConcreteRetentionEngine = RetentionEngine<SqliteChatRepository, SqliteSettingsRepository>;

pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteSettingsRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub sessions: Arc<ConcreteSessionIssuer>,
    pub settings_service: Arc<ConcreteSettingsService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub retention: Arc<ConcreteRetentionEngine>,
    pub scheduler: Arc<SweepScheduler>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Connect to the database and wire every service against the wall clock.
    pub async fn init(config: ServerConfig, data_dir: &Path) -> anyhow::Result<Self> {
        let db_url = resolve_database_url(&config, data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;
        let codec = HmacTokenCodec::from_config(config.token_secret.as_deref());

        Ok(Self::from_parts(config, db_pool, codec, Arc::new(SystemClock)))
    }

    /// Wire services over an already-open pool.
    pub fn from_parts(
        config: ServerConfig,
        db_pool: DatabasePool,
        codec: HmacTokenCodec,
        clock: SharedClock,
    ) -> Self {
        let users = SqliteUserRepository::new(db_pool.clone());
        let settings = SqliteSettingsRepository::new(db_pool.clone());
        let chats = SqliteChatRepository::new(db_pool);

        let defaults = default_settings(config.default_storage_limit, config.default_auto_clear_days);
        let auth_service = AuthService::new(
            users.clone(),
            Argon2CredentialHasher::new(),
            clock.clone(),
            defaults,
        );
        let sessions = SessionIssuer::new(users, codec, clock.clone());

        let retention = Arc::new(RetentionEngine::new(
            chats.clone(),
            settings.clone(),
            clock.clone(),
        ));
        let chat_service = ChatService::new(chats, retention.clone(), clock);

        Self {
            auth_service: Arc::new(auth_service),
            sessions: Arc::new(sessions),
            settings_service: Arc::new(SettingsService::new(settings)),
            chat_service: Arc::new(chat_service),
            retention,
            scheduler: Arc::new(SweepScheduler::new()),
            config: Arc::new(config),
        }
    }
}
