//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/hasher traits, but AppState pins them
//! to the SQLite and SHA-256 implementations from chatbox-infra.

use std::sync::Arc;

use chatbox_core::service::chat::ChatService;
use chatbox_core::service::user::UserService;
use chatbox_infra::config::{load_config, resolve_data_dir};
use chatbox_infra::crypto::hash::Sha256KeyHasher;
use chatbox_infra::sqlite::chat::SqliteChatRepository;
use chatbox_infra::sqlite::message::SqliteMessageRepository;
use chatbox_infra::sqlite::pool::{DatabasePool, database_url_for};
use chatbox_infra::sqlite::user::SqliteUserRepository;
use chatbox_types::config::ChatboxConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteChatRepository, SqliteMessageRepository, SqliteUserRepository>;

pub type ConcreteUserService = UserService<SqliteUserRepository, Sha256KeyHasher>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub user_service: Arc<ConcreteUserService>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, open the database and
    /// wire the services.
    ///
    /// `database_url` overrides the default `{data_dir}/chatbox.db`.
    pub async fn init(database_url: Option<&str>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await?;

        let db_url = match database_url {
            Some(url) => url.to_string(),
            None => database_url_for(&data_dir),
        };
        let db_pool = DatabasePool::new(&db_url).await?;

        tracing::info!(data_dir = %data_dir.display(), "Initialized application state");
        Ok(Self::from_pool(db_pool, &config))
    }

    /// Wire the services over an already opened pool.
    pub fn from_pool(db_pool: DatabasePool, config: &ChatboxConfig) -> Self {
        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
            config,
        );
        let user_service =
            UserService::new(SqliteUserRepository::new(db_pool.clone()), Sha256KeyHasher);

        Self {
            chat_service: Arc::new(chat_service),
            user_service: Arc::new(user_service),
            db_pool,
        }
    }
}
