/// Application context wiring
///
/// Builds the connection pool, runs migrations, and constructs every service
/// with shared config and clock. This is the single composition root; callers
/// embedding the auth core hold one [`AppContext`].
use crate::{
    account::AccountManager,
    auth::AuthManager,
    clock::{Clock, SystemClock},
    config::CoreConfig,
    db,
    error::AuthResult,
    mailer::Mailer,
    session::TokenService,
    twofactor::RecoveryCodeVault,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<CoreConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub tokens: Arc<TokenService>,
    pub recovery: Arc<RecoveryCodeVault>,
    pub mailer: Arc<Mailer>,
    pub auth: Arc<AuthManager>,
}

impl AppContext {
    /// Initialize with wall-clock time
    pub async fn init(config: CoreConfig) -> AuthResult<Self> {
        Self::init_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Initialize with an injected clock
    pub async fn init_with_clock(
        config: CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let pool = db::create_pool(&config.storage.auth_db, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;
        info!(db = %config.storage.auth_db.display(), "auth database ready");

        let accounts = Arc::new(AccountManager::new(
            pool.clone(),
            config.clone(),
            clock.clone(),
        ));
        let tokens = Arc::new(TokenService::new(
            pool.clone(),
            config.clone(),
            clock.clone(),
        ));
        let recovery = Arc::new(RecoveryCodeVault::new(pool.clone(), clock.clone()));
        let mailer = Arc::new(Mailer::new(config.email.clone())?);

        let auth = Arc::new(AuthManager::new(
            accounts.clone(),
            tokens.clone(),
            recovery.clone(),
            mailer.clone(),
            config.clone(),
            clock,
        )?);

        Ok(Self {
            config,
            db: pool,
            accounts,
            tokens,
            recovery,
            mailer,
            auth,
        })
    }
}
