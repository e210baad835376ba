/// Authentication flows
///
/// Sequences the account, two-factor, and session services into the
/// user-facing operations: register, login, the 2FA handshake, refresh, and
/// logout. Every failed credential or code check on an account feeds the same
/// lockout counter, and the lock is checked before any hashing work.
use crate::{
    account::{normalize_email, AccountManager},
    clock::Clock,
    config::CoreConfig,
    db::models::Account,
    error::{AuthError, AuthResult},
    mailer::Mailer,
    session::{AuthTokens, TokenService},
    twofactor::{
        RecoveryCodeBatch, RecoveryCodeVault, TempTokenProtector, TotpEngine, TwoFactorSetup,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Optional inline TOTP code; completes both legs in one call
    pub two_factor_code: Option<String>,
}

/// Login response
///
/// Either a full token pair, or `requires_two_factor` with a temp token the
/// client must echo back to [`AuthManager::verify_two_factor`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub requires_two_factor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
}

impl LoginResponse {
    fn authenticated(tokens: AuthTokens) -> Self {
        Self {
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            expires_in: Some(tokens.expires_in),
            requires_two_factor: false,
            temp_token: None,
        }
    }

    fn pending_two_factor(temp_token: String) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_in: None,
            requires_two_factor: true,
            temp_token: Some(temp_token),
        }
    }
}

/// Authentication orchestrator
pub struct AuthManager {
    accounts: Arc<AccountManager>,
    tokens: Arc<TokenService>,
    totp: TotpEngine,
    recovery: Arc<RecoveryCodeVault>,
    temp_tokens: TempTokenProtector,
    mailer: Arc<Mailer>,
    config: Arc<CoreConfig>,
    clock: Arc<dyn Clock>,
}

impl AuthManager {
    pub fn new(
        accounts: Arc<AccountManager>,
        tokens: Arc<TokenService>,
        recovery: Arc<RecoveryCodeVault>,
        mailer: Arc<Mailer>,
        config: Arc<CoreConfig>,
        clock: Arc<dyn Clock>,
    ) -> AuthResult<Self> {
        let totp = TotpEngine::new(config.two_factor.issuer.clone());
        let temp_tokens = TempTokenProtector::new(
            &config.temp_token.key,
            TempTokenProtector::PURPOSE_TWO_FACTOR_LOGIN,
            config.temp_token.ttl_secs,
        )?;

        Ok(Self {
            accounts,
            tokens,
            totp,
            recovery,
            temp_tokens,
            mailer,
            config,
            clock,
        })
    }

    /// Register a new account
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<Account> {
        self.accounts.create_account(email, password).await
    }

    /// First leg of login: verify the password, then either issue tokens or
    /// hand back a temp token for the 2FA leg
    pub async fn login(&self, request: &LoginRequest) -> AuthResult<LoginResponse> {
        let email = normalize_email(&request.email);
        let Some(account) = self.accounts.find_by_email(&email).await? else {
            // Same error as a wrong password; no counter exists to bump
            debug!("login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let now = self.clock.now();
        self.accounts.lockout().check(&account, now)?;

        let password_ok =
            crate::account::password::verify_password(&request.password, &account.password_hash)
                .await?;
        if !password_ok {
            self.note_failure(&account).await?;
            return Err(AuthError::InvalidCredentials);
        }

        if account.two_factor_enabled {
            if let Some(code) = request.two_factor_code.as_deref() {
                self.check_totp(&account, code).await?;
                let tokens = self.complete_authentication(&account).await?;
                return Ok(LoginResponse::authenticated(tokens));
            }

            let temp_token = self.temp_tokens.seal(&account.id, now)?;
            debug!(account_id = %account.id, "password verified, awaiting second factor");
            return Ok(LoginResponse::pending_two_factor(temp_token));
        }

        let tokens = self.complete_authentication(&account).await?;
        Ok(LoginResponse::authenticated(tokens))
    }

    /// Second leg of login: temp token plus a TOTP code
    pub async fn verify_two_factor(&self, temp_token: &str, code: &str) -> AuthResult<AuthTokens> {
        let account = self.open_pending_account(temp_token).await?;
        self.check_totp(&account, code).await?;
        self.complete_authentication(&account).await
    }

    /// Second leg of login via a single-use recovery code
    pub async fn verify_recovery_code(
        &self,
        temp_token: &str,
        code: &str,
    ) -> AuthResult<AuthTokens> {
        let account = self.open_pending_account(temp_token).await?;

        match self.recovery.consume(&account.id, code).await {
            Ok(()) => {}
            Err(AuthError::RecoveryCodeInvalid) => {
                self.note_failure(&account).await?;
                return Err(AuthError::RecoveryCodeInvalid);
            }
            Err(other) => return Err(other),
        }

        let remaining = self.recovery.remaining(&account.id).await?;
        if remaining == 0 {
            warn!(account_id = %account.id, "last recovery code consumed");
        }

        self.complete_authentication(&account).await
    }

    /// Exchange a refresh token for a fresh pair; the old token is revoked
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthTokens> {
        self.tokens.rotate(refresh_token).await
    }

    /// Revoke a refresh session; safe to repeat
    pub async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        self.tokens.revoke(refresh_token).await
    }

    /// Provision a TOTP secret for the account; does not enable 2FA yet
    pub async fn two_factor_setup(&self, account_id: &str) -> AuthResult<TwoFactorSetup> {
        let account = self.accounts.get_account(account_id).await?;
        if account.two_factor_enabled {
            return Err(AuthError::TwoFactorAlreadyEnabled);
        }

        let secret = self.totp.generate_secret();
        self.accounts
            .set_two_factor_secret(&account.id, &secret)
            .await?;

        Ok(TwoFactorSetup {
            provisioning_uri: self.totp.provisioning_uri(&account.email, &secret),
            manual_entry_format: self.totp.manual_entry_format(&secret),
            secret,
        })
    }

    /// Enable 2FA once the caller proves possession with a fresh code
    pub async fn two_factor_enable(
        &self,
        account_id: &str,
        code: &str,
    ) -> AuthResult<RecoveryCodeBatch> {
        let account = self.accounts.get_account(account_id).await?;
        if account.two_factor_enabled {
            return Err(AuthError::TwoFactorAlreadyEnabled);
        }
        let secret = account
            .two_factor_secret
            .as_deref()
            .ok_or(AuthError::TwoFactorSetupRequired)?;

        if !self.totp.validate(secret, code, self.clock.now())? {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        // Codes land before the flag flips: a failure in between leaves 2FA
        // disabled with inert codes that the next enable attempt replaces,
        // never enabled with an empty batch
        let codes = self
            .recovery
            .regenerate_all(&account.id, self.config.two_factor.recovery_code_count)
            .await?;
        self.accounts.enable_two_factor(&account.id).await?;

        if let Err(e) = self.mailer.send_two_factor_enabled_notice(&account.email).await {
            warn!(account_id = %account.id, "could not send 2FA enabled notice: {}", e);
        }

        Ok(RecoveryCodeBatch {
            count: codes.len(),
            recovery_codes: codes,
        })
    }

    /// Disable 2FA, clearing the secret and every recovery code
    pub async fn two_factor_disable(&self, account_id: &str) -> AuthResult<()> {
        let account = self.accounts.get_account(account_id).await?;
        if !account.two_factor_enabled {
            return Err(AuthError::TwoFactorNotEnabled);
        }

        self.accounts.disable_two_factor(&account.id).await?;
        self.recovery.invalidate_all(&account.id).await?;

        if let Err(e) = self.mailer.send_two_factor_disabled_notice(&account.email).await {
            warn!(account_id = %account.id, "could not send 2FA disabled notice: {}", e);
        }

        Ok(())
    }

    /// Replace the recovery code batch; previous codes stop working
    pub async fn regenerate_recovery_codes(
        &self,
        account_id: &str,
    ) -> AuthResult<RecoveryCodeBatch> {
        let account = self.accounts.get_account(account_id).await?;
        if !account.two_factor_enabled {
            return Err(AuthError::TwoFactorNotEnabled);
        }

        let codes = self
            .recovery
            .regenerate_all(&account.id, self.config.two_factor.recovery_code_count)
            .await?;

        Ok(RecoveryCodeBatch {
            count: codes.len(),
            recovery_codes: codes,
        })
    }

    /// Open a temp token and load its account, re-checking the lock
    async fn open_pending_account(&self, temp_token: &str) -> AuthResult<Account> {
        let now = self.clock.now();
        let account_id = self.temp_tokens.open(temp_token, now)?;
        let account = self.accounts.get_account(&account_id).await?;

        self.accounts.lockout().check(&account, now)?;
        if !account.two_factor_enabled {
            return Err(AuthError::TwoFactorNotEnabled);
        }

        Ok(account)
    }

    /// Validate a TOTP code; a miss counts toward lockout
    async fn check_totp(&self, account: &Account, code: &str) -> AuthResult<()> {
        let secret = account
            .two_factor_secret
            .as_deref()
            .ok_or(AuthError::TwoFactorSetupRequired)?;

        if !self.totp.validate(secret, code, self.clock.now())? {
            self.note_failure(account).await?;
            return Err(AuthError::InvalidTwoFactorCode);
        }

        Ok(())
    }

    /// Zero the failure counter and issue the token pair
    async fn complete_authentication(&self, account: &Account) -> AuthResult<AuthTokens> {
        self.accounts.reset_failed_attempts(&account.id).await?;
        let tokens = self.tokens.issue_pair(account).await?;
        info!(account_id = %account.id, "authentication complete");
        Ok(tokens)
    }

    /// Record a failed attempt; notify the account holder on the transition
    /// into the locked state
    async fn note_failure(&self, account: &Account) -> AuthResult<()> {
        let (attempts, locked_until) = self.accounts.record_failed_attempt(&account.id).await?;

        if locked_until.is_some() && attempts == self.accounts.lockout().max_attempts() {
            let minutes = self.config.lockout.duration_secs / 60;
            if let Err(e) = self.mailer.send_lockout_notice(&account.email, minutes).await {
                warn!(account_id = %account.id, "could not send lockout notice: {}", e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db;
    use crate::test_support::test_config;
    use chrono::Duration;

    async fn setup() -> (AuthManager, Arc<ManualClock>) {
        let pool = db::test_pool().await;
        let clock: Arc<ManualClock> = Arc::new(ManualClock::starting_now());
        let config = Arc::new(test_config());

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
        let mailer = Arc::new(Mailer::new(None).unwrap());

        let manager = AuthManager::new(accounts, tokens, recovery, mailer, config, clock.clone())
            .unwrap();
        (manager, clock)
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            two_factor_code: None,
        }
    }

    /// Enable 2FA for the account and return the recovery batch
    async fn enable_two_factor(
        manager: &AuthManager,
        clock: &Arc<ManualClock>,
        account_id: &str,
    ) -> RecoveryCodeBatch {
        let setup = manager.two_factor_setup(account_id).await.unwrap();
        let code = manager
            .totp
            .current_code(&setup.secret, clock.as_ref() as &dyn Clock)
            .unwrap();
        manager.two_factor_enable(account_id, &code).await.unwrap()
    }

    fn current_code(
        manager: &AuthManager,
        clock: &Arc<ManualClock>,
        secret: &str,
    ) -> String {
        manager
            .totp
            .current_code(secret, clock.as_ref() as &dyn Clock)
            .unwrap()
    }

    #[tokio::test]
    async fn login_without_two_factor_returns_tokens() {
        let (manager, _) = setup().await;
        manager.register("a@x.com", "Secret123!").await.unwrap();

        let response = manager
            .login(&login_request("a@x.com", "Secret123!"))
            .await
            .unwrap();

        assert!(!response.requires_two_factor);
        assert!(response.temp_token.is_none());
        assert_eq!(response.expires_in, Some(3600));

        let claims = manager
            .tokens
            .validate_access_token(response.access_token.as_deref().unwrap())
            .unwrap();
        let account = manager.accounts.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(claims.sub, account.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (manager, _) = setup().await;
        manager.register("a@x.com", "Secret123!").await.unwrap();

        let wrong = manager.login(&login_request("a@x.com", "WrongPass1")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = manager.login(&login_request("ghost@x.com", "Secret123!")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn repeated_failures_lock_then_window_expiry_releases() {
        let (manager, clock) = setup().await;
        manager.register("b@x.com", "Secret123!").await.unwrap();

        for _ in 0..5 {
            let result = manager.login(&login_request("b@x.com", "WrongPass1")).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        // Correct password no longer helps while locked
        let locked = manager.login(&login_request("b@x.com", "Secret123!")).await;
        assert!(matches!(locked, Err(AuthError::AccountLocked { .. })));

        clock.advance(Duration::minutes(16));
        let response = manager
            .login(&login_request("b@x.com", "Secret123!"))
            .await
            .unwrap();
        assert!(response.access_token.is_some());

        let account = manager.accounts.find_by_email("b@x.com").await.unwrap().unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert!(account.locked_until.is_none());
    }

    #[tokio::test]
    async fn two_factor_login_handshake() {
        let (manager, clock) = setup().await;
        let account = manager.register("c@x.com", "Secret123!").await.unwrap();
        let batch = enable_two_factor(&manager, &clock, &account.id).await;
        assert_eq!(batch.count, 8);

        let response = manager
            .login(&login_request("c@x.com", "Secret123!"))
            .await
            .unwrap();
        assert!(response.requires_two_factor);
        assert!(response.access_token.is_none());
        let temp_token = response.temp_token.unwrap();

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        let code = current_code(&manager, &clock, stored.two_factor_secret.as_deref().unwrap());

        let tokens = manager.verify_two_factor(&temp_token, &code).await.unwrap();
        assert_eq!(
            manager
                .tokens
                .validate_access_token(&tokens.access_token)
                .unwrap()
                .sub,
            account.id
        );
    }

    #[tokio::test]
    async fn inline_code_completes_login_in_one_call() {
        let (manager, clock) = setup().await;
        let account = manager.register("d@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        let code = current_code(&manager, &clock, stored.two_factor_secret.as_deref().unwrap());

        let request = LoginRequest {
            email: "d@x.com".to_string(),
            password: "Secret123!".to_string(),
            two_factor_code: Some(code),
        };
        let response = manager.login(&request).await.unwrap();
        assert!(!response.requires_two_factor);
        assert!(response.access_token.is_some());
    }

    #[tokio::test]
    async fn temp_token_expires_after_the_window() {
        let (manager, clock) = setup().await;
        let account = manager.register("e@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        let response = manager
            .login(&login_request("e@x.com", "Secret123!"))
            .await
            .unwrap();
        let temp_token = response.temp_token.unwrap();

        clock.advance(Duration::minutes(6));
        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        let code = current_code(&manager, &clock, stored.two_factor_secret.as_deref().unwrap());

        let result = manager.verify_two_factor(&temp_token, &code).await;
        assert!(matches!(result, Err(AuthError::TempTokenInvalid)));
    }

    #[tokio::test]
    async fn temp_token_allows_repeat_verification_within_its_window() {
        let (manager, clock) = setup().await;
        let account = manager.register("o@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        let response = manager
            .login(&login_request("o@x.com", "Secret123!"))
            .await
            .unwrap();
        let temp_token = response.temp_token.unwrap();

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        let secret = stored.two_factor_secret.clone().unwrap();

        let code = current_code(&manager, &clock, &secret);
        manager.verify_two_factor(&temp_token, &code).await.unwrap();

        // The token has no server-side state; a later code still passes
        clock.advance(Duration::seconds(60));
        let code = current_code(&manager, &clock, &secret);
        manager.verify_two_factor(&temp_token, &code).await.unwrap();
    }

    #[tokio::test]
    async fn bad_totp_codes_count_toward_lockout() {
        let (manager, clock) = setup().await;
        let account = manager.register("f@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        let response = manager
            .login(&login_request("f@x.com", "Secret123!"))
            .await
            .unwrap();
        let temp_token = response.temp_token.unwrap();

        for _ in 0..5 {
            let result = manager.verify_two_factor(&temp_token, "000000").await;
            assert!(matches!(result, Err(AuthError::InvalidTwoFactorCode)));
        }

        // The lock now blocks the handshake even with a valid code
        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        let code = current_code(&manager, &clock, stored.two_factor_secret.as_deref().unwrap());
        let result = manager.verify_two_factor(&temp_token, &code).await;
        assert!(matches!(result, Err(AuthError::AccountLocked { .. })));
    }

    #[tokio::test]
    async fn recovery_code_completes_login_once() {
        let (manager, clock) = setup().await;
        let account = manager.register("g@x.com", "Secret123!").await.unwrap();
        let batch = enable_two_factor(&manager, &clock, &account.id).await;

        let response = manager
            .login(&login_request("g@x.com", "Secret123!"))
            .await
            .unwrap();
        let temp_token = response.temp_token.unwrap();

        manager
            .verify_recovery_code(&temp_token, &batch.recovery_codes[0])
            .await
            .unwrap();

        // Spent code is rejected and counts as a failure
        let replay = manager
            .verify_recovery_code(&temp_token, &batch.recovery_codes[0])
            .await;
        assert!(matches!(replay, Err(AuthError::RecoveryCodeInvalid)));

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        assert_eq!(stored.failed_attempts, 1);
    }

    #[tokio::test]
    async fn enable_requires_a_matching_fresh_code() {
        let (manager, _) = setup().await;
        let account = manager.register("h@x.com", "Secret123!").await.unwrap();

        manager.two_factor_setup(&account.id).await.unwrap();
        let result = manager.two_factor_enable(&account.id, "000000").await;
        assert!(matches!(result, Err(AuthError::InvalidTwoFactorCode)));

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        assert!(!stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn enable_replaces_codes_left_by_an_interrupted_attempt() {
        let (manager, clock) = setup().await;
        let account = manager.register("n@x.com", "Secret123!").await.unwrap();
        let setup_response = manager.two_factor_setup(&account.id).await.unwrap();

        // Codes written but the enabled flag never landed
        manager.recovery.generate(&account.id, 3).await.unwrap();
        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        assert!(!stored.two_factor_enabled);

        let code = current_code(&manager, &clock, &setup_response.secret);
        let batch = manager.two_factor_enable(&account.id, &code).await.unwrap();
        assert_eq!(batch.count, 8);
        assert_eq!(manager.recovery.remaining(&account.id).await.unwrap(), 8);

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        assert!(stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn enable_before_setup_is_rejected() {
        let (manager, _) = setup().await;
        let account = manager.register("i@x.com", "Secret123!").await.unwrap();

        let result = manager.two_factor_enable(&account.id, "000000").await;
        assert!(matches!(result, Err(AuthError::TwoFactorSetupRequired)));
    }

    #[tokio::test]
    async fn setup_is_rejected_once_enabled() {
        let (manager, clock) = setup().await;
        let account = manager.register("j@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        let result = manager.two_factor_setup(&account.id).await;
        assert!(matches!(result, Err(AuthError::TwoFactorAlreadyEnabled)));
    }

    #[tokio::test]
    async fn disable_clears_secret_and_recovery_codes() {
        let (manager, clock) = setup().await;
        let account = manager.register("k@x.com", "Secret123!").await.unwrap();
        enable_two_factor(&manager, &clock, &account.id).await;

        manager.two_factor_disable(&account.id).await.unwrap();

        let stored = manager.accounts.get_account(&account.id).await.unwrap();
        assert!(!stored.two_factor_enabled);
        assert!(stored.two_factor_secret.is_none());
        assert_eq!(manager.recovery.remaining(&account.id).await.unwrap(), 0);

        // Login is plain password again
        let response = manager
            .login(&login_request("k@x.com", "Secret123!"))
            .await
            .unwrap();
        assert!(!response.requires_two_factor);

        let again = manager.two_factor_disable(&account.id).await;
        assert!(matches!(again, Err(AuthError::TwoFactorNotEnabled)));
    }

    #[tokio::test]
    async fn regenerating_codes_requires_enabled_two_factor() {
        let (manager, clock) = setup().await;
        let account = manager.register("l@x.com", "Secret123!").await.unwrap();

        let result = manager.regenerate_recovery_codes(&account.id).await;
        assert!(matches!(result, Err(AuthError::TwoFactorNotEnabled)));

        let first = enable_two_factor(&manager, &clock, &account.id).await;
        let second = manager.regenerate_recovery_codes(&account.id).await.unwrap();
        assert_eq!(second.count, 8);

        // Old batch is dead
        let response = manager
            .login(&login_request("l@x.com", "Secret123!"))
            .await
            .unwrap();
        let temp_token = response.temp_token.unwrap();
        let replay = manager
            .verify_recovery_code(&temp_token, &first.recovery_codes[0])
            .await;
        assert!(matches!(replay, Err(AuthError::RecoveryCodeInvalid)));
    }

    #[tokio::test]
    async fn refresh_and_logout_round_trip() {
        let (manager, _) = setup().await;
        manager.register("m@x.com", "Secret123!").await.unwrap();

        let response = manager
            .login(&login_request("m@x.com", "Secret123!"))
            .await
            .unwrap();
        let refresh_token = response.refresh_token.unwrap();

        let rotated = manager.refresh(&refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, refresh_token);

        manager.logout(&rotated.refresh_token).await.unwrap();
        let result = manager.refresh(&rotated.refresh_token).await;
        assert!(matches!(result, Err(AuthError::RefreshTokenInvalid)));
    }
}
