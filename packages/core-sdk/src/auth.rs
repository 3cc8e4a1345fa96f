use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ChatError;
use crate::logger::Logger;
use crate::models::Credential;
use crate::store;

const CATEGORY: &str = "auth";

/**
 * \brief Header carrying the per-request correlation id.
 */
pub const RQUID_HEADER: &str = "RqUID";

/**
 * \brief Owns the access token: disk cache, expiry check, refresh, persist.
 */
pub struct CredentialManager {
    http: reqwest::Client,
    config: ClientConfig,
    basic_auth: String,
    credential: Option<Credential>,
    logger: Arc<dyn Logger>,
}

impl CredentialManager {
    pub fn new(config: ClientConfig, logger: Arc<dyn Logger>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(http, config, logger))
    }

    pub fn with_client(
        http: reqwest::Client,
        config: ClientConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let basic_auth = basic_auth(&config.client_id, &config.client_secret);
        Self {
            http,
            config,
            basic_auth,
            credential: None,
            logger,
        }
    }

    /**
     * \brief Credential currently held in memory, if any.
     */
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /**
     * \brief Return a bearer token, refreshing it only when the cached one
     * is missing or expired.
     *
     * Cache read/write failures are logged and never fail the call.
     */
    pub async fn get_valid_token(&mut self) -> Result<String, ChatError> {
        self.read_saved_token();

        if let Some(credential) = &self.credential {
            if credential.is_usable(now_ms(), self.config.expiry_margin_ms) {
                self.logger.info(CATEGORY, "token not expired");
                return Ok(credential.access_token.clone());
            }
        }

        let credential = self.request_new_token().await?;
        let token = credential.access_token.clone();
        self.credential = Some(credential);
        self.save_token();
        Ok(token)
    }

    async fn request_new_token(&self) -> Result<Credential, ChatError> {
        let rq_uid = Uuid::new_v4().to_string();
        self.logger
            .debug(CATEGORY, &format!("requesting new token, {RQUID_HEADER}={rq_uid}"));

        let resp = self
            .http
            .post(&self.config.auth_url)
            .header(RQUID_HEADER, rq_uid)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", self.basic_auth))
            .body(format!("scope={}", self.config.scope))
            .send()
            .await
            .map_err(|e| {
                self.logger.error(CATEGORY, "auth request error", &e);
                ChatError::auth_transport(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            self.logger.error(CATEGORY, "read body error", &e);
            ChatError::auth_transport(e)
        })?;
        self.logger.debug(CATEGORY, &format!("auth body: {body}"));

        if !status.is_success() {
            let err = ChatError::auth_status(status.as_u16());
            self.logger.error(CATEGORY, "auth request failed", &err);
            return Err(err);
        }

        serde_json::from_str::<Credential>(&body).map_err(|e| {
            self.logger.error(CATEGORY, "token unmarshal error", &e);
            ChatError::Auth {
                status: Some(status.as_u16()),
                message: format!("invalid token response: {e}"),
            }
        })
    }

    fn read_saved_token(&mut self) {
        if !self.config.save_token {
            return;
        }
        match store::load_credential(&self.config.token_file_path) {
            Ok(credential) => {
                self.logger
                    .debug(CATEGORY, &format!("saved token expires at {}", credential.expires_at));
                self.credential = Some(credential);
            }
            Err(err) if err.is_not_found() => {
                self.logger.info(CATEGORY, "no saved token");
            }
            Err(err) => self.logger.error(CATEGORY, "read saved token error", &err),
        }
    }

    fn save_token(&self) {
        if !self.config.save_token {
            return;
        }
        let Some(credential) = &self.credential else {
            return;
        };
        match store::save_credential(&self.config.token_file_path, credential) {
            Ok(_) => self.logger.info(CATEGORY, "token file saved"),
            Err(err) => self.logger.error(CATEGORY, "save token file error", &err),
        }
    }
}

/**
 * \brief `base64(client_id ":" client_secret)` for the Basic scheme.
 */
pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}

/**
 * \brief Wall clock in epoch milliseconds.
 */
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
