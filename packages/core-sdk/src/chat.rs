use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::auth::CredentialManager;
use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::logger::Logger;
use crate::models::{ChatRequest, ChatResponse, Message};
use crate::store;

const CATEGORY: &str = "chat";

/**
 * \brief Runs one exchange: transcript assembly, token, completion call,
 * reply extraction and transcript persistence.
 */
pub struct ConversationCoordinator {
    http: reqwest::Client,
    config: ChatConfig,
    credentials: CredentialManager,
    transcript: Vec<Message>,
    logger: Arc<dyn Logger>,
}

impl ConversationCoordinator {
    pub fn new(
        credentials: CredentialManager,
        config: ChatConfig,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(http, credentials, config, logger))
    }

    pub fn with_client(
        http: reqwest::Client,
        credentials: CredentialManager,
        config: ChatConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            http,
            config,
            credentials,
            transcript: Vec::new(),
            logger,
        }
    }

    /**
     * \brief Working transcript of the last exchange. Holds the user turn
     * even when the exchange failed.
     */
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /**
     * \brief Send `input` and return the assistant reply.
     *
     * With `continuation` set (and history saving enabled) the stored
     * transcript is sent ahead of the new user turn.
     */
    pub async fn exchange(&mut self, input: &str, continuation: bool) -> Result<String, ChatError> {
        let payload = self.prepare_payload(input, continuation)?;
        let body = self.send_request(&payload).await?;
        let reply = parse_reply(&body).map_err(|e| {
            self.logger.error(CATEGORY, "response parse error", &e);
            e
        })?;

        if self.config.save_history {
            self.transcript.push(reply.clone());
            self.save_transcript();
        }
        Ok(reply.content)
    }

    /**
     * \brief Build the outbound message list and record it as the working
     * transcript.
     */
    pub fn assemble_messages(&mut self, input: &str, continuation: bool) -> &[Message] {
        let mut messages = if continuation && self.config.save_history {
            self.load_transcript()
        } else {
            Vec::new()
        };
        messages.push(Message::user(input));
        self.transcript = messages;
        &self.transcript
    }

    /**
     * \brief Completion request for the current working transcript.
     */
    pub fn build_request(&self) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: self.transcript.clone(),
            temperature: self.config.temperature,
            n: self.config.n,
            max_tokens: self.config.max_tokens,
            repetition_penalty: self.config.repetition_penalty,
        }
    }

    fn prepare_payload(&mut self, input: &str, continuation: bool) -> Result<String, ChatError> {
        self.assemble_messages(input, continuation);
        serde_json::to_string(&self.build_request()).map_err(|e| {
            self.logger.error(CATEGORY, "marshal error", &e);
            ChatError::Parse(format!("failed to encode request: {e}"))
        })
    }

    async fn send_request(&mut self, payload: &str) -> Result<String, ChatError> {
        let token = self.credentials.get_valid_token().await.map_err(|e| {
            self.logger.error(CATEGORY, "get token error", &e);
            match e {
                ChatError::Auth { .. } => e,
                other => ChatError::Auth {
                    status: None,
                    message: other.to_string(),
                },
            }
        })?;

        let resp = self
            .http
            .post(self.config.completions_url())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| {
                self.logger.error(CATEGORY, "request error", &e);
                ChatError::Network(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            self.logger.error(CATEGORY, "read body error", &e);
            ChatError::Network(e)
        })?;
        self.logger.debug(CATEGORY, &format!("body: {body}"));

        if !status.is_success() {
            let err = ChatError::Request {
                status: status.as_u16(),
            };
            self.logger.error(CATEGORY, "request failed", &err);
            return Err(err);
        }
        Ok(body)
    }

    fn load_transcript(&self) -> Vec<Message> {
        match store::load_transcript(&self.config.history_file_path) {
            Ok(history) => {
                self.logger
                    .debug(CATEGORY, &format!("loaded {} history messages", history.len()));
                history
            }
            Err(err) => {
                self.logger.error(CATEGORY, "read message history error", &err);
                Vec::new()
            }
        }
    }

    fn save_transcript(&self) {
        match store::save_transcript(&self.config.history_file_path, &self.transcript) {
            Ok(text) => {
                self.logger.info(CATEGORY, "history file saved");
                self.logger.debug(CATEGORY, &text);
            }
            Err(err) => self.logger.error(CATEGORY, "save history file error", &err),
        }
    }
}

/**
 * \brief Decode a completion body and take the message of the last choice.
 */
pub fn parse_reply(body: &str) -> Result<Message, ChatError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::Parse(format!("invalid response body: {e}")))?;
    extract_reply(response)
}

/**
 * \brief The reply is the last choice, not the first.
 */
pub fn extract_reply(response: ChatResponse) -> Result<Message, ChatError> {
    response
        .choices
        .into_iter()
        .last()
        .map(|choice| choice.message)
        .ok_or_else(|| ChatError::Parse("response has no choices".to_string()))
}
