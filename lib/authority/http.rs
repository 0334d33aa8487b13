use super::{Authority, AuthorityConfig, AuthorityError, GameId, Reply};
use crate::chess::Color;
use async_trait::async_trait;
use derive_more::{Display, Error, From};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// The reason why an [`HttpAuthority`] could not be set up.
#[derive(Debug, Display, Error, From)]
#[display(fmt = "invalid authority configuration; {}")]
pub enum ConfigError {
    #[display(fmt = "the authority location is unknown")]
    MissingUrl,

    #[display(fmt = "`{}` is not an http(s) URL", _0)]
    #[from(ignore)]
    InvalidUrl(#[error(not(source))] String),

    #[display(fmt = "failed to set up the http client")]
    Client(reqwest::Error),
}

#[derive(Serialize)]
struct NewGame {
    color: Color,
}

#[derive(Serialize)]
struct Submit<'a> {
    game_id: &'a GameId,
    r#move: &'a str,
}

/// An [`Authority`] reached over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    base: String,
    client: Client,
}

impl HttpAuthority {
    /// Builds a client for the authority described by `config`.
    pub fn new(config: &AuthorityConfig) -> Result<Self, ConfigError> {
        let url = config.url.as_deref().ok_or(ConfigError::MissingUrl)?.trim();

        match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => {}
            _ => return Err(ConfigError::InvalidUrl(url.into())),
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(HttpAuthority {
            base: url.trim_end_matches('/').into(),
            client,
        })
    }

    /// The base URL of the authority.
    pub fn url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<Reply, AuthorityError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, path);

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| AuthorityError::Transport(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(refusal(status, &body))
        }
    }
}

/// Interprets an unsuccessful response.
///
/// Client errors are deliberate refusals, anything else is a transport failure.
fn refusal(status: StatusCode, body: &str) -> AuthorityError {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["detail", "error"]
            .iter()
            .find_map(|k| v.get(k)?.as_str().map(String::from))
    });

    let msg = detail.unwrap_or_else(|| status.to_string());

    if status.is_client_error() {
        AuthorityError::Rejected(msg)
    } else {
        AuthorityError::Transport(msg)
    }
}

#[async_trait]
impl Authority for HttpAuthority {
    #[instrument(level = "debug", skip(self), err)]
    async fn create_game(&self, color: Color) -> Result<Reply, AuthorityError> {
        self.post("new_game", &NewGame { color }).await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn submit_move(&self, game: &GameId, token: &str) -> Result<Reply, AuthorityError> {
        let body = Submit {
            game_id: game,
            r#move: token,
        };

        self.post("move", &body).await
    }
}
