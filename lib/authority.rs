use crate::chess::Color;
use async_trait::async_trait;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

#[cfg(test)]
use proptest::{option, prelude::*};

mod http;

pub use http::*;

/// The opaque identifier the authority assigns to a game.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, From, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(transparent)]
pub struct GameId(#[cfg_attr(test, strategy("[a-z0-9-]{1,16}"))] String);

impl GameId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        GameId(s.into())
    }
}

/// The status of a game as reported by the authority.
///
/// Only [`Status::IN_PROGRESS`] has meaning to the client, every other value is terminal.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, From, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(transparent)]
pub struct Status(#[cfg_attr(test, strategy("[a-z_]{1,16}"))] String);

impl Status {
    /// The only non-terminal status.
    pub const IN_PROGRESS: &'static str = "in_progress";

    /// The status of a game that has not ended.
    pub fn in_progress() -> Self {
        Status(Self::IN_PROGRESS.into())
    }

    /// Whether the game is still being played.
    pub fn is_in_progress(&self) -> bool {
        self.0 == Self::IN_PROGRESS
    }

    /// The status as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status(s.into())
    }
}

/// The authority's answer to a request.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Reply {
    /// The game this reply refers to.
    pub game_id: GameId,

    /// The move token the authority played in response, if any.
    #[serde(
        default,
        rename = "ai_move",
        alias = "authority_move",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(test, strategy(option::of("[a-h][1-8][a-h][1-8][nbrq]?")))]
    pub authority_move: Option<String>,

    /// The status of the game after the request.
    pub status: Status,
}

/// The reason why the authority failed to serve a request.
#[derive(Debug, Display, Clone, Eq, PartialEq, Hash, Error)]
pub enum AuthorityError {
    /// The authority understood the request and declined it.
    #[display(fmt = "the authority declined the request; {}", _0)]
    Rejected(#[error(not(source))] String),

    /// The authority could not be reached or its answer could not be understood.
    #[display(fmt = "failed to reach the authority; {}", _0)]
    Transport(#[error(not(source))] String),
}

/// Trait for the remote party that validates moves and plays the opponent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authority {
    /// Asks the authority to start a new game where the player has `color`.
    async fn create_game(&self, color: Color) -> Result<Reply, AuthorityError>;

    /// Submits the player's move token for validation.
    async fn submit_move(&self, game: &GameId, token: &str) -> Result<Reply, AuthorityError>;
}

/// How long a request to the authority may take by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for reaching the authority.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    /// The base URL of the authority.
    #[serde(default)]
    #[cfg_attr(test, strategy(option::of("http://[a-z]{1,8}(:[0-9]{1,4})?")))]
    pub url: Option<String>,

    /// How long a single request may take.
    #[serde(default, with = "humantime_serde")]
    #[cfg_attr(test, strategy(option::of((1u64..3_600_000).prop_map(Duration::from_millis))))]
    pub timeout: Option<Duration>,
}

impl AuthorityConfig {
    /// The configured timeout or [`DEFAULT_TIMEOUT`].
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl fmt::Display for AuthorityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

/// The reason why parsing [`AuthorityConfig`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse authority configuration")]
pub struct ParseAuthorityConfigError(ron::de::SpannedError);

impl FromStr for AuthorityConfig {
    type Err = ParseAuthorityConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn reply_accepts_missing_authority_move() {
        let reply: Reply = serde_json::from_str(r#"{"game_id":"g1","status":"in_progress"}"#).unwrap();
        assert_eq!(reply.game_id, "g1".into());
        assert_eq!(reply.authority_move, None);
        assert!(reply.status.is_in_progress());
    }

    #[test]
    fn reply_accepts_null_authority_move() {
        let json = r#"{"game_id":"g1","ai_move":null,"status":"checkmate"}"#;
        let reply: Reply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.authority_move, None);
        assert!(!reply.status.is_in_progress());
    }

    #[test]
    fn reply_reads_authority_move_under_either_name() {
        let a: Reply = serde_json::from_str(r#"{"game_id":"g","ai_move":"e7e5","status":"in_progress"}"#).unwrap();
        let b: Reply = serde_json::from_str(r#"{"game_id":"g","authority_move":"e7e5","status":"in_progress"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.authority_move.as_deref(), Some("e7e5"));
    }

    #[test]
    fn reply_without_status_is_rejected() {
        assert!(serde_json::from_str::<Reply>(r#"{"game_id":"g"}"#).is_err());
    }

    #[proptest]
    fn deserializing_serialized_reply_is_an_identity(r: Reply) {
        assert_eq!(serde_json::from_str::<Reply>(&serde_json::to_string(&r)?)?, r);
    }

    #[proptest]
    fn only_in_progress_is_not_terminal(s: Status) {
        assert_eq!(s.is_in_progress(), s.as_str() == "in_progress");
        assert!(Status::in_progress().is_in_progress());
    }

    #[test]
    fn config_fields_are_optional() {
        assert_eq!("()".parse(), Ok(AuthorityConfig::default()));
        assert_eq!(AuthorityConfig::default().timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn config_reads_human_readable_timeout() {
        let config: AuthorityConfig = r#"(url: Some("http://localhost:8000"), timeout: Some("1m 30s"))"#
            .parse()
            .unwrap();

        assert_eq!(config.url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout(), Duration::from_secs(90));
    }

    #[test]
    fn config_rejects_unknown_fields() {
        assert!("(retries: 3)".parse::<AuthorityConfig>().is_err());
    }

    #[proptest]
    fn parsing_printed_config_is_an_identity(c: AuthorityConfig) {
        assert_eq!(c.to_string().parse(), Ok(c));
    }
}
