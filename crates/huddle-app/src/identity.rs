//! Caller identity resolution.
//!
//! Identity is issued by an external subsystem; this module only threads it
//! through the API explicitly. The CLI resolves a default caller from
//! environment variables, overridable per invocation.

use std::env;

use huddle_core::UserId;

/// Environment variable checked first for the caller's user id.
pub const ENV_USER_ID: &str = "HUDDLE_USER_ID";
/// Environment variable checked first for the caller's display name.
pub const ENV_USER_NAME: &str = "HUDDLE_USER_NAME";

const FALLBACK_USER_NAME_ENV: &str = "USER";

/// Authenticated identity attached to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Identity-subsystem user id.
    pub id: UserId,
    /// Display name, denormalized onto tasks at creation.
    pub username: String,
}

/// The identity a request is executed as.
///
/// Every mutation and every subscription takes one of these as an explicit
/// input; there is no ambient current-user global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No authenticated user.
    Anonymous,
    /// An authenticated user.
    User(UserInfo),
}

impl Caller {
    /// Build an authenticated caller.
    pub fn user(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self::User(UserInfo {
            id: id.into(),
            username: username.into(),
        })
    }

    /// Authenticated user info, if any.
    #[must_use]
    pub const fn info(&self) -> Option<&UserInfo> {
        match self {
            Self::Anonymous => None,
            Self::User(info) => Some(info),
        }
    }

    /// User id of an authenticated caller.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(info) => Some(&info.id),
        }
    }

    /// Whether the caller is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Resolve a caller purely from environment variables.
///
/// Checks the huddle-specific variables first (`HUDDLE_USER_ID`,
/// `HUDDLE_USER_NAME`) and falls back to the conventional `USER` variable
/// for the display name. When nothing usable is set, the caller is
/// [`Caller::Anonymous`].
#[must_use]
pub fn caller_from_env() -> Caller {
    let mut fetch = |key: &'static str| env::var(key).ok();
    caller_from_env_with(&mut fetch)
}

/// Build a caller from optional CLI parameters with environment fallbacks.
///
/// Whenever one of the fields is missing, the environment-resolved caller is
/// used and then selectively overridden with the provided value(s).
#[must_use]
pub fn caller_from_params_or_env(id: Option<&str>, username: Option<&str>) -> Caller {
    let mut fetch = |key: &'static str| env::var(key).ok();
    caller_from_params_with(id, username, &mut fetch)
}

fn caller_from_params_with(
    id: Option<&str>,
    username: Option<&str>,
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Caller {
    let env_caller = caller_from_env_with(fetch);
    let env_info = env_caller.info();

    let id = id
        .map(ToOwned::to_owned)
        .or_else(|| env_info.map(|info| info.id.as_str().to_owned()))
        .or_else(|| username.map(ToOwned::to_owned));
    let Some(id) = id else {
        return Caller::Anonymous;
    };
    let username = username
        .map(ToOwned::to_owned)
        .or_else(|| env_info.map(|info| info.username.clone()))
        .unwrap_or_else(|| id.clone());
    Caller::user(id, username)
}

fn caller_from_env_with(fetch: &mut impl FnMut(&'static str) -> Option<String>) -> Caller {
    let name = env_value_with(&[ENV_USER_NAME, FALLBACK_USER_NAME_ENV], fetch);
    let id = env_value_with(&[ENV_USER_ID], fetch).or_else(|| name.clone());
    match id {
        Some(id) => {
            let username = name.unwrap_or_else(|| id.clone());
            Caller::user(id, username)
        }
        None => Caller::Anonymous,
    }
}

fn env_value_with(
    candidates: &[&'static str],
    fetch: &mut impl FnMut(&'static str) -> Option<String>,
) -> Option<String> {
    candidates.iter().find_map(|key| {
        fetch(key).and_then(|value| {
            if value.trim().is_empty() {
                None
            } else {
                Some(value)
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_caller_prefers_explicit_variables() {
        let mut fetch = |key: &'static str| match key {
            ENV_USER_ID => Some("u-42".into()),
            ENV_USER_NAME => Some("alice".into()),
            _ => None,
        };
        let caller = caller_from_env_with(&mut fetch);
        assert_eq!(caller, Caller::user("u-42", "alice"));
    }

    #[test]
    fn env_caller_falls_back_to_user_variable() {
        let mut fetch = |key: &'static str| match key {
            FALLBACK_USER_NAME_ENV => Some("bob".into()),
            _ => None,
        };
        let caller = caller_from_env_with(&mut fetch);
        assert_eq!(caller, Caller::user("bob", "bob"));
    }

    #[test]
    fn empty_environment_is_anonymous() {
        let mut fetch = |_: &'static str| None;
        assert_eq!(caller_from_env_with(&mut fetch), Caller::Anonymous);
    }

    #[test]
    fn params_override_environment_selectively() {
        let mut fetch = |key: &'static str| match key {
            ENV_USER_ID => Some("u-42".into()),
            ENV_USER_NAME => Some("alice".into()),
            _ => None,
        };

        let caller = caller_from_params_with(Some("u-7"), None, &mut fetch);
        assert_eq!(caller, Caller::user("u-7", "alice"));

        let caller = caller_from_params_with(None, Some("carol"), &mut fetch);
        assert_eq!(caller, Caller::user("u-42", "carol"));
    }

    #[test]
    fn params_alone_build_a_caller() {
        let mut fetch = |_: &'static str| None;
        let caller = caller_from_params_with(None, Some("carol"), &mut fetch);
        assert_eq!(caller, Caller::user("carol", "carol"));
    }
}
