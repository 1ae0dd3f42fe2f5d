use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role granted to a registered user.
///
/// Roles form a static allow-list: every protected route declares the set of
/// roles it accepts and rejects all others.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        })
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(InvalidRole),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid role")]
pub struct InvalidRole;

/// The claim set embedded in a signed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Role granted at registration
    pub role: Role,
    /// Issued at
    pub iat: u64,
    /// Not before time
    pub nbf: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// Creates a new `Claims` for the given subject with all timestamps
    /// zeroed. The issuer fills in `iat`, `nbf` and `exp` when signing.
    pub fn new<T>(sub: T, role: Role) -> Self
    where
        T: ToString,
    {
        Self {
            sub: sub.to_string(),
            role,
            iat: 0,
            nbf: 0,
            exp: 0,
        }
    }
}

/// A signed token as it travels over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Token {
    token: String,
}

impl Token {
    pub fn new<T>(token: T) -> Self
    where
        T: ToString,
    {
        Self {
            token: token.to_string(),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Decodes the claim set from the token payload.
    ///
    /// Note that this does **not** verify the signature. Use this only for
    /// inspecting a token; verification happens server-side.
    pub fn claims(&self) -> Result<Claims, TokenError> {
        let payload = self
            .token
            .split('.')
            .nth(1)
            .ok_or(TokenError::InvalidToken)?;

        let payload = base64::decode_config(payload, base64::URL_SAFE_NO_PAD)?;

        Ok(serde_json::from_slice(&payload)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The body of a `POST /login` request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

/// The body of a `POST /register` request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterData {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// The body of a successful `POST /login` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: Token,
}

#[cfg(test)]
mod tests {
    use serde_test::{assert_tokens, Token as SerdeToken};

    use super::{Claims, Role};

    #[test]
    fn test_role_serde() {
        assert_tokens(
            &Role::Admin,
            &[SerdeToken::UnitVariant {
                name: "Role",
                variant: "admin",
            }],
        );
        assert_tokens(
            &Role::Viewer,
            &[SerdeToken::UnitVariant {
                name: "Role",
                variant: "viewer",
            }],
        );
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("editor".parse::<Role>().unwrap(), Role::Editor);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_claims_new() {
        let claims = Claims::new("alice", Role::Admin);

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iat, 0);
        assert_eq!(claims.nbf, 0);
        assert_eq!(claims.exp, 0);
    }
}
