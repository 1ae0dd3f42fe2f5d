use std::fmt::{self, Debug, Formatter};

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use leagues_api::auth::{Claims, Role, Token};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::Error;

/// Token expiration time.
const TOKEN_EXP: u64 = 60 * 60;

pub const SECRET: &[u8] = include_bytes!("../jwt-secret");

/// The roles allowed to mutate resources.
pub const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Editor];

/// A utility type to handle all [`Token`] encoding, decoding and validating.
#[derive(Clone)]
pub struct Authorization {
    alg: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Authorization {
    /// Creates a new `Authorization` instance which uses given [`Algorithm`].
    pub fn new(alg: Algorithm) -> Self {
        let mut validation = Validation::new(alg);
        // Expiration is validated manually in `validate_token`.
        validation.validate_exp = false;

        Self {
            alg,
            encoding_key: EncodingKey::from_secret(SECRET),
            decoding_key: DecodingKey::from_secret(SECRET),
            validation,
        }
    }

    /// Creates a new signed [`Token`] for the provided [`Claims`].
    ///
    /// Note that the `iat`, `nbf` and `exp` claims will be overwritten.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if encoding the token fails.
    pub fn create_token(&self, mut claims: Claims) -> Result<Token, Error> {
        let now = Utc::now().timestamp() as u64;

        claims.iat = now;
        claims.nbf = now;
        claims.exp = now + TOKEN_EXP;

        self.encode_token(claims)
    }

    /// Encodes a new [`Token`] using the provided [`Claims`] as they are.
    ///
    /// If you need a token with the correct `iat`, `nbf` and `exp` claims,
    /// use [`Self::create_token`].
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if encoding the token fails.
    pub fn encode_token(&self, claims: Claims) -> Result<Token, Error> {
        let header = Header::new(self.alg);
        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;
        Ok(Token::new(token))
    }

    /// Decodes a [`Token`] and validates its signature.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the token is malformed or carries an
    /// invalid signature.
    pub fn decode_token<T>(&self, token: T) -> Result<Claims, Error>
    where
        T: AsRef<str>,
    {
        let data = jsonwebtoken::decode(token.as_ref(), &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Decodes and fully validates a token, including all claims.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if decoding the token fails or any claims
    /// are invalid or expired.
    pub fn validate_token<T>(&self, token: T) -> Result<Claims, Error>
    where
        T: AsRef<str>,
    {
        let claims = self.decode_token(token)?;

        let now = Utc::now().timestamp() as u64;

        for claim in [claims.iat, claims.nbf, claims.exp] {
            if claim == 0 {
                return Err(Error::InvalidToken);
            }
        }

        if claims.exp < now {
            return Err(Error::InvalidToken);
        }

        if claims.exp - claims.nbf != TOKEN_EXP {
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }
}

impl Debug for Authorization {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Authorization {{ encoding_key, decoding_key }}")
    }
}

/// Hashes a password with a fresh random salt.
///
/// The output has the form `hex(salt)$hex(sha256(salt || password))`, which
/// is also the layout of the `password` field in the credential file.
pub fn password_hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);

    hash_with_salt(password, &salt)
}

/// Verifies a password against a stored `salt$hash` string.
pub fn password_verify(password: &str, stored: &str) -> bool {
    let salt = match stored.split_once('$') {
        Some((salt, _)) => salt,
        None => return false,
    };

    let salt = match hex::decode(salt) {
        Ok(salt) => salt,
        Err(_) => return false,
    };

    hash_with_salt(password, &salt) == stored
}

fn hash_with_salt(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());

    format!("{}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::Algorithm;
    use leagues_api::auth::{Claims, Role};

    use super::{password_hash, password_verify, Authorization, TOKEN_EXP};

    #[test]
    fn test_create_token() {
        let auth = Authorization::new(Algorithm::HS256);

        let token = auth.create_token(Claims::new("alice", Role::Admin)).unwrap();

        // Decode the token to check the actual claims in the token.
        let claims = token.claims().unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.nbf, TOKEN_EXP);
    }

    #[test]
    fn test_validate_token() {
        let auth = Authorization::new(Algorithm::HS256);

        let token = auth.create_token(Claims::new("alice", Role::Admin)).unwrap();

        let claims = auth.validate_token(token.as_str()).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);

        // Token with zeroed iat, nbf, exp claims.
        let token = auth.encode_token(Claims::new("alice", Role::Admin)).unwrap();
        auth.validate_token(token.as_str()).unwrap_err();

        // Expired token.
        let now = Utc::now().timestamp() as u64;
        let mut claims = Claims::new("alice", Role::Admin);
        claims.iat = now - 2 * TOKEN_EXP;
        claims.nbf = now - 2 * TOKEN_EXP;
        claims.exp = now - TOKEN_EXP;
        let token = auth.encode_token(claims).unwrap();
        auth.validate_token(token.as_str()).unwrap_err();

        // Token with an invalid lifetime.
        let mut claims = Claims::new("alice", Role::Admin);
        claims.iat = now;
        claims.nbf = now;
        claims.exp = now + TOKEN_EXP + 1;
        let token = auth.encode_token(claims).unwrap();
        auth.validate_token(token.as_str()).unwrap_err();
    }

    #[test]
    fn test_validate_tampered_token() {
        let auth = Authorization::new(Algorithm::HS256);

        let token = auth.create_token(Claims::new("alice", Role::Admin)).unwrap();

        // Flip the first signature character.
        let (head, sig) = token.as_str().rsplit_once('.').unwrap();
        let mut sig = sig.to_owned();
        let first = sig.remove(0);
        sig.insert(0, if first == 'A' { 'B' } else { 'A' });

        let tampered = format!("{}.{}", head, sig);
        auth.validate_token(&tampered).unwrap_err();
    }

    #[test]
    fn test_password_hash() {
        let hash = password_hash("hunter2");

        assert!(password_verify("hunter2", &hash));
        assert!(!password_verify("hunter3", &hash));

        // Two hashes of the same password use different salts.
        assert_ne!(hash, password_hash("hunter2"));

        assert!(!password_verify("hunter2", "not-a-hash"));
    }
}
