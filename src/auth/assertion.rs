//! App identity assertions (RS256 JWTs).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkerError};

/// Seconds the issued-at claim is backdated to tolerate clock drift.
pub const CLOCK_SKEW_SECS: i64 = 60;

/// Seconds from now until the assertion expires. GitHub caps this at ten minutes.
pub const LIFETIME_SECS: i64 = 9 * 60;

/// JWT claims GitHub expects from an App.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub iss: u64,
}

/// A signed, short-lived App assertion.
#[derive(Clone)]
pub struct SignedAssertion {
    issuer: u64,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    token: String,
}

impl SignedAssertion {
    pub fn issuer(&self) -> u64 {
        self.issuer
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The encoded JWT.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for SignedAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedAssertion")
            .field("issuer", &self.issuer)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Sign an assertion for `app_id` with the App's PEM private key.
pub fn issue_assertion(app_id: u64, private_key: &str) -> Result<SignedAssertion> {
    issue_assertion_at(app_id, private_key, Utc::now())
}

/// Like [`issue_assertion`], with an explicit clock.
pub fn issue_assertion_at(
    app_id: u64,
    private_key: &str,
    now: DateTime<Utc>,
) -> Result<SignedAssertion> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| WorkerError::Auth(format!("invalid App private key: {}", e)))?;

    let issued_at = now - Duration::seconds(CLOCK_SKEW_SECS);
    let expires_at = now + Duration::seconds(LIFETIME_SECS);
    let claims = Claims {
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
        iss: app_id,
    };

    let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| WorkerError::Auth(format!("failed to sign App assertion: {}", e)))?;

    Ok(SignedAssertion {
        issuer: app_id,
        issued_at,
        expires_at,
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/app_key/private.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/app_key/public.pem");

    fn decode_claims(token: &str) -> Claims {
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<Claims>(token, &key, &validation).unwrap().claims
    }

    #[test]
    fn test_claims_window() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let assertion = issue_assertion_at(4242, PRIVATE_KEY, now).unwrap();

        let claims = decode_claims(assertion.token());
        assert_eq!(claims.iat, now.timestamp() - 60);
        assert_eq!(claims.exp, now.timestamp() + 540);
        assert_eq!(claims.iss, 4242);

        assert_eq!(assertion.issuer(), 4242);
        assert_eq!(assertion.expires_at() - assertion.issued_at(), Duration::minutes(10));
    }

    #[test]
    fn test_uses_rs256() {
        let assertion = issue_assertion(1, PRIVATE_KEY).unwrap();
        let header = decode_header(assertion.token()).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[test]
    fn test_current_assertion_validates() {
        let assertion = issue_assertion(7, PRIVATE_KEY).unwrap();
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::RS256);

        let data = decode::<Claims>(assertion.token(), &key, &validation).unwrap();
        assert_eq!(data.claims.iss, 7);
    }

    #[test]
    fn test_malformed_key_is_auth_error() {
        let err = issue_assertion(1, "not a pem").unwrap_err();
        assert!(matches!(err, WorkerError::Auth(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let assertion = issue_assertion(1, PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", assertion);
        assert!(!debug.contains(assertion.token()));
    }
}
