//! `Authorization: Basic` credential parsing for `GET /connect`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Parse `Basic base64(email:password)`. The password may itself contain `:`.
pub fn parse_basic_credentials(header: &str) -> Option<Credentials> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    if email.is_empty() {
        return None;
    }

    Some(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parses_email_and_password() {
        let creds = parse_basic_credentials(&basic("bob@dylan.com:toto:1234")).unwrap();
        assert_eq!(creds.email, "bob@dylan.com");
        assert_eq!(creds.password, "toto:1234");
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(parse_basic_credentials("Bearer abc").is_none());
        assert!(parse_basic_credentials("Basic !!!not-base64").is_none());
        assert!(parse_basic_credentials(&basic("no-colon")).is_none());
        assert!(parse_basic_credentials(&basic(":password")).is_none());
        assert!(parse_basic_credentials("Basic").is_none());
    }
}
