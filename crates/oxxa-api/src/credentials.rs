use std::fmt;
use tracing::warn;

/// Prefix of a pre-hashed password.
pub const DIGEST_MARKER: &str = "MD5";

/// API user and password, the password always stored in digest form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// `password` is either `MD5` + 32 hex chars, or a raw password which is
    /// hashed here.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let password = password.into();
        assert!(!username.is_empty(), "empty API username");
        assert!(!password.is_empty(), "empty API password");

        let password = if is_digest(&password) {
            password
        } else {
            warn!("hashing raw API password; prefer passing MD5 + md5(password)");
            digest(&password)
        };

        Self { username, password }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The digest-form password sent as `apipassword`.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_digest(password: &str) -> bool {
    password
        .strip_prefix(DIGEST_MARKER)
        .map(|hex| hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn digest(password: &str) -> String {
    format!("{DIGEST_MARKER}{:x}", md5::compute(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_password_is_hashed() {
        let creds = Credentials::new("USER", "PASS");
        assert_eq!(creds.password(), "MD57a95bf926a0333f57705aeac07a362a2");
        assert_eq!(creds.username(), "USER");
    }

    #[test]
    fn digest_password_is_kept() {
        for pw in [
            "MD57a95bf926a0333f57705aeac07a362a2",
            "MD55EBE2294ECD0E0F08EAB7690D2A6EE69",
        ] {
            assert_eq!(Credentials::new("USER", pw).password(), pw);
        }
    }

    #[test]
    fn digest_lookalikes_are_hashed() {
        // right length, not hex
        let fake = "MD5zzzzbf926a0333f57705aeac07a362a2";
        let creds = Credentials::new("USER", fake);
        assert_ne!(creds.password(), fake);
        assert!(is_digest(creds.password()));

        // hex, wrong length
        let short = "MD57a95bf926a0333f57705aeac07a362a";
        assert_eq!(Credentials::new("USER", short).password(), digest(short));
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::new("USER", "secret");
        let shown = format!("{creds:?}");
        assert!(shown.contains("USER"));
        assert!(!shown.contains("5ebe2294ecd0e0f08eab7690d2a6ee69"));
    }

    #[test]
    #[should_panic(expected = "empty API username")]
    fn empty_username_is_rejected() {
        Credentials::new("", "PASS");
    }
}
