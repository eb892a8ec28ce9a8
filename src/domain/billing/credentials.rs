//! Merchant credentials shared with the payment gateway.

use secrecy::{ExposeSecret, SecretString};

/// Merchant login plus the production and test secret pairs.
///
/// `password1` signs invoice creation, `password2` verifies result callbacks.
/// Which pair is live depends on the runtime test-mode flag.
#[derive(Clone)]
pub struct MerchantCredentials {
    pub login: String,
    password1: SecretString,
    password2: SecretString,
    test_password1: SecretString,
    test_password2: SecretString,
}

impl MerchantCredentials {
    pub fn new(
        login: impl Into<String>,
        password1: SecretString,
        password2: SecretString,
        test_password1: SecretString,
        test_password2: SecretString,
    ) -> Self {
        Self {
            login: login.into(),
            password1,
            password2,
            test_password1,
            test_password2,
        }
    }

    /// Secret for signing invoice creation.
    pub fn password1(&self, is_test: bool) -> &str {
        if is_test {
            self.test_password1.expose_secret()
        } else {
            self.password1.expose_secret()
        }
    }

    /// Secret for verifying result callbacks.
    pub fn password2(&self, is_test: bool) -> &str {
        if is_test {
            self.test_password2.expose_secret()
        } else {
            self.password2.expose_secret()
        }
    }
}

impl std::fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> MerchantCredentials {
        MerchantCredentials::new(
            "shop",
            SecretString::new("S1".into()),
            SecretString::new("S2".into()),
            SecretString::new("T1".into()),
            SecretString::new("T2".into()),
        )
    }

    #[test]
    fn picks_pair_by_mode() {
        let c = creds();
        assert_eq!(c.password1(false), "S1");
        assert_eq!(c.password2(false), "S2");
        assert_eq!(c.password1(true), "T1");
        assert_eq!(c.password2(true), "T2");
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", creds());
        assert!(rendered.contains("shop"));
        assert!(!rendered.contains("S1"));
    }
}
