//! Payment gateway signatures.
//!
//! The gateway authenticates both directions with an uppercase-insensitive
//! hex SHA-256 over colon-joined fields:
//!
//! - invoice creation: `login:out_sum:inv_id:password1`
//! - payment result callback: `out_sum:inv_id:password2`
//!
//! `out_sum` is always rendered with exactly two decimal places.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::domain::foundation::{Amount, InvoiceId};

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Signature sent with an invoice creation request.
pub fn creation_signature(
    merchant_login: &str,
    out_sum: &Amount,
    inv_id: InvoiceId,
    password1: &str,
) -> String {
    sha256_hex(&format!(
        "{}:{}:{}:{}",
        merchant_login, out_sum, inv_id, password1
    ))
}

/// Signature the gateway attaches to the payment result callback.
pub fn result_signature(out_sum: &Amount, inv_id: InvoiceId, password2: &str) -> String {
    sha256_hex(&format!("{}:{}:{}", out_sum, inv_id, password2))
}

/// Compares two hex signatures ignoring case, in constant time.
pub fn signatures_match(expected: &str, supplied: &str) -> bool {
    let expected = expected.trim().to_ascii_uppercase();
    let supplied = supplied.trim().to_ascii_uppercase();
    if expected.len() != supplied.len() {
        return false;
    }
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn creation_signature_hashes_login_sum_id_and_secret() {
        let sig = creation_signature("login", &amount("199.99"), InvoiceId::new(42), "S1");
        let expected = hex::encode(Sha256::digest(b"login:199.99:42:S1"));
        assert_eq!(sig, expected);
    }

    #[test]
    fn result_signature_hashes_sum_id_and_secret() {
        let sig = result_signature(&amount("199.99"), InvoiceId::new(42), "P2");
        let expected = hex::encode(Sha256::digest(b"199.99:42:P2"));
        assert_eq!(sig, expected);
    }

    #[test]
    fn whole_amounts_are_signed_with_two_decimals() {
        let sig = result_signature(&amount("300"), InvoiceId::new(7), "P2");
        let expected = hex::encode(Sha256::digest(b"300.00:7:P2"));
        assert_eq!(sig, expected);
    }

    #[test]
    fn comparison_ignores_case() {
        let sig = result_signature(&amount("1.00"), InvoiceId::new(1), "x");
        assert!(signatures_match(&sig, &sig.to_uppercase()));
        assert!(signatures_match(&sig.to_uppercase(), &sig));
    }

    #[test]
    fn comparison_rejects_different_signature() {
        let a = result_signature(&amount("1.00"), InvoiceId::new(1), "x");
        let b = result_signature(&amount("1.00"), InvoiceId::new(2), "x");
        assert!(!signatures_match(&a, &b));
        assert!(!signatures_match(&a, ""));
    }

    proptest! {
        #[test]
        fn any_change_to_the_amount_breaks_the_signature(cents in 1u32..10_000_000, delta in 1u32..100) {
            let base = Amount::new(rust_decimal::Decimal::new(cents as i64, 2)).unwrap();
            let other = Amount::new(rust_decimal::Decimal::new((cents + delta) as i64, 2)).unwrap();
            let sig = result_signature(&base, InvoiceId::new(5), "secret");
            prop_assert!(signatures_match(&sig, &result_signature(&base, InvoiceId::new(5), "secret")));
            prop_assert!(!signatures_match(&sig, &result_signature(&other, InvoiceId::new(5), "secret")));
        }
    }
}
