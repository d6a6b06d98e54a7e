//! Stellar strkey addresses as they travel outside the ledger.
//!
//! Strkeys are upper-case base32, so lower-casing is lossless: the mirror
//! stores the lower-case form and the ledger gets the upper-case one back.

use stellar_strkey::Strkey;

use crate::error::LedgerError;

/// Validate an account (`G...`) or contract (`C...`) strkey in any case and
/// return its canonical upper-case form.
pub fn canonicalize(address: &str) -> Result<String, LedgerError> {
    let upper = address.trim().to_ascii_uppercase();
    match Strkey::from_string(&upper) {
        Ok(Strkey::PublicKeyEd25519(_)) | Ok(Strkey::Contract(_)) => Ok(upper),
        _ => Err(LedgerError::InvalidAddress(address.to_string())),
    }
}

/// Key used by the off-chain mirror for a voter.
pub fn mirror_key(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
    const ZERO_CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

    #[test]
    fn test_accepts_accounts_and_contracts() {
        assert_eq!(canonicalize(ZERO_ACCOUNT).unwrap(), ZERO_ACCOUNT);
        assert_eq!(canonicalize(ZERO_CONTRACT).unwrap(), ZERO_CONTRACT);
    }

    #[test]
    fn test_lower_case_input_is_canonicalized() {
        let lower = ZERO_ACCOUNT.to_ascii_lowercase();
        assert_eq!(canonicalize(&lower).unwrap(), ZERO_ACCOUNT);
        assert_eq!(mirror_key(ZERO_ACCOUNT), lower);
    }

    #[test]
    fn test_rejects_garbage_and_bad_checksums() {
        assert!(matches!(canonicalize("0x1234"), Err(LedgerError::InvalidAddress(_))));
        assert!(matches!(canonicalize(""), Err(LedgerError::InvalidAddress(_))));

        let mut corrupted = ZERO_ACCOUNT.to_string();
        corrupted.replace_range(55..56, "G");
        assert!(canonicalize(&corrupted).is_err());
    }
}
