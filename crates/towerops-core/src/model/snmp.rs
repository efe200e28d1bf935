// ── SNMP enumerations ──
//
// Wire spellings are the `strum` serializations; parsing is case-sensitive
// because the API is.

use strum::{AsRefStr, Display, EnumString, VariantNames};

/// SNMP protocol version used to poll a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, VariantNames)]
pub enum SnmpVersion {
    #[strum(serialize = "1")]
    V1,
    #[strum(serialize = "2c")]
    V2c,
    #[strum(serialize = "3")]
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, VariantNames)]
pub enum SecurityLevel {
    #[strum(serialize = "noAuthNoPriv")]
    NoAuthNoPriv,
    #[strum(serialize = "authNoPriv")]
    AuthNoPriv,
    #[strum(serialize = "authPriv")]
    AuthPriv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, VariantNames)]
pub enum AuthProtocol {
    #[strum(serialize = "MD5")]
    Md5,
    #[strum(serialize = "SHA")]
    Sha,
    #[strum(serialize = "SHA-224")]
    Sha224,
    #[strum(serialize = "SHA-256")]
    Sha256,
    #[strum(serialize = "SHA-384")]
    Sha384,
    #[strum(serialize = "SHA-512")]
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, VariantNames)]
pub enum PrivProtocol {
    #[strum(serialize = "DES")]
    Des,
    #[strum(serialize = "AES")]
    Aes,
    #[strum(serialize = "AES-192")]
    Aes192,
    #[strum(serialize = "AES-256")]
    Aes256,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn versions_use_wire_spelling() {
        assert_eq!("2c".parse::<SnmpVersion>().unwrap(), SnmpVersion::V2c);
        assert_eq!(SnmpVersion::V3.to_string(), "3");
        assert!("v3".parse::<SnmpVersion>().is_err());
    }

    #[test]
    fn protocols_keep_dashes() {
        assert_eq!("SHA-256".parse::<AuthProtocol>().unwrap(), AuthProtocol::Sha256);
        assert_eq!(PrivProtocol::Aes192.as_ref(), "AES-192");
        assert!("sha".parse::<AuthProtocol>().is_err());
    }

    #[test]
    fn variant_names_are_wire_values() {
        assert_eq!(SnmpVersion::VARIANTS, &["1", "2c", "3"]);
        assert_eq!(SecurityLevel::VARIANTS, &["noAuthNoPriv", "authNoPriv", "authPriv"]);
    }
}
