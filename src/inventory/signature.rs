use super::models::{ERROR, UNKNOWN};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
}
impl DigestAlgorithm {
    /// MD5 is rendered as a bare hex run, the SHA family colon-delimited.
    pub fn delimited(self) -> bool {
        !matches!(self, Self::Md5)
    }
    fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(bytes).to_vec(),
            Self::Sha1 => Sha1::digest(bytes).to_vec(),
            Self::Sha256 => Sha256::digest(bytes).to_vec(),
        }
    }
}
impl FromStr for DigestAlgorithm {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            other => Err(format!("unsupported digest algorithm {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDigests {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}
impl CertificateDigests {
    pub fn unknown() -> Self {
        Self {
            md5: UNKNOWN.to_string(),
            sha1: UNKNOWN.to_string(),
            sha256: UNKNOWN.to_string(),
        }
    }
    /// Digests of the first signer; `"Unknown"` everywhere when there is none.
    pub fn from_signers(certificates: &[Vec<u8>]) -> Self {
        match certificates.first() {
            Some(cert) => Self {
                md5: certificate_digest(cert, "MD5"),
                sha1: certificate_digest(cert, "SHA1"),
                sha256: certificate_digest(cert, "SHA256"),
            },
            None => Self::unknown(),
        }
    }
}

/// Hex digest of `cert` under the named algorithm, or `"Error"` if it cannot be computed.
pub fn certificate_digest(cert: &[u8], algorithm: &str) -> String {
    match algorithm.parse::<DigestAlgorithm>() {
        Ok(alg) => format_hex(&alg.digest(cert), alg.delimited()),
        Err(e) => {
            error!("Error calculating {} hash: {}", algorithm, e);
            ERROR.to_string()
        }
    }
}

pub fn format_hex(bytes: &[u8], delimited: bool) -> String {
    let hex = hex::encode_upper(bytes);
    if !delimited {
        return hex;
    }
    let mut out = String::with_capacity(hex.len() + hex.len() / 2);
    for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push_str(std::str::from_utf8(pair).unwrap_or_default());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digests_of_abc_match_reference_vectors() {
        let d = CertificateDigests::from_signers(&[b"abc".to_vec()]);
        assert_eq!(d.md5, "900150983CD24FB0D6963F7D28E17F72");
        assert_eq!(
            d.sha1,
            "A9:99:3E:36:47:06:81:6A:BA:3E:25:71:78:50:C2:6C:9C:D0:D8:9D"
        );
        assert_eq!(
            d.sha256,
            "BA:78:16:BF:8F:01:CF:EA:41:41:40:DE:5D:AE:22:23:\
             B0:03:61:A3:96:17:7A:9C:B4:10:FF:61:F2:00:15:AD"
        );
    }

    #[test]
    fn only_first_signer_is_hashed() {
        let first = CertificateDigests::from_signers(&[b"abc".to_vec()]);
        let both = CertificateDigests::from_signers(&[b"abc".to_vec(), b"other".to_vec()]);
        assert_eq!(first, both);
    }

    #[test]
    fn no_signers_is_unknown() {
        assert_eq!(CertificateDigests::from_signers(&[]), CertificateDigests::unknown());
    }

    #[test]
    fn unsupported_algorithm_yields_error_sentinel() {
        assert_eq!(certificate_digest(b"abc", "WHIRLPOOL"), ERROR);
        assert_eq!(certificate_digest(b"abc", "sha-1").len(), 59);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(format_hex(&[0x0a, 0xff, 0x10], true), "0A:FF:10");
        assert_eq!(format_hex(&[0x0a, 0xff, 0x10], false), "0AFF10");
        assert_eq!(format_hex(&[], true), "");
    }
}
