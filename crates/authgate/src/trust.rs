//! Issuer trust anchor loading
//!
//! Reads the optional CA certificate used to validate the OIDC provider's TLS
//! certificate. Any problem with the file is reported at startup; nothing is
//! deferred to the first request.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;
use rustls_pemfile::Item;
use tracing::debug;

use crate::error::TrustError;

/// A CA certificate trusted for provider calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    certificate: CertificateDer<'static>,
}

impl TrustAnchor {
    /// DER encoding of the certificate
    pub fn der(&self) -> &[u8] {
        self.certificate.as_ref()
    }

    /// Convert into a certificate reqwest can add to its root store
    pub(crate) fn to_reqwest_certificate(&self) -> Result<reqwest::Certificate, reqwest::Error> {
        reqwest::Certificate::from_der(self.der())
    }
}

/// Load the issuer CA from `path`
///
/// Returns `Ok(None)` when no path is configured.
///
/// # Errors
///
/// Returns [`TrustError`] if the file cannot be read, is empty, does not
/// contain exactly one PEM block, or the block is not a valid certificate.
pub fn load_issuer_ca(path: Option<&Path>) -> Result<Option<TrustAnchor>, TrustError> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };

    let file = File::open(path).map_err(|source| TrustError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| TrustError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() == 0 {
        return Err(TrustError::Empty {
            path: path.to_path_buf(),
        });
    }

    let items = rustls_pemfile::read_all(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            debug!(path = %path.display(), error = %e, "Failed to decode PEM");
            TrustError::NoPemBlock {
                path: path.to_path_buf(),
            }
        })?;

    let item = match <[Item; 1]>::try_from(items) {
        Ok([item]) => item,
        Err(items) if items.is_empty() => {
            return Err(TrustError::NoPemBlock {
                path: path.to_path_buf(),
            });
        }
        Err(items) => {
            return Err(TrustError::MultiplePemBlocks {
                path: path.to_path_buf(),
                count: items.len(),
            });
        }
    };

    let Item::X509Certificate(certificate) = item else {
        return Err(TrustError::NotACertificate {
            path: path.to_path_buf(),
        });
    };

    // Parse the same way rustls will when building the client's root store
    RootCertStore::empty()
        .add(certificate.clone())
        .map_err(|e| TrustError::InvalidCertificate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(path = %path.display(), "Loaded issuer CA certificate");
    Ok(Some(TrustAnchor { certificate }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn generate_ca() -> rcgen::CertifiedKey {
        let mut params = rcgen::CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        let key_pair = rcgen::KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        rcgen::CertifiedKey { cert, key_pair }
    }

    #[test]
    fn test_no_path_means_no_anchor() {
        assert!(load_issuer_ca(None).unwrap().is_none());
        assert!(load_issuer_ca(Some(Path::new(""))).unwrap().is_none());
    }

    #[test]
    fn test_load_ca_from_path() {
        let ca = generate_ca();
        let file = write_temp(ca.cert.pem().as_bytes());

        let anchor = load_issuer_ca(Some(file.path())).unwrap().unwrap();

        assert_eq!(anchor.der(), ca.cert.der().as_ref());
    }

    #[test]
    fn test_missing_file() {
        let result = load_issuer_ca(Some(Path::new("some-non-existing-file")));
        assert!(matches!(result, Err(TrustError::Read { .. })));
    }

    #[test]
    fn test_empty_file() {
        let file = write_temp(b"");
        let result = load_issuer_ca(Some(file.path()));
        assert!(matches!(result, Err(TrustError::Empty { .. })));
    }

    #[test]
    fn test_content_without_pem_block() {
        let file = write_temp(b"foobar");
        let result = load_issuer_ca(Some(file.path()));
        assert!(matches!(result, Err(TrustError::NoPemBlock { .. })));
    }

    #[test]
    fn test_two_certificates_rejected() {
        let first = generate_ca();
        let second = generate_ca();
        let bundle = format!("{}{}", first.cert.pem(), second.cert.pem());
        let file = write_temp(bundle.as_bytes());

        let result = load_issuer_ca(Some(file.path()));

        assert!(matches!(
            result,
            Err(TrustError::MultiplePemBlocks { count: 2, .. })
        ));
    }

    #[test]
    fn test_private_key_is_not_a_certificate() {
        let ca = generate_ca();
        let file = write_temp(ca.key_pair.serialize_pem().as_bytes());

        let result = load_issuer_ca(Some(file.path()));

        assert!(matches!(result, Err(TrustError::NotACertificate { .. })));
    }

    #[test]
    fn test_garbage_certificate_body() {
        let pem = "-----BEGIN CERTIFICATE-----\nZm9vYmFy\n-----END CERTIFICATE-----\n";
        let file = write_temp(pem.as_bytes());

        let result = load_issuer_ca(Some(file.path()));

        assert!(matches!(
            result,
            Err(TrustError::InvalidCertificate { .. })
        ));
    }
}
