use shared_types::KeyHandle;
use time::OffsetDateTime;

use crate::model::trust_group::{CertificateType, SignatureAlgorithm};
use crate::util::x509::DistinguishedName;

/// Issuer certificate of a trust group, generated together with its key pair
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuerKeyRequest {
    pub subject: DistinguishedName,
    pub signature_algorithm: SignatureAlgorithm,
    pub key_size: u32,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

/// Existing issuer used to sign
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuerReference {
    pub key_handle: KeyHandle,
    /// DER encoded issuer certificate
    pub certificate: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyPairRequest {
    pub subject: DistinguishedName,
    pub domain_names: Vec<String>,
    pub certificate_type: CertificateType,
    pub signature_algorithm: SignatureAlgorithm,
    pub key_size: u32,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignRequest {
    /// DER encoded PKCS#10 request
    pub csr: Vec<u8>,
    pub certificate_type: CertificateType,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrlRequest {
    pub crl_number: u32,
    pub this_update: OffsetDateTime,
    pub next_update: OffsetDateTime,
    pub revoked: Vec<RevokedCertificate>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevokedCertificate {
    /// Big-endian serial number as encoded in the certificate
    pub serial_number: Vec<u8>,
    pub revocation_time: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedIssuer {
    pub key_handle: KeyHandle,
    pub certificate: Vec<u8>,
    /// Empty revocation list signed by the new issuer key
    pub crl: Vec<u8>,
    pub serial_number: String,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedKeyPair {
    pub key_handle: KeyHandle,
    pub certificate: Vec<u8>,
}
