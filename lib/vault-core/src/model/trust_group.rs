use serde::{Deserialize, Serialize};
use shared_types::{KeyHandle, TrustGroupId};
use strum::{Display, EnumString};
use time::OffsetDateTime;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustGroup {
    pub id: TrustGroupId,
    pub created_date: OffsetDateTime,
    pub last_modified: OffsetDateTime,
    pub parent_id: Option<TrustGroupId>,
    pub name: String,
    pub certificate_type: CertificateType,

    // issuer certificate of this group
    pub subject_name: String,
    pub lifetime: u32,
    pub key_size: u32,
    pub signature_algorithm: SignatureAlgorithm,

    // certificates issued by this group
    pub issued_lifetime: u32,
    pub issued_key_size: u32,
    pub issued_signature_algorithm: SignatureAlgorithm,

    pub version: u32,
    pub sort_key: i64,

    // Relations
    pub issuer: Option<TrustGroupIssuer>,
}

/// Number of the CRL published together with a new issuer certificate
pub const INITIAL_CRL_NUMBER: u32 = 1;

/// One version of the issuer material of a trust group. The version with the highest
/// number is the current one, older versions stay resolvable until the group is deleted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustGroupIssuer {
    pub group_id: TrustGroupId,
    pub version: u32,
    /// Issuer version of the parent group that signed this certificate, `None` for roots
    pub parent_version: Option<u32>,
    pub created_date: OffsetDateTime,
    pub serial_number: String,
    pub certificate: Vec<u8>,
    pub crl: Vec<u8>,
    pub crl_number: u32,
    pub key_handle: KeyHandle,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl TrustGroupIssuer {
    pub fn is_valid_at(&self, time: OffsetDateTime) -> bool {
        self.not_before <= time && time < self.not_after
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    ApplicationInstanceCertificate,
    HttpsCertificate,
    UserCredentialCertificate,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureAlgorithm {
    RsaSha256,
    RsaSha384,
    RsaSha512,
    EcdsaP256Sha256,
    EcdsaP384Sha384,
    Eddsa,
}

impl SignatureAlgorithm {
    pub fn is_rsa(&self) -> bool {
        matches!(self, Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512)
    }
}

/// Partial update of the group parameters, applied with a version check.
/// Issuer parameters only take effect on the next renewal.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateTrustGroupRequest {
    pub name: Option<String>,
    pub subject_name: Option<String>,
    pub lifetime: Option<u32>,
    pub key_size: Option<u32>,
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub issued_lifetime: Option<u32>,
    pub issued_key_size: Option<u32>,
    pub issued_signature_algorithm: Option<SignatureAlgorithm>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum TrustGroupParentFilter {
    #[default]
    Any,
    Roots,
    Children(TrustGroupId),
}
