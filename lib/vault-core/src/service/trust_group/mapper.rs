use shared_types::TrustGroupId;
use time::OffsetDateTime;

use super::dto::{CreateTrustGroupRequestDTO, UpdateTrustGroupRequestDTO};
use crate::config::core_config::TrustGroupConfig;
use crate::model::list_query::PageCursor;
use crate::model::trust_group::{
    CertificateType, INITIAL_CRL_NUMBER, SignatureAlgorithm, TrustGroup, TrustGroupIssuer,
    UpdateTrustGroupRequest,
};
use crate::provider::key_vault::model::{GeneratedIssuer, IssuerReference};
use crate::util::sort_key::next_sort_key;

/// Effective parameters of a group after defaults and updates are applied
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct GroupParameters {
    pub name: String,
    pub subject_name: String,
    pub lifetime: u32,
    pub key_size: u32,
    pub signature_algorithm: SignatureAlgorithm,
    pub issued_lifetime: u32,
    pub issued_key_size: u32,
    pub issued_signature_algorithm: SignatureAlgorithm,
}

impl GroupParameters {
    pub(super) fn from_request(
        request: &CreateTrustGroupRequestDTO,
        config: &TrustGroupConfig,
    ) -> Self {
        let defaults = &config.defaults;

        let signature_algorithm = request
            .signature_algorithm
            .unwrap_or(defaults.signature_algorithm);
        let issued_signature_algorithm = request
            .issued_signature_algorithm
            .unwrap_or(defaults.issued_signature_algorithm);

        Self {
            name: request.name.trim().to_owned(),
            subject_name: request.subject_name.trim().to_owned(),
            lifetime: request.lifetime.unwrap_or(defaults.lifetime),
            key_size: request.key_size.unwrap_or_else(|| {
                default_key_size(
                    config,
                    signature_algorithm,
                    defaults.signature_algorithm,
                    defaults.key_size,
                )
            }),
            signature_algorithm,
            issued_lifetime: request.issued_lifetime.unwrap_or(defaults.issued_lifetime),
            issued_key_size: request.issued_key_size.unwrap_or_else(|| {
                default_key_size(
                    config,
                    issued_signature_algorithm,
                    defaults.issued_signature_algorithm,
                    defaults.issued_key_size,
                )
            }),
            issued_signature_algorithm,
        }
    }

    pub(super) fn with_update(group: &TrustGroup, update: &UpdateTrustGroupRequestDTO) -> Self {
        Self {
            name: update
                .name
                .as_deref()
                .map_or_else(|| group.name.to_owned(), |name| name.trim().to_owned()),
            subject_name: update.subject_name.as_deref().map_or_else(
                || group.subject_name.to_owned(),
                |subject| subject.trim().to_owned(),
            ),
            lifetime: update.lifetime.unwrap_or(group.lifetime),
            key_size: update.key_size.unwrap_or(group.key_size),
            signature_algorithm: update
                .signature_algorithm
                .unwrap_or(group.signature_algorithm),
            issued_lifetime: update.issued_lifetime.unwrap_or(group.issued_lifetime),
            issued_key_size: update.issued_key_size.unwrap_or(group.issued_key_size),
            issued_signature_algorithm: update
                .issued_signature_algorithm
                .unwrap_or(group.issued_signature_algorithm),
        }
    }
}

/// Keeps only the fields present in the update, with their normalized values
pub(super) fn update_request_from(
    update: &UpdateTrustGroupRequestDTO,
    parameters: GroupParameters,
) -> UpdateTrustGroupRequest {
    UpdateTrustGroupRequest {
        name: update.name.as_ref().map(|_| parameters.name),
        subject_name: update.subject_name.as_ref().map(|_| parameters.subject_name),
        lifetime: update.lifetime.map(|_| parameters.lifetime),
        key_size: update.key_size.map(|_| parameters.key_size),
        signature_algorithm: update
            .signature_algorithm
            .map(|_| parameters.signature_algorithm),
        issued_lifetime: update.issued_lifetime.map(|_| parameters.issued_lifetime),
        issued_key_size: update.issued_key_size.map(|_| parameters.issued_key_size),
        issued_signature_algorithm: update
            .issued_signature_algorithm
            .map(|_| parameters.issued_signature_algorithm),
    }
}

/// The configured default size belongs to the default algorithm, any other
/// algorithm falls back to its first enabled size
fn default_key_size(
    config: &TrustGroupConfig,
    algorithm: SignatureAlgorithm,
    default_algorithm: SignatureAlgorithm,
    default_key_size: u32,
) -> u32 {
    if algorithm == default_algorithm {
        return default_key_size;
    }

    config
        .algorithms
        .get(&algorithm)
        .and_then(|algorithm| algorithm.key_sizes.first().copied())
        .unwrap_or(default_key_size)
}

pub(super) fn trust_group_from_parameters(
    id: TrustGroupId,
    parent_id: Option<TrustGroupId>,
    certificate_type: CertificateType,
    parameters: GroupParameters,
    issuer: TrustGroupIssuer,
    now: OffsetDateTime,
) -> TrustGroup {
    TrustGroup {
        id,
        created_date: now,
        last_modified: now,
        parent_id,
        name: parameters.name,
        certificate_type,
        subject_name: parameters.subject_name,
        lifetime: parameters.lifetime,
        key_size: parameters.key_size,
        signature_algorithm: parameters.signature_algorithm,
        issued_lifetime: parameters.issued_lifetime,
        issued_key_size: parameters.issued_key_size,
        issued_signature_algorithm: parameters.issued_signature_algorithm,
        version: 0,
        sort_key: next_sort_key(now),
        issuer: Some(issuer),
    }
}

pub(super) fn issuer_from_generated(
    group_id: TrustGroupId,
    version: u32,
    parent_version: Option<u32>,
    generated: GeneratedIssuer,
    now: OffsetDateTime,
) -> TrustGroupIssuer {
    TrustGroupIssuer {
        group_id,
        version,
        parent_version,
        created_date: now,
        serial_number: generated.serial_number,
        certificate: generated.certificate,
        crl: generated.crl,
        crl_number: INITIAL_CRL_NUMBER,
        key_handle: generated.key_handle,
        not_before: generated.not_before,
        not_after: generated.not_after,
    }
}

impl From<&TrustGroupIssuer> for IssuerReference {
    fn from(issuer: &TrustGroupIssuer) -> Self {
        Self {
            key_handle: issuer.key_handle.to_owned(),
            certificate: issuer.certificate.to_owned(),
        }
    }
}

pub(super) fn group_cursor(group: &TrustGroup) -> PageCursor {
    PageCursor {
        sort_key: group.sort_key,
        id: group.id.to_string(),
    }
}
