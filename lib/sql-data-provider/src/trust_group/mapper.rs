use sea_orm::Set;
use vault_core::model::trust_group::{TrustGroup, TrustGroupIssuer};

use crate::entity::{trust_group, trust_group_issuer};

impl From<trust_group::Model> for TrustGroup {
    fn from(value: trust_group::Model) -> Self {
        Self {
            id: value.id,
            created_date: value.created_date,
            last_modified: value.last_modified,
            parent_id: value.parent_id,
            name: value.name,
            certificate_type: value.certificate_type.into(),
            subject_name: value.subject_name,
            lifetime: value.lifetime,
            key_size: value.key_size,
            signature_algorithm: value.signature_algorithm.into(),
            issued_lifetime: value.issued_lifetime,
            issued_key_size: value.issued_key_size,
            issued_signature_algorithm: value.issued_signature_algorithm.into(),
            version: value.version,
            sort_key: value.sort_key,
            issuer: None,
        }
    }
}

impl From<TrustGroup> for trust_group::ActiveModel {
    fn from(value: TrustGroup) -> Self {
        Self {
            id: Set(value.id),
            created_date: Set(value.created_date),
            last_modified: Set(value.last_modified),
            parent_id: Set(value.parent_id),
            name: Set(value.name),
            certificate_type: Set(value.certificate_type.into()),
            subject_name: Set(value.subject_name),
            lifetime: Set(value.lifetime),
            key_size: Set(value.key_size),
            signature_algorithm: Set(value.signature_algorithm.into()),
            issued_lifetime: Set(value.issued_lifetime),
            issued_key_size: Set(value.issued_key_size),
            issued_signature_algorithm: Set(value.issued_signature_algorithm.into()),
            version: Set(value.version),
            sort_key: Set(value.sort_key),
        }
    }
}

impl From<trust_group_issuer::Model> for TrustGroupIssuer {
    fn from(value: trust_group_issuer::Model) -> Self {
        Self {
            group_id: value.group_id,
            version: value.version,
            created_date: value.created_date,
            serial_number: value.serial_number,
            certificate: value.certificate,
            crl: value.crl,
            key_handle: value.key_handle,
            not_before: value.not_before,
            not_after: value.not_after,
            parent_version: value.parent_version,
            crl_number: value.crl_number,
        }
    }
}

impl From<TrustGroupIssuer> for trust_group_issuer::ActiveModel {
    fn from(value: TrustGroupIssuer) -> Self {
        Self {
            group_id: Set(value.group_id),
            version: Set(value.version),
            created_date: Set(value.created_date),
            serial_number: Set(value.serial_number),
            certificate: Set(value.certificate),
            crl: Set(value.crl),
            key_handle: Set(value.key_handle),
            not_before: Set(value.not_before),
            not_after: Set(value.not_after),
            parent_version: Set(value.parent_version),
            crl_number: Set(value.crl_number),
        }
    }
}
