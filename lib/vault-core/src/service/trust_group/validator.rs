use time::OffsetDateTime;

use super::mapper::GroupParameters;
use crate::config::ConfigValidationError;
use crate::config::core_config::TrustGroupConfig;
use crate::model::trust_group::{SignatureAlgorithm, TrustGroup, TrustGroupIssuer};
use crate::service::error::{InvalidStateError, ServiceError, ValidationError};
use crate::util::x509::DistinguishedName;

/// Checks the group parameters against the configured limits, returns the parsed subject
pub(super) fn validate_group_parameters(
    parameters: &GroupParameters,
    config: &TrustGroupConfig,
) -> Result<DistinguishedName, ServiceError> {
    if parameters.name.is_empty() {
        return Err(ValidationError::MissingValue("name").into());
    }

    let subject =
        DistinguishedName::parse(&parameters.subject_name).map_err(ValidationError::from)?;

    validate_algorithm(config, parameters.signature_algorithm, parameters.key_size)?;
    validate_algorithm(
        config,
        parameters.issued_signature_algorithm,
        parameters.issued_key_size,
    )?;

    let bounds = &config.lifetime;
    if !(bounds.issuer_min_months..=bounds.issuer_max_months).contains(&parameters.lifetime) {
        return Err(ValidationError::InvalidLifetime(format!(
            "issuer lifetime of {} months is outside {}..={}",
            parameters.lifetime, bounds.issuer_min_months, bounds.issuer_max_months
        ))
        .into());
    }
    if !(bounds.issued_min_months..=bounds.issued_max_months)
        .contains(&parameters.issued_lifetime)
    {
        return Err(ValidationError::InvalidLifetime(format!(
            "issued lifetime of {} months is outside {}..={}",
            parameters.issued_lifetime, bounds.issued_min_months, bounds.issued_max_months
        ))
        .into());
    }
    if parameters.issued_lifetime.saturating_mul(2) > parameters.lifetime {
        return Err(ValidationError::InvalidLifetime(
            "issued lifetime must not exceed half of the issuer lifetime".to_owned(),
        )
        .into());
    }

    // sizes are only comparable within the same key family
    if parameters.signature_algorithm.is_rsa()
        && parameters.issued_signature_algorithm.is_rsa()
        && parameters.issued_key_size > parameters.key_size
    {
        return Err(ValidationError::InvalidKeySize(format!(
            "issued key size {} exceeds issuer key size {}",
            parameters.issued_key_size, parameters.key_size
        ))
        .into());
    }

    Ok(subject)
}

pub(super) fn validate_algorithm(
    config: &TrustGroupConfig,
    algorithm: SignatureAlgorithm,
    key_size: u32,
) -> Result<(), ServiceError> {
    config
        .check_algorithm(algorithm, key_size)
        .map_err(|err| match err {
            ConfigValidationError::UnsupportedKeySize { .. } => {
                ValidationError::InvalidKeySize(err.to_string())
            }
            err => ValidationError::UnsupportedAlgorithm(err.to_string()),
        })
        .map_err(Into::into)
}

/// The current issuer, if it can sign at `now`
pub(crate) fn validate_issuer_material(
    group: &TrustGroup,
    now: OffsetDateTime,
) -> Result<&TrustGroupIssuer, ServiceError> {
    let issuer = group
        .issuer
        .as_ref()
        .ok_or(InvalidStateError::MissingIssuer(group.id))?;

    if !issuer.is_valid_at(now) {
        return Err(InvalidStateError::IssuerExpired(group.id).into());
    }

    Ok(issuer)
}
