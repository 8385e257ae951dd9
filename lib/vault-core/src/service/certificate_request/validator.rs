use std::net::IpAddr;

use shared_types::EntityId;

use crate::service::error::{ServiceError, ValidationError};

pub(crate) fn validate_entity_id(entity_id: &EntityId) -> Result<(), ServiceError> {
    if entity_id.as_str().trim().is_empty() {
        return Err(ValidationError::MissingValue("entity_id").into());
    }
    Ok(())
}

/// Host names (optionally with a leading `*.` wildcard) or IP addresses
pub(super) fn validate_domain_names(domain_names: &[String]) -> Result<(), ServiceError> {
    for name in domain_names {
        let name = name.trim();
        if name.parse::<IpAddr>().is_ok() {
            continue;
        }
        if !is_valid_host_name(name) {
            return Err(ValidationError::InvalidDomainName(name.to_owned()).into());
        }
    }
    Ok(())
}

fn is_valid_host_name(name: &str) -> bool {
    let name = name.strip_prefix("*.").unwrap_or(name);
    let name = name.strip_suffix('.').unwrap_or(name);

    if name.is_empty() || name.len() > 253 {
        return false;
    }

    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
