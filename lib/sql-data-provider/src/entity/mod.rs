pub mod certificate_request;
pub mod trust_group;
pub mod trust_group_issuer;
pub mod trust_relationship;
