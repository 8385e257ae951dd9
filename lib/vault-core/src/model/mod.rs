pub mod certificate_request;
pub mod common;
pub mod list_query;
pub mod trust_group;
pub mod trust_relationship;
