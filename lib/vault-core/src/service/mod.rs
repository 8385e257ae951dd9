pub mod certificate_request;
pub mod error;
pub mod issuer_chain;
pub mod permission;
pub mod trust_group;
pub mod trust_relationship;

#[cfg(test)]
pub mod test_utilities;
