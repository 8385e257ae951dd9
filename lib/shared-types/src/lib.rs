mod certificate_request_id;
mod entity_id;
mod key_handle;
mod macros;
mod trust_group_id;

pub use certificate_request_id::CertificateRequestId;
pub use entity_id::EntityId;
pub use key_handle::KeyHandle;
pub use trust_group_id::TrustGroupId;
