use time::OffsetDateTime;

/// Who performed a workflow step and when.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperationStamp {
    pub authority_id: String,
    pub time: OffsetDateTime,
}

impl OperationStamp {
    pub fn now(authority_id: impl Into<String>) -> Self {
        Self {
            authority_id: authority_id.into(),
            time: OffsetDateTime::now_utc(),
        }
    }
}
