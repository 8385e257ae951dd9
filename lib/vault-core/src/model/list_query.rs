use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use thiserror::Error;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ListQuery {
    pub page_token: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetListResponse<T> {
    pub values: Vec<T>,
    /// `None` when there are no more results
    pub next_page_token: Option<String>,
}

/// Position after the last returned item. Records are ordered by `(sort_key, id)`,
/// the sort key is assigned at creation and never changes, so records inserted
/// concurrently always land after an already issued cursor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageCursor {
    pub sort_key: i64,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum PageTokenError {
    #[error("Invalid page token encoding: `{0}`")]
    Encoding(ct_codecs::Error),
    #[error("Malformed page token")]
    Malformed,
}

impl PageCursor {
    pub fn encode(&self) -> Result<String, PageTokenError> {
        Base64UrlSafeNoPadding::encode_to_string(format!("{}:{}", self.sort_key, self.id))
            .map_err(PageTokenError::Encoding)
    }

    pub fn decode(token: &str) -> Result<Self, PageTokenError> {
        let bytes =
            Base64UrlSafeNoPadding::decode_to_vec(token, None).map_err(PageTokenError::Encoding)?;
        let decoded = String::from_utf8(bytes).map_err(|_| PageTokenError::Malformed)?;

        let (sort_key, id) = decoded.split_once(':').ok_or(PageTokenError::Malformed)?;
        if id.is_empty() {
            return Err(PageTokenError::Malformed);
        }

        Ok(Self {
            sort_key: sort_key.parse().map_err(|_| PageTokenError::Malformed)?,
            id: id.to_owned(),
        })
    }
}
