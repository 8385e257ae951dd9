use crate::model::list_query::{GetListResponse, PageCursor};
use crate::service::error::{ServiceError, ValidationError};

pub fn vector_into<T, F: Into<T>>(input: Vec<F>) -> Vec<T> {
    input.into_iter().map(|item| item.into()).collect()
}

pub fn list_response_into<T, F: Into<T>>(input: GetListResponse<F>) -> GetListResponse<T> {
    GetListResponse::<T> {
        values: vector_into(input.values),
        next_page_token: input.next_page_token,
    }
}

pub(crate) fn decode_page_token(token: Option<&str>) -> Result<Option<PageCursor>, ServiceError> {
    token
        .map(PageCursor::decode)
        .transpose()
        .map_err(|err| {
            tracing::debug!("Rejected page token: {err}");
            ValidationError::InvalidPageToken.into()
        })
}

/// Builds a page out of `page_size + 1` fetched records, the extra record only
/// signals that another page exists.
pub(crate) fn to_list_response<T>(
    mut values: Vec<T>,
    page_size: u32,
    cursor: impl Fn(&T) -> PageCursor,
) -> Result<GetListResponse<T>, ServiceError> {
    let page_size = page_size as usize;
    if values.len() <= page_size {
        return Ok(GetListResponse {
            values,
            next_page_token: None,
        });
    }

    values.truncate(page_size);
    let next_page_token = values
        .last()
        .map(|last| cursor(last).encode())
        .transpose()
        .map_err(|err| ServiceError::MappingError(err.to_string()))?;

    Ok(GetListResponse {
        values,
        next_page_token,
    })
}
