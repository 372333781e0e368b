use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id that is echoed back; longer ones are replaced.
const MAX_REQUEST_ID_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Keep a caller's id only if it is short, non-empty, printable ASCII.
fn accepted_id(raw: Option<&HeaderValue>) -> Option<String> {
    let value = raw?.to_str().ok()?;
    let ok = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    ok.then(|| value.to_string())
}

/// Tags every request and response with an `x-request-id`, generating a
/// `UUIDv4` when the caller sent none or sent one [`accepted_id`] rejects.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = accepted_id(req.headers().get(REQUEST_ID_HEADER))
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}
