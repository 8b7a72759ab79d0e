//! Method-override rewrite for verb-restricted wire layers.
//!
//! Some transports and intermediaries only pass a subset of HTTP verbs.
//! Requests using a verb outside that subset are sent as POST, with the real
//! verb carried in an override header the server honors. The rewrite is a
//! pure function over the method and the request's starting headers; the
//! caller's own header set is merged afterwards, so an explicitly set
//! override header wins.

use crate::headers::HeaderSet;
use crate::http::Method;

/// Header carrying the caller's verb when the wire verb is substituted.
pub const HEADER: &str = "x-http-method-override";

fn wire_supported(method: Method) -> bool {
    matches!(
        method,
        Method::Get | Method::Post | Method::Put | Method::Delete | Method::Head
    )
}

/// Rewrites `method` into a wire-supported verb, recording the original in
/// the override header when a substitution happens.
pub fn apply(method: Method, mut headers: HeaderSet) -> (Method, HeaderSet) {
    if wire_supported(method) {
        return (method, headers);
    }
    headers.set(HEADER, method.as_str());
    (Method::Post, headers)
}
