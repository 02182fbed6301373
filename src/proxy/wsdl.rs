//! WSDL discovery: cache first, upstream on a miss.

use axum::http::{header, Method, StatusCode};
use bytes::Bytes;

use crate::cache::WsdlCache;
use crate::proxy::error::{ProxyError, UpstreamError};
use crate::security::Credentials;
use crate::soap::{self, xml};
use crate::upstream::{UpstreamCall, UpstreamClient};

const WSDL_ACCEPT: &str = "application/xml, text/xml, */*";

/// Return the WSDL document for `target_url`.
///
/// A cache hit needs no credentials and makes no upstream call. A miss is
/// fetched with the caller's Basic credentials, validated and cached.
pub(crate) async fn lookup(
    cache: &WsdlCache,
    upstream: &UpstreamClient,
    target_url: &str,
    authorization: Option<&str>,
) -> Result<Bytes, ProxyError> {
    if let Some(content) = cache.get(target_url).await? {
        return Ok(content);
    }

    let credentials = Credentials::from_authorization(authorization)?;
    tracing::debug!(
        url = %target_url,
        user = %credentials.user,
        has_password = credentials.has_password(),
        "Fetching WSDL from upstream"
    );

    let call = UpstreamCall::new(Method::GET, target_url)
        .header(header::AUTHORIZATION, &credentials.basic_header_value())
        .header(header::ACCEPT, WSDL_ACCEPT);
    let result = upstream.execute(call).await?;

    let invalid = |reason| UpstreamError::InvalidWsdl {
        status: result.status,
        reason,
    };
    if result.status != StatusCode::OK {
        return Err(invalid("unexpected status").into());
    }
    if !xml::is_well_formed(&result.body) {
        return Err(invalid("response is not well-formed XML").into());
    }
    if !soap::is_valid_wsdl(&result.body) {
        return Err(invalid("no WSDL definitions element").into());
    }

    cache.put(target_url, &result.body).await?;
    Ok(result.body)
}
