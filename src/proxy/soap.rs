//! SOAP operation dispatch.

use axum::http::{header, HeaderName, Method, StatusCode};
use bytes::Bytes;

use crate::http::ProxyRequest;
use crate::proxy::error::{ProxyError, UpstreamError};
use crate::security::Credentials;
use crate::soap::{xml, SoapVersion};
use crate::upstream::{UpstreamCall, UpstreamClient};

const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

/// Forward a SOAP envelope to `target_url` and return the upstream envelope.
pub(crate) async fn dispatch(
    upstream: &UpstreamClient,
    target_url: &str,
    request: &ProxyRequest,
) -> Result<(SoapVersion, Bytes), ProxyError> {
    let version = SoapVersion::from_content_type(request.content_type.as_deref());
    let action = version.extract_action(request.soap_action.as_deref(), &request.body);
    let credentials = Credentials::from_authorization(request.authorization.as_deref())?;

    tracing::debug!(
        url = %target_url,
        soap_version = %version,
        action = %action,
        user = %credentials.user,
        has_password = credentials.has_password(),
        "Dispatching SOAP call"
    );

    let call = UpstreamCall::new(Method::POST, target_url)
        .header(header::CONTENT_TYPE, version.content_type())
        .header(header::AUTHORIZATION, &credentials.basic_header_value())
        .header(SOAP_ACTION, &action)
        .body(request.body.clone());
    let result = upstream.execute(call).await?;

    if result.status != StatusCode::OK {
        return Err(UpstreamError::InvalidSoapResponse {
            status: result.status,
            reason: "unexpected status",
        }
        .into());
    }
    if !xml::is_well_formed(&result.body) {
        return Err(UpstreamError::InvalidSoapResponse {
            status: result.status,
            reason: "response is not well-formed XML",
        }
        .into());
    }

    Ok((version, result.body))
}
