//! SOAP framing helpers.
//!
//! # Data Flow
//! ```text
//! Inbound Content-Type
//!     → SoapVersion (1.1 text/xml, 1.2 application/soap+xml)
//!
//! SOAP 1.1: SOAPAction header, verbatim
//! SOAP 1.2: body → xml.rs → first WS-Addressing <Action> element
//! ```
//!
//! # Design Decisions
//! - Payloads are checked for well-formedness only, never schema-validated
//! - A missing 1.2 action is an empty string, not an error

pub mod xml;

/// WSDL 1.1 namespace; a WSDL document must contain `definitions` in it.
pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// WS-Addressing namespace carrying the SOAP 1.2 `Action` element.
pub const ADDRESSING_NAMESPACE: &str = "http://www.w3.org/2005/08/addressing";

const SOAP_12_MEDIA_TYPE: &str = "application/soap+xml";
const SOAP_11_MEDIA_TYPE: &str = "text/xml";

/// SOAP protocol version, detected from the inbound `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapVersion {
    Soap11,
    Soap12,
}

impl SoapVersion {
    /// `application/soap+xml` means 1.2; anything else, or no header, is 1.1.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.contains(SOAP_12_MEDIA_TYPE) => SoapVersion::Soap12,
            _ => SoapVersion::Soap11,
        }
    }

    /// Bare media type for this version.
    pub fn media_type(self) -> &'static str {
        match self {
            SoapVersion::Soap11 => SOAP_11_MEDIA_TYPE,
            SoapVersion::Soap12 => SOAP_12_MEDIA_TYPE,
        }
    }

    /// `Content-Type` header value used both upstream and toward the caller.
    pub fn content_type(self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "text/xml; charset=utf-8",
            SoapVersion::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }

    /// Resolve the SOAP action for this version.
    ///
    /// 1.1 takes the `SOAPAction` header as-is. 1.2 reads the first
    /// WS-Addressing `Action` element from the envelope.
    pub fn extract_action(self, soap_action_header: Option<&str>, body: &[u8]) -> String {
        match self {
            SoapVersion::Soap11 => soap_action_header.unwrap_or_default().to_string(),
            SoapVersion::Soap12 => xml::first_element_text(body, ADDRESSING_NAMESPACE, "Action")
                .map(|action| action.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoapVersion::Soap11 => write!(f, "1.1"),
            SoapVersion::Soap12 => write!(f, "1.2"),
        }
    }
}

/// Whether `content` is a well-formed document containing a WSDL `definitions` element.
pub fn is_valid_wsdl(content: &[u8]) -> bool {
    xml::contains_element(content, WSDL_NAMESPACE, "definitions")
}
