//! Request classification and target URL rewriting.
//!
//! # Responsibilities
//! - Decide whether a request is WSDL discovery or a SOAP operation call
//! - Rewrite the inbound URI onto the configured upstream host
//!
//! # Design Decisions
//! - Query markers are matched case-sensitively (`?wsdl`, `?singleWsdl`)
//! - POST is always a SOAP call, whatever the query string says
//! - Every occurrence of the mount path is removed from the URI

use axum::http::Method;

const WSDL_MARKERS: [&str; 2] = ["?wsdl", "?singleWsdl"];

/// Outcome of classifying one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// True for WSDL discovery, false for a SOAP operation call.
    pub is_wsdl_request: bool,
    /// Upstream URL the request is forwarded to.
    pub target_url: String,
}

/// Classifies inbound requests against a fixed upstream host and mount path.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    target_host: String,
    mount_path: String,
}

impl RequestClassifier {
    /// Create a new classifier.
    /// A trailing slash on the target host is normalised away.
    pub fn new(target_host: impl Into<String>, mount_path: impl Into<String>) -> Self {
        let target_host = target_host.into().trim_end_matches('/').to_string();
        Self {
            target_host,
            mount_path: mount_path.into(),
        }
    }

    /// Classify a request by method and original URI (path and query).
    pub fn classify(&self, method: &Method, uri: &str) -> Classification {
        Classification {
            is_wsdl_request: Self::is_wsdl_request(method, uri),
            target_url: self.target_url(uri),
        }
    }

    fn is_wsdl_request(method: &Method, uri: &str) -> bool {
        if *method == Method::POST {
            return false;
        }
        WSDL_MARKERS.iter().any(|marker| uri.contains(marker))
    }

    fn target_url(&self, uri: &str) -> String {
        let path = if self.mount_path.is_empty() {
            uri.to_string()
        } else {
            uri.replace(&self.mount_path, "")
        };
        format!("{}{}", self.target_host, path)
    }

    /// Upstream host this classifier rewrites onto.
    pub fn target_host(&self) -> &str {
        &self.target_host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RequestClassifier {
        RequestClassifier::new("https://api.example.com", "/soap-proxy")
    }

    #[test]
    fn test_get_wsdl_is_discovery() {
        let result = classifier().classify(&Method::GET, "/soap-proxy/svc?wsdl");
        assert!(result.is_wsdl_request);
        assert_eq!(result.target_url, "https://api.example.com/svc?wsdl");
    }

    #[test]
    fn test_single_wsdl_marker() {
        let result = classifier().classify(&Method::GET, "/soap-proxy/Service.svc?singleWsdl");
        assert!(result.is_wsdl_request);
        assert_eq!(result.target_url, "https://api.example.com/Service.svc?singleWsdl");
    }

    #[test]
    fn test_post_is_always_soap() {
        let result = classifier().classify(&Method::POST, "/soap-proxy/svc?wsdl");
        assert!(!result.is_wsdl_request);
        assert_eq!(result.target_url, "https://api.example.com/svc?wsdl");
    }

    #[test]
    fn test_head_with_marker_is_discovery() {
        assert!(classifier().classify(&Method::HEAD, "/soap-proxy/svc?wsdl").is_wsdl_request);
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert!(!classifier().classify(&Method::GET, "/soap-proxy/svc?WSDL").is_wsdl_request);
        assert!(!classifier().classify(&Method::GET, "/soap-proxy/svc").is_wsdl_request);
    }

    #[test]
    fn test_trailing_slash_on_host_trimmed() {
        let classifier = RequestClassifier::new("https://api.example.com/", "/soap-proxy");
        assert_eq!(classifier.target_host(), "https://api.example.com");
        let result = classifier.classify(&Method::POST, "/soap-proxy/svc");
        assert_eq!(result.target_url, "https://api.example.com/svc");
    }

    #[test]
    fn test_missing_mount_path_appends_full_uri() {
        let result = classifier().classify(&Method::POST, "/other/svc");
        assert_eq!(result.target_url, "https://api.example.com/other/svc");
    }

    #[test]
    fn test_every_mount_path_occurrence_removed() {
        let result = classifier().classify(&Method::POST, "/soap-proxy/a/soap-proxy/b");
        assert_eq!(result.target_url, "https://api.example.com/a/b");
    }
}
