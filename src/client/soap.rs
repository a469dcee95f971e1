//! SOAP 1.1 transport for the Secret Server web service.
//!
//! The transport only knows how to deliver an operation with its ordered
//! parameters and hand back the parsed reply. Interpreting the reply
//! (result unwrapping, in-band errors) is the client's job.

use std::fmt;

use async_trait::async_trait;
use quick_xml::escape::escape;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::xml::XmlElement;

/// XML namespace of the Secret Server web service.
pub const SECRET_SERVER_NAMESPACE: &str = "urn:thesecretserver.com";

/// Remote operations this crate consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    GetSecret,
    DownloadFileAttachmentByItemId,
}

impl Operation {
    /// SOAP operation name as published in the service description.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Authenticate => "Authenticate",
            Operation::GetSecret => "GetSecret",
            Operation::DownloadFileAttachmentByItemId => "DownloadFileAttachmentByItemId",
        }
    }

    pub fn response_element(self) -> String {
        format!("{}Response", self.name())
    }

    pub fn result_element(self) -> String {
        format!("{}Result", self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failure below the application protocol: HTTP, SOAP faults, bad XML.
#[derive(Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or its body read.
    Http(reqwest::Error),
    /// Non-success status without a SOAP fault in the body.
    Status { status: u16, body: String },
    /// The server answered with a SOAP `Fault`.
    Fault(String),
    /// The reply was not well-formed XML.
    Xml(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Http(e) => write!(f, "HTTP error: {}", e),
            TransportError::Status { status, body } => {
                write!(f, "unexpected HTTP status {}: {}", status, body.trim())
            }
            TransportError::Fault(msg) => write!(f, "SOAP fault: {}", msg),
            TransportError::Xml(msg) => write!(f, "malformed XML: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Http(e) => Some(e),
            _ => None,
        }
    }
}

/// Delivers one operation call and returns the parsed reply document.
#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn call(
        &self,
        operation: Operation,
        message: &[(&str, String)],
    ) -> Result<XmlElement, TransportError>;
}

/// Secret Server transport over HTTP(S).
pub struct HttpSoapTransport {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpSoapTransport {
    /// Create a transport for the service described at `wsdl`.
    ///
    /// With `ignore_ssl`, certificate verification is disabled.
    pub fn new(wsdl: &str, ignore_ssl: bool) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(ignore_ssl)
            .user_agent(format!("zanzibar/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            endpoint: endpoint_from_wsdl(wsdl),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SoapTransport for HttpSoapTransport {
    async fn call(
        &self,
        operation: Operation,
        message: &[(&str, String)],
    ) -> Result<XmlElement, TransportError> {
        debug!(operation = operation.name(), endpoint = %self.endpoint, "calling Secret Server");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(
                "SOAPAction",
                format!("\"{}/{}\"", SECRET_SERVER_NAMESPACE, operation.name()),
            )
            .body(build_envelope(SECRET_SERVER_NAMESPACE, operation, message))
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;
        let parsed = XmlElement::parse(&body);

        if !status.is_success() {
            if let Ok(root) = &parsed
                && let Some(fault) = fault_string(root)
            {
                return Err(TransportError::Fault(fault));
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let root = parsed?;
        if let Some(fault) = fault_string(&root) {
            return Err(TransportError::Fault(fault));
        }
        Ok(root)
    }
}

/// Derive the service endpoint from a WSDL location by dropping `?wsdl`.
pub fn endpoint_from_wsdl(wsdl: &str) -> String {
    let wsdl = wsdl.trim();
    match wsdl.split_once('?') {
        Some((base, query)) if query.eq_ignore_ascii_case("wsdl") => base.to_string(),
        _ => wsdl.to_string(),
    }
}

/// Render a SOAP 1.1 request envelope with parameters in the given order.
pub fn build_envelope(namespace: &str, operation: Operation, message: &[(&str, String)]) -> String {
    let mut params = String::new();
    for (name, value) in message {
        params.push_str(&format!("<{name}>{}</{name}>", escape(value.as_str())));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema">"#,
            r#"<soap:Body><{op} xmlns="{ns}">{params}</{op}></soap:Body></soap:Envelope>"#
        ),
        op = operation.name(),
        ns = escape(namespace),
        params = params,
    )
}

fn fault_string(root: &XmlElement) -> Option<String> {
    let fault = root.path(&["Envelope", "Body", "Fault"])?;
    let message = fault
        .child_text("faultstring")
        .or_else(|| {
            fault
                .path(&["Fault", "Reason", "Text"])
                .map(|t| t.text.trim())
        })
        .unwrap_or("unknown fault");
    Some(message.to_string())
}
