//! In-memory Secret Server used by the integration tests.
//!
//! Replies are rendered as real SOAP documents and parsed back, so the
//! client's envelope handling is exercised exactly as against a server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::escape;

use zanzibar::client::{Operation, SoapTransport, TransportError, XmlElement};
use zanzibar::{Credentials, SecretServerClient};

#[derive(Clone)]
struct Item {
    id: i64,
    field_name: String,
    value: String,
    /// Send the value as a CDATA section instead of escaped text.
    cdata: bool,
    attachment: Option<(String, Vec<u8>)>,
}

#[derive(Default)]
struct State {
    secrets: HashMap<i64, Vec<Item>>,
    secret_errors: HashMap<i64, String>,
    /// Secrets whose reply carries an error list *and* a payload.
    error_with_payload: HashMap<i64, String>,
    reject_login: Option<String>,
    next_item_id: i64,
    issued_tokens: Vec<String>,
    calls: Vec<Operation>,
}

#[derive(Clone, Default)]
pub struct FakeSecretServer {
    state: Arc<Mutex<State>>,
}

impl FakeSecretServer {
    pub fn new() -> Self {
        let server = Self::default();
        server.state.lock().unwrap().next_item_id = 1000;
        server
    }

    pub fn with_password(self, id: i64, password: &str) -> Self {
        self.push_item(id, "Password", password, false, None);
        self
    }

    pub fn with_cdata_password(self, id: i64, password: &str) -> Self {
        self.push_item(id, "Password", password, true, None);
        self
    }

    pub fn with_file(self, id: i64, field_name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.push_item(
            id,
            field_name,
            "",
            false,
            Some((file_name.to_string(), bytes.to_vec())),
        );
        self
    }

    pub fn set_password(&self, id: i64, password: &str) {
        let mut state = self.state.lock().unwrap();
        let items = state.secrets.get_mut(&id).expect("unknown secret");
        for item in items.iter_mut().filter(|i| i.field_name == "Password") {
            item.value = password.to_string();
        }
    }

    pub fn fail_secret(&self, id: i64, message: &str) {
        self.state
            .lock()
            .unwrap()
            .secret_errors
            .insert(id, message.to_string());
    }

    pub fn clear_failure(&self, id: i64) {
        self.state.lock().unwrap().secret_errors.remove(&id);
    }

    pub fn fail_secret_with_payload(&self, id: i64, message: &str) {
        self.state
            .lock()
            .unwrap()
            .error_with_payload
            .insert(id, message.to_string());
    }

    pub fn reject_login(&self, message: &str) {
        self.state.lock().unwrap().reject_login = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls().into_iter().filter(|op| *op == operation).count()
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// A client talking to this server.
    pub fn client(&self) -> SecretServerClient<FakeTransport> {
        SecretServerClient::new(
            FakeTransport(self.clone()),
            Credentials::new("alice", "s3cret", "corp"),
        )
    }

    fn push_item(
        &self,
        id: i64,
        field_name: &str,
        value: &str,
        cdata: bool,
        attachment: Option<(String, Vec<u8>)>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.next_item_id += 1;
        let item = Item {
            id: state.next_item_id,
            field_name: field_name.to_string(),
            value: value.to_string(),
            cdata,
            attachment,
        };
        state.secrets.entry(id).or_default().push(item);
    }

    fn respond(&self, operation: Operation, message: &[(&str, String)]) -> String {
        let param = |name: &str| {
            message
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);

        if operation != Operation::Authenticate {
            let token = param("token");
            if !state.issued_tokens.contains(&token) {
                return wrap(operation, &errors("Invalid token"));
            }
        }

        match operation {
            Operation::Authenticate => {
                if let Some(message) = &state.reject_login {
                    return wrap(operation, &errors(message));
                }
                let token = format!("token-{}", state.issued_tokens.len() + 1);
                state.issued_tokens.push(token.clone());
                wrap(operation, &format!("<Errors /><Token>{}</Token>", token))
            }
            Operation::GetSecret => {
                let id: i64 = param("secretId").parse().unwrap();
                if let Some(message) = state.secret_errors.get(&id) {
                    return wrap(operation, &errors(message));
                }
                let Some(items) = state.secrets.get(&id) else {
                    return wrap(operation, &errors("Access Denied"));
                };
                let items: String = items
                    .iter()
                    .map(|i| {
                        format!(
                            "<SecretItem><Value>{}</Value><Id>{}</Id><FieldName>{}</FieldName><IsFile>{}</IsFile></SecretItem>",
                            render_value(i),
                            i.id,
                            i.field_name,
                            i.attachment.is_some()
                        )
                    })
                    .collect();
                let error_list = match state.error_with_payload.get(&id) {
                    Some(message) => format!("<Errors><string>{}</string></Errors>", message),
                    None => "<Errors />".to_string(),
                };
                wrap(
                    operation,
                    &format!(
                        "{}<Secret><Name>secret-{}</Name><Id>{}</Id><Items>{}</Items></Secret>",
                        error_list, id, id, items
                    ),
                )
            }
            Operation::DownloadFileAttachmentByItemId => {
                let id: i64 = param("secretId").parse().unwrap();
                let item_id: i64 = param("secretItemId").parse().unwrap();
                let attachment = state
                    .secrets
                    .get(&id)
                    .and_then(|items| items.iter().find(|i| i.id == item_id))
                    .and_then(|i| i.attachment.clone());
                match attachment {
                    Some((file_name, bytes)) => wrap(
                        operation,
                        &format!(
                            "<Errors /><FileAttachment>{}</FileAttachment><FileName>{}</FileName>",
                            STANDARD.encode(bytes),
                            file_name
                        ),
                    ),
                    None => wrap(operation, &errors("File attachment not found")),
                }
            }
        }
    }
}

pub struct FakeTransport(pub FakeSecretServer);

#[async_trait]
impl SoapTransport for FakeTransport {
    async fn call(
        &self,
        operation: Operation,
        message: &[(&str, String)],
    ) -> Result<XmlElement, TransportError> {
        let reply = self.0.respond(operation, message);
        XmlElement::parse(&reply)
    }
}

fn render_value(item: &Item) -> String {
    if item.cdata {
        format!("<![CDATA[{}]]>", item.value)
    } else {
        escape(item.value.as_str()).into_owned()
    }
}

fn errors(message: &str) -> String {
    format!("<Errors><string>{}</string></Errors>", message)
}

fn wrap(operation: Operation, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>
<{op}Response xmlns="urn:thesecretserver.com"><{op}Result>{inner}</{op}Result></{op}Response>
</soap:Body></soap:Envelope>"#,
        op = operation.name(),
        inner = inner
    )
}

/// Write a Zanzifile into `dir`.
pub fn write_manifest(dir: &std::path::Path, secrets_yaml: &str) {
    let manifest = format!(
        "settings:\n  wsdl: https://ss.example.com/SecretServer/webservices/SSWebservice.asmx?wsdl\n  domain: corp\n  secret_dir: secrets\nsecrets:\n{}",
        secrets_yaml
    );
    std::fs::write(dir.join("Zanzifile"), manifest).unwrap();
}
