//! HTTP transport over reqwest.

use reqwest::multipart::{Form, Part};

use crate::{ClientConfig, FormPart, HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Transport for `config.base_url` with `config.timeout` per request.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }
}

impl HttpTransport for ReqwestTransport {
    type Error = reqwest::Error;

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

fn multipart_form(parts: Vec<FormPart>) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File { name, file_name, content_type, bytes } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(content_type) = content_type {
                    file = file.mime_str(&content_type)?;
                }
                form.part(name, file)
            },
        };
    }
    Ok(form)
}
