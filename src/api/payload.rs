use serde_json::Value;

/// Body of an API request, chosen explicitly by the caller.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body and no query parameters.
    #[default]
    Empty,
    /// JSON value. Sent as the request body on body-bearing methods,
    /// rendered as query parameters on GET/DELETE.
    Json(Value),
    /// Multipart form. Kept as field descriptions rather than a built
    /// form so a retry can rebuild the body.
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content: Vec<u8>,
    },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        MultipartField::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, content: Vec<u8>) -> Self {
        MultipartField::File {
            name: name.into(),
            file_name: file_name.into(),
            content,
        }
    }
}

impl Payload {
    /// JSON payload from any serializable value.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Query-parameter rendering for methods that carry no body. Only
    /// JSON objects have one; null entries are dropped, strings appear
    /// unquoted, everything else renders as its JSON text.
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let Payload::Json(Value::Object(map)) = self else {
            return Vec::new();
        };
        map.iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }
}

/// Build a transmittable form from field descriptions. The CSRF token,
/// when configured, rides along as a form field.
pub(crate) fn multipart_form(
    fields: &[MultipartField],
    csrf_token: Option<&str>,
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field {
            MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartField::File {
                name,
                file_name,
                content,
            } => form.part(
                name.clone(),
                reqwest::multipart::Part::bytes(content.clone()).file_name(file_name.clone()),
            ),
        };
    }
    if let Some(csrf) = csrf_token {
        form = form.text("csrfToken", csrf.to_string());
    }
    form
}
