//! Request payloads: structured JSON or multipart form data
//!
//! `FormData` is an inspectable list of fields that is only turned into a
//! `reqwest::multipart::Form` when the request is sent.

use reqwest::multipart::{Form, Part};

/// Form field carrying the spoofed HTTP verb on multipart updates
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        mime_type: Option<String>,
        content: Vec<u8>,
    },
}

/// Ordered multipart fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime_type: Option<&str>,
        content: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormValue::File {
                filename: filename.into(),
                mime_type: mime_type.map(String::from),
                content,
            },
        ));
        self
    }

    /// Append a text field in place
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), FormValue::Text(value.into())));
    }

    /// First value stored under `name`
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the wire form
    pub fn into_multipart(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File {
                    filename,
                    mime_type,
                    content,
                } => {
                    let mut part = Part::bytes(content).file_name(filename);
                    if let Some(mime) = mime_type {
                        part = part.mime_str(&mime)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Body of a create or update call
#[derive(Debug)]
pub enum Payload<'a, T> {
    Json(&'a T),
    Multipart(FormData),
}

impl<'a, T> From<&'a T> for Payload<'a, T> {
    fn from(body: &'a T) -> Self {
        Payload::Json(body)
    }
}

impl<T> From<FormData> for Payload<'_, T> {
    fn from(form: FormData) -> Self {
        Payload::Multipart(form)
    }
}
