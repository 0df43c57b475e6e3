//! Per-resource CRUD wrappers
//!
//! Each backend collection is described by a [`Resource`] impl and accessed
//! through [`ResourceApi`]. Responses are returned as `serde_json::Value`
//! because the backend's list/detail envelopes are not fixed.
//!
//! Multipart bodies can only be sent with POST, so a multipart update is a
//! POST to `/R/:id` carrying a `_method` field with the real verb.

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ApiClient, ApiError};
use crate::form::{Payload, METHOD_OVERRIDE_FIELD};
use crate::models;

/// A backend collection
pub trait Resource {
    /// Request/response record
    type Body: Serialize;

    /// Collection path segment, without slashes
    const PATH: &'static str;

    /// Verb spoofed on multipart updates; `None` means JSON only
    const MULTIPART_OVERRIDE: Option<Method> = None;
}

pub struct Employees;
pub struct Clients;
pub struct PicExternals;
pub struct Placements;
pub struct ContractClients;
pub struct Invoices;
pub struct ContractEmployees;

impl Resource for Employees {
    type Body = models::Employee;
    const PATH: &'static str = "employees";
    const MULTIPART_OVERRIDE: Option<Method> = Some(Method::PATCH);
}

impl Resource for Clients {
    type Body = models::Client;
    const PATH: &'static str = "clients";
    const MULTIPART_OVERRIDE: Option<Method> = Some(Method::PUT);
}

impl Resource for PicExternals {
    type Body = models::PicExternal;
    const PATH: &'static str = "pic-externals";
}

impl Resource for Placements {
    type Body = models::Placement;
    const PATH: &'static str = "placements";
}

impl Resource for ContractClients {
    type Body = models::ContractClient;
    const PATH: &'static str = "contract-clients";
}

impl Resource for Invoices {
    type Body = models::Invoice;
    const PATH: &'static str = "invoices";
}

impl Resource for ContractEmployees {
    type Body = models::ContractEmployee;
    const PATH: &'static str = "contract-employees";
}

/// Query parameters for list calls, sent in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListQuery(Vec<(String, String)>);

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// CRUD calls for one resource
pub struct ResourceApi<'a, R> {
    client: &'a ApiClient,
    _resource: PhantomData<R>,
}

impl<'a, R: Resource> ResourceApi<'a, R> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Value, ApiError> {
        let mut req = self.client.request(Method::GET, &collection_path::<R>());
        if !query.is_empty() {
            req = req.query(query);
        }
        self.client.execute(req).await
    }

    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.client.get(&member_path::<R>(id)).await
    }

    pub async fn create<'b>(
        &self,
        payload: impl Into<Payload<'b, R::Body>>,
    ) -> Result<Value, ApiError>
    where
        R::Body: 'b,
    {
        let path = collection_path::<R>();
        let req = match payload.into() {
            Payload::Json(body) => self.client.request(Method::POST, &path).json(body),
            Payload::Multipart(form) => {
                if R::MULTIPART_OVERRIDE.is_none() {
                    return Err(ApiError::MultipartUnsupported(R::PATH));
                }
                let form = form.into_multipart().map_err(ApiError::Builder)?;
                self.client.request(Method::POST, &path).multipart(form)
            }
        };
        self.client.execute(req).await
    }

    pub async fn update<'b>(
        &self,
        id: &str,
        payload: impl Into<Payload<'b, R::Body>>,
    ) -> Result<Value, ApiError>
    where
        R::Body: 'b,
    {
        let path = member_path::<R>(id);
        let req = match payload.into() {
            Payload::Json(body) => self.client.request(Method::PUT, &path).json(body),
            Payload::Multipart(mut form) => {
                let Some(method) = R::MULTIPART_OVERRIDE else {
                    return Err(ApiError::MultipartUnsupported(R::PATH));
                };
                form.append(METHOD_OVERRIDE_FIELD, method.as_str());
                let form = form.into_multipart().map_err(ApiError::Builder)?;
                self.client.request(Method::POST, &path).multipart(form)
            }
        };
        self.client.execute(req).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&member_path::<R>(id)).await
    }
}

/// Document calls nested under employee records
impl ResourceApi<'_, Employees> {
    pub async fn preview_document(&self, employee_id: &str, document_id: &str) -> Result<Value, ApiError> {
        self.client
            .get(&document_path(employee_id, document_id, Some("preview")))
            .await
    }

    /// Raw file content, never parsed
    pub async fn download_document(&self, employee_id: &str, document_id: &str) -> Result<Vec<u8>, ApiError> {
        let req = self.client.request(
            Method::GET,
            &document_path(employee_id, document_id, Some("download")),
        );
        self.client.execute_bytes(req).await
    }

    pub async fn delete_document(&self, employee_id: &str, document_id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&document_path(employee_id, document_id, None))
            .await
    }
}

impl ApiClient {
    pub fn employees(&self) -> ResourceApi<'_, Employees> {
        ResourceApi::new(self)
    }

    pub fn clients(&self) -> ResourceApi<'_, Clients> {
        ResourceApi::new(self)
    }

    pub fn pic_externals(&self) -> ResourceApi<'_, PicExternals> {
        ResourceApi::new(self)
    }

    pub fn placements(&self) -> ResourceApi<'_, Placements> {
        ResourceApi::new(self)
    }

    pub fn contract_clients(&self) -> ResourceApi<'_, ContractClients> {
        ResourceApi::new(self)
    }

    pub fn invoices(&self) -> ResourceApi<'_, Invoices> {
        ResourceApi::new(self)
    }

    pub fn contract_employees(&self) -> ResourceApi<'_, ContractEmployees> {
        ResourceApi::new(self)
    }
}

fn collection_path<R: Resource>() -> String {
    format!("/{}", R::PATH)
}

fn member_path<R: Resource>(id: &str) -> String {
    format!("/{}/{}", R::PATH, id)
}

fn document_path(employee_id: &str, document_id: &str, action: Option<&str>) -> String {
    let base = format!("/{}/{}/documents/{}", Employees::PATH, employee_id, document_id);
    match action {
        Some(action) => format!("{}/{}", base, action),
        None => base,
    }
}
