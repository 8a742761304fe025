use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use eventdesk_api_types::{ListResponse, QueryDescriptor, RecordResponse};

use crate::envelope::{ListEnvelope, RecordEnvelope};
use crate::query::encode_list_query;
use crate::{
    ApiPathBuilder, Client, DataProviderConfig, Error, FilterEncoding, HttpApiClient,
    HttpApiResponse, ResourceKind, ResourceRegistry, TriggerAction, UpdateMethod,
};

/// The uniform CRUD contract of the admin screens on top of an [`HttpApiClient`].
///
/// Every operation issues exactly one request and keeps no state between calls, so a provider
/// can be shared freely between concurrently running screens.
pub struct DataProvider<C> {
    client: C,
    api_url: String,
    encoding: FilterEncoding,
    update_method: UpdateMethod,
    registry: ResourceRegistry,
}

impl DataProvider<Client> {
    /// Create a provider talking to the deployment described by `config`.
    pub fn from_config(config: &DataProviderConfig) -> Result<Self, Error> {
        Ok(Self::new(Client::from_config(config)?, config))
    }
}

impl<C> DataProvider<C>
where
    C: HttpApiClient,
{
    /// Use `client` as transport. The client must already point at `config.api_url`.
    pub fn new(client: C, config: &DataProviderConfig) -> Self {
        Self {
            client,
            api_url: config.base_url().to_string(),
            encoding: config.filter_encoding,
            update_method: config.update_method,
            registry: ResourceRegistry::default(),
        }
    }

    /// Replace the default [`ResourceRegistry`].
    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn filter_encoding(&self) -> FilterEncoding {
        self.encoding
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch one page of `descriptor.resource`.
    pub async fn get_list(&self, descriptor: &QueryDescriptor) -> Result<ListResponse, Error> {
        let builder = ApiPathBuilder::resource(check_resource(&descriptor.resource)?, None);
        let path = encode_list_query(builder, descriptor, self.encoding).build();

        let body = self.call(Method::GET, &path, None::<()>).await?.json()?;
        let (data, total) = ListEnvelope::from_body(body).unwrap();

        Ok(ListResponse { data, total })
    }

    /// Fetch several records by id in one request.
    pub async fn get_many<I, T>(&self, resource: &str, ids: I) -> Result<ListResponse, Error>
    where
        I: IntoIterator<Item = T>,
        T: std::fmt::Display,
    {
        let path = ApiPathBuilder::resource(check_resource(resource)?, None)
            .repeated_arg("id", ids)
            .build();

        let body = self.call(Method::GET, &path, None::<()>).await?.json()?;
        let (data, _) = ListEnvelope::from_body(body).unwrap();
        let total = data.len() as u64;

        Ok(ListResponse { data, total })
    }

    pub async fn get_one(&self, resource: &str, id: &str) -> Result<RecordResponse, Error> {
        let id = check_id(id)?;
        let path = ApiPathBuilder::resource(check_resource(resource)?, Some(id)).build();
        let body = self.call(Method::GET, &path, None::<()>).await?.json()?;

        Ok(record_response(body))
    }

    pub async fn create<T>(&self, resource: &str, values: &T) -> Result<RecordResponse, Error>
    where
        T: ?Sized + Serialize,
    {
        let path = ApiPathBuilder::resource(check_resource(resource)?, None).build();
        let body = self.call(Method::POST, &path, Some(values)).await?.json()?;

        Ok(record_response(body))
    }

    /// Update a record, or run the trigger action registered for `resource`.
    ///
    /// For trigger resources `values` is not sent.
    pub async fn update<T>(
        &self,
        resource: &str,
        id: &str,
        values: &T,
    ) -> Result<RecordResponse, Error>
    where
        T: ?Sized + Serialize,
    {
        let resource = check_resource(resource)?;
        let id = check_id(id)?;
        match self.registry.kind(resource) {
            ResourceKind::Trigger(action) => self.run_trigger(resource, id, &action).await,
            ResourceKind::Standard => {
                let path = ApiPathBuilder::resource(resource, Some(id)).build();
                let body = self
                    .call(self.update_method.method(), &path, Some(values))
                    .await?
                    .json()?;

                Ok(record_response(body))
            }
        }
    }

    /// Start the job behind a trigger resource.
    ///
    /// Resources not registered as trigger are triggered with a `POST`.
    pub async fn trigger(&self, resource: &str, id: &str) -> Result<RecordResponse, Error> {
        let resource = check_resource(resource)?;
        let id = check_id(id)?;
        let action = match self.registry.kind(resource) {
            ResourceKind::Trigger(action) => action,
            ResourceKind::Standard => TriggerAction::new(Method::POST),
        };
        self.run_trigger(resource, id, &action).await
    }

    async fn run_trigger(
        &self,
        resource: &str,
        id: &str,
        action: &TriggerAction,
    ) -> Result<RecordResponse, Error> {
        let path = ApiPathBuilder::resource(resource, Some(id)).build();
        log::debug!("{} {path} (trigger)", action.method);

        let response = self
            .client
            .request(action.method.clone(), &path, None::<()>)
            .await?;

        if !response.is_success() {
            log::warn!("trigger {path} failed with status {}", response.status);
            return Err(Error::SendFailed(response.status_text()));
        }

        let body = response.json().unwrap_or_else(|err| {
            log::debug!("ignoring unparsable trigger response from {path}: {err}");
            Value::Null
        });

        Ok(record_response(body))
    }

    /// Delete a record. The response body is passed through as is.
    pub async fn delete_one(&self, resource: &str, id: &str) -> Result<RecordResponse, Error> {
        let id = check_id(id)?;
        let path = ApiPathBuilder::resource(check_resource(resource)?, Some(id)).build();
        let data = self.call(Method::DELETE, &path, None::<()>).await?.json()?;

        Ok(RecordResponse { data })
    }

    /// Issue a request and map error statuses.
    async fn call<T>(
        &self,
        method: Method,
        path: &str,
        params: Option<T>,
    ) -> Result<HttpApiResponse, Error>
    where
        T: Serialize,
    {
        log::debug!("{method} {path}");

        let response = self.client.request(method, path, params).await?;

        match response.status_code() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(path.to_string())),
            _ if response.is_success() => Ok(response),
            status => {
                log::warn!("{path} failed with status {status}");
                Err(Error::request_failed(status, response.text()))
            }
        }
    }
}

fn record_response(body: Value) -> RecordResponse {
    RecordResponse {
        data: RecordEnvelope::from_body(body).unwrap(),
    }
}

fn check_resource(resource: &str) -> Result<&str, Error> {
    let trimmed = resource.trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(['?', '#']) {
        return Err(Error::InvalidResource(resource.to_string()));
    }
    Ok(trimmed)
}

/// A blank id would address the collection instead of a record.
fn check_id(id: &str) -> Result<&str, Error> {
    if id.trim().is_empty() {
        return Err(Error::InvalidId(id.to_string()));
    }
    Ok(id)
}
