use core::fmt;

use reqwest::{IntoUrl, Method, RequestBuilder, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::config::Config;
use crate::date_range::DateRange;
use crate::employee::{CreateQuery, Employee, EmployeeDetails, HireDateQuery, NewEmployee};
use crate::endpoints::{EmployeeEndpoint, normalize_base};
use crate::error::{Error, Result};

/// The client used for talking to the roster API.
///
/// Every call is a single attempt: there is no retry and no explicit
/// timeout beyond the transport's defaults.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Creates a client for the API served under `base_url`.
    pub fn new(base_url: Url) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base(base_url),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.base_url.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request object for `url`.
    pub(crate) fn build_request<U: IntoUrl + fmt::Debug>(
        &self,
        method: Method,
        url: U,
    ) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Perform a `GET` request against an endpoint.
    #[instrument(skip(self, query))]
    pub async fn get<R: DeserializeOwned, T: Serialize + ?Sized + fmt::Debug>(
        &self,
        endpoint: EmployeeEndpoint,
        query: &T,
    ) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(?query, %url, "making GET request");
        let response = self
            .build_request(Method::GET, url)
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform a `POST` request with a JSON body against an endpoint.
    #[instrument(skip(self, query, data))]
    pub async fn post<
        R: DeserializeOwned,
        Q: Serialize + ?Sized + fmt::Debug,
        T: Serialize + ?Sized + fmt::Debug,
    >(
        &self,
        endpoint: EmployeeEndpoint,
        query: &Q,
        data: &T,
    ) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(?query, ?data, %url, "making POST request");
        let response = self
            .build_request(Method::POST, url)
            .query(query)
            .json(data)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Perform a body-less `PUT` request against an endpoint.
    #[instrument(skip(self))]
    pub async fn put<R: DeserializeOwned>(&self, endpoint: EmployeeEndpoint) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, "making PUT request");
        let response = self.build_request(Method::PUT, url).send().await?;

        Self::handle_response(response).await
    }

    /// Perform a `DELETE` request against an endpoint. Any 2xx status is a success.
    #[instrument(skip(self))]
    pub async fn delete(&self, endpoint: EmployeeEndpoint) -> Result<()> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, "making DELETE request");
        let response = self.build_request(Method::DELETE, url).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "delete accepted");
            return Ok(());
        }

        let url = response.url().to_string();
        let text = response.text().await?;
        error!(%status, %url, "delete rejected");
        Err(Error::from_status(url, status, &text))
    }

    #[instrument(skip(response))]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();
        let entity_type = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        debug!(%status, %url, %entity_type, "received response");

        let text = response.text().await?;
        debug!("Response body size: {} bytes", text.len());
        trace!("Response text:\n{}", text);

        if !status.is_success() {
            if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
                debug!(%status, %url, "request rejected by server");
            } else {
                error!(%status, %url, "unexpected status code");
            }
            return Err(Error::from_status(url, status, &text));
        }

        serde_json::from_str(&text).map_err(|source| {
            error!(
                "Deserialization error: {}, near column {} - response text around that position: {}",
                source,
                source.column(),
                text.chars()
                    .skip(source.column().saturating_sub(30))
                    .take(100)
                    .collect::<String>()
            );
            Error::DeserializationError {
                source,
                url,
                response_body: Some(text.clone()),
                span_trace: tracing_error::SpanTrace::capture(),
            }
        })
    }

    /// Access the employees API
    #[must_use]
    pub fn employees(&self) -> EmployeesApi<'_> {
        EmployeesApi { client: self }
    }
}

/// API handler for the employee endpoints
#[derive(Debug)]
pub struct EmployeesApi<'a> {
    client: &'a Client,
}

impl EmployeesApi<'_> {
    /// Retrieve every employee, active or not
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Employee>> {
        self.client.get(EmployeeEndpoint::All, &()).await
    }

    /// Retrieve only the active employees
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Employee>> {
        self.client.get(EmployeeEndpoint::Employees, &()).await
    }

    /// Retrieve an employee together with its direct hires
    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<EmployeeDetails> {
        self.client.get(EmployeeEndpoint::Employee(id), &()).await
    }

    /// Retrieve the employees hired within `range`, both ends inclusive
    #[instrument(skip(self))]
    pub async fn list_hired(&self, range: DateRange) -> Result<Vec<Employee>> {
        let query = HireDateQuery {
            start_date: range.start(),
            end_date: range.end(),
        };
        self.client.get(EmployeeEndpoint::Hired, &query).await
    }

    /// Create an employee, optionally placing it under `manager_id`
    #[instrument(skip(self, employee), fields(id = employee.id))]
    pub async fn create(&self, employee: &NewEmployee, manager_id: Option<u64>) -> Result<Employee> {
        let query = CreateQuery { manager_id };
        self.client
            .post(EmployeeEndpoint::Employees, &query, employee)
            .await
    }

    /// Mark an employee inactive
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: u64) -> Result<Employee> {
        self.client.put(EmployeeEndpoint::Deactivate(id)).await
    }

    /// Mark an employee active again
    #[instrument(skip(self))]
    pub async fn activate(&self, id: u64) -> Result<Employee> {
        self.client.put(EmployeeEndpoint::Reactivate(id)).await
    }

    /// Delete an employee. Original employees are refused with [`Error::Protected`].
    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(EmployeeEndpoint::Employee(id)).await
    }
}
