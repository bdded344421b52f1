//! Supabase backend over the PostgREST HTTP API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use glowbook_core::appointment::{Appointment, NewAppointment, UpdateAppointmentRequest};
use glowbook_core::catalog::{Professional, Service};
use glowbook_core::storage::{AppointmentBackend, BackendError, CatalogBackend, Result};

use crate::config::Config;

const APPOINTMENTS_TABLE: &str = "appointments";
const SERVICES_TABLE: &str = "services";
const PROFESSIONALS_TABLE: &str = "professionals";

/// HTTP client for the hosted Supabase project.
///
/// Row level security on the server scopes every query to the user the
/// access token belongs to; the `user_id` filter is sent anyway.
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: reqwest::Client,
    base_url: String,
}

impl SupabaseBackend {
    /// Builds a client from configuration. Falls back to the anon key as the
    /// bearer token when no user token is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bearer = config
            .access_token
            .as_deref()
            .unwrap_or(&config.supabase_anon_key);

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .default_headers(auth_headers(&config.supabase_anon_key, bearer)?)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the REST URL for a table.
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Decode a successful response or map the error status.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(map_reqwest_error)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(BackendError::from_status(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl AppointmentBackend for SupabaseBackend {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Appointment>> {
        let response = self
            .client
            .get(self.table_url(APPOINTMENTS_TABLE))
            .query(&list_query(user_id))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let rows: Vec<Appointment> = Self::handle_response(response).await?;
        tracing::debug!(%user_id, count = rows.len(), "Fetched appointments");
        Ok(rows)
    }

    async fn insert(&self, appointment: &NewAppointment) -> Result<Appointment> {
        let response = self
            .client
            .post(self.table_url(APPOINTMENTS_TABLE))
            .header("Prefer", "return=representation")
            .json(appointment)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let rows: Vec<Appointment> = Self::handle_response(response).await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse("insert returned no rows".to_string())
        })
    }

    async fn update(&self, id: Uuid, update: &UpdateAppointmentRequest) -> Result<Appointment> {
        let response = self
            .client
            .patch(self.table_url(APPOINTMENTS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let rows: Vec<Appointment> = Self::handle_response(response).await?;
        rows.into_iter().next().ok_or_else(|| BackendError::NotFound {
            entity_type: "Appointment",
            id: id.to_string(),
        })
    }
}

#[async_trait]
impl CatalogBackend for SupabaseBackend {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let response = self
            .client
            .get(self.table_url(SERVICES_TABLE))
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>> {
        let response = self
            .client
            .get(self.table_url(PROFESSIONALS_TABLE))
            .query(&[("select", "*"), ("order", "name.asc")])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::handle_response(response).await
    }
}

fn list_query(user_id: Uuid) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        ("user_id", format!("eq.{user_id}")),
        ("order", "date.asc,time.asc".to_string()),
    ]
}

fn auth_headers(api_key: &str, bearer: &str) -> Result<HeaderMap> {
    let invalid = |_| BackendError::InvalidResponse("API key is not a valid header".to_string());

    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {bearer}")).map_err(invalid)?,
    );
    Ok(headers)
}

/// Maps a transport or decoding failure to a backend error.
fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::InvalidResponse(err.to_string())
    } else if let Some(status) = err.status() {
        BackendError::from_status(status.as_u16(), err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> Config {
        Config {
            supabase_url: url.to_string(),
            supabase_anon_key: "anon".to_string(),
            access_token: None,
            namespace: "glowbook".to_string(),
            cache_ttl_seconds: 300,
            cache_max_entries: 100,
            sqlite_path: ":memory:".to_string(),
            reminder_lead_minutes: 60,
            http_timeout_seconds: 2,
        }
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let backend = SupabaseBackend::from_config(&config("https://xyz.supabase.co/")).unwrap();

        assert_eq!(backend.base_url(), "https://xyz.supabase.co");
        assert_eq!(
            backend.table_url(APPOINTMENTS_TABLE),
            "https://xyz.supabase.co/rest/v1/appointments"
        );
    }

    #[test]
    fn test_list_query_orders_by_schedule() {
        let user_id = Uuid::nil();
        let query = list_query(user_id);

        assert_eq!(query[1].1, format!("eq.{user_id}"));
        assert_eq!(query[2], ("order", "date.asc,time.asc".to_string()));
    }

    #[test]
    fn test_auth_headers() {
        let headers = auth_headers("anon", "user-token").unwrap();

        assert_eq!(headers["apikey"], "anon");
        assert_eq!(headers[AUTHORIZATION], "Bearer user-token");
    }

    #[test]
    fn test_auth_headers_reject_control_characters() {
        assert!(matches!(
            auth_headers("bad\nkey", "token"),
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let backend = SupabaseBackend::from_config(&config("http://127.0.0.1:1")).unwrap();

        let result = backend.list(Uuid::new_v4()).await;

        assert!(matches!(result, Err(BackendError::Network(_))));
    }
}
