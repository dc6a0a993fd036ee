use std::sync::Arc;

use dashboard_core::validate::{validate_email, validate_password, validate_required};
use dashboard_core::{NewArtist, Record, Service, Target};
use dashboard_logging::{dash_info, dash_warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ApiClient, ApiError, Endpoint};

/// Logged-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "Role", default)]
    pub role: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "E-Mail", default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: CurrentUser,
}

/// Body of `GET /logs`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub data: Vec<Record>,
}

/// Typed operations of the dashboard's backend services over one [`ApiClient`].
#[derive(Clone)]
pub struct DashboardApi {
    client: Arc<dyn ApiClient>,
}

impl DashboardApi {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn ApiClient> {
        &self.client
    }

    // Auth

    pub async fn me(&self) -> Result<CurrentUser, ApiError> {
        let response = self
            .client
            .get(&Endpoint::new(Service::Auth, "/me"), &[])
            .await?;
        let me: MeResponse = serde_json::from_value(response.data)
            .map_err(|err| ApiError::decode(format!("/me: {err}")))?;
        Ok(me.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        validate_email("email", email)?;
        validate_required("password", password)?;
        let response = self
            .client
            .post(
                &Endpoint::new(Service::Auth, "/login"),
                &json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        dash_info!("logged in as {}", email.trim());
        Ok(response.data)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client
            .post(&Endpoint::new(Service::Auth, "/logout"), &json!({}))
            .await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        validate_email("email", email)?;
        self.client
            .post(
                &Endpoint::new(Service::Auth, "/forgotPassword"),
                &json!({ "email": email.trim() }),
            )
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        validate_required("token", token)?;
        validate_password("password", password)?;
        self.client
            .patch(
                &Endpoint::with_param(Service::Auth, "/resetPassword", token),
                &json!({ "password": password }),
            )
            .await?;
        Ok(())
    }

    // Artists

    pub async fn artists(&self) -> Result<Vec<Record>, ApiError> {
        let payload = self.fetch_target(Target::Artists).await?;
        records_from_payload(payload)
    }

    pub async fn calendars(&self) -> Result<Vec<String>, ApiError> {
        self.names(Endpoint::new(Service::Artists, "/calendars"))
            .await
    }

    pub async fn role_options(&self) -> Result<Vec<String>, ApiError> {
        self.names(Endpoint::new(Service::Artists, "/roleOptions"))
            .await
    }

    /// Validates the form locally and only then posts it.
    pub async fn create_artist(&self, artist: &NewArtist) -> Result<Value, ApiError> {
        artist.validate()?;
        let body = serde_json::to_value(artist)
            .map_err(|err| ApiError::decode(format!("artist form: {err}")))?;
        let response = self
            .client
            .post(&Endpoint::new(Service::Artists, "/"), &body)
            .await?;
        dash_info!("created artist {} in {}", artist.email, artist.calendar);
        Ok(response.data)
    }

    pub async fn delete_artist(&self, calendar: &str, email: &str) -> Result<(), ApiError> {
        validate_required("calendar", calendar)?;
        validate_email("email", email)?;
        self.client
            .delete(
                &Endpoint::new(Service::Artists, "/"),
                &json!({ "calendar": calendar, "email": email.trim() }),
            )
            .await?;
        dash_info!("deleted artist {} from {}", email.trim(), calendar);
        Ok(())
    }

    // Events: these may answer with the loading placeholder; see `fetch_with_polling`.

    pub async fn unassigned_events(&self) -> Result<Value, ApiError> {
        self.fetch_target(Target::UnassignedEvents).await
    }

    pub async fn assigned_events(&self) -> Result<Value, ApiError> {
        self.fetch_target(Target::AssignedEvents).await
    }

    pub async fn event_history(&self) -> Result<Value, ApiError> {
        self.fetch_target(Target::EventHistory).await
    }

    // Email

    pub async fn emails(&self) -> Result<Vec<Record>, ApiError> {
        let payload = self.fetch_target(Target::Emails).await?;
        records_from_payload(payload)
    }

    pub async fn email(&self, id: &str) -> Result<Record, ApiError> {
        validate_required("id", id)?;
        let response = self
            .client
            .get(&Endpoint::with_param(Service::Email, "/api/v1/email", id), &[])
            .await?;
        let data = match response.data {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };
        Record::from_value(data)
            .ok_or_else(|| ApiError::decode(format!("email {id}: not an object")))
    }

    pub async fn messages(&self) -> Result<Vec<Record>, ApiError> {
        let payload = self.fetch_target(Target::Messages).await?;
        records_from_payload(payload)
    }

    // Logs

    pub async fn logs(&self) -> Result<LogsResponse, ApiError> {
        let payload = self.fetch_target(Target::Logs).await?;
        serde_json::from_value(payload)
            .map_err(|err| ApiError::decode(format!("/logs: {err}")))
    }

    /// Raw payload of a page's list endpoint.
    pub async fn fetch_target(&self, target: Target) -> Result<Value, ApiError> {
        let response = self.client.get(&Endpoint::for_target(target), &[]).await?;
        Ok(response.data)
    }

    async fn names(&self, endpoint: Endpoint) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(&endpoint, &[]).await?;
        let items = match response.data {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => return Err(ApiError::decode(format!("{}: no list", endpoint.path))),
            },
            _ => return Err(ApiError::decode(format!("{}: no list", endpoint.path))),
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect())
    }
}

/// Extracts records from a list payload: a JSON array, or an object with a `data` array.
///
/// Array items that are not objects are skipped.
pub fn records_from_payload(payload: Value) -> Result<Vec<Record>, ApiError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(ApiError::decode("payload has no data list")),
        },
        _ => return Err(ApiError::decode("payload is not a list")),
    };
    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
    if records.len() != total {
        dash_warn!("skipped {} non-object list items", total - records.len());
    }
    Ok(records)
}
