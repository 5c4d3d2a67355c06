//! This module provides a client to connect to the planning API
//!
//! Every call the web UI makes has a method here. Records the UI only displays are returned as raw JSON
//! ([`serde_json::Value`]); records the calendar works with are typed.

use std::error::Error;
use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::calendar::PlanCalendar;
use crate::config::Settings;
use crate::records::{Field, Infographic, KbIngestText, KbIngestUrl, NewDelivery, NewField, NewMeasurement, ReplanRequest};
use crate::task::{FieldId, Task, TaskId, TaskStatus};
use crate::traits::ScheduleSource;


/// The server answered with a non-2xx status
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    status: u16,
    body: String,
}

impl ApiError {
    pub fn new<S: ToString>(status: u16, body: S) -> Self {
        Self { status, body: body.to_string() }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn body(&self) -> &str { &self.body }

    /// The `error` member of a JSON body (that is how the server words its errors), or the raw body
    pub fn message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(|e| e.to_string()))
            .unwrap_or_else(|| self.body.trim().to_string())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unexpected HTTP status code {}", self.status)?;
        let message = self.message();
        if message.is_empty() == false {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl Error for ApiError {}


/// A client of the planning API
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }
        // so that joined paths are appended to a path prefix, if any
        if base_url.path().ends_with('/') == false {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let user_agent = match crate::config::USER_AGENT.lock() {
            Ok(ua) => ua.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn Error>> {
        Self::new(settings.api_url.as_str())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The absolute URL of an API path (given without its leading slash)
    pub fn endpoint(&self, path: &str) -> Result<Url, Box<dyn Error>> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Box<dyn Error>> {
        let url = self.endpoint(path)?;
        log::debug!("{} {}", method, url);
        Ok(self.http.request(method, url))
    }

    /// Send a request, and fail on non-2xx statuses
    async fn send_raw(request: RequestBuilder) -> Result<Response, Box<dyn Error>> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() == false {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::new(status.as_u16(), body).into());
        }
        Ok(response)
    }

    /// Send a request, fail on non-2xx statuses, and decode the JSON body
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Box<dyn Error>> {
        let response = Self::send_raw(request).await?;
        let decoded = response.json::<T>().await?;
        Ok(decoded)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Box<dyn Error>> {
        let request = self.request(Method::GET, path)?;
        Self::send(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>> {
        let request = self.request(Method::POST, path)?.json(body);
        Self::send(request).await
    }

    //
    // Session
    //

    pub async fn health(&self) -> Result<Value, Box<dyn Error>> {
        self.get("health").await
    }

    pub async fn whoami(&self) -> Result<Value, Box<dyn Error>> {
        self.get("whoami").await
    }

    /// Log in as a development user, then return who the server thinks we are
    pub async fn dev_login(&self, uid: &str) -> Result<Value, Box<dyn Error>> {
        let request = self.request(Method::GET, "devlogin")?
            .query(&[("uid", uid)]);
        // the session lives in the cookie store, the answer itself is not needed
        Self::send_raw(request).await?;
        log::info!("Logged in as {}", uid);
        self.whoami().await
    }

    //
    // Fields and plans
    //

    pub async fn create_field(&self, field: &NewField) -> Result<Field, Box<dyn Error>> {
        let created: Field = self.post("fields", field).await?;
        log::info!("Created field {}", created.field_id);
        Ok(created)
    }

    pub async fn get_field(&self, field_id: FieldId) -> Result<Field, Box<dyn Error>> {
        self.get(&format!("fields/{}", field_id)).await
    }

    /// Generate the first plan of a field, and get its tasks as a calendar
    pub async fn generate_plan(&self, field_id: FieldId) -> Result<PlanCalendar, Box<dyn Error>> {
        let request = self.request(Method::POST, &format!("fields/{}/plan", field_id))?
            .query(&[("format", "calendar")]);
        Self::send(request).await
    }

    pub async fn replan(&self, field_id: FieldId, request: &ReplanRequest) -> Result<Value, Box<dyn Error>> {
        self.post(&format!("fields/{}/replan", field_id), request).await
    }

    pub async fn list_plans(&self, field_id: FieldId) -> Result<Value, Box<dyn Error>> {
        self.get(&format!("fields/{}/plan", field_id)).await
    }

    //
    // Measurements
    //

    pub async fn create_measurement(&self, field_id: FieldId, measurement: &NewMeasurement) -> Result<Value, Box<dyn Error>> {
        self.post(&format!("fields/{}/measurements", field_id), measurement).await
    }

    pub async fn list_measurements(&self, field_id: FieldId) -> Result<Value, Box<dyn Error>> {
        self.get(&format!("fields/{}/measurements", field_id)).await
    }

    //
    // Schedule
    //

    /// Tasks of a field between two `YYYY-MM-DD` dates
    pub async fn get_schedule(&self, field_id: FieldId, from: &str, to: &str) -> Result<Vec<Task>, Box<dyn Error>> {
        let request = self.request(Method::GET, &format!("fields/{}/schedule", field_id))?
            .query(&[("from", from), ("to", to)]);
        // an empty schedule may be encoded as `null`
        let tasks: Option<Vec<Task>> = Self::send(request).await?;
        Ok(tasks.unwrap_or_default())
    }

    pub async fn patch_task_status(&self, task_id: TaskId, status: TaskStatus) -> Result<(), Box<dyn Error>> {
        let request = self.request(Method::PATCH, &format!("schedule/{}", task_id))?
            .json(&serde_json::json!({ "status": status }));
        // the acknowledgement body (if any) is not needed
        Self::send_raw(request).await?;
        Ok(())
    }

    //
    // Deliveries
    //

    pub async fn create_delivery(&self, field_id: FieldId, delivery: &NewDelivery) -> Result<Value, Box<dyn Error>> {
        self.post(&format!("fields/{}/deliveries", field_id), delivery).await
    }

    pub async fn list_deliveries(&self, field_id: FieldId, from: &str, to: &str) -> Result<Value, Box<dyn Error>> {
        let request = self.request(Method::GET, &format!("fields/{}/deliveries", field_id))?
            .query(&[("from", from), ("to", to)]);
        Self::send(request).await
    }

    //
    // Knowledge base
    //

    pub async fn kb_ingest_url(&self, request: &KbIngestUrl) -> Result<Value, Box<dyn Error>> {
        self.post("kb/ingest/url", request).await
    }

    pub async fn kb_ingest_text(&self, request: &KbIngestText) -> Result<Value, Box<dyn Error>> {
        self.post("kb/ingest", request).await
    }

    pub async fn kb_search(&self, query: &str) -> Result<Value, Box<dyn Error>> {
        let request = self.request(Method::GET, "kb/search")?
            .query(&[("q", query)]);
        Self::send(request).await
    }

    //
    // Per-rai analysis (form based)
    //

    pub async fn rai_ingest(&self, form: &[(String, String)]) -> Result<Value, Box<dyn Error>> {
        let request = self.request(Method::POST, "api/rai/ingest")?
            .multipart(build_form(form));
        Self::send(request).await
    }

    pub async fn rai_analyze(&self, form: &[(String, String)]) -> Result<Infographic, Box<dyn Error>> {
        let request = self.request(Method::POST, "api/rai/analyze")?
            .multipart(build_form(form));
        Self::send(request).await
    }
}

fn build_form(fields: &[(String, String)]) -> reqwest::multipart::Form {
    fields.iter().fold(reqwest::multipart::Form::new(), |form, (name, value)| {
        form.text(name.clone(), value.clone())
    })
}

#[async_trait]
impl ScheduleSource for Client {
    async fn get_schedule(&self, field_id: FieldId, from: &str, to: &str) -> Result<Vec<Task>, Box<dyn Error>> {
        Client::get_schedule(self, field_id, from, to).await
    }

    async fn patch_task_status(&mut self, task_id: TaskId, status: TaskStatus) -> Result<(), Box<dyn Error>> {
        Client::patch_task_status(self, task_id, status).await
    }
}
