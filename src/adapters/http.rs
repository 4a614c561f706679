use crate::domain::assistant::{ChatReply, ChatRequest, ConversationHistory};
use crate::domain::model::{Event, Expense, NewEvent, NewExpense, NewTask, Task, TaskUpdate};
use crate::domain::ports::SessionProvider;
use crate::domain::views::Collection;
use crate::domain::weather::{WeatherPayload, WeatherReport};
use crate::utils::error::{DashError, Result};
use crate::utils::validation::Validate;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Documents that carry both `_id` and the virtual `id` keep `_id`.
fn drop_virtual_id(document: &mut serde_json::Value) {
    if let Some(object) = document.as_object_mut() {
        if object.contains_key("_id") {
            object.remove("id");
        }
    }
}

fn not_found(collection: Collection, id: &str) -> DashError {
    DashError::ValidationError {
        message: format!("no {} entry with id '{}'", collection, id),
    }
}

/// Typed client for the dashboard REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    /// 帶上 session 的 bearer token（若有）
    pub fn with_session<P: SessionProvider + ?Sized>(mut self, session: &P) -> Self {
        self.token = session.token().map(str::to_string);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(endpoint: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("API response status for {}: {}", endpoint, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DashError::ApiStatusError {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(path, response).await?;
        Ok(response.json().await?)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        Self::check(path, response).await
    }

    /// 逐筆解析集合，格式不符的項目略過而不是整批失敗
    async fn get_list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let documents: Vec<serde_json::Value> = self.get_json(collection.path()).await?;
        let total = documents.len();

        let items: Vec<T> = documents
            .into_iter()
            .enumerate()
            .filter_map(|(index, mut document)| {
                drop_virtual_id(&mut document);
                match serde_json::from_value(document) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        tracing::debug!("Skipping malformed {} entry #{}: {}", collection, index, e);
                        None
                    }
                }
            })
            .collect();

        if items.len() < total {
            tracing::debug!("Kept {} of {} {}", items.len(), total, collection);
        }
        Ok(items)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.get_list(Collection::Tasks).await
    }

    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.get_list(Collection::Expenses).await
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.get_list(Collection::Events).await
    }

    pub async fn find_task(&self, id: &str) -> Result<Task> {
        self.list_tasks()
            .await?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| not_found(Collection::Tasks, id))
    }

    pub async fn find_event(&self, id: &str) -> Result<Event> {
        self.list_events()
            .await?
            .into_iter()
            .find(|event| event.id == id)
            .ok_or_else(|| not_found(Collection::Events, id))
    }

    fn task_form(task: &NewTask) -> Form {
        task.form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<()> {
        task.validate()?;
        let path = Collection::Tasks.path();
        tracing::info!("Creating task '{}'", task.title);
        self.send(
            path,
            self.client.post(self.url(path)).multipart(Self::task_form(task)),
        )
        .await?;
        Ok(())
    }

    /// Replaces the task's form fields; existing attachments are kept server side.
    pub async fn edit_task(&self, id: &str, task: &NewTask) -> Result<()> {
        task.validate()?;
        let path = format!("tasks/{}", id);
        tracing::info!("Updating task {}", id);
        self.send(
            &path,
            self.client.put(self.url(&path)).multipart(Self::task_form(task)),
        )
        .await?;
        Ok(())
    }

    pub async fn set_task_completed(&self, id: &str, completed: bool) -> Result<()> {
        let path = format!("tasks/{}", id);
        tracing::info!("Marking task {} completed={}", id, completed);
        let update = TaskUpdate::completion(completed);
        self.send(&path, self.client.put(self.url(&path)).json(&update))
            .await?;
        Ok(())
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.delete(Collection::Tasks, id).await
    }

    pub async fn create_expense(&self, expense: &NewExpense) -> Result<()> {
        expense.validate()?;
        let path = Collection::Expenses.path();
        tracing::info!(
            "Recording {:?} of {} in '{}'",
            expense.kind,
            expense.amount,
            expense.category
        );
        self.send(path, self.client.post(self.url(path)).json(expense))
            .await?;
        Ok(())
    }

    pub async fn delete_expense(&self, id: &str) -> Result<()> {
        self.delete(Collection::Expenses, id).await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<()> {
        event.validate()?;
        let path = Collection::Events.path();
        tracing::info!("Creating event '{}' on {} {}", event.title, event.date, event.time);
        self.send(path, self.client.post(self.url(path)).json(event))
            .await?;
        Ok(())
    }

    pub async fn update_event(&self, id: &str, event: &NewEvent) -> Result<()> {
        event.validate()?;
        let path = format!("events/{}", id);
        tracing::info!("Updating event {}", id);
        self.send(&path, self.client.put(self.url(&path)).json(event))
            .await?;
        Ok(())
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.delete(Collection::Events, id).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let path = format!("{}/{}", collection.path(), id);
        tracing::info!("Deleting {}", path);
        self.send(&path, self.client.delete(self.url(&path))).await?;
        Ok(())
    }

    pub async fn current_weather(&self, city: &str) -> Result<WeatherReport> {
        let city = city.trim();
        if city.is_empty() {
            return Err(DashError::ValidationError {
                message: "city cannot be empty".to_string(),
            });
        }
        let mut url = reqwest::Url::parse(&self.url("weather/current")).map_err(|e| {
            DashError::ConfigError {
                message: format!("invalid API base URL '{}': {}", self.base_url, e),
            }
        })?;
        url.path_segments_mut()
            .map_err(|_| DashError::ConfigError {
                message: format!("API base URL '{}' cannot carry a path", self.base_url),
            })?
            .push(city);

        tracing::debug!("GET {}", url);
        let path = format!("weather/current/{}", city);
        let response = self.authorized(self.client.get(url)).send().await?;
        let payload: WeatherPayload = Self::check(&path, response).await?.json().await?;
        Ok(WeatherReport::from(payload))
    }

    pub async fn chat(&self, message: &str, history: &ConversationHistory) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(DashError::ValidationError {
                message: "message cannot be empty".to_string(),
            });
        }
        let path = "ai/chat";
        let request = ChatRequest {
            message,
            conversation_history: history,
        };
        tracing::debug!("Sending chat message with {} prior turns", history.len());
        let response = self
            .send(path, self.client.post(self.url(path)).json(&request))
            .await?;
        Ok(response.json().await?)
    }
}
