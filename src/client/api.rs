//! HTTP client for the `/api/crud` endpoint.

use reqwest::{Client, Response, Url};

use super::ClientError;
use crate::errors::ErrorBody;
use crate::models::task::{Task, UpsertTask};
use crate::routes::crud::DeleteResult;

#[derive(Debug, Clone)]
pub struct CrudClient {
    http: Client,
    endpoint: Url,
}

impl CrudClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let endpoint = format!("{}/api/crud", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    fn with_param(&self, key: &str, value: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(key, value);
        url
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Task>, ClientError> {
        let res = self.http.get(self.with_param("user_id", user_id)).send().await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn upsert(&self, body: &UpsertTask) -> Result<Vec<Task>, ClientError> {
        let res = self.http.post(self.endpoint.clone()).json(body).send().await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let res = self
            .http
            .delete(self.with_param("id", &id.to_string()))
            .send()
            .await?;
        let _: DeleteResult = check(res).await?.json().await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `ClientError::Status`, using the `error`
/// field of the body when there is one.
async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
