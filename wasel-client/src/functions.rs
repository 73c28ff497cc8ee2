//! Serverless functions client (`/functions/v1`)

use reqwest::Method;
use shared::notify::{NotifyStatusRequest, NotifyStatusResponse};
use shared::ApiResponse;

use crate::http::HttpClient;
use crate::{ClientError, ClientResult};

pub const NOTIFY_STATUS_FUNCTION: &str = "notify-status";

#[derive(Debug, Clone)]
pub struct FunctionsClient {
    http: HttpClient,
    base_url: String,
}

impl FunctionsClient {
    pub fn new(http: HttpClient) -> Self {
        let base_url = http.config().functions_url();
        Self { http, base_url }
    }

    /// Invoke a function with a JSON body; unwraps the `ApiResponse` envelope
    pub async fn invoke<B, T>(&self, name: &str, body: &B) -> ClientResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, name);
        let request = self.http.request(Method::POST, &url).json(body);
        let response: ApiResponse<T> = self.http.send_json(request).await?;
        response
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("{name}: {}", response.message)))
    }

    /// Tell the recipient their shipment changed status
    pub async fn notify_status(&self, request: &NotifyStatusRequest) -> ClientResult<NotifyStatusResponse> {
        let response: NotifyStatusResponse = self.invoke(NOTIFY_STATUS_FUNCTION, request).await?;
        if !response.notification_sent {
            tracing::warn!(shipment_id = %response.shipment_id, "status saved but message not delivered");
        }
        Ok(response)
    }
}
