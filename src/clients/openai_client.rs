//! 推理服务 HTTP 客户端
//!
//! 封装 Files / Responses 两组接口的调用

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::BackendError;
use crate::models::response::ResponseBody;
use crate::models::{ModelOutput, RemoteFileHandle, ResponseRequest, RoleDocument};
use crate::services::ReasoningBackend;

/// 上传文件时使用的 purpose
const FILE_PURPOSE: &str = "assistants";

/// OpenAI 兼容的推理服务客户端
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
}

impl OpenAiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let http = builder.build().map_err(|e| BackendError::InvalidRequest {
            message: format!("无法创建 HTTP 客户端: {}", e),
        })?;

        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            api_base_url: config.openai_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path)
    }

    /// 检查状态码并解析 JSON 响应体
    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, BackendError> {
        let response = Self::check_status(endpoint, response).await?;
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| BackendError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn check_status(endpoint: &str, response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn transport(endpoint: &str) -> impl FnOnce(reqwest::Error) -> BackendError + '_ {
        move |source| {
            if source.is_builder() {
                BackendError::InvalidRequest {
                    message: format!("{}: {}", endpoint, source),
                }
            } else {
                BackendError::Transport {
                    endpoint: endpoint.to_string(),
                    source,
                }
            }
        }
    }
}

/// 根据扩展名推断 MIME 类型
fn mime_for(document: &RoleDocument) -> &'static str {
    match document.extension().as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiClient {
    async fn upload_document(
        &self,
        document: &RoleDocument,
    ) -> Result<RemoteFileHandle, BackendError> {
        let endpoint = self.endpoint("files");
        debug!(
            "上传文档 {} ({} 字节)",
            document.filename,
            document.len()
        );

        let part = Part::bytes(document.bytes.clone())
            .file_name(document.filename.clone())
            .mime_str(mime_for(document))
            .map_err(|e| BackendError::InvalidRequest {
                message: format!("无法构建上传内容: {}", e),
            })?;
        let form = Form::new().text("purpose", FILE_PURPOSE).part("file", part);

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport(&endpoint))?;

        Self::read_json(&endpoint, response).await
    }

    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelOutput, BackendError> {
        let endpoint = self.endpoint("responses");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Self::transport(&endpoint))?;

        let body: ResponseBody = Self::read_json(&endpoint, response).await?;
        Ok(ModelOutput::from(body))
    }

    async fn delete_document(&self, handle: &RemoteFileHandle) -> Result<(), BackendError> {
        let endpoint = self.endpoint(&format!("files/{}", handle.id));

        let response = self
            .http
            .delete(&endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(Self::transport(&endpoint))?;

        Self::check_status(&endpoint, response).await?;
        Ok(())
    }
}
