/// 评分服务客户端
///
/// 上传裁剪后的答题卡照片，解析评分结果
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::Scorer;
use crate::logger::truncate_text;
use crate::models::{ScoreOutcome, ScorerResponse};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 评分接口路径
pub const SCORE_ENDPOINT: &str = "corrigir-prova";
/// 上传字段名
pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_FILE_NAME: &str = "scan_gabarito.jpg";

/// 评分服务客户端
pub struct ScorerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScorerClient {
    /// 创建新的评分客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(SCORE_ENDPOINT, e))?;

        Ok(Self {
            http,
            base_url: config.scorer_api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn score_url(&self) -> String {
        format!("{}/{}", self.base_url, SCORE_ENDPOINT)
    }
}

/// 解释评分服务的响应
///
/// 能解析出 JSON 就交给 [`ScorerResponse::into_outcome`]；
/// 解析失败时，非 2xx 视为服务端错误，2xx 视为响应格式错误
pub fn interpret_reply(http_ok: bool, status: u16, body: &str) -> AppResult<ScoreOutcome> {
    match serde_json::from_str::<ScorerResponse>(body) {
        Ok(reply) => Ok(reply.into_outcome(http_ok)),
        Err(_) if !http_ok => Err(AppError::Upload(ApiError::BadResponse {
            endpoint: SCORE_ENDPOINT.to_string(),
            status,
            message: None,
        })),
        Err(source) => Err(AppError::Upload(ApiError::JsonParseFailed {
            endpoint: SCORE_ENDPOINT.to_string(),
            source,
        })),
    }
}

impl Scorer for ScorerClient {
    async fn score(&self, jpeg: Vec<u8>) -> AppResult<ScoreOutcome> {
        let upload_err = |e: reqwest::Error| {
            AppError::Upload(ApiError::RequestFailed {
                endpoint: SCORE_ENDPOINT.to_string(),
                source: Box::new(e),
            })
        };

        info!("📤 上传答题卡照片 ({} 字节)...", jpeg.len());

        let part = Part::bytes(jpeg)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("image/jpeg")
            .map_err(upload_err)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.score_url())
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(upload_err)?;

        let status = response.status();
        let body = response.text().await.map_err(upload_err)?;
        debug!("评分响应 [{}]: {}", status, truncate_text(&body, 200));

        let outcome = interpret_reply(status.is_success(), status.as_u16(), &body)?;
        match &outcome {
            ScoreOutcome::Scored(result) => info!("✓ 评分完成: {}", result),
            ScoreOutcome::Rejected { message } => warn!("⚠️ 评分被拒绝: {:?}", message),
        }
        Ok(outcome)
    }
}
