//! 托管数据库客户端
//!
//! 封装 Supabase 的认证（GoTrue）与表查询（PostgREST）调用
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::{AnswerSheetStore, AuthBackend, HistoryStore, ProfileStore};
use crate::models::{
    AnswerSheetUpdate, CorrectionRow, ExamFilterRow, SheetStatus, UserIdentity,
    ANSWER_SHEET_TABLE,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROFESSOR_TABLE: &str = "tb_professor";

/// 登录凭证
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthTokens {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<AuthUser> for UserIdentity {
    fn from(user: AuthUser) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct ProfessorRow {
    #[serde(default)]
    id_escola: Option<i64>,
}

/// Supabase 客户端
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    tokens: RwLock<Option<AuthTokens>>,
    session_file: Option<PathBuf>,
}

impl SupabaseClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("supabase", e))?;

        Ok(Self {
            http,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            tokens: RwLock::new(None),
            session_file: config.session_file.as_ref().map(PathBuf::from),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// 附加 apikey 与 Authorization 头，未登录时用匿名 key
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    // ========== 会话缓存 ==========

    fn cached_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.access_token.clone()))
    }

    /// 内存中没有令牌时尝试从会话文件恢复
    async fn access_token(&self) -> Option<String> {
        if let Some(token) = self.cached_token() {
            return Some(token);
        }

        let path = self.session_file.as_ref()?;
        let content = tokio::fs::read_to_string(path).await.ok()?;
        match serde_json::from_str::<AuthTokens>(&content) {
            Ok(tokens) => {
                debug!("从会话文件恢复登录凭证: {}", path.display());
                let token = tokens.access_token.clone();
                self.set_tokens(Some(tokens)).await;
                Some(token)
            }
            Err(e) => {
                warn!("会话文件损坏，忽略: {} ({})", path.display(), e);
                None
            }
        }
    }

    async fn set_tokens(&self, tokens: Option<AuthTokens>) {
        if let Some(path) = &self.session_file {
            let result = match &tokens {
                Some(t) => match serde_json::to_string(t) {
                    Ok(content) => tokio::fs::write(path, content).await,
                    Err(e) => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
                },
                None => match tokio::fs::remove_file(path).await {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
            };
            if let Err(e) = result {
                warn!("写入会话文件失败: {} ({})", path.display(), e);
            }
        }

        if let Ok(mut guard) = self.tokens.write() {
            *guard = tokens;
        }
    }

    fn cached_refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|t| t.refresh_token.clone()))
    }

    /// 读取当前用户，令牌被拒（401/403）时返回 None
    async fn fetch_user(&self, token: &str) -> Result<Option<AuthUser>, ApiError> {
        let endpoint = "auth/v1/user";
        let request = self.authorize(self.http.get(self.auth_url("user")), Some(token));
        let response = self.send(endpoint, request).await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        Self::read_json(endpoint, response).await.map(Some)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let endpoint = "auth/v1/token";
        let request = self
            .authorize(self.http.post(self.auth_url("token")), None)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let response = self.send(endpoint, request).await?;
        let token: TokenResponse = Self::read_json(endpoint, response).await?;
        Ok(AuthTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        })
    }

    // ========== 请求辅助 ==========

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: Box::new(e),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::bad_response(endpoint, response).await);
        }
        let body = response.text().await.map_err(|e| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: Box::new(e),
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn bad_response(endpoint: &str, response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status,
            message: extract_error_message(&body),
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let token = self.access_token().await;
        let request = self
            .authorize(self.http.get(self.rest_url(table)), token.as_deref())
            .query(query);
        let response = self.send(table, request).await?;
        Self::read_json(table, response).await
    }
}

/// 从错误响应中提取服务端提示
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl AuthBackend for SupabaseClient {
    async fn current_user(&self) -> AppResult<Option<UserIdentity>> {
        let Some(token) = self.access_token().await else {
            return Ok(None);
        };

        if let Some(user) = self.fetch_user(&token).await? {
            return Ok(Some(user.into()));
        }

        // 访问令牌过期时用刷新令牌换一次
        if let Some(refresh_token) = self.cached_refresh_token() {
            match self.refresh_session(&refresh_token).await {
                Ok(tokens) => {
                    let access_token = tokens.access_token.clone();
                    self.set_tokens(Some(tokens)).await;
                    if let Some(user) = self.fetch_user(&access_token).await? {
                        debug!("访问令牌已刷新");
                        return Ok(Some(user.into()));
                    }
                }
                Err(e) => warn!("刷新会话失败: {}", e),
            }
        }

        info!("缓存的会话已失效，清除本地凭证");
        self.set_tokens(None).await;
        Ok(None)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<UserIdentity> {
        let endpoint = "auth/v1/token";
        let request = self
            .authorize(self.http.post(self.auth_url("token")), None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(endpoint, request).await?;

        if !response.status().is_success() {
            let err = Self::bad_response(endpoint, response).await;
            let message = match err {
                ApiError::BadResponse {
                    message: Some(message),
                    ..
                } => message,
                other => other.to_string(),
            };
            return Err(AppError::auth(message));
        }

        let token: TokenResponse = Self::read_json(endpoint, response).await?;
        self.set_tokens(Some(AuthTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        }))
        .await;

        info!("✓ 登录成功: {}", token.user.id);
        Ok(token.user.into())
    }

    async fn sign_out(&self) -> AppResult<()> {
        let token = self.access_token().await;
        let result = match token {
            Some(token) => {
                let request =
                    self.authorize(self.http.post(self.auth_url("logout")), Some(&token));
                match self.send("auth/v1/logout", request).await {
                    Ok(response) if response.status().is_success() => Ok(()),
                    Ok(response) => Err(Self::bad_response("auth/v1/logout", response).await),
                    Err(e) => Err(e),
                }
            }
            None => Ok(()),
        };

        // 无论远端是否成功，本地凭证都要清掉
        self.set_tokens(None).await;
        result.map_err(AppError::from)
    }
}

impl ProfileStore for SupabaseClient {
    async fn fetch_school_id(&self, auth_id: &str) -> AppResult<Option<i64>> {
        let rows: Vec<ProfessorRow> = self
            .select(
                PROFESSOR_TABLE,
                &[
                    ("select", "id_escola".to_string()),
                    ("auth_id", format!("eq.{}", auth_id)),
                ],
            )
            .await
            .map_err(AppError::Profile)?;

        Ok(rows.into_iter().next().and_then(|row| row.id_escola))
    }
}

impl AnswerSheetStore for SupabaseClient {
    async fn mark_corrected(&self, sheet_id: i64, update: &AnswerSheetUpdate) -> AppResult<()> {
        let token = self.access_token().await;
        let request = self
            .authorize(self.http.patch(self.rest_url(ANSWER_SHEET_TABLE)), token.as_deref())
            .query(&[("id_folha", format!("eq.{}", sheet_id))])
            .header("Prefer", "return=minimal")
            .json(update);

        let response = self
            .send(ANSWER_SHEET_TABLE, request)
            .await
            .map_err(|e| AppError::persistence(ANSWER_SHEET_TABLE, e.user_message()))?;

        if !response.status().is_success() {
            let err = Self::bad_response(ANSWER_SHEET_TABLE, response).await;
            return Err(AppError::persistence(ANSWER_SHEET_TABLE, err.user_message()));
        }

        debug!("答题卡 #{} 已写回: {:?}", sheet_id, update);
        Ok(())
    }
}

impl HistoryStore for SupabaseClient {
    async fn fetch_exam_filters(&self, school_id: i64) -> AppResult<Vec<ExamFilterRow>> {
        let rows = self
            .select(
                ANSWER_SHEET_TABLE,
                &[
                    ("select", "id_prova,tb_prova!id_prova!inner(titulo,id_escola)".to_string()),
                    ("tb_prova.id_escola", format!("eq.{}", school_id)),
                    ("status", format!("eq.{}", SheetStatus::Corrected)),
                ],
            )
            .await?;
        Ok(rows)
    }

    async fn fetch_corrections(
        &self,
        school_id: i64,
        exam_id: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<CorrectionRow>> {
        let mut query = vec![
            (
                "select",
                "id_folha,nota_final,data_correcao,status,id_prova,\
                 tb_aluno!id_aluno(nome_completo),\
                 tb_prova!id_prova!inner(titulo,id_escola)"
                    .to_string(),
            ),
            ("tb_prova.id_escola", format!("eq.{}", school_id)),
            ("status", format!("eq.{}", SheetStatus::Corrected)),
            ("order", "data_correcao.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(exam_id) = exam_id {
            query.push(("id_prova", format!("eq.{}", exam_id)));
        }

        let rows = self.select(ANSWER_SHEET_TABLE, &query).await?;
        Ok(rows)
    }
}
