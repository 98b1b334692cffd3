use thiserror::Error;

/// 应用程序错误类型
///
/// 变体按照失败发生的边界划分：认证、资料查询、拍摄/裁剪、上传评分、落库。
/// 所有错误最终在流程边界被转换成用户可见的 [`Alert`]，不会向上抛出成致命错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 认证错误（账号密码错误、会话过期）
    #[error("认证失败: {message}")]
    Auth { message: String },
    /// 教师资料查询错误（非致命）
    #[error("资料查询失败: {0}")]
    Profile(#[source] ApiError),
    /// 拍照或裁剪错误
    #[error("拍摄处理失败: {message}")]
    Capture { message: String },
    /// 上传评分服务错误
    #[error("上传失败: {0}")]
    Upload(#[source] ApiError),
    /// 写回数据库失败
    #[error("保存失败 ({table}): {message}")]
    Persistence { table: String, message: String },
    /// 其他 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 表单校验错误
    #[error("校验失败: {message}")]
    Validation { message: String },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// 给用户看的消息：优先使用服务端返回的 message
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadResponse {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::RequestFailed { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 用户可见的提示框内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建认证错误
    pub fn auth(message: impl Into<String>) -> Self {
        AppError::Auth {
            message: message.into(),
        }
    }

    /// 创建拍摄处理错误
    pub fn capture(message: impl Into<String>) -> Self {
        AppError::Capture {
            message: message.into(),
        }
    }

    /// 创建落库错误
    pub fn persistence(table: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Persistence {
            table: table.into(),
            message: message.into(),
        }
    }

    /// 创建校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    /// 转换成提示框
    pub fn to_alert(&self) -> Alert {
        match self {
            AppError::Auth { message } => Alert::new("Erro no Login", message),
            AppError::Validation { message } => Alert::new("Atenção", message),
            AppError::Capture { message } => Alert::new("Erro", message),
            AppError::Upload(e) => Alert::new("Erro de Conexão", e.user_message()),
            AppError::Persistence { message, .. } => Alert::new("Falha ao Salvar", message),
            AppError::Profile(e) | AppError::Api(e) => Alert::new("Erro", e.user_message()),
            AppError::Config(e) => Alert::new("Erro", e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            endpoint: String::new(), // serde_json 错误不带接口信息
            source: err,
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::capture(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_response_prefers_server_message() {
        let err = AppError::Upload(ApiError::BadResponse {
            endpoint: "/corrigir-prova".to_string(),
            status: 422,
            message: Some("QR inválido".to_string()),
        });
        let alert = err.to_alert();
        assert_eq!(alert.title, "Erro de Conexão");
        assert_eq!(alert.message, "QR inválido");
    }

    #[test]
    fn test_persistence_alert_title() {
        let err = AppError::persistence("tb_folha_resposta", "permission denied");
        assert_eq!(
            err.to_alert(),
            Alert::new("Falha ao Salvar", "permission denied")
        );
    }
}
