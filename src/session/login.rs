use crate::error::{Alert, AppError};
use crate::infrastructure::{AuthBackend, ProfileStore};
use crate::models::AuthEvent;
use crate::session::gate::SessionGate;
use tracing::warn;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Por favor, preencha e-mail e senha.";

/// 登录表单
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::validation(MISSING_CREDENTIALS_MESSAGE));
        }
        Ok(())
    }
}

impl<B> SessionGate<B>
where
    B: AuthBackend + ProfileStore,
{
    /// 账号密码登录
    ///
    /// 表单不完整时不发请求；登录失败后会话保持未登录
    pub async fn sign_in(&self, form: &LoginForm) -> Result<(), Alert> {
        form.validate().map_err(|e| e.to_alert())?;

        match self
            .backend()
            .sign_in_with_password(form.email.trim(), &form.password)
            .await
        {
            Ok(user) => {
                self.on_auth_change(AuthEvent::SignedIn(user)).await;
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ 登录失败: {}", e);
                self.reset();
                let message = match e {
                    AppError::Auth { message } => message,
                    other => other.to_alert().message,
                };
                Err(Alert::new("Erro no Login", message))
            }
        }
    }
}
