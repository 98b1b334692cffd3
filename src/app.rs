//! 应用外壳 - 编排层
//!
//! 持有会话守门与当前路由。每次导航、每次会话变化都重新执行路由守卫；
//! 初始化完成前只显示加载中。

use crate::error::Alert;
use crate::infrastructure::{AuthBackend, ProfileStore};
use crate::models::{AuthEvent, Session};
use crate::session::routes::normalize_path;
use crate::session::{guard, LoginForm, RouteDecision, SessionGate, SIGN_IN_ROUTE};
use tokio::sync::watch;
use tracing::info;

/// 当前应展示的界面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// 会话尚未初始化，只显示加载指示
    Loading,
    Route(String),
}

/// 应用主结构
pub struct App<B> {
    gate: SessionGate<B>,
    path: String,
}

impl<B> App<B>
where
    B: AuthBackend + ProfileStore,
{
    pub fn new(backend: B) -> Self {
        Self::with_initial_path(backend, SIGN_IN_ROUTE)
    }

    /// 以指定路由启动（例如深链接）
    pub fn with_initial_path(backend: B, path: &str) -> Self {
        Self {
            gate: SessionGate::new(backend),
            path: normalize_path(path),
        }
    }

    /// 订阅会话变化（只读，会话只能经由 App 修改）
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.gate.subscribe()
    }

    pub fn session(&self) -> Session {
        self.gate.snapshot()
    }

    /// 当前界面，每次读取都按最新会话执行守卫
    pub fn screen(&self) -> Screen {
        let session = self.gate.snapshot();
        if !session.initialized {
            return Screen::Loading;
        }
        match guard(session.is_signed_in(), &self.path) {
            RouteDecision::Redirect(target) => Screen::Route(target.to_string()),
            RouteDecision::Stay => Screen::Route(self.path.clone()),
        }
    }

    /// 冷启动：加载会话后执行一次守卫
    pub async fn start(&mut self) -> RouteDecision {
        self.gate.initialize().await;
        self.enforce()
    }

    /// 显式重新加载会话，期间显示加载中
    pub async fn reload(&mut self) -> RouteDecision {
        self.gate.reload().await;
        self.enforce()
    }

    /// 导航到目标路由
    pub fn navigate(&mut self, path: &str) -> RouteDecision {
        self.path = normalize_path(path);
        self.enforce()
    }

    pub async fn sign_in(&mut self, form: &LoginForm) -> Result<RouteDecision, Alert> {
        self.gate.sign_in(form).await?;
        Ok(self.enforce())
    }

    pub async fn sign_out(&mut self) -> RouteDecision {
        self.gate.clear_session().await;
        self.enforce()
    }

    /// 认证服务推送的事件
    pub async fn handle_auth_event(&mut self, event: AuthEvent) -> RouteDecision {
        self.gate.on_auth_change(event).await;
        self.enforce()
    }

    fn enforce(&mut self) -> RouteDecision {
        let session = self.gate.snapshot();
        if !session.initialized {
            return RouteDecision::Stay;
        }

        let decision = guard(session.is_signed_in(), &self.path);
        if let RouteDecision::Redirect(target) = decision {
            info!("↪️ 路由跳转: {} → {}", self.path, target);
            self.path = target.to_string();
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::UserIdentity;

    struct CachedUser;

    impl AuthBackend for CachedUser {
        async fn current_user(&self) -> AppResult<Option<UserIdentity>> {
            Ok(Some(UserIdentity::new("auth-uuid-1", None)))
        }

        async fn sign_in_with_password(&self, _: &str, _: &str) -> AppResult<UserIdentity> {
            Err(AppError::auth("Invalid login credentials"))
        }

        async fn sign_out(&self) -> AppResult<()> {
            Ok(())
        }
    }

    impl ProfileStore for CachedUser {
        async fn fetch_school_id(&self, _: &str) -> AppResult<Option<i64>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_screen_guards_after_session_change() {
        let mut app = App::with_initial_path(CachedUser, "/home");
        app.start().await;
        assert_eq!(app.screen(), Screen::Route("/home".to_string()));

        // 绕过 App 直接改会话，读取界面时也要重新守卫
        app.gate.clear_session().await;
        assert_eq!(app.screen(), Screen::Route(SIGN_IN_ROUTE.to_string()));
    }
}
