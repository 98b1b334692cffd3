//! 会话守门 - 流程层
//!
//! 进程内唯一的会话状态，通过 watch 通道注入给各页面，而不是全局可变状态。
//!
//! 生命周期：
//! 1. `initialize` - 启动时查询一次缓存会话，无论成功失败都会把 initialized 置为 true
//! 2. `on_auth_change` - 认证服务推送的登录/退出事件
//! 3. `clear_session` - 主动退出登录

use crate::infrastructure::{AuthBackend, ProfileStore};
use crate::models::{AuthEvent, Session, UserIdentity};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct SessionGate<B> {
    backend: B,
    state: watch::Sender<Session>,
}

impl<B> SessionGate<B>
where
    B: AuthBackend + ProfileStore,
{
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { backend, state }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 订阅会话变化
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// 当前会话快照
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// 启动时加载会话
    ///
    /// 认证查询失败按"无会话"处理；学校查询失败只把学校置空
    pub async fn initialize(&self) {
        let user = match self.backend.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("⚠️ 读取会话失败，按未登录处理: {}", e);
                None
            }
        };

        let school_id = match &user {
            Some(user) => self.lookup_school(user).await,
            None => None,
        };

        match &user {
            Some(user) => info!("✓ 会话已恢复: {} (学校: {:?})", user.id, school_id),
            None => info!("未发现已登录会话"),
        }

        self.state.send_modify(|session| {
            session.user = user;
            session.school_id = school_id;
            session.initialized = true;
        });
    }

    /// 重新加载会话（显式刷新）
    ///
    /// 先把 initialized 置回 false，加载完成后再置为 true
    pub async fn reload(&self) {
        self.state.send_modify(|session| session.initialized = false);
        self.initialize().await;
    }

    /// 处理登录状态变化
    pub async fn on_auth_change(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                let school_id = self.lookup_school(&user).await;
                info!("✓ 已登录: {} (学校: {:?})", user.id, school_id);
                self.state.send_modify(|session| {
                    session.user = Some(user);
                    session.school_id = school_id;
                });
            }
            AuthEvent::SignedOut => {
                info!("已退出登录");
                self.reset();
            }
        }
    }

    /// 主动退出：远端退出失败也要清掉本地会话
    pub async fn clear_session(&self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!("⚠️ 远端退出登录失败: {}", e);
        }
        self.on_auth_change(AuthEvent::SignedOut).await;
    }

    /// 回到未登录状态（不触发网络请求）
    pub(crate) fn reset(&self) {
        self.state.send_modify(|session| {
            session.user = None;
            session.school_id = None;
        });
    }

    async fn lookup_school(&self, user: &UserIdentity) -> Option<i64> {
        match self.backend.fetch_school_id(&user.id).await {
            Ok(Some(school_id)) => Some(school_id),
            Ok(None) => {
                warn!("⚠️ 教师 {} 未关联学校", user.id);
                None
            }
            Err(e) => {
                error!("❌ 查询教师学校失败: {}", e);
                None
            }
        }
    }
}
