use serde::{Deserialize, Serialize};

/// 已登录用户身份（来自认证服务）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// 认证服务中的用户 ID（不透明字符串）
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.map(str::to_string),
        }
    }
}

/// 进程内唯一的会话状态
///
/// 每次冷启动或显式重新加载，`initialized` 都恰好从 false 变为 true 一次；之后身份仍可能因退出登录变为 None
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserIdentity>,
    /// 教师所属学校 ID
    pub school_id: Option<i64>,
    pub initialized: bool,
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// 认证服务推送的登录状态变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(UserIdentity),
    SignedOut,
}
