//! 路由守卫
//!
//! 受保护页面需要已登录身份；公开页面（登录、注册）不允许已登录身份停留

use phf::phf_set;

/// 公开入口（登录页）
pub const SIGN_IN_ROUTE: &str = "/";
pub const REGISTER_ROUTE: &str = "/register";
/// 登录后的入口
pub const HOME_ROUTE: &str = "/home";

static PUBLIC_ROUTES: phf::Set<&'static str> = phf_set! {
    "/",
    "/register",
};

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Stay,
    Redirect(&'static str),
}

/// 去掉末尾的 `/`，空路径视为根路径
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        SIGN_IN_ROUTE.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(normalize_path(path).as_str())
}

/// 判断目标路由是否需要跳转（仅在会话初始化完成后调用）
pub fn guard(signed_in: bool, path: &str) -> RouteDecision {
    match (signed_in, is_public(path)) {
        (false, false) => RouteDecision::Redirect(SIGN_IN_ROUTE),
        (true, true) => RouteDecision::Redirect(HOME_ROUTE),
        _ => RouteDecision::Stay,
    }
}
