//! 日志初始化
//!
//! 基于 tracing-subscriber，`RUST_LOG` 优先；未设置时按配置选择 info / debug

use tracing_subscriber::EnvFilter;

/// 初始化日志（默认 info 级别）
pub fn init() {
    init_with_verbose(false);
}

/// 初始化日志
///
/// 重复调用不会报错，后续调用直接忽略
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with_verbose(true);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Ana", 10), "Ana");
        assert_eq!(truncate_text("Maria Eduarda", 5), "Maria...");
    }
}
