//! 答题卡二维码内容
//!
//! 生成答题卡时写入 `P<id_prova>A<id_aluno>`

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetCode {
    pub exam_id: i64,
    pub student_id: i64,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^P(\d+)A(\d+)$").expect("二维码正则应当合法"))
}

impl SheetCode {
    pub fn new(exam_id: i64, student_id: i64) -> Self {
        Self {
            exam_id,
            student_id,
        }
    }

    /// 解析二维码内容，格式不符返回 None
    pub fn parse(payload: &str) -> Option<Self> {
        let caps = pattern().captures(payload.trim())?;
        let exam_id = caps.get(1)?.as_str().parse().ok()?;
        let student_id = caps.get(2)?.as_str().parse().ok()?;
        Some(Self::new(exam_id, student_id))
    }
}

impl std::fmt::Display for SheetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}A{}", self.exam_id, self.student_id)
    }
}
