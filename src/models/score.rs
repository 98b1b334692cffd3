use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 评分服务成功时的状态值
pub const STATUS_SUCCESS: &str = "sucesso";

/// 结果不完整时的提示
pub const INCOMPLETE_RESULT_MESSAGE: &str = "Dados da correção incompletos.";

/// 一张答题卡的评分结果，等待老师确认后写回数据库
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    /// 答题卡 ID（tb_folha_resposta.id_folha）
    pub sheet_id: i64,
    pub student_name: String,
    pub correct: u32,
    pub total: u32,
}

impl ScoreResult {
    /// 形如 "8/10" 的得分摘要
    pub fn summary(&self) -> String {
        format!("{}/{}", self.correct, self.total)
    }
}

impl std::fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[答题卡 #{}] {} {}",
            self.sheet_id,
            self.student_name,
            self.summary()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCounts {
    pub acertos: u32,
    pub total: u32,
}

/// 评分服务返回的原始 JSON
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorerResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_sheet_id")]
    pub id_folha: Option<i64>,
    #[serde(default)]
    pub aluno: Option<String>,
    #[serde(default)]
    pub resultado: Option<ScoreCounts>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

/// 评分结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Scored(ScoreResult),
    /// 服务端拒绝（非成功状态或非 2xx），message 为服务端提示
    Rejected { message: Option<String> },
}

impl ScorerResponse {
    /// 结合 HTTP 状态解释响应
    pub fn into_outcome(self, http_ok: bool) -> ScoreOutcome {
        if !(http_ok && self.status.as_deref() == Some(STATUS_SUCCESS)) {
            return ScoreOutcome::Rejected {
                message: self.server_message(),
            };
        }

        match (self.id_folha, self.resultado) {
            (Some(sheet_id), Some(counts)) => ScoreOutcome::Scored(ScoreResult {
                sheet_id,
                student_name: self.aluno.unwrap_or_default(),
                correct: counts.acertos,
                total: counts.total,
            }),
            _ => ScoreOutcome::Rejected {
                message: Some(INCOMPLETE_RESULT_MESSAGE.to_string()),
            },
        }
    }

    fn server_message(&self) -> Option<String> {
        if let Some(msg) = self.msg.as_ref().filter(|m| !m.is_empty()) {
            return Some(msg.clone());
        }
        match &self.detail {
            Some(Value::String(detail)) if !detail.is_empty() => Some(detail.clone()),
            _ => None,
        }
    }
}

// id_folha 可能是数字也可能是数字字符串
fn deserialize_sheet_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct SheetIdVisitor;

    impl<'de> Visitor<'de> for SheetIdVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a numeric string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid id_folha: {}", value)))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            i64::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("id_folha out of range: {}", value)))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(SheetIdVisitor)
}
