use crate::models::score::ScoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 答题卡表名
pub const ANSWER_SHEET_TABLE: &str = "tb_folha_resposta";

/// 答题卡批改状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "CORRIGIDO")]
    Corrected,
}

impl SheetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SheetStatus::Pending => "PENDENTE",
            SheetStatus::Corrected => "CORRIGIDO",
        }
    }
}

impl std::fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 确认评分时写回答题卡的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSheetUpdate {
    pub nota_final: u32,
    pub status: SheetStatus,
    pub data_correcao: DateTime<Utc>,
}

impl AnswerSheetUpdate {
    /// 用评分结果构造"已批改"更新，最终得分取答对题数
    pub fn corrected(result: &ScoreResult, corrected_at: DateTime<Utc>) -> Self {
        Self {
            nota_final: result.correct,
            status: SheetStatus::Corrected,
            data_correcao: corrected_at,
        }
    }
}
