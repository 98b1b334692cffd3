use crate::models::relation::{normalize, Relation};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentRef {
    pub nome_completo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExamRef {
    pub titulo: String,
    pub id_escola: i64,
}

/// 历史查询返回的原始行（关联字段未归一化）
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionRow {
    pub id_folha: i64,
    #[serde(default)]
    pub nota_final: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub data_correcao: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub id_prova: Option<i64>,
    #[serde(default)]
    pub tb_aluno: Option<Relation<StudentRef>>,
    #[serde(default)]
    pub tb_prova: Option<Relation<ExamRef>>,
}

/// 解析数据库时间戳
///
/// 带时区的按 RFC 3339 解析；不带时区的 `timestamp` 列按 UTC 处理
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// 无法识别的时间只丢掉这个字段，不让整页历史失败
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let parsed = parse_timestamp(&value);
        if parsed.is_none() {
            debug!("无法解析 data_correcao: {}", value);
        }
        parsed
    }))
}

/// 筛选标签查询返回的原始行
#[derive(Debug, Clone, Deserialize)]
pub struct ExamFilterRow {
    pub id_prova: i64,
    #[serde(default)]
    pub tb_prova: Option<Relation<ExamRef>>,
}

/// 一条批改记录
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionRecord {
    pub sheet_id: i64,
    pub final_score: Option<f64>,
    pub corrected_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub exam_id: Option<i64>,
    pub student: Option<StudentRef>,
    pub exam: Option<ExamRef>,
}

impl From<CorrectionRow> for CorrectionRecord {
    fn from(row: CorrectionRow) -> Self {
        Self {
            sheet_id: row.id_folha,
            final_score: row.nota_final,
            corrected_at: row.data_correcao,
            status: row.status,
            exam_id: row.id_prova,
            student: normalize(row.tb_aluno),
            exam: normalize(row.tb_prova),
        }
    }
}

/// 历史页面顶部的试卷筛选标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamFilter {
    pub exam_id: i64,
    pub title: String,
}

/// 历史页面数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<CorrectionRecord>,
    pub exams: Vec<ExamFilter>,
}
