//! 批改历史服务 - 业务能力层
//!
//! 只查询本校已批改的答题卡，关联字段在这里统一归一化

use crate::error::AppResult;
use crate::infrastructure::HistoryStore;
use crate::models::{CorrectionRecord, ExamFilter, ExamFilterRow, HistoryPage};
use crate::models::relation::normalize;
use std::collections::HashSet;
use tracing::{info, warn};

/// 单次最多返回的记录数
pub const HISTORY_LIMIT: usize = 50;

pub struct HistoryService<S> {
    store: S,
}

impl<S: HistoryStore> HistoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 加载历史页面
    ///
    /// # 参数
    /// - `school_id`: 当前会话的学校 ID，为空时返回空页面
    /// - `exam_id`: 只看某一场考试，None 表示全部
    pub async fn load(&self, school_id: Option<i64>, exam_id: Option<i64>) -> AppResult<HistoryPage> {
        let Some(school_id) = school_id else {
            warn!("⚠️ 当前用户没有学校 ID，历史记录为空");
            return Ok(HistoryPage::default());
        };

        let (filter_rows, rows) = futures::try_join!(
            self.store.fetch_exam_filters(school_id),
            self.store.fetch_corrections(school_id, exam_id, HISTORY_LIMIT),
        )?;

        let exams = collect_exam_filters(filter_rows);
        let records: Vec<CorrectionRecord> = rows.into_iter().map(CorrectionRecord::from).collect();

        info!(
            "✓ 历史记录加载完成: {} 条记录, {} 场考试 (筛选: {:?})",
            records.len(),
            exams.len(),
            exam_id
        );

        Ok(HistoryPage { records, exams })
    }
}

/// 按首次出现顺序去重，缺少试卷信息的行跳过
fn collect_exam_filters(rows: Vec<ExamFilterRow>) -> Vec<ExamFilter> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter_map(|row| {
            let exam = normalize(row.tb_prova)?;
            seen.insert(row.id_prova).then(|| ExamFilter {
                exam_id: row.id_prova,
                title: exam.titulo,
            })
        })
        .collect()
}
