//! 外部协作方能力 - 基础设施层
//!
//! 托管数据库与评分服务只通过这些 trait 暴露能力，流程层不直接认识 HTTP

use crate::error::AppResult;
use crate::models::{
    AnswerSheetUpdate, CorrectionRow, ExamFilterRow, ScoreOutcome, UserIdentity,
};
use std::sync::Arc;

/// 认证能力
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    /// 读取缓存/在线会话，没有会话时返回 None
    async fn current_user(&self) -> AppResult<Option<UserIdentity>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<UserIdentity>;

    async fn sign_out(&self) -> AppResult<()>;
}

/// 教师资料查询
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    /// 查询教师所属学校，查不到记录不是错误
    async fn fetch_school_id(&self, auth_id: &str) -> AppResult<Option<i64>>;
}

/// 答题卡写回
#[allow(async_fn_in_trait)]
pub trait AnswerSheetStore {
    async fn mark_corrected(&self, sheet_id: i64, update: &AnswerSheetUpdate) -> AppResult<()>;
}

/// 批改历史查询
#[allow(async_fn_in_trait)]
pub trait HistoryStore {
    async fn fetch_exam_filters(&self, school_id: i64) -> AppResult<Vec<ExamFilterRow>>;

    async fn fetch_corrections(
        &self,
        school_id: i64,
        exam_id: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<CorrectionRow>>;
}

/// 远程评分
#[allow(async_fn_in_trait)]
pub trait Scorer {
    async fn score(&self, jpeg: Vec<u8>) -> AppResult<ScoreOutcome>;
}

// ========== Arc 共享 ==========

impl<T: AuthBackend> AuthBackend for Arc<T> {
    async fn current_user(&self) -> AppResult<Option<UserIdentity>> {
        (**self).current_user().await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<UserIdentity> {
        (**self).sign_in_with_password(email, password).await
    }

    async fn sign_out(&self) -> AppResult<()> {
        (**self).sign_out().await
    }
}

impl<T: ProfileStore> ProfileStore for Arc<T> {
    async fn fetch_school_id(&self, auth_id: &str) -> AppResult<Option<i64>> {
        (**self).fetch_school_id(auth_id).await
    }
}

impl<T: AnswerSheetStore> AnswerSheetStore for Arc<T> {
    async fn mark_corrected(&self, sheet_id: i64, update: &AnswerSheetUpdate) -> AppResult<()> {
        (**self).mark_corrected(sheet_id, update).await
    }
}

impl<T: HistoryStore> HistoryStore for Arc<T> {
    async fn fetch_exam_filters(&self, school_id: i64) -> AppResult<Vec<ExamFilterRow>> {
        (**self).fetch_exam_filters(school_id).await
    }

    async fn fetch_corrections(
        &self,
        school_id: i64,
        exam_id: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<CorrectionRow>> {
        (**self).fetch_corrections(school_id, exam_id, limit).await
    }
}

impl<T: Scorer> Scorer for Arc<T> {
    async fn score(&self, jpeg: Vec<u8>) -> AppResult<ScoreOutcome> {
        (**self).score(jpeg).await
    }
}
