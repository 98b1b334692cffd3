//! 测试用的内存协作方
#![allow(dead_code)]

use gabarito_core::error::{ApiError, AppError, AppResult};
use gabarito_core::infrastructure::{
    AnswerSheetStore, AuthBackend, Camera, Haptics, HistoryStore, Photo, ProfileStore, Scorer,
};
use gabarito_core::models::{AnswerSheetUpdate, CorrectionRow, ExamFilterRow, ScoreOutcome, UserIdentity};
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn api_failure(endpoint: &str, message: &str) -> AppError {
    AppError::Api(ApiError::BadResponse {
        endpoint: endpoint.to_string(),
        status: 500,
        message: Some(message.to_string()),
    })
}

/// 认证会话的初始状态
pub enum CachedSession {
    None,
    User(UserIdentity),
    Broken,
}

/// 托管数据库的内存替身
pub struct FakeBackend {
    cached: Mutex<CachedSession>,
    accounts: HashMap<String, (String, UserIdentity)>,
    schools: HashMap<String, i64>,
    pub profile_fails: AtomicBool,
    pub update_fails: AtomicBool,
    pub sign_in_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub updates: Mutex<Vec<(i64, AnswerSheetUpdate)>>,
    pub exam_filter_rows: serde_json::Value,
    pub correction_rows: serde_json::Value,
    pub last_history_query: Mutex<Option<(i64, Option<i64>, usize)>>,
}

impl FakeBackend {
    pub fn new(cached: CachedSession) -> Self {
        Self {
            cached: Mutex::new(cached),
            accounts: HashMap::new(),
            schools: HashMap::new(),
            profile_fails: AtomicBool::new(false),
            update_fails: AtomicBool::new(false),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
            exam_filter_rows: serde_json::json!([]),
            correction_rows: serde_json::json!([]),
            last_history_query: Mutex::new(None),
        }
    }

    pub fn with_account(mut self, email: &str, password: &str, user: UserIdentity) -> Self {
        self.accounts
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    pub fn with_school(mut self, auth_id: &str, school_id: i64) -> Self {
        self.schools.insert(auth_id.to_string(), school_id);
        self
    }

    pub fn with_history(mut self, filters: serde_json::Value, rows: serde_json::Value) -> Self {
        self.exam_filter_rows = filters;
        self.correction_rows = rows;
        self
    }
}

impl AuthBackend for FakeBackend {
    async fn current_user(&self) -> AppResult<Option<UserIdentity>> {
        match &*self.cached.lock().unwrap() {
            CachedSession::None => Ok(None),
            CachedSession::User(user) => Ok(Some(user.clone())),
            CachedSession::Broken => Err(api_failure("auth/v1/user", "network down")),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<UserIdentity> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match self.accounts.get(email) {
            Some((expected, user)) if expected == password => {
                *self.cached.lock().unwrap() = CachedSession::User(user.clone());
                Ok(user.clone())
            }
            _ => Err(AppError::auth("Invalid login credentials")),
        }
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.cached.lock().unwrap() = CachedSession::None;
        Ok(())
    }
}

impl ProfileStore for FakeBackend {
    async fn fetch_school_id(&self, auth_id: &str) -> AppResult<Option<i64>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.profile_fails.load(Ordering::SeqCst) {
            return Err(AppError::Profile(ApiError::BadResponse {
                endpoint: "tb_professor".to_string(),
                status: 500,
                message: None,
            }));
        }
        Ok(self.schools.get(auth_id).copied())
    }
}

impl AnswerSheetStore for FakeBackend {
    async fn mark_corrected(&self, sheet_id: i64, update: &AnswerSheetUpdate) -> AppResult<()> {
        if self.update_fails.load(Ordering::SeqCst) {
            return Err(AppError::persistence("tb_folha_resposta", "permission denied"));
        }
        self.updates.lock().unwrap().push((sheet_id, update.clone()));
        Ok(())
    }
}

impl HistoryStore for FakeBackend {
    async fn fetch_exam_filters(&self, _school_id: i64) -> AppResult<Vec<ExamFilterRow>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(self.exam_filter_rows.clone())?)
    }

    async fn fetch_corrections(
        &self,
        school_id: i64,
        exam_id: Option<i64>,
        limit: usize,
    ) -> AppResult<Vec<CorrectionRow>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_history_query.lock().unwrap() = Some((school_id, exam_id, limit));
        Ok(serde_json::from_value(self.correction_rows.clone())?)
    }
}

/// 生成一张 PNG 照片
pub fn test_photo(width: u32, height: u32) -> Photo {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 200) as u8, (y % 200) as u8, 255]));
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    Photo {
        data,
        width,
        height,
    }
}

/// 相机替身：每次拍照前让出一次执行权，便于测试重入
pub struct FakeCamera {
    pub shots: AtomicUsize,
    pub fails: AtomicBool,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            shots: AtomicUsize::new(0),
            fails: AtomicBool::new(false),
        }
    }
}

impl Camera for FakeCamera {
    async fn take_picture(&self) -> AppResult<Photo> {
        self.shots.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fails.load(Ordering::SeqCst) {
            return Err(AppError::capture("camera unavailable"));
        }
        Ok(test_photo(300, 400))
    }
}

/// 评分服务的脚本化回复
pub enum Reply {
    Outcome(ScoreOutcome),
    Transport(String),
}

pub struct FakeScorer {
    replies: Mutex<VecDeque<Reply>>,
    pub uploads: Mutex<Vec<Vec<u8>>>,
}

impl FakeScorer {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

impl Scorer for FakeScorer {
    async fn score(&self, jpeg: Vec<u8>) -> AppResult<ScoreOutcome> {
        self.uploads.lock().unwrap().push(jpeg);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Outcome(outcome)) => Ok(outcome),
            Some(Reply::Transport(message)) => Err(AppError::Upload(ApiError::RequestFailed {
                endpoint: "corrigir-prova".to_string(),
                source: message.into(),
            })),
            None => panic!("评分服务没有预设回复"),
        }
    }
}

#[derive(Default)]
pub struct FakeHaptics {
    pub pulses: Mutex<Vec<Duration>>,
}

impl Haptics for FakeHaptics {
    fn pulse(&self, duration: Duration) {
        self.pulses.lock().unwrap().push(duration);
    }
}
