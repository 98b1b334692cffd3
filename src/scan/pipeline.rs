//! 扫描评分流程 - 流程层
//!
//! 状态顺序：
//! 1. Seeking - 相机取景，尚未识别到二维码
//! 2. Detected - 识别到二维码（2 秒防抖保持），允许拍照
//! 3. Capturing → Cropping → Uploading - 拍照、裁剪、上传评分
//! 4. Result - 展示评分结果，等待老师确认
//! 5. Confirming - 写回答题卡；成功回到 Seeking，失败保留 Result 以便重试
//!
//! 所有方法都是 `&self`，状态锁从不跨 await 持有；
//! 正在处理时重复触发的拍照/确认直接丢弃，不排队。

use crate::error::{Alert, AppResult};
use crate::infrastructure::{AnswerSheetStore, Camera, Haptics, Scorer};
use crate::models::score::INCOMPLETE_RESULT_MESSAGE;
use crate::models::{AnswerSheetUpdate, ScoreOutcome, ScoreResult, SheetCode};
use crate::scan::debounce::DetectionDebounce;
use crate::scan::geometry::ScreenSize;
use crate::scan::image_ops::prepare_upload;
use crate::scan::torch::Torch;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 识别成功时的震动时长
pub const DETECTION_PULSE: Duration = Duration::from_millis(80);
/// 评分服务未给出原因时的提示
pub const GENERIC_FAILURE_MESSAGE: &str = "Falha no processamento.";
pub const SAVED_MESSAGE: &str = "Gabarito salvo com sucesso!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPhase {
    Seeking,
    Detected,
    Capturing,
    Cropping,
    Uploading,
    Result(ScoreResult),
    Confirming(ScoreResult),
}

/// 拍照结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// 当前状态不允许拍照，什么都没做
    Ignored,
    Scored(ScoreResult),
    Failed(Alert),
}

/// 确认结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Ignored,
    Saved(Alert),
    Failed(Alert),
}

#[derive(Debug)]
struct ScanState {
    phase: ScanPhase,
    debounce: DetectionDebounce,
    busy: bool,
    last_marker: Option<String>,
}

impl ScanState {
    /// 防抖窗口过期后回到 Seeking
    fn refresh(&mut self, now: Instant) {
        if self.phase == ScanPhase::Detected && !self.debounce.is_active(now) {
            debug!("二维码丢失超过保持窗口，回到取景状态");
            self.phase = ScanPhase::Seeking;
        }
    }

    fn back_to_seeking(&mut self) {
        self.phase = ScanPhase::Seeking;
        self.debounce.clear();
    }

    fn showing_result(&self) -> bool {
        matches!(
            self.phase,
            ScanPhase::Result(_) | ScanPhase::Confirming(_)
        )
    }
}

/// 扫描评分流程
pub struct ScanPipeline<C, S, D, H> {
    camera: C,
    scorer: S,
    store: D,
    haptics: H,
    screen: ScreenSize,
    torch: Torch,
    state: Mutex<ScanState>,
}

impl<C, S, D, H> ScanPipeline<C, S, D, H>
where
    C: Camera,
    S: Scorer,
    D: AnswerSheetStore,
    H: Haptics,
{
    pub fn new(camera: C, scorer: S, store: D, haptics: H, screen: ScreenSize) -> Self {
        Self {
            camera,
            scorer,
            store,
            haptics,
            screen,
            torch: Torch::new(),
            state: Mutex::new(ScanState {
                phase: ScanPhase::Seeking,
                debounce: DetectionDebounce::default(),
                busy: false,
                last_marker: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ScanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: ScanPhase) {
        self.state().phase = phase;
    }

    pub fn torch(&self) -> &Torch {
        &self.torch
    }

    /// 当前阶段（先按 now 处理防抖过期）
    pub fn phase(&self, now: Instant) -> ScanPhase {
        let mut state = self.state();
        state.refresh(now);
        state.phase.clone()
    }

    /// 是否处于处理中（拍照、上传或写回）
    pub fn is_busy(&self) -> bool {
        self.state().busy
    }

    /// 拍照按钮是否可用
    pub fn can_capture(&self, now: Instant) -> bool {
        let mut state = self.state();
        state.refresh(now);
        !state.busy && state.phase == ScanPhase::Detected
    }

    /// 最近一次识别到的二维码内容
    pub fn last_marker(&self) -> Option<String> {
        self.state().last_marker.clone()
    }

    /// 逐帧识别回调
    ///
    /// 处理中或正在展示结果时忽略；返回是否接受了这次识别
    pub fn on_marker_detected(&self, payload: &str, now: Instant) -> bool {
        let mut state = self.state();
        if state.busy || state.showing_result() || payload.trim().is_empty() {
            return false;
        }

        state.refresh(now);
        state.debounce.hit(now);
        let rising = state.phase == ScanPhase::Seeking;
        state.phase = ScanPhase::Detected;

        if rising {
            self.haptics.pulse(DETECTION_PULSE);
            match SheetCode::parse(payload) {
                Some(code) => info!("🔍 识别到答题卡二维码: {}", code),
                None => info!("🔍 识别到二维码 (非答题卡格式)"),
            }
        }
        state.last_marker = Some(payload.to_string());
        true
    }

    /// 定时刷新（界面帧回调），返回刷新后的阶段
    pub fn tick(&self, now: Instant) -> ScanPhase {
        self.phase(now)
    }

    /// 拍照并评分
    pub async fn capture(&self, now: Instant) -> CaptureOutcome {
        {
            let mut state = self.state();
            state.refresh(now);
            if state.busy || state.phase != ScanPhase::Detected {
                debug!("忽略拍照: busy={}, phase={:?}", state.busy, state.phase);
                return CaptureOutcome::Ignored;
            }
            state.busy = true;
            state.phase = ScanPhase::Capturing;
        }

        let result = self.capture_and_score().await;

        let mut state = self.state();
        state.busy = false;
        match result {
            Ok(ScoreOutcome::Scored(score)) => {
                state.phase = ScanPhase::Result(score.clone());
                state.debounce.clear();
                CaptureOutcome::Scored(score)
            }
            Ok(ScoreOutcome::Rejected { message }) => {
                state.back_to_seeking();
                let message = message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                CaptureOutcome::Failed(Alert::new("Erro", message))
            }
            Err(e) => {
                warn!("⚠️ 拍照评分失败: {}", e);
                state.back_to_seeking();
                CaptureOutcome::Failed(e.to_alert())
            }
        }
    }

    async fn capture_and_score(&self) -> AppResult<ScoreOutcome> {
        let photo = self.camera.take_picture().await?;
        info!("📷 拍照完成: {}x{}", photo.width, photo.height);

        self.set_phase(ScanPhase::Cropping);
        let (_, jpeg) = prepare_upload(&photo, self.screen)?;

        self.set_phase(ScanPhase::Uploading);
        self.scorer.score(jpeg).await
    }

    /// 确认评分并写回答题卡
    pub async fn confirm(&self) -> ConfirmOutcome {
        let score = {
            let mut state = self.state();
            if state.busy {
                return ConfirmOutcome::Ignored;
            }
            let score = match &state.phase {
                ScanPhase::Result(score) => score.clone(),
                _ => {
                    return ConfirmOutcome::Failed(Alert::new("Erro", INCOMPLETE_RESULT_MESSAGE))
                }
            };
            state.busy = true;
            state.phase = ScanPhase::Confirming(score.clone());
            score
        };

        let update = AnswerSheetUpdate::corrected(&score, Utc::now());
        let result = self.store.mark_corrected(score.sheet_id, &update).await;

        let mut state = self.state();
        state.busy = false;
        match result {
            Ok(()) => {
                info!("✓ 成绩已保存: {}", score);
                state.back_to_seeking();
                state.last_marker = None;
                ConfirmOutcome::Saved(Alert::new("Sucesso", SAVED_MESSAGE))
            }
            Err(e) => {
                warn!("⚠️ 成绩保存失败，保留结果以便重试: {}", e);
                state.phase = ScanPhase::Result(score);
                ConfirmOutcome::Failed(e.to_alert())
            }
        }
    }
}
