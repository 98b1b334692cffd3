//! # Gabarito Core
//!
//! 答题卡扫描评分应用的客户端核心（无界面），移动端外壳负责渲染与设备接入
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 外部协作方与设备能力的 trait（认证、表查询、评分、相机、震动）
//! - `clients/` - Supabase 与评分服务的 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 批改历史查询
//! - `scan/geometry`、`scan/image_ops` - 裁剪换算与图片处理
//!
//! ### ③ 流程层（Workflow）
//! - `session/` - 会话守门、登录、路由守卫
//! - `scan/pipeline` - 识别 → 拍照 → 裁剪 → 上传 → 结果 → 确认写回
//!
//! ### ④ 编排层（Orchestration）
//! - `app` - 应用外壳，持有会话与当前路由
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod scan;
pub mod services;
pub mod session;

// 重新导出常用类型
pub use app::{App, Screen};
pub use clients::{ScorerClient, SupabaseClient};
pub use config::Config;
pub use error::{Alert, AppError, AppResult};
pub use models::{ScoreResult, Session, UserIdentity};
pub use scan::{CaptureOutcome, ConfirmOutcome, ScanPhase, ScanPipeline};
pub use services::HistoryService;
pub use session::{LoginForm, SessionGate};
