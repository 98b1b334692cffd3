//! 设备能力 - 基础设施层
//!
//! 相机与震动由移动端外壳实现

use crate::error::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// 一张全分辨率照片
#[derive(Debug, Clone)]
pub struct Photo {
    /// 编码后的图像数据（JPEG/PNG）
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[allow(async_fn_in_trait)]
pub trait Camera {
    async fn take_picture(&self) -> AppResult<Photo>;
}

pub trait Haptics {
    fn pulse(&self, duration: Duration);
}

impl<T: Camera> Camera for Arc<T> {
    async fn take_picture(&self) -> AppResult<Photo> {
        (**self).take_picture().await
    }
}

impl<T: Haptics> Haptics for Arc<T> {
    fn pulse(&self, duration: Duration) {
        (**self).pulse(duration)
    }
}
