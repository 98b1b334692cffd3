//! 取景框到照片像素的裁剪换算
//!
//! 纯函数：同样的屏幕尺寸与照片分辨率永远得到同样的裁剪区域

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 取景框宽度占屏幕宽度的比例
pub const VIEWFINDER_WIDTH_RATIO: f64 = 0.85;
/// 答题卡纸张比例（宽:高）
pub const SHEET_ASPECT_WIDTH: f64 = 1240.0;
pub const SHEET_ASPECT_HEIGHT: f64 = 1754.0;
/// 裁剪时四周额外保留的像素
pub const CROP_MARGIN_PX: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<&Config> for ScreenSize {
    fn from(config: &Config) -> Self {
        Self::new(config.screen_width, config.screen_height)
    }
}

/// 屏幕坐标系下的取景框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewfinder {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewfinder {
    /// 屏幕居中、按答题卡比例的取景框
    pub fn centered(screen: ScreenSize) -> Self {
        let width = screen.width * VIEWFINDER_WIDTH_RATIO;
        let height = width * (SHEET_ASPECT_HEIGHT / SHEET_ASPECT_WIDTH);
        Self {
            x: (screen.width - width) / 2.0,
            y: (screen.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// 照片像素坐标系下的裁剪区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 把一条边从屏幕坐标映射到照片坐标并加边距，返回 (起点, 长度)
fn project_axis(offset: f64, length: f64, screen: f64, photo: u32) -> (u32, u32) {
    let photo = f64::from(photo);
    let origin = (offset * photo / screen - CROP_MARGIN_PX).max(0.0);
    let extent = (length * photo / screen + CROP_MARGIN_PX * 2.0).min(photo - origin);

    let start = (origin.floor() as u32).min(photo as u32);
    let size = (extent.max(0.0).floor() as u32).min(photo as u32 - start);
    (start, size)
}

/// 计算裁剪区域，结果起点不小于 0 且不超出照片边界
pub fn compute_crop(screen: ScreenSize, photo_width: u32, photo_height: u32) -> AppResult<CropRegion> {
    if !(screen.width > 0.0 && screen.height > 0.0) {
        return Err(AppError::capture(format!("屏幕尺寸非法: {:?}", screen)));
    }

    let viewfinder = Viewfinder::centered(screen);
    let (x, width) = project_axis(viewfinder.x, viewfinder.width, screen.width, photo_width);
    let (y, height) = project_axis(viewfinder.y, viewfinder.height, screen.height, photo_height);

    if width == 0 || height == 0 {
        return Err(AppError::capture(format!(
            "裁剪区域为空 (照片 {}x{})",
            photo_width, photo_height
        )));
    }

    Ok(CropRegion {
        x,
        y,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> ScreenSize {
        ScreenSize::new(390.0, 844.0)
    }

    #[test]
    fn test_reference_phone_photo() {
        let region = compute_crop(phone(), 3000, 4000).unwrap();

        // 29.25 * 3000/390 - 150 = 75；331.5 * 3000/390 + 300 = 2850
        assert_eq!(region.x, 75);
        assert_eq!(region.width, 2850);
        assert!(region.y > 0);
        assert!(region.y + region.height <= 4000);
        assert_eq!(region, compute_crop(phone(), 3000, 4000).unwrap());
    }

    #[test]
    fn test_never_leaves_photo_bounds() {
        for (w, h) in [(3000, 4000), (4000, 3000), (640, 480), (301, 301), (1, 1), (1080, 1920)] {
            let region = compute_crop(phone(), w, h).unwrap();
            assert!(region.width >= 1 && region.height >= 1);
            assert!(region.x + region.width <= w, "{}x{} -> {:?}", w, h, region);
            assert!(region.y + region.height <= h, "{}x{} -> {:?}", w, h, region);
        }
    }

    #[test]
    fn test_margin_clamped_at_origin() {
        // 小照片时边距会越过左上角，起点必须钳到 0
        let region = compute_crop(phone(), 390, 844).unwrap();
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 37);
        assert_eq!(region.width, 390);
    }

    #[test]
    fn test_empty_photo_is_error() {
        assert!(compute_crop(phone(), 0, 4000).is_err());
        assert!(compute_crop(ScreenSize::new(0.0, 844.0), 3000, 4000).is_err());
    }

    #[test]
    fn test_viewfinder_keeps_sheet_aspect() {
        let vf = Viewfinder::centered(phone());
        assert!((vf.width - 331.5).abs() < 1e-9);
        assert!((vf.height / vf.width - 1754.0 / 1240.0).abs() < 1e-9);
        assert!((vf.x - 29.25).abs() < 1e-9);
    }
}
