//! 照片裁剪、缩放与重新编码

use crate::error::{AppError, AppResult};
use crate::infrastructure::Photo;
use crate::scan::geometry::{compute_crop, CropRegion, ScreenSize};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use tracing::{debug, info, warn};

/// 上传图片的固定高度
pub const OUTPUT_HEIGHT: u32 = 1600;
/// JPEG 压缩质量
pub const JPEG_QUALITY: u8 = 80;

/// 解码并按 EXIF 方向摆正
///
/// 手机照片常以横向像素存储，再用方向标记表示竖拍
pub fn decode_oriented(data: &[u8]) -> AppResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::capture(e.to_string()))?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// 把照片处理成上传用的 JPEG
///
/// 裁剪区域按摆正后的真实尺寸计算，相机上报的尺寸只用于日志比对
pub fn prepare_upload(photo: &Photo, screen: ScreenSize) -> AppResult<(CropRegion, Vec<u8>)> {
    let img = decode_oriented(&photo.data)?;

    if (img.width(), img.height()) != (photo.width, photo.height) {
        warn!(
            "相机上报尺寸 {}x{} 与解码尺寸 {}x{} 不一致",
            photo.width,
            photo.height,
            img.width(),
            img.height()
        );
    }

    let region = compute_crop(screen, img.width(), img.height())?;
    info!("✂️ 裁剪区域: {:?}", region);

    let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
    let target_width = (f64::from(region.width) * f64::from(OUTPUT_HEIGHT)
        / f64::from(region.height))
    .round()
    .max(1.0) as u32;
    let resized = cropped.resize_exact(target_width, OUTPUT_HEIGHT, FilterType::Triangle);

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder.encode_image(&resized.to_rgb8())?;

    debug!("上传图片: {}x{}, {} 字节", target_width, OUTPUT_HEIGHT, buf.len());
    Ok((region, buf))
}
