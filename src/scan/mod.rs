pub mod debounce;
pub mod geometry;
pub mod image_ops;
pub mod pipeline;
pub mod torch;

pub use debounce::{DetectionDebounce, DETECTION_HOLD};
pub use geometry::{compute_crop, CropRegion, ScreenSize, Viewfinder};
pub use image_ops::prepare_upload;
pub use pipeline::{CaptureOutcome, ConfirmOutcome, ScanPhase, ScanPipeline};
pub use torch::Torch;
