pub mod backend;
pub mod device;

pub use backend::{AnswerSheetStore, AuthBackend, HistoryStore, ProfileStore, Scorer};
pub use device::{Camera, Haptics, Photo};
