pub mod answer_sheet;
pub mod history;
pub mod relation;
pub mod score;
pub mod session;
pub mod sheet_code;

pub use answer_sheet::{AnswerSheetUpdate, SheetStatus, ANSWER_SHEET_TABLE};
pub use history::{CorrectionRecord, CorrectionRow, ExamFilter, ExamFilterRow, HistoryPage};
pub use relation::Relation;
pub use score::{ScoreOutcome, ScoreResult, ScorerResponse};
pub use session::{AuthEvent, Session, UserIdentity};
pub use sheet_code::SheetCode;
