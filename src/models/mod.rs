pub mod loaders;
pub mod option;
pub mod profile;
pub mod record;
pub mod session;

pub use loaders::load_profiles;
pub use option::{AnswerField, ChoiceOption};
pub use profile::{CustomProfile, FieldKind};
pub use record::{HistoryLog, ProgressEvent, QuestionRecord, RecordStatus, HISTORY_CAP, PROGRESS_EVENT_CAP};
pub use session::{Session, SessionOutcome};
