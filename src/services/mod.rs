pub mod answer_service;
pub mod normalizer;
pub mod option_matcher;
pub mod question_tracker;

pub use answer_service::AnswerService;
pub use normalizer::{normalize, sanitize};
pub use option_matcher::match_option;
pub use question_tracker::{decode_hash, hash_question, AnsweredSet, ANSWERED_CAP};
