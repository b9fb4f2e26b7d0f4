mod answer;
mod ids;
mod nickname;
mod question;
mod quiz;
mod results;
mod settings;

pub use answer::Answer;
pub use ids::{AttemptId, ParseIdError, QuizId};
pub use nickname::{MAX_NICKNAME_CHARS, Nickname, NicknameError};
pub use question::{ContentError, Question, QuestionDraft};
pub use quiz::{Quiz, QuizDraft};
pub use results::{QuestionDetail, QuizResults};
pub use settings::{MAX_TIME_LIMIT_SECS, QuizSettings, QuizSettingsDraft, SettingsError};
