pub mod catalog;
pub mod chat_state;
pub mod message;
pub mod retrieval;

pub use catalog::{EmploymentCategory, Insight, InsightAnswer, InsightBatch, Skill};
pub use chat_state::{
    ChatInsightSession, ChatInsightState, ChatUIAState, InsightMeta, InsightMode, InsightSource,
    PendingReason, TakenAnswer,
};
pub use message::{
    EmploymentSurvey, InsightQuestionKind, InsightSurveyBatchPayload, InsightSurveyEnvelope,
    InsightSurveyQuestion, InsightSurveySubmission, Message, MessageRole, MessageType,
    SkillsSurvey, SkillsSurveySubmission, Survey, SurveyOption, SurveyType,
};
pub use retrieval::{ChunkType, RetrievalChunk};
