use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Answer, NewAnswer, NewQuestion, Question, QuestionFilter};

mod supabase;

pub use supabase::SupabaseStore;

pub const QUESTION_LIST_LIMIT: usize = 20;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Transport(String),
    #[error("record store rejected request: status={status} message={message}")]
    Rejected { status: u16, message: String },
    #[error("record store returned invalid data: {0}")]
    InvalidData(String),
    #[error("record not found")]
    NotFound,
}

/// Remote table service holding community questions and answers.
pub trait RecordStore: Send + Sync {
    /// Case-insensitive substring match on title or content.
    fn search_questions<'a>(&'a self, query: &'a str, limit: usize)
    -> StoreFuture<'a, Vec<Question>>;

    fn list_questions<'a>(&'a self, filter: &'a QuestionFilter) -> StoreFuture<'a, Vec<Question>>;

    fn get_question<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Question>;

    fn insert_question<'a>(&'a self, question: NewQuestion) -> StoreFuture<'a, Question>;

    /// Best answer first, then by upvotes.
    fn list_answers<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Vec<Answer>>;

    fn insert_answer<'a>(&'a self, answer: NewAnswer) -> StoreFuture<'a, Answer>;

    fn upvote_answer<'a>(&'a self, answer_id: Uuid, current_upvotes: i64)
    -> StoreFuture<'a, Answer>;

    /// Clears the flag on every answer of the question, then sets it on `answer_id`.
    fn mark_best_answer<'a>(&'a self, question_id: Uuid, answer_id: Uuid)
    -> StoreFuture<'a, Answer>;
}
