use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

use super::{QUESTION_LIST_LIMIT, RecordStore, StoreError, StoreFuture};
use crate::config::{ConfigError, SupabaseSettings};
use crate::models::{Answer, NewAnswer, NewQuestion, Question, QuestionFilter, QuestionSort};

const QUESTIONS_TABLE: &str = "questions";
const ANSWERS_TABLE: &str = "answers";

/// PostgREST client for the hosted Supabase tables.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    rest_base: Url,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, ConfigError> {
        let rest_base = Url::parse(&format!("{}/rest/v1/", settings.url.trim_end_matches('/')))
            .map_err(|err| {
                ConfigError::InvalidConfiguration(format!("SUPABASE_URL is not a valid url: {err}"))
            })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            rest_base,
            anon_key: settings.anon_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, StoreError> {
        let url = self
            .rest_base
            .join(table)
            .map_err(|err| StoreError::Transport(format!("invalid table url: {err}")))?;

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key))
    }

    async fn fetch_rows<T>(&self, request: RequestBuilder) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(rejected(status, &body));
        }

        serde_json::from_str::<Vec<T>>(&body)
            .map_err(|err| StoreError::InvalidData(format!("unexpected row shape: {err}")))
    }

    async fn fetch_single<T>(&self, request: RequestBuilder) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.fetch_rows::<T>(request)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Question>, StoreError> {
        let pattern = ilike_pattern(query);
        let request = self.request(Method::GET, QUESTIONS_TABLE)?.query(&[
            ("select", "*".to_string()),
            (
                "or",
                format!("(title.ilike.{pattern},content.ilike.{pattern})"),
            ),
            ("limit", limit.to_string()),
        ]);
        self.fetch_rows(request).await
    }

    async fn list(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StoreError> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(category) = filter.category.as_deref()
            && !category.is_empty()
            && category != "all"
        {
            params.push(("category", format!("eq.{category}")));
        }
        match filter.sort {
            QuestionSort::Recent => params.push(("order", "created_at.desc".to_string())),
            QuestionSort::Popular => params.push(("order", "upvotes.desc".to_string())),
            QuestionSort::Unanswered => {
                params.push(("status", "eq.open".to_string()));
                params.push(("order", "created_at.desc".to_string()));
            }
        }
        params.push(("limit", QUESTION_LIST_LIMIT.to_string()));

        let request = self.request(Method::GET, QUESTIONS_TABLE)?.query(&params);
        self.fetch_rows(request).await
    }

    async fn insert_row<T>(&self, table: &str, row: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table)?
            .header("Prefer", "return=representation")
            .json(&row);
        self.fetch_single(request).await
    }

    async fn update_rows<T>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: Value,
    ) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, table)?
            .query(filters)
            .header("Prefer", "return=representation")
            .json(&patch);
        self.fetch_rows(request).await
    }

    async fn set_best_answer(&self, question_id: Uuid, answer_id: Uuid) -> Result<Answer, StoreError> {
        self.update_rows::<Answer>(
            ANSWERS_TABLE,
            &[("question_id", format!("eq.{question_id}"))],
            json!({ "is_best_answer": false }),
        )
        .await?;

        self.update_rows::<Answer>(
            ANSWERS_TABLE,
            &[
                ("id", format!("eq.{answer_id}")),
                ("question_id", format!("eq.{question_id}")),
            ],
            json!({ "is_best_answer": true }),
        )
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::NotFound)
    }
}

impl RecordStore for SupabaseStore {
    fn search_questions<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> StoreFuture<'a, Vec<Question>> {
        Box::pin(self.search(query, limit))
    }

    fn list_questions<'a>(&'a self, filter: &'a QuestionFilter) -> StoreFuture<'a, Vec<Question>> {
        Box::pin(self.list(filter))
    }

    fn get_question<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Question> {
        Box::pin(async move {
            let request = self.request(Method::GET, QUESTIONS_TABLE)?.query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{question_id}")),
            ]);
            self.fetch_single(request).await
        })
    }

    fn insert_question<'a>(&'a self, question: NewQuestion) -> StoreFuture<'a, Question> {
        Box::pin(async move {
            let row = json!({
                "user_id": question.user_id,
                "title": question.title,
                "content": question.content,
                "category": question.category,
                "status": question.status.as_str(),
            });
            self.insert_row(QUESTIONS_TABLE, row).await
        })
    }

    fn list_answers<'a>(&'a self, question_id: Uuid) -> StoreFuture<'a, Vec<Answer>> {
        Box::pin(async move {
            let request = self.request(Method::GET, ANSWERS_TABLE)?.query(&[
                ("select", "*".to_string()),
                ("question_id", format!("eq.{question_id}")),
                ("order", "is_best_answer.desc,upvotes.desc".to_string()),
            ]);
            self.fetch_rows(request).await
        })
    }

    fn insert_answer<'a>(&'a self, answer: NewAnswer) -> StoreFuture<'a, Answer> {
        Box::pin(async move {
            let row = json!({
                "question_id": answer.question_id,
                "user_id": answer.user_id,
                "content": answer.content.trim(),
            });
            self.insert_row(ANSWERS_TABLE, row).await
        })
    }

    fn upvote_answer<'a>(
        &'a self,
        answer_id: Uuid,
        current_upvotes: i64,
    ) -> StoreFuture<'a, Answer> {
        Box::pin(async move {
            self.update_rows::<Answer>(
                ANSWERS_TABLE,
                &[("id", format!("eq.{answer_id}"))],
                json!({ "upvotes": current_upvotes.saturating_add(1) }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
        })
    }

    fn mark_best_answer<'a>(
        &'a self,
        question_id: Uuid,
        answer_id: Uuid,
    ) -> StoreFuture<'a, Answer> {
        Box::pin(self.set_best_answer(question_id, answer_id))
    }
}

/// Quoted `*term*` ilike operand. Quoting keeps commas and parentheses in user input
/// from being read as PostgREST filter syntax.
fn ilike_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!("\"*{escaped}*\"")
}

fn rejected(status: StatusCode, body: &str) -> StoreError {
    #[derive(Deserialize)]
    struct PostgrestError {
        message: Option<String>,
    }

    let message = serde_json::from_str::<PostgrestError>(body)
        .ok()
        .and_then(|error| error.message)
        .unwrap_or_else(|| "unknown".to_string());

    StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
}
