//! Site-wide keyword search over community questions and the static FAQ / blog table.

use std::sync::Arc;

use tracing::warn;

use crate::models::{Question, SearchResult, SearchResultKind};
use crate::repos::RecordStore;

pub const MAX_RESULTS: usize = 8;
pub const REMOTE_FETCH_LIMIT: usize = 10;
const PREVIEW_CHARS: usize = 150;

const TITLE_MATCH_RELEVANCE: f32 = 1.0;
const QUESTION_CONTENT_RELEVANCE: f32 = 0.7;
const QUESTION_FALLBACK_RELEVANCE: f32 = 0.5;
const STATIC_NON_TITLE_RELEVANCE: f32 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct StaticEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub kind: SearchResultKind,
    pub category: &'static str,
    pub url: &'static str,
    pub keywords: &'static [&'static str],
}

pub fn default_static_entries() -> Vec<StaticEntry> {
    vec![
        StaticEntry {
            id: "faq-attendance",
            title: "Attendance Requirements",
            content: "Minimum 75% attendance required for all courses...",
            kind: SearchResultKind::FaqEntry,
            category: "academics",
            url: "/faq#attendance",
            keywords: &["attendance", "75%", "minimum", "requirement"],
        },
        StaticEntry {
            id: "faq-gpa",
            title: "GPA Calculation",
            content: "How to calculate your GPA at SRM University...",
            kind: SearchResultKind::FaqEntry,
            category: "academics",
            url: "/faq#academics",
            keywords: &["gpa", "grade", "calculation", "points"],
        },
        StaticEntry {
            id: "faq-hostel",
            title: "Hostel Life",
            content: "Everything about hostel facilities and rules...",
            kind: SearchResultKind::FaqEntry,
            category: "hostel",
            url: "/faq#hostel",
            keywords: &["hostel", "accommodation", "mess", "facilities"],
        },
        StaticEntry {
            id: "blog-cycle-test-preparation",
            title: "How to Prepare for Cycle Tests: A Complete Strategy",
            content: "Master the art of cycle test preparation with proven strategies and time management techniques.",
            kind: SearchResultKind::BlogPost,
            category: "academics",
            url: "/blog/cycle-test-preparation",
            keywords: &["cycle test", "exam", "preparation", "study"],
        },
        StaticEntry {
            id: "blog-placement-preparation-guide",
            title: "Placement Preparation: Starting from Day One",
            content: "Begin your placement preparation from the first year with these essential tips and strategies.",
            kind: SearchResultKind::BlogPost,
            category: "placements",
            url: "/blog/placement-preparation-guide",
            keywords: &["placement", "career", "internship", "interview"],
        },
    ]
}

#[derive(Clone)]
pub struct SearchAggregator {
    store: Option<Arc<dyn RecordStore>>,
    entries: Vec<StaticEntry>,
}

impl SearchAggregator {
    pub fn new(store: Option<Arc<dyn RecordStore>>) -> Self {
        Self::with_entries(store, default_static_entries())
    }

    pub fn with_entries(store: Option<Arc<dyn RecordStore>>, entries: Vec<StaticEntry>) -> Self {
        Self { store, entries }
    }

    /// At most [`MAX_RESULTS`] hits, highest relevance first. A failing record store only
    /// drops its share of the results.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let mut results = match self.store.as_ref() {
            Some(store) => match store.search_questions(query, REMOTE_FETCH_LIMIT).await {
                Ok(questions) => questions
                    .iter()
                    .take(REMOTE_FETCH_LIMIT)
                    .map(|question| question_result(question, &needle))
                    .collect(),
                Err(err) => {
                    warn!("question search failed, serving static results only: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        results.extend(search_static(&self.entries, &needle));
        rank(results)
    }
}

pub fn search_static(entries: &[StaticEntry], query: &str) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter_map(|entry| {
            let title_match = entry.title.to_lowercase().contains(&needle);
            let matched = title_match
                || entry.content.to_lowercase().contains(&needle)
                || entry
                    .keywords
                    .iter()
                    .any(|keyword| keyword.to_lowercase().contains(&needle));
            if !matched {
                return None;
            }

            Some(SearchResult {
                id: entry.id.to_string(),
                title: entry.title.to_string(),
                content: entry.content.to_string(),
                kind: entry.kind,
                category: Some(entry.category.to_string()),
                url: entry.url.to_string(),
                relevance: if title_match {
                    TITLE_MATCH_RELEVANCE
                } else {
                    STATIC_NON_TITLE_RELEVANCE
                },
            })
        })
        .collect()
}

fn question_result(question: &Question, needle: &str) -> SearchResult {
    let relevance = if question.title.to_lowercase().contains(needle) {
        TITLE_MATCH_RELEVANCE
    } else if question.content.to_lowercase().contains(needle) {
        QUESTION_CONTENT_RELEVANCE
    } else {
        QUESTION_FALLBACK_RELEVANCE
    };

    SearchResult {
        id: question.id.to_string(),
        title: question.title.clone(),
        content: preview(&question.content),
        kind: SearchResultKind::Question,
        category: Some(question.category.clone()),
        url: format!("/community/question/{}", question.id),
        relevance,
    }
}

// Stable sort: equal relevance keeps store results ahead of static ones.
fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.sort_by(|left, right| right.relevance.total_cmp(&left.relevance));
    results.truncate(MAX_RESULTS);
    results
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head = chars.by_ref().take(PREVIEW_CHARS).collect::<String>();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
