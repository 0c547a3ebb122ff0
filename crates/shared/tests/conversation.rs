use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shared::assistant::{AssistantError, AssistantFuture, ResponseGenerator};
use shared::config::ConfigurationStatus;
use shared::conversation::{
    ConversationOrchestrator, GREETING_TEXT, Sender, SubmitOutcome, THINKING_TEXT,
    UNAVAILABLE_TEXT,
};
use shared::llm::ErrorKind;
use tokio::sync::Notify;

/// Generator that answers every call with the same outcome, optionally waiting for a
/// release signal first.
struct StubGenerator {
    outcome: Result<String, ErrorKind>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl StubGenerator {
    fn answering(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn failing(kind: ErrorKind) -> Self {
        Self {
            outcome: Err(kind),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn gated(text: &str, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::answering(text)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResponseGenerator for StubGenerator {
    fn generate_response<'a>(&'a self, _user_message: &'a str) -> AssistantFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = self.gate.as_ref() {
                gate.notified().await;
            }
            self.outcome.clone().map_err(AssistantError::new)
        })
    }
}

#[tokio::test]
async fn answered_exchange_replaces_placeholder_in_place() {
    let generator = Arc::new(StubGenerator::answering("75% minimum."));
    let orchestrator =
        ConversationOrchestrator::new(generator.clone(), ConfigurationStatus::configured());

    let outcome = orchestrator.submit("What is the attendance rule?").await;

    assert_eq!(outcome, SubmitOutcome::Answered);
    assert_eq!(generator.calls(), 1);

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.last_error, None);

    let turns = snapshot
        .messages
        .iter()
        .map(|message| (message.sender, message.text.as_str(), message.pending))
        .collect::<Vec<_>>();
    assert_eq!(
        turns,
        vec![
            (Sender::Assistant, GREETING_TEXT, false),
            (Sender::User, "What is the attendance rule?", false),
            (Sender::Assistant, "75% minimum.", false),
        ]
    );
}

#[tokio::test]
async fn unconfigured_backend_answers_locally_without_calling_out() {
    let generator = Arc::new(StubGenerator::answering("should never be used"));
    let orchestrator =
        ConversationOrchestrator::new(generator.clone(), ConfigurationStatus::unconfigured());

    let outcome = orchestrator.submit("How is the GPA calculated in SRM?").await;

    assert_eq!(outcome, SubmitOutcome::Unavailable);
    assert_eq!(generator.calls(), 0);

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[1].sender, Sender::User);
    assert_eq!(snapshot.messages[2].text, UNAVAILABLE_TEXT);
    assert!(!snapshot.messages[2].pending);
}

#[tokio::test]
async fn blank_input_changes_nothing() {
    let generator = Arc::new(StubGenerator::answering("unused"));
    let orchestrator =
        ConversationOrchestrator::new(generator.clone(), ConfigurationStatus::configured());
    let before = orchestrator.state();

    let outcome = orchestrator.submit("   \n\t").await;

    assert_eq!(outcome, SubmitOutcome::IgnoredEmpty);
    assert_eq!(generator.calls(), 0);
    assert_eq!(orchestrator.state(), before);
}

#[tokio::test]
async fn failure_keeps_the_exchange_and_records_the_explanation() {
    let generator = Arc::new(StubGenerator::failing(ErrorKind::QuotaExceeded));
    let orchestrator =
        ConversationOrchestrator::new(generator.clone(), ConfigurationStatus::configured());

    let outcome = orchestrator.submit("When do cycle tests happen?").await;

    assert_eq!(outcome, SubmitOutcome::Failed(ErrorKind::QuotaExceeded));

    let snapshot = orchestrator.snapshot();
    let explanation = ErrorKind::QuotaExceeded.explanation();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.last_error.as_deref(), Some(explanation));
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[2].sender, Sender::Assistant);
    assert_eq!(snapshot.messages[2].text, explanation);
    assert!(!snapshot.messages[2].pending);
}

#[tokio::test]
async fn next_success_clears_previous_error() {
    let failing = ConversationOrchestrator::new(
        Arc::new(StubGenerator::failing(ErrorKind::Overloaded)),
        ConfigurationStatus::configured(),
    );
    failing.submit("first").await;
    assert!(failing.snapshot().last_error.is_some());

    let recovered = ConversationOrchestrator::with_state(
        Arc::new(StubGenerator::answering("second answer")),
        ConfigurationStatus::configured(),
        failing.state(),
    );
    assert_eq!(recovered.submit("second").await, SubmitOutcome::Answered);

    let snapshot = recovered.snapshot();
    assert_eq!(snapshot.last_error, None);
    assert_eq!(snapshot.messages.len(), 5);
    assert_eq!(snapshot.messages[4].text, "second answer");
}

#[tokio::test]
async fn retry_in_flight_does_not_show_the_previous_error() {
    let failing = ConversationOrchestrator::new(
        Arc::new(StubGenerator::failing(ErrorKind::Overloaded)),
        ConfigurationStatus::configured(),
    );
    failing.submit("first").await;
    assert_eq!(
        failing.snapshot().last_error.as_deref(),
        Some(ErrorKind::Overloaded.explanation())
    );

    let gate = Arc::new(Notify::new());
    let generator = Arc::new(StubGenerator::gated("second answer", gate.clone()));
    let retrying = Arc::new(ConversationOrchestrator::with_state(
        generator.clone(),
        ConfigurationStatus::configured(),
        failing.state(),
    ));

    let in_flight = tokio::spawn({
        let retrying = retrying.clone();
        async move { retrying.submit("second").await }
    });

    while generator.calls() == 0 {
        tokio::task::yield_now().await;
    }

    let during = retrying.snapshot();
    assert!(during.busy);
    assert_eq!(during.last_error, None);
    assert_eq!(during.messages[4].text, THINKING_TEXT);

    gate.notify_one();
    assert_eq!(
        in_flight.await.expect("submit task should join"),
        SubmitOutcome::Answered
    );
    assert_eq!(retrying.snapshot().last_error, None);
}

#[tokio::test]
async fn submission_while_busy_is_dropped() {
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(StubGenerator::gated("Hostel curfew is 9:30 PM.", gate.clone()));
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        generator.clone(),
        ConfigurationStatus::configured(),
    ));

    let in_flight = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit("hostel rules?").await }
    });

    while generator.calls() == 0 {
        tokio::task::yield_now().await;
    }

    let during = orchestrator.snapshot();
    assert!(during.busy);
    assert_eq!(during.messages.len(), 3);
    assert_eq!(during.messages[2].text, THINKING_TEXT);
    assert!(during.messages[2].pending);

    assert_eq!(
        orchestrator.submit("another question").await,
        SubmitOutcome::IgnoredBusy
    );
    assert_eq!(orchestrator.snapshot().messages.len(), 3);

    gate.notify_one();
    let outcome = in_flight.await.expect("submit task should join");

    assert_eq!(outcome, SubmitOutcome::Answered);
    assert_eq!(generator.calls(), 1);
    let after = orchestrator.snapshot();
    assert!(!after.busy);
    assert_eq!(after.messages.len(), 3);
    assert_eq!(after.messages[2].text, "Hostel curfew is 9:30 PM.");
}

#[tokio::test]
async fn abandoned_submission_does_not_leave_a_pending_placeholder() {
    let gate = Arc::new(Notify::new());
    let generator = Arc::new(StubGenerator::gated("never delivered", gate));
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        generator.clone(),
        ConfigurationStatus::configured(),
    ));

    let in_flight = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit("placements?").await }
    });

    while generator.calls() == 0 {
        tokio::task::yield_now().await;
    }
    in_flight.abort();
    let _ = in_flight.await;

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert!(snapshot.messages.iter().all(|message| !message.pending));
    assert_eq!(
        snapshot.messages[2].text,
        ErrorKind::Unknown.explanation()
    );
}
