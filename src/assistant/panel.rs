//! Assistant Panel
//!
//! Holds the transcript and busy state for one assistant session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::backend::ChatBackend;
use super::types::{ChatTurn, Role};

/// Reply shown when the backend call fails for any reason
pub const FALLBACK_REPLY: &str = "Sorry, AI service is unavailable.";

/// Single-turn assistant state machine
pub struct AssistantPanel<B> {
    backend: B,
    transcript: Vec<ChatTurn>,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when dropped
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<B: ChatBackend> AssistantPanel<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            transcript: Vec::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask a question.
    ///
    /// Blank input is ignored and returns `None`. Otherwise exactly one user
    /// turn and one assistant turn are appended, and the assistant turn is
    /// returned.
    pub async fn submit(&mut self, input: &str) -> Option<&ChatTurn> {
        if input.trim().is_empty() {
            return None;
        }

        self.answer_dangling_turn();
        self.transcript.push(ChatTurn::user(input));
        let _busy = BusyGuard::engage(&self.busy);

        let reply = match self.backend.complete(&self.transcript).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "Assistant call failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        self.transcript.push(ChatTurn::assistant(reply));
        self.transcript.last()
    }

    /// A cancelled `submit` leaves its user turn unanswered; close it with
    /// the fallback so turns keep alternating.
    fn answer_dangling_turn(&mut self) {
        if self.transcript.last().is_some_and(|t| t.role == Role::User) {
            tracing::debug!("Previous question was cancelled, recording fallback reply");
            self.transcript.push(ChatTurn::assistant(FALLBACK_REPLY));
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Shared view of the busy flag, for observers outside the panel
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that records what it saw and replays a canned outcome
    struct ScriptedBackend {
        reply: Option<String>,
        busy_seen: Mutex<Option<Arc<AtomicBool>>>,
        busy_during_call: AtomicBool,
        calls: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl ScriptedBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                busy_seen: Mutex::new(None),
                busy_during_call: AtomicBool::new(false),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                ..Self::replying("")
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
            if let Some(flag) = self.busy_seen.lock().unwrap().as_ref() {
                self.busy_during_call
                    .store(flag.load(Ordering::SeqCst), Ordering::SeqCst);
            }
            self.calls.lock().unwrap().push(turns.to_vec());
            self.reply.clone().ok_or(AssistantError::Unavailable)
        }
    }

    fn panel_with(backend: ScriptedBackend) -> AssistantPanel<Arc<ScriptedBackend>> {
        let backend = Arc::new(backend);
        let panel = AssistantPanel::new(Arc::clone(&backend));
        *backend.busy_seen.lock().unwrap() = Some(panel.busy_flag());
        panel
    }

    #[tokio::test]
    async fn test_submit_appends_user_and_reply() {
        let mut panel = panel_with(ScriptedBackend::replying("Use the Kar98"));

        let reply = panel.submit("Best sniper loadout in Warzone?").await.cloned();

        assert_eq!(reply, Some(ChatTurn::assistant("Use the Kar98")));
        assert_eq!(panel.transcript().len(), 2);
        assert_eq!(panel.transcript()[0].role, Role::User);
        assert_eq!(panel.transcript()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_blank_input_is_noop() {
        let mut panel = panel_with(ScriptedBackend::replying("unused"));

        assert!(panel.submit("").await.is_none());
        assert!(panel.submit("   \n\t").await.is_none());
        assert!(panel.transcript().is_empty());
        assert!(!panel.is_busy());
    }

    #[tokio::test]
    async fn test_busy_during_call_and_cleared_after() {
        let backend = Arc::new(ScriptedBackend::replying("ok"));
        let mut panel = AssistantPanel::new(Arc::clone(&backend));
        *backend.busy_seen.lock().unwrap() = Some(panel.busy_flag());

        panel.submit("hello").await;

        assert!(backend.busy_during_call.load(Ordering::SeqCst));
        assert!(!panel.is_busy());
    }

    #[tokio::test]
    async fn test_failure_yields_fallback_and_clears_busy() {
        let backend = Arc::new(ScriptedBackend::failing());
        let mut panel = AssistantPanel::new(Arc::clone(&backend));
        *backend.busy_seen.lock().unwrap() = Some(panel.busy_flag());

        panel.submit("is the server up?").await;

        assert!(backend.busy_during_call.load(Ordering::SeqCst));
        assert!(!panel.is_busy());
        assert_eq!(panel.transcript().len(), 2);
        assert_eq!(panel.transcript()[1], ChatTurn::assistant(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn test_full_transcript_sent_each_call() {
        let backend = Arc::new(ScriptedBackend::replying("sure"));
        let mut panel = AssistantPanel::new(Arc::clone(&backend));

        panel.submit("first").await;
        panel.submit("second").await;

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[1].len(), 3);
        assert_eq!(calls[1][2], ChatTurn::user("second"));
    }

    #[tokio::test]
    async fn test_cancelled_call_clears_busy() {
        struct HangingBackend;

        #[async_trait]
        impl ChatBackend for HangingBackend {
            async fn complete(&self, _turns: &[ChatTurn]) -> Result<String, AssistantError> {
                std::future::pending().await
            }
        }

        let mut panel = AssistantPanel::new(HangingBackend);
        let busy = panel.busy_flag();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            panel.submit("anyone?"),
        )
        .await;

        assert!(result.is_err());
        assert!(!busy.load(Ordering::SeqCst));
        assert_eq!(panel.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_question_answered_before_next() {
        /// Hangs on the first call, replies afterwards
        struct SlowStartBackend {
            calls: Mutex<Vec<Vec<ChatTurn>>>,
        }

        #[async_trait]
        impl ChatBackend for SlowStartBackend {
            async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AssistantError> {
                let first = {
                    let mut calls = self.calls.lock().unwrap();
                    calls.push(turns.to_vec());
                    calls.len() == 1
                };
                if first {
                    std::future::pending::<()>().await;
                }
                Ok("back online".to_string())
            }
        }

        let backend = Arc::new(SlowStartBackend {
            calls: Mutex::new(Vec::new()),
        });
        let mut panel = AssistantPanel::new(Arc::clone(&backend));

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            panel.submit("anyone?"),
        )
        .await;
        assert!(result.is_err());

        panel.submit("hello again").await;

        let expected = vec![
            ChatTurn::user("anyone?"),
            ChatTurn::assistant(FALLBACK_REPLY),
            ChatTurn::user("hello again"),
        ];
        assert_eq!(backend.calls.lock().unwrap()[1], expected);
        assert_eq!(panel.transcript().len(), 4);
        assert_eq!(panel.transcript()[3], ChatTurn::assistant("back online"));
    }
}
