// SPDX-FileCopyrightText: 2026 Abstracta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat sub-flow: follow-up questions about a generated abstract.
//!
//! At most one request is in flight. While a reply is pending, new sends are
//! rejected or queued depending on [`ChatSendPolicy`]. User and assistant
//! turns strictly alternate in the message list.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use abstracta_config::{ChatConfig, ChatSendPolicy};
use abstracta_core::types::{AssistantTurn, ExtractedDocument, QuestionRequest};
use abstracta_core::{AbstractaError, ChatMessage, ChatRole, MessageId, QuestionAnswerer};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What happened to a message handed to [`ChatSession::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Appended and sent; carries the id of the user message.
    Accepted(MessageId),
    /// Held until the pending reply arrives.
    Queued,
    /// Dropped because a reply is pending.
    Rejected,
    /// Empty after trimming; nothing happened.
    Ignored,
}

/// Grounding context passed along with every question.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub document: Option<Arc<ExtractedDocument>>,
    pub grounded: bool,
}

/// Content of the failed turn left behind by [`ChatSession::cancel`].
pub const CANCELLED_REPLY: &str = "reply cancelled";

#[derive(Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    loading: bool,
    queue: VecDeque<(String, ChatContext)>,
    /// Context of the most recent question, reused by retry.
    last_context: ChatContext,
    /// Bumped on cancel so replies of abandoned requests are dropped.
    epoch: u64,
}

struct ChatInner {
    answerer: Arc<dyn QuestionAnswerer>,
    config: ChatConfig,
    state: Mutex<ChatState>,
    loading_tx: watch::Sender<bool>,
    token: Mutex<CancellationToken>,
}

impl ChatInner {
    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_loading(&self, state: &mut ChatState, loading: bool) {
        state.loading = loading;
        self.loading_tx.send_replace(loading);
    }
}

/// Ordered conversation plus the single in-flight request.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<ChatInner>,
}

impl ChatSession {
    pub fn new(answerer: Arc<dyn QuestionAnswerer>, config: ChatConfig) -> Self {
        let (loading_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ChatInner {
                answerer,
                config,
                state: Mutex::new(ChatState::default()),
                loading_tx,
                token: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Sends a question. Must be called from within a Tokio runtime.
    pub fn send_message(&self, text: &str, context: ChatContext) -> SendOutcome {
        let question = text.trim();
        if question.is_empty() {
            return SendOutcome::Ignored;
        }

        let mut state = self.inner.lock();
        if state.loading {
            return match self.inner.config.send_policy {
                ChatSendPolicy::Reject => {
                    debug!("chat send rejected while a reply is pending");
                    SendOutcome::Rejected
                }
                ChatSendPolicy::Queue if state.queue.len() < self.inner.config.max_queued => {
                    state.queue.push_back((question.to_string(), context));
                    debug!(queued = state.queue.len(), "chat message queued");
                    SendOutcome::Queued
                }
                ChatSendPolicy::Queue => {
                    warn!(max = self.inner.config.max_queued, "chat queue full, message dropped");
                    SendOutcome::Rejected
                }
            };
        }

        let id = begin_turn(&self.inner, &mut state, question.to_string(), context);
        SendOutcome::Accepted(id)
    }

    /// Removes a trailing failed assistant turn and asks its question again.
    /// Returns `false` when the last message is not a failed turn.
    pub fn retry_last(&self) -> Result<bool, AbstractaError> {
        let mut state = self.inner.lock();
        if state.loading {
            return Err(AbstractaError::ChatBusy);
        }
        if !state.messages.last().is_some_and(|m| m.failed) {
            return Ok(false);
        }
        state.messages.pop();

        let Some(question) = state
            .messages
            .last()
            .filter(|m| m.role == ChatRole::User)
            .map(|m| m.content.clone())
        else {
            return Ok(false);
        };

        debug!("retrying last chat question");
        let context = state.last_context.clone();
        dispatch(&self.inner, &mut state, question, context);
        Ok(true)
    }

    /// Empties the conversation. Not allowed while a reply is pending.
    pub fn clear_chat(&self) -> Result<(), AbstractaError> {
        let mut state = self.inner.lock();
        if state.loading {
            return Err(AbstractaError::ChatBusy);
        }
        state.messages.clear();
        state.queue.clear();
        Ok(())
    }

    /// Abandons the pending reply and any queued messages. Already appended
    /// messages are kept, and an unanswered question gets a failed turn so it
    /// can be retried. Returns whether a request was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.lock();
        {
            let mut token = self
                .inner
                .token
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            token.cancel();
            *token = CancellationToken::new();
        }
        state.epoch += 1;
        state.queue.clear();
        let was_loading = state.loading;
        self.inner.set_loading(&mut state, false);
        if was_loading {
            debug!("pending chat reply cancelled");
            if state.messages.last().is_some_and(|m| m.role == ChatRole::User) {
                state.messages.push(ChatMessage::failure(CANCELLED_REPLY));
            }
        }
        was_loading
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn queued(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Waits until no reply is pending and the queue has drained.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.loading_tx.subscribe();
        let _ = rx.wait_for(|loading| !*loading).await;
    }
}

/// Appends the user message and dispatches it.
fn begin_turn(
    inner: &Arc<ChatInner>,
    state: &mut ChatState,
    question: String,
    context: ChatContext,
) -> MessageId {
    let message = ChatMessage::user(question.clone());
    let id = message.id.clone();
    state.messages.push(message);
    dispatch(inner, state, question, context);
    id
}

/// Spawns the backend request for the question at the end of the list.
fn dispatch(inner: &Arc<ChatInner>, state: &mut ChatState, question: String, context: ChatContext) {
    let history: Vec<ChatMessage> = state
        .messages
        .iter()
        .take(state.messages.len().saturating_sub(1))
        .filter(|m| !m.failed)
        .cloned()
        .collect();
    let request = QuestionRequest {
        question,
        history,
        document: context.document.clone(),
        grounded: context.grounded,
    };
    state.last_context = context;
    inner.set_loading(state, true);

    let epoch = state.epoch;
    let token = inner.token().child_token();
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let timeout = inner.config.reply_timeout();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            outcome = tokio::time::timeout(timeout, inner.answerer.answer(request)) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AbstractaError::Timeout { duration: timeout }),
            },
        };
        complete_turn(&inner, epoch, outcome);
    });
}

/// Records a reply, then starts the next queued message or clears loading.
fn complete_turn(
    inner: &Arc<ChatInner>,
    epoch: u64,
    outcome: Result<AssistantTurn, AbstractaError>,
) {
    let mut state = inner.lock();
    if state.epoch != epoch {
        return;
    }

    match outcome {
        Ok(turn) => {
            debug!(citations = turn.citations.len(), "chat reply received");
            state.messages.push(ChatMessage::assistant(turn));
        }
        Err(err) => {
            warn!(error = %err, "chat reply failed");
            state.messages.push(ChatMessage::failure(err.to_string()));
        }
    }

    match state.queue.pop_front() {
        Some((question, context)) => {
            begin_turn(inner, &mut state, question, context);
        }
        None => inner.set_loading(&mut state, false),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use abstracta_test_utils::MockAnswerer;

    fn session(answerer: MockAnswerer, policy: ChatSendPolicy) -> ChatSession {
        let config = ChatConfig {
            reply_delay_ms: 0,
            send_policy: policy,
            max_queued: 2,
            reply_timeout_secs: 5,
        };
        ChatSession::new(Arc::new(answerer), config)
    }

    fn roles(chat: &ChatSession) -> Vec<ChatRole> {
        chat.messages().iter().map(|m| m.role).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_appended_after_question() {
        let chat = session(MockAnswerer::new().with_reply("It works."), ChatSendPolicy::Reject);
        let outcome = chat.send_message("  What is it?  ", ChatContext::default());
        assert!(matches!(outcome, SendOutcome::Accepted(_)));
        assert!(chat.is_loading());

        chat.wait_idle().await;
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "What is it?");
        assert_eq!(messages[1].content, "It works.");
        assert!(!chat.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let chat = session(MockAnswerer::new(), ChatSendPolicy::Reject);
        assert_eq!(chat.send_message("   \n", ChatContext::default()), SendOutcome::Ignored);
        assert!(chat.messages().is_empty());
        assert!(!chat.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn second_send_is_rejected_while_loading() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(2));
        let chat = session(answerer, ChatSendPolicy::Reject);
        chat.send_message("first", ChatContext::default());
        assert_eq!(chat.send_message("second", ChatContext::default()), SendOutcome::Rejected);

        chat.wait_idle().await;
        assert_eq!(roles(&chat), vec![ChatRole::User, ChatRole::Assistant]);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_sends_keep_strict_alternation() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(1));
        let chat = session(answerer, ChatSendPolicy::Queue);
        chat.send_message("one", ChatContext::default());
        assert_eq!(chat.send_message("two", ChatContext::default()), SendOutcome::Queued);
        assert_eq!(chat.send_message("three", ChatContext::default()), SendOutcome::Queued);
        assert_eq!(chat.send_message("four", ChatContext::default()), SendOutcome::Rejected);
        assert_eq!(chat.messages().len(), 1);

        chat.wait_idle().await;
        let messages = chat.messages();
        assert_eq!(messages.len(), 6);
        for (i, m) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant };
            assert_eq!(m.role, expected);
        }
        assert_eq!(messages[4].content, "three");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_appends_diagnostic_turn_and_retry_replaces_it() {
        let answerer = MockAnswerer::new().with_reply("Recovered answer.");
        answerer.fail_next("backend unavailable");
        let chat = session(answerer, ChatSendPolicy::Reject);

        chat.send_message("Why?", ChatContext::default());
        chat.wait_idle().await;
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].failed);
        assert!(messages[1].content.contains("backend unavailable"));

        assert!(chat.retry_last().unwrap());
        chat.wait_idle().await;
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert!(!messages[1].failed);
        assert_eq!(messages[1].content, "Recovered answer.");
        assert!(!chat.retry_last().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reply_times_out_as_failed_turn() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(30));
        let chat = session(answerer, ChatSendPolicy::Reject);
        chat.send_message("slow?", ChatContext::default());
        chat.wait_idle().await;
        let last = chat.messages().pop().unwrap();
        assert!(last.failed);
        assert!(last.content.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_is_refused_while_loading() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(1));
        let chat = session(answerer, ChatSendPolicy::Reject);
        chat.send_message("q", ChatContext::default());
        assert!(matches!(chat.clear_chat(), Err(AbstractaError::ChatBusy)));

        chat.wait_idle().await;
        chat.clear_chat().unwrap();
        assert!(chat.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_late_reply() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(2));
        let chat = session(answerer, ChatSendPolicy::Reject);
        chat.send_message("q", ChatContext::default());
        assert!(chat.cancel());
        assert!(!chat.is_loading());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(roles(&chat), vec![ChatRole::User, ChatRole::Assistant]);
        let last = chat.messages().pop().unwrap();
        assert!(last.failed);
        assert_eq!(last.content, CANCELLED_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_question_can_be_retried() {
        let answerer = MockAnswerer::new().with_delay(Duration::from_secs(2));
        let requests = answerer.requests();
        let chat = session(answerer, ChatSendPolicy::Reject);
        chat.send_message("q", ChatContext::default());
        chat.cancel();

        assert!(chat.retry_last().unwrap());
        chat.wait_idle().await;
        assert_eq!(roles(&chat), vec![ChatRole::User, ChatRole::Assistant]);
        assert!(!chat.messages()[1].failed);
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cancel_when_idle_leaves_messages_untouched() {
        let chat = session(MockAnswerer::new(), ChatSendPolicy::Reject);
        chat.send_message("q", ChatContext::default());
        chat.wait_idle().await;
        assert!(!chat.cancel());
        assert_eq!(chat.messages().len(), 2);
        assert!(!chat.messages()[1].failed);
    }

    #[tokio::test(start_paused = true)]
    async fn history_excludes_failed_turns_and_the_question() {
        let answerer = MockAnswerer::new();
        let requests = answerer.requests();
        answerer.fail_next("down");
        let chat = session(answerer, ChatSendPolicy::Reject);

        chat.send_message("first", ChatContext::default());
        chat.wait_idle().await;
        chat.send_message("second", ChatContext::default());
        chat.wait_idle().await;

        let seen = requests.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].history.is_empty());
        assert_eq!(seen[1].question, "second");
        assert_eq!(seen[1].history.len(), 1);
        assert_eq!(seen[1].history[0].content, "first");
    }
}
