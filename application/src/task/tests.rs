use super::*;
use crate::ports::event_stream::{RunEvent, event_channel};
use crate::ports::input_source::{InputError, InputSource, QueuedInput};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use crate::responders::{ChatAgent, FnResponder, HumanResponder, Reply};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskweave_domain::{Message, Model, RoutingError, Signal, StepState, TaskConfig};

// ==================== Fixtures ====================

fn parse_number(message: &Message) -> Option<i64> {
    message.content().trim().parse().ok()
}

fn even_handler() -> Task {
    Task::new(
        TaskConfig::new("EvenHandler").single_round(),
        FnResponder::replying(|m| {
            let n = parse_number(m)?;
            Some((if n % 2 == 0 { n / 2 } else { -10 }).to_string())
        }),
    )
    .unwrap()
}

fn odd_handler() -> Task {
    Task::new(
        TaskConfig::new("OddHandler").single_round(),
        FnResponder::replying(|m| {
            let n = parse_number(m)?;
            Some((if n % 2 != 0 { 3 * n + 1 } else { -10 }).to_string())
        }),
    )
    .unwrap()
}

fn router_with(responder: impl Into<Responder>, allowed: &[&str]) -> Task {
    Task::new(
        TaskConfig::new("Router").llm_delegate(true).with_max_steps(10),
        responder,
    )
    .unwrap()
    .with_sub_tasks([
        Task::validator(allowed.iter().copied()),
        even_handler(),
        odd_handler(),
    ])
    .unwrap()
}

fn router(replies: &[&str]) -> Task {
    router_with(
        FnResponder::scripted(replies.iter().copied()),
        &["EvenHandler", "OddHandler"],
    )
}

/// Responder that counts its calls and always gives the same reply
fn counting(reply: &'static str) -> (FnResponder, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let responder = FnResponder::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Reply::from(reply)))
    });
    (responder, calls)
}

fn signals(task: &Task) -> Vec<Signal> {
    task.transcript()
        .iter()
        .filter_map(|m| m.signal().cloned())
        .collect()
}

// ==================== Routing scenarios ====================

#[tokio::test]
async fn test_odd_number_routed_to_odd_handler() {
    let mut router = router(&["TO[OddHandler]: 3"]);
    let result = router.run_async("3", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "10");
    assert_eq!(result.sender(), "OddHandler");
    assert_eq!(router.transcript().feedback_count(), 0);
    assert_eq!(router.transcript().len(), 3);
    assert_eq!(router.state(), StepState::Done);
    assert_eq!(router.child("EvenHandler").unwrap().run_count(), 0);
    assert_eq!(router.child("RecipientValidator").unwrap().run_count(), 1);
}

#[tokio::test]
async fn test_misrouted_number_becomes_router_tail() {
    let mut router = router(&["TO[OddHandler]: 4"]);
    let result = router.run_async("4", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "-10");
    assert_eq!(router.transcript().tail().unwrap().content(), "-10");
    assert_eq!(router.transcript().feedback_count(), 0);
}

#[tokio::test]
async fn test_unaddressed_reply_is_reported_as_feedback() {
    let (observer, mut events) = event_channel();
    let ctx = RunContext::new().with_observer(Arc::new(observer));
    let mut router = router(&["3", "TO[OddHandler]: 3"]);

    let result = router.run_async("3", &ctx).await.unwrap();

    assert_eq!(result.content(), "10");
    assert_eq!(signals(&router), vec![Signal::Unaddressed]);
    assert!(events.drain().iter().any(|e| matches!(
        e,
        RunEvent::RoutingFailed {
            error: RoutingError::Unaddressed,
            ..
        }
    )));
}

#[tokio::test]
async fn test_unaddressed_reply_fails_single_round() {
    let mut router = Task::new(
        TaskConfig::new("Router").llm_delegate(true).single_round(),
        FnResponder::scripted(["3"]),
    )
    .unwrap()
    .with_sub_tasks([even_handler(), odd_handler()])
    .unwrap();

    let error = router.run_async("3", &RunContext::new()).await.unwrap_err();
    assert!(matches!(
        error,
        RunError::Routing {
            source: RoutingError::Unaddressed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unknown_recipient_self_heals() {
    let mut router = router(&["TO[PrimeHandler]: 3", "TO[OddHandler]: 3"]);
    let result = router.run_async("3", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "10");
    assert_eq!(
        signals(&router),
        vec![Signal::UnknownRecipient {
            name: "PrimeHandler".to_string()
        }]
    );
    let feedback = router
        .transcript()
        .iter()
        .find(|m| m.is_negative_feedback())
        .unwrap();
    assert_eq!(feedback.recipient(), Some("Router"));
}

#[tokio::test]
async fn test_validator_rejection_blocks_delivery() {
    let mut router = router_with(
        FnResponder::scripted(["TO[OddHandler]: 3", "DONE"]),
        &["EvenHandler"],
    );
    let result = router.run_async("3", &RunContext::new()).await.unwrap();

    assert_eq!(result.sender(), "RecipientValidator");
    assert_eq!(result.recipient(), Some("Router"));
    assert_eq!(
        result.signal(),
        Some(&Signal::RejectedRecipient {
            name: Some("OddHandler".to_string())
        })
    );
    assert_eq!(router.child("OddHandler").unwrap().run_count(), 0);
}

#[tokio::test]
async fn test_done_with_text_is_new_result() {
    let mut router = router(&["TO[OddHandler]: 3", "DONE: 10"]);
    let result = router.run_async("3", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "10");
    assert_eq!(result.sender(), "Router");
    assert_eq!(router.transcript().tail(), Some(&result));
}

// ==================== Termination ====================

#[tokio::test]
async fn test_budget_bounds_responder_calls() {
    let (responder, calls) = counting("TO[Nobody]: x");
    let mut looper = Task::new(TaskConfig::new("Looper").with_max_steps(4), responder).unwrap();

    let error = looper.run_async("go", &RunContext::new()).await.unwrap_err();

    assert!(matches!(
        error,
        RunError::StepBudgetExceeded { max_steps: 4, .. }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_single_round_calls_responder_once() {
    let (responder, calls) = counting("hello");
    let mut unit = Task::new(TaskConfig::new("Greeter").single_round(), responder).unwrap();

    let result = unit.run_async("hi", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "hello");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_leaf_directive_is_unknown_recipient() {
    let mut unit = Task::new(
        TaskConfig::new("Leaf").single_round(),
        FnResponder::scripted(["TO[Anyone]: hi"]),
    )
    .unwrap();

    let error = unit.run_async("hi", &RunContext::new()).await.unwrap_err();
    assert!(matches!(
        error,
        RunError::Routing {
            source: RoutingError::UnknownRecipient { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_child_budget_absorbed_by_looping_parent() {
    let looper = || {
        let (responder, _) = counting("TO[Nobody]: x");
        Task::new(TaskConfig::new("Looper").with_max_steps(2), responder).unwrap()
    };

    let mut parent = Task::new(
        TaskConfig::new("Parent").llm_delegate(true),
        FnResponder::scripted(["TO[Looper]: go"]),
    )
    .unwrap()
    .with_sub_tasks([looper()])
    .unwrap();
    let result = parent.run_async("go", &RunContext::new()).await.unwrap();
    assert_eq!(
        result.signal(),
        Some(&Signal::ChildFailed {
            child: "Looper".to_string()
        })
    );

    let mut strict = Task::new(
        TaskConfig::new("Strict").llm_delegate(true).single_round(),
        FnResponder::scripted(["TO[Looper]: go"]),
    )
    .unwrap()
    .with_sub_tasks([looper()])
    .unwrap();
    let error = strict.run_async("go", &RunContext::new()).await.unwrap_err();
    assert_eq!(error.unit(), Some("Looper"));
    assert!(error.is_budget_exceeded());
}

#[tokio::test]
async fn test_no_reply_ends_run_with_tail() {
    let mut unit = Task::new(TaskConfig::new("Quiet"), FnResponder::scripted(Vec::<&str>::new()))
        .unwrap();
    let result = unit.run_async("input", &RunContext::new()).await.unwrap();
    assert_eq!(result, Message::root("input"));
}

// ==================== Static order ====================

fn declining(parent: &'static str) -> Task {
    Task::new(
        TaskConfig::new("Picky").single_round(),
        FnResponder::new(move |ctx| {
            Ok(Some(Reply::Forward(Message::feedback(
                ctx.unit,
                parent,
                Signal::NoEligibleChild,
                "not mine",
            ))))
        }),
    )
    .unwrap()
}

fn echo(name: &str) -> Task {
    Task::new(
        TaskConfig::new(name).single_round(),
        FnResponder::replying(|m| Some(m.content().to_string())),
    )
    .unwrap()
}

#[tokio::test]
async fn test_static_order_skips_negative_replies() {
    let mut parent = Task::new(TaskConfig::new("Parent"), FnResponder::scripted(["7"]))
        .unwrap()
        .with_sub_tasks([declining("Parent"), echo("Echo")])
        .unwrap();

    let result = parent.run_async("7", &RunContext::new()).await.unwrap();

    assert_eq!(result.content(), "7");
    assert_eq!(result.sender(), "Echo");
    assert_eq!(parent.child("Picky").unwrap().run_count(), 1);
    assert_eq!(parent.transcript().feedback_count(), 0);
}

#[tokio::test]
async fn test_static_order_honours_explicit_recipient() {
    let mut parent = Task::new(
        TaskConfig::new("Parent"),
        FnResponder::scripted(["TO[Second]: hi"]),
    )
    .unwrap()
    .with_sub_tasks([echo("First"), echo("Second")])
    .unwrap();

    let result = parent.run_async("hi", &RunContext::new()).await.unwrap();

    assert_eq!(result.sender(), "Second");
    assert_eq!(parent.child("First").unwrap().run_count(), 0);
}

#[tokio::test]
async fn test_static_single_round_without_taker_fails() {
    let mut parent = Task::new(
        TaskConfig::new("Parent").single_round(),
        FnResponder::scripted(["7"]),
    )
    .unwrap()
    .with_sub_tasks([declining("Parent")])
    .unwrap();

    let error = parent.run_async("7", &RunContext::new()).await.unwrap_err();
    assert!(matches!(error, RunError::NoEligibleChild { .. }));
}

// ==================== Structure ====================

#[test]
fn test_duplicate_sub_task_leaves_children_unchanged() {
    let mut router = router(&[]);
    let error = router.add_sub_task([even_handler()]).unwrap_err();

    assert_eq!(error, DomainError::DuplicateChildName("EvenHandler".to_string()));
    assert_eq!(
        router.child_names(),
        vec!["RecipientValidator", "EvenHandler", "OddHandler"]
    );
}

#[test]
fn test_duplicate_within_batch_is_atomic() {
    let mut parent = Task::new(TaskConfig::new("Parent"), FnResponder::scripted(["x"])).unwrap();
    let error = parent
        .add_sub_task([echo("Twin"), echo("Other"), echo("Twin")])
        .unwrap_err();

    assert!(error.is_duplicate());
    assert!(parent.children().is_empty());
}

#[test]
fn test_invalid_config_rejected() {
    assert!(matches!(
        Task::new(TaskConfig::new("bad:name"), FnResponder::scripted(["x"])),
        Err(DomainError::InvalidUnitName { .. })
    ));
}

#[test]
fn test_blocking_run() {
    let mut router = router(&["TO[OddHandler]: 3"]);
    let result = router.run("3", &RunContext::new()).unwrap();
    assert_eq!(result.content(), "10");
}

#[tokio::test]
async fn test_blocking_run_inside_runtime_is_an_error() {
    let mut unit = echo("Echo");
    assert!(matches!(
        unit.run("x", &RunContext::new()),
        Err(RunError::Runtime(_))
    ));
}

#[tokio::test]
async fn test_rerun_starts_fresh_and_seals_hierarchy() {
    let mut unit = echo("Echo");
    let ctx = RunContext::new();

    unit.run_async("a", &ctx).await.unwrap();
    let result = unit.run_async("b", &ctx).await.unwrap();

    assert_eq!(result.content(), "b");
    assert_eq!(unit.transcript().len(), 2);
    assert_eq!(unit.transcript().messages()[0], Message::root("b"));
    assert_eq!(unit.run_count(), 2);
    assert_eq!(
        unit.add_sub_task([echo("Late")]),
        Err(DomainError::HierarchySealed("Echo".to_string()))
    );
}

// ==================== Cancellation & interaction ====================

struct PendingInput;

#[async_trait]
impl InputSource for PendingInput {
    async fn next_input(&self, _prompt: &str) -> Result<Option<String>, InputError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_before_run() {
    let ctx = RunContext::new();
    ctx.cancel();
    let mut router = router(&["TO[OddHandler]: 3"]);

    let error = router.run_async("3", &ctx).await.unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(router.transcript().len(), 1);
}

#[tokio::test]
async fn test_cancel_while_waiting_for_human() {
    let ctx = RunContext::new().with_input(Arc::new(PendingInput));
    let token = ctx.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        token.cancel();
    });

    let mut unit = Task::new(TaskConfig::new("Human"), HumanResponder::new()).unwrap();
    let error = unit.run_async("start", &ctx).await.unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(unit.transcript().len(), 1);
}

#[tokio::test]
async fn test_cancel_reaches_delegated_child() {
    let ctx = RunContext::new().with_input(Arc::new(PendingInput));
    let token = ctx.cancellation().clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        token.cancel();
    });

    let human = Task::new(
        TaskConfig::new("Human").single_round(),
        HumanResponder::new(),
    )
    .unwrap();
    let mut parent = Task::new(
        TaskConfig::new("Asker").llm_delegate(true),
        FnResponder::scripted(["TO[Human]: ask"]),
    )
    .unwrap()
    .with_sub_tasks([human])
    .unwrap();

    let error = parent.run_async("start", &ctx).await.unwrap_err();

    assert!(error.is_cancelled());
    // Input and the routed message; the child never replied
    assert_eq!(parent.transcript().len(), 2);
    let tail = parent.transcript().tail().unwrap();
    assert_eq!(tail.sender(), "Asker");
    assert_eq!(tail.recipient(), Some("Human"));
    assert_eq!(tail.content(), "ask");
    assert_eq!(parent.child("Human").unwrap().transcript().len(), 1);
}

#[tokio::test]
async fn test_interactive_run_consumes_human_turns() {
    let input = Arc::new(QueuedInput::new(["second"]));
    let ctx = RunContext::new().with_input(input.clone());
    let mut chat = Task::new(
        TaskConfig::new("Chat").interactive(),
        FnResponder::replying(|m| Some(format!("echo: {}", m.content()))),
    )
    .unwrap();

    let result = chat.run_async("first", &ctx).await.unwrap();

    assert_eq!(result.content(), "echo: second");
    let senders: Vec<&str> = chat.transcript().iter().map(Message::sender).collect();
    assert_eq!(senders, vec!["root", "Chat", "user", "Chat"]);
    assert_eq!(input.remaining(), 0);
}

#[tokio::test]
async fn test_event_stream_follows_the_run() {
    let (observer, mut events) = event_channel();
    let ctx = RunContext::new().with_observer(Arc::new(observer));
    let mut router = router(&["TO[OddHandler]: 3"]);

    router.run_async("3", &ctx).await.unwrap();
    let events = events.drain();

    assert!(matches!(&events[0], RunEvent::RunStarted { unit, .. } if unit == "Router"));
    assert!(matches!(
        events.last(),
        Some(RunEvent::RunCompleted { unit, result })
            if unit == "Router" && result.content() == "10"
    ));
    let started: Vec<&str> = events
        .iter()
        .filter(|e| matches!(e, RunEvent::RunStarted { .. }))
        .map(RunEvent::unit)
        .collect();
    assert_eq!(started, vec!["Router", "RecipientValidator", "OddHandler"]);
    assert!(events.iter().any(|e| matches!(
        e,
        RunEvent::StateChanged { unit, state: StepState::Delivering } if unit == "Router"
    )));
}

// ==================== LLM-backed responder ====================

struct ScriptedSession {
    model: Model,
    responses: Mutex<VecDeque<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmSession for ScriptedSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(content.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::RequestFailed("script exhausted".to_string()))
    }
}

struct ScriptedGateway {
    responses: Vec<String>,
    prompts: Arc<Mutex<Vec<String>>>,
    system_prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_string()).collect(),
            prompts: Arc::new(Mutex::new(Vec::new())),
            system_prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(ScriptedSession {
            model: model.clone(),
            responses: Mutex::new(self.responses.clone().into()),
            prompts: Arc::clone(&self.prompts),
        }))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.to_string());
        self.create_session(model).await
    }
}

#[tokio::test]
async fn test_chat_agent_drives_router() {
    let gateway = Arc::new(ScriptedGateway::new(&["TO[OddHandler]: 3", "DONE: 10"]));
    let agent = ChatAgent::new(gateway.clone(), Model::default());
    let mut router = Task::new(
        TaskConfig::new("Router")
            .llm_delegate(true)
            .with_system_message("Route numbers by parity"),
        agent,
    )
    .unwrap()
    .with_sub_tasks([
        Task::validator(["EvenHandler", "OddHandler"]),
        even_handler(),
        odd_handler(),
    ])
    .unwrap();

    let result = router
        .run_async("3", &RunContext::new().with_streaming(true))
        .await
        .unwrap();

    assert_eq!(result.content(), "10");
    assert_eq!(result.sender(), "Router");
    assert_eq!(
        *gateway.system_prompts.lock().unwrap(),
        vec!["Route numbers by parity".to_string()]
    );
    let prompts = gateway.prompts.lock().unwrap();
    assert_eq!(prompts[0], "3");
    assert_eq!(prompts[1], "[OddHandler]: 10");
}

#[tokio::test]
async fn test_gateway_failure_is_responder_failure() {
    let gateway = Arc::new(ScriptedGateway::new(&[]));
    let mut unit = Task::new(
        TaskConfig::new("Agent").single_round(),
        ChatAgent::new(gateway, Model::default()),
    )
    .unwrap();

    let error = unit.run_async("hi", &RunContext::new()).await.unwrap_err();
    assert!(matches!(error, RunError::ResponderFailure { .. }));
}
