//! The three-handler number router
//!
//! Router sends the current number to EvenHandler or OddHandler until it
//! reaches 1. A RecipientValidator sits in front of both handlers so a reply
//! without a valid `TO[...]` address bounces back to the Router.

use std::sync::Arc;
use taskweave_application::{
    ChatAgent, ExecutionParams, FnResponder, LlmGateway, Reply, Responder, ResponderError, Task,
};
use taskweave_domain::{DomainError, Message, Model, TaskConfig};

pub const ROUTER: &str = "Router";
pub const EVEN_HANDLER: &str = "EvenHandler";
pub const ODD_HANDLER: &str = "OddHandler";

const ROUTER_PROMPT: &str = "\
Your job is to send the current number to one of two people:
If the number is even, send it to EvenHandler,
and if it is odd, send it to OddHandler.
The handlers will transform the number and give you a new number.
If you send it to the wrong person, you will receive a negative value.
Your goal is to never get a negative number, so you must
clearly specify who you are sending the number to, by starting
your message with \"TO[EvenHandler]:\" or \"TO[OddHandler]:\".
For example, you could say \"TO[EvenHandler]: 4\".
When the number reaches 1, say \"DONE: 1\".";

const EVEN_PROMPT: &str = "\
You will be given a number.
If it is even, divide by 2 and say the result, nothing else.
If it is odd, say -10";

const ODD_PROMPT: &str = "\
You will be given a number n.
If it is odd, return (n*3+1), say nothing else.
If it is even, say -10";

/// Where the unit responders come from
pub enum Responders {
    /// Every unit is a chat agent on this gateway
    Llm {
        gateway: Arc<dyn LlmGateway>,
        model: Model,
    },
    /// Deterministic closures, no network
    Offline,
}

impl Responders {
    fn pick(&self, offline: FnResponder) -> Responder {
        match self {
            Responders::Llm { gateway, model } => {
                ChatAgent::new(Arc::clone(gateway), model.clone()).into()
            }
            Responders::Offline => offline.into(),
        }
    }
}

/// Build the Router unit with its validator and both handlers attached.
pub fn build(responders: &Responders, params: &ExecutionParams) -> Result<Task, DomainError> {
    let router = Task::new(
        TaskConfig::new(ROUTER)
            .llm_delegate(true)
            .with_termination(params.continuous())
            .with_system_message(ROUTER_PROMPT),
        responders.pick(FnResponder::replying(route_by_parity)),
    )?;

    let even = Task::new(
        TaskConfig::new(EVEN_HANDLER)
            .single_round()
            .with_system_message(EVEN_PROMPT),
        responders.pick(FnResponder::replying(|m| {
            let n = parse_number(m)?;
            Some((if n % 2 == 0 { n / 2 } else { -10 }).to_string())
        })),
    )?;

    let odd = Task::new(
        TaskConfig::new(ODD_HANDLER)
            .single_round()
            .with_system_message(ODD_PROMPT),
        responders.pick(FnResponder::new(|ctx| {
            let Some(n) = ctx.latest().and_then(parse_number) else {
                return Ok(None);
            };
            if n % 2 == 0 {
                return Ok(Some(Reply::from("-10")));
            }
            let next = n
                .checked_mul(3)
                .and_then(|v| v.checked_add(1))
                .ok_or_else(|| ResponderError::Failed(format!("3n+1 overflows for {n}")))?;
            Ok(Some(Reply::from(next.to_string())))
        })),
    )?;

    router.with_sub_tasks([Task::validator([EVEN_HANDLER, ODD_HANDLER]), even, odd])
}

fn parse_number(message: &Message) -> Option<i64> {
    message.content().trim().parse().ok()
}

/// Offline stand-in for the Router's model.
fn route_by_parity(message: &Message) -> Option<String> {
    let n = parse_number(message)?;
    Some(match n {
        1 => "DONE: 1".to_string(),
        n if n <= 0 => return None,
        n if n % 2 == 0 => format!("TO[{EVEN_HANDLER}]: {n}"),
        n => format!("TO[{ODD_HANDLER}]: {n}"),
    })
}
