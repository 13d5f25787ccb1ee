//! Step loop
//!
//! ```text
//! Idle -> AwaitingResponder -> Routing -> Delivering -> Idle | Done
//! ```
//!
//! Each step asks the responder for a reply, routes it, and delivers it to a
//! child when it is addressed. Looping units turn routing failures into
//! feedback entries; single-round units fail instead.

use super::{RunContext, RunError, Task};
use crate::responders::{Reply, ResponderContext};
use futures::future::BoxFuture;
use std::future::Future;
use taskweave_domain::{
    Message, RecipientRouter, Route, RoutingError, Signal, StepState, Transcript,
};
use tracing::{debug, info, warn};

/// How one step ended
enum StepOutcome {
    Continue,
    /// Terminal output; interactive units ask for another human turn.
    Output(Message),
    /// DONE signal, no reply, or a completed single round.
    Done(Message),
}

/// What the children made of a routed message
enum Delivery {
    Reply(Message),
    Rejected { gate: String, feedback: Message },
    /// Nobody produced a positive reply; carries the last negative one.
    NoEligible(Option<Message>),
}

/// Race `fut` against the run's cancellation token.
async fn cancellable<T>(ctx: &RunContext, fut: impl Future<Output = T>) -> Result<T, RunError> {
    tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => Err(RunError::Cancelled),
        out = fut => Ok(out),
    }
}

impl Task {
    /// Run to completion on a private current-thread runtime.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`Task::run_async`] there.
    pub fn run(
        &mut self,
        input: impl Into<Message>,
        ctx: &RunContext,
    ) -> Result<Message, RunError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(RunError::Runtime(
                "run() called inside an async runtime, use run_async()".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RunError::Runtime(e.to_string()))?;
        runtime.block_on(self.run_async(input, ctx))
    }

    /// Run with `input` as the first transcript entry and return the result.
    ///
    /// Every run starts from a fresh transcript. The future is boxed because
    /// delivering to a child runs this same method one level down.
    pub fn run_async<'a>(
        &'a mut self,
        input: impl Into<Message>,
        ctx: &'a RunContext,
    ) -> BoxFuture<'a, Result<Message, RunError>> {
        let input = input.into();
        Box::pin(async move {
            let name = self.config.name.clone();
            self.runs += 1;
            info!(unit = %name, policy = self.config.termination.as_str(), "Run started");
            ctx.observer().on_run_start(&name, &input);

            let result = self.run_steps(input, ctx).await;
            match &result {
                Ok(message) => {
                    info!(
                        unit = %name,
                        entries = self.transcript.len(),
                        "Run complete"
                    );
                    ctx.observer().on_run_complete(&name, message);
                }
                Err(e) => {
                    debug!(unit = %name, error = %e, "Run failed");
                    ctx.observer().on_run_failed(&name, &e.to_string());
                }
            }
            result
        })
    }

    async fn run_steps(&mut self, input: Message, ctx: &RunContext) -> Result<Message, RunError> {
        self.transcript = Transcript::new();
        self.state = StepState::Idle;
        self.append(input, ctx);

        let max_steps = self.config.termination.max_steps();
        let mut step = 0;
        loop {
            if ctx.is_cancelled() {
                return Err(RunError::Cancelled);
            }
            if step == max_steps {
                warn!(unit = %self.config.name, max_steps, "Step budget exhausted");
                return Err(RunError::StepBudgetExceeded {
                    unit: self.config.name.clone(),
                    max_steps,
                });
            }
            step += 1;
            debug!(unit = %self.config.name, step, "Step");

            match self.step(step, ctx).await? {
                StepOutcome::Continue => {}
                StepOutcome::Done(result) => return Ok(result),
                StepOutcome::Output(result) => {
                    if !self.config.termination.is_interactive() {
                        return Ok(result);
                    }
                    match self.next_human_turn(ctx).await? {
                        Some(turn) => {
                            self.append(turn, ctx);
                            self.transition(StepState::Idle, ctx);
                        }
                        None => return Ok(result),
                    }
                }
            }
        }
    }

    async fn step(&mut self, step: usize, ctx: &RunContext) -> Result<StepOutcome, RunError> {
        self.transition(StepState::AwaitingResponder, ctx);
        let reply = {
            let responder_ctx = ResponderContext {
                unit: &self.config.name,
                step,
                system_message: self.config.system_message.as_deref(),
                transcript: &self.transcript,
                observer: ctx.observer(),
                input: ctx.input(),
                stream: ctx.stream(),
            };
            cancellable(ctx, self.responder.respond(&responder_ctx)).await?
        };
        let reply = reply.map_err(|source| RunError::ResponderFailure {
            unit: self.config.name.clone(),
            source,
        })?;

        let Some(reply) = reply else {
            debug!(unit = %self.config.name, "Responder had nothing to say");
            self.transition(StepState::Done, ctx);
            return Ok(StepOutcome::Done(self.tail()));
        };

        self.transition(StepState::Routing, ctx);
        let routed = {
            let router =
                RecipientRouter::new(&self.config.name, self.child_names(), self.config.delegation);
            match &reply {
                Reply::Text(raw) => router.route_text(raw),
                Reply::Forward(message) => router.route_message(message.clone()),
            }
        };
        let route = match routed {
            Ok(route) => route,
            Err(error) => return self.recover_routing(error, reply, ctx),
        };

        match route {
            Route::Done(text) => {
                let result = match text {
                    Some(text) => {
                        let message = Message::new(&self.config.name, text);
                        self.append(message.clone(), ctx);
                        message
                    }
                    None => self.tail(),
                };
                debug!(unit = %self.config.name, "DONE");
                self.transition(StepState::Done, ctx);
                Ok(StepOutcome::Done(result))
            }
            Route::Output(message) => {
                self.append(message.clone(), ctx);
                self.transition(StepState::Done, ctx);
                Ok(StepOutcome::Output(message))
            }
            Route::Delegate(message) | Route::Broadcast(message) => {
                debug!(
                    unit = %self.config.name,
                    recipient = message.recipient().unwrap_or("*"),
                    "Routed"
                );
                self.append(message.clone(), ctx);
                self.transition(StepState::Delivering, ctx);
                let delivery = if self.delegates_by_llm() && message.is_addressed() {
                    self.deliver_to(message, ctx).await?
                } else {
                    self.deliver_in_order(message, ctx).await?
                };
                self.settle(delivery, ctx)
            }
        }
    }

    fn recover_routing(
        &mut self,
        error: RoutingError,
        reply: Reply,
        ctx: &RunContext,
    ) -> Result<StepOutcome, RunError> {
        ctx.observer().on_routing_error(&self.config.name, &error);
        if self.config.termination.is_single_round() {
            return Err(RunError::Routing {
                unit: self.config.name.clone(),
                source: error,
            });
        }

        warn!(unit = %self.config.name, %error, "Routing failed, sending feedback");
        let rejected = match reply {
            Reply::Text(raw) => Message::new(&self.config.name, raw),
            Reply::Forward(message) => message,
        };
        self.append(rejected, ctx);
        self.append(error.to_feedback(&self.config.name), ctx);
        self.transition(StepState::Idle, ctx);
        Ok(StepOutcome::Continue)
    }

    fn settle(&mut self, delivery: Delivery, ctx: &RunContext) -> Result<StepOutcome, RunError> {
        let single_round = self.config.termination.is_single_round();
        match delivery {
            Delivery::Reply(message) => {
                self.append(message.clone(), ctx);
                if single_round {
                    self.transition(StepState::Done, ctx);
                    return Ok(StepOutcome::Done(message));
                }
            }
            Delivery::Rejected { gate, feedback } => {
                let reason = feedback.content().to_string();
                self.append(feedback, ctx);
                if single_round {
                    return Err(RunError::Rejected {
                        unit: self.config.name.clone(),
                        gate,
                        reason,
                    });
                }
                warn!(unit = %self.config.name, %gate, %reason, "Recipient rejected");
            }
            Delivery::NoEligible(last_negative) => {
                if single_round {
                    return Err(RunError::NoEligibleChild {
                        unit: self.config.name.clone(),
                    });
                }
                let name = &self.config.name;
                let feedback = last_negative.unwrap_or_else(|| {
                    Message::feedback(
                        name,
                        name,
                        Signal::NoEligibleChild,
                        "None of the children accepted the message. Rephrase it or address a child directly.",
                    )
                });
                self.append(feedback, ctx);
            }
        }
        self.transition(StepState::Idle, ctx);
        Ok(StepOutcome::Continue)
    }

    /// Delegating units: every gate sees the message first, then the target.
    async fn deliver_to(
        &mut self,
        message: Message,
        ctx: &RunContext,
    ) -> Result<Delivery, RunError> {
        let target = message.recipient().unwrap_or_default().to_string();
        let gates: Vec<usize> = (0..self.children.len())
            .filter(|&i| self.children[i].is_gate())
            .collect();

        for index in gates {
            let gate = self.children[index].name().to_string();
            let verdict = self.run_child(index, message.clone(), ctx).await?;
            if verdict.is_negative_feedback() {
                return Ok(Delivery::Rejected {
                    gate,
                    feedback: verdict,
                });
            }
            if gate == target {
                return Ok(Delivery::Reply(verdict));
            }
        }

        let Some(index) = self.children.iter().position(|c| c.name() == target) else {
            return Ok(Delivery::NoEligible(None));
        };
        let reply = self.run_child(index, message, ctx).await?;
        Ok(Delivery::Reply(reply))
    }

    /// Static units: children in declaration order until one replies
    /// without a negative signal. Non-gate children not matching an explicit
    /// recipient are skipped.
    async fn deliver_in_order(
        &mut self,
        message: Message,
        ctx: &RunContext,
    ) -> Result<Delivery, RunError> {
        let mut last_negative = None;
        for index in 0..self.children.len() {
            let child = &self.children[index];
            let is_gate = child.is_gate();
            let name = child.name().to_string();
            if !is_gate && message.recipient().is_some_and(|r| r != name) {
                continue;
            }

            let reply = self.run_child(index, message.clone(), ctx).await?;
            match (is_gate, reply.is_negative_feedback()) {
                (true, true) => {
                    return Ok(Delivery::Rejected {
                        gate: name,
                        feedback: reply,
                    });
                }
                (true, false) => {}
                (false, true) => {
                    debug!(unit = %self.config.name, child = %name, "Child declined");
                    last_negative = Some(reply);
                }
                (false, false) => return Ok(Delivery::Reply(reply)),
            }
        }
        Ok(Delivery::NoEligible(last_negative))
    }

    /// Run child `index` with `message` and turn its result into an entry
    /// for this unit's transcript.
    async fn run_child(
        &mut self,
        index: usize,
        message: Message,
        ctx: &RunContext,
    ) -> Result<Message, RunError> {
        let parent = self.config.name.clone();
        let absorb_failures = !self.config.termination.is_single_round();
        let child = &mut self.children[index];
        let child_name = child.config.name.clone();
        debug!(unit = %parent, child = %child_name, "Delivering");

        match cancellable(ctx, child.run_async(message, ctx)).await? {
            Ok(result) => Ok(match result.signal() {
                Some(signal) => Message::feedback(
                    &child_name,
                    &parent,
                    signal.clone(),
                    result.content(),
                ),
                None => result.restamped(&child_name),
            }),
            Err(error) if absorb_failures && error.is_budget_exceeded() => {
                warn!(
                    unit = %parent,
                    child = %child_name,
                    %error,
                    "Child failed, sending feedback"
                );
                Ok(Message::feedback(
                    &child_name,
                    &parent,
                    Signal::ChildFailed {
                        child: child_name.clone(),
                    },
                    error.to_string(),
                ))
            }
            Err(error) => Err(error),
        }
    }

    async fn next_human_turn(&self, ctx: &RunContext) -> Result<Option<Message>, RunError> {
        let turn = cancellable(ctx, ctx.input().next_input(&self.config.name))
            .await?
            .map_err(|e| RunError::ResponderFailure {
                unit: self.config.name.clone(),
                source: e.into(),
            })?;
        Ok(turn.map(Message::user))
    }

    fn tail(&self) -> Message {
        self.transcript
            .tail()
            .cloned()
            .unwrap_or_else(|| Message::new(&self.config.name, ""))
    }

    fn append(&mut self, message: Message, ctx: &RunContext) {
        ctx.observer().on_message(&self.config.name, &message);
        self.transcript.push(message);
    }

    fn transition(&mut self, next: StepState, ctx: &RunContext) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal step transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        ctx.observer().on_state_change(&self.config.name, next);
    }
}
