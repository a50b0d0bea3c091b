//! # Run the lifecycle stages of a single dispatch call.
//!
//! Executes the four stages of a [`Callback`] in fixed order, publishes
//! lifecycle events to [`Bus`], and routes the first failure through the
//! callback's error hook.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   validate → preprocess → execute → postprocess
//!     └─ publish StageCompleted after each stage
//!   publish DispatchCompleted → return result
//!
//! Failure (any stage):
//!   on_error(&err)  (panic-isolated, at most once)
//!   publish DispatchFailed { stage, reason }
//!   return Err(err)  (the original error, unchanged)
//! ```
//!
//! ## Rules
//! - Stages run in fixed order; the first failure stops the call and later
//!   stages never run.
//! - `on_error` fires **exactly once** on failure and never on success.
//! - A panic inside `on_error` is caught, published as `ErrorHookPanicked`,
//!   and the original stage error is still returned.
//! - Always publishes **exactly one** terminal event: `DispatchCompleted`
//!   or `DispatchFailed`.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Callback, Stage, TaskMeta};

/// Executes the four lifecycle stages of `callback` against `input`,
/// publishing lifecycle events to `bus`.
///
/// ### Flow
/// 1. `validate(&input)` — reject structurally invalid input
/// 2. `preprocess(&mut input)` — normalize in place
/// 3. `execute(input)` — produce the result (consumes the input)
/// 4. `postprocess(&result)` — side effect on the result
///
/// ### Failure semantics
/// The first failing stage ends the call: `on_error` observes the error
/// once, a `DispatchFailed` event carries the failing stage and message,
/// and the error is returned to the caller verbatim.
pub(crate) async fn run_stages<T, R, C>(
    callback: &C,
    meta: &TaskMeta,
    input: T,
    bus: &Bus,
) -> Result<R, TaskError>
where
    C: Callback<T, R> + ?Sized,
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    match drive(callback, meta, input, bus).await {
        Ok(result) => {
            publish_completed(bus, meta);
            Ok(result)
        }
        Err((stage, error)) => {
            observe_error(callback, meta, &error, bus).await;
            publish_failed(bus, meta, stage, &error);
            Err(error)
        }
    }
}

/// Runs the stages in order, tagging the first failure with its stage.
async fn drive<T, R, C>(
    callback: &C,
    meta: &TaskMeta,
    mut input: T,
    bus: &Bus,
) -> Result<R, (Stage, TaskError)>
where
    C: Callback<T, R> + ?Sized,
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    callback
        .validate(&input)
        .await
        .map_err(|e| (Stage::Validate, e))?;
    publish_stage(bus, meta, Stage::Validate);

    callback
        .preprocess(&mut input)
        .await
        .map_err(|e| (Stage::Preprocess, e))?;
    publish_stage(bus, meta, Stage::Preprocess);

    let result = callback
        .execute(input)
        .await
        .map_err(|e| (Stage::Execute, e))?;
    publish_stage(bus, meta, Stage::Execute);

    callback
        .postprocess(&result)
        .await
        .map_err(|e| (Stage::Postprocess, e))?;
    publish_stage(bus, meta, Stage::Postprocess);

    Ok(result)
}

/// Invokes the error hook, isolating panics so they never mask the error.
async fn observe_error<T, R, C>(callback: &C, meta: &TaskMeta, error: &TaskError, bus: &Bus)
where
    C: Callback<T, R> + ?Sized,
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    let hook = AssertUnwindSafe(callback.on_error(error)).catch_unwind();
    if let Err(panic) = hook.await {
        bus.publish(
            Event::new(EventKind::ErrorHookPanicked)
                .with_task(meta.name())
                .with_reason(panic_message(panic)),
        );
    }
}

/// Publishes `StageCompleted` for one finished stage.
fn publish_stage(bus: &Bus, meta: &TaskMeta, stage: Stage) {
    bus.publish(
        Event::new(EventKind::StageCompleted)
            .with_task(meta.name())
            .with_stage(stage),
    );
}

/// Publishes `DispatchCompleted` (all stages done, result returned).
fn publish_completed(bus: &Bus, meta: &TaskMeta) {
    bus.publish(
        Event::new(EventKind::DispatchCompleted)
            .with_task(meta.name())
            .with_module(meta.module()),
    );
}

/// Publishes `DispatchFailed` with the failing stage and error details.
fn publish_failed(bus: &Bus, meta: &TaskMeta, stage: Stage, err: &TaskError) {
    bus.publish(
        Event::new(EventKind::DispatchFailed)
            .with_task(meta.name())
            .with_module(meta.module())
            .with_stage(stage)
            .with_reason(err.to_string()),
    );
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
