//! # Function-backed callback (`CallbackFn`)
//!
//! [`CallbackFn`] assembles a [`Callback`] out of plain closures: the
//! `execute` closure is required at construction, the optional stages are
//! attached with `with_*` builders. A stage that was never supplied behaves
//! exactly like the trait default (a true no-op).
//!
//! Use it when a dedicated callback type is not worth writing; implement
//! [`Callback`] directly when a stage needs to await.
//!
//! ## Example
//! ```
//! use stagerun::{CallbackFn, CallbackRef, TaskError};
//!
//! let double: CallbackRef<u32, u32> = CallbackFn::new(|n: u32| Ok(n * 2))
//!     .with_validate(|n: &u32| {
//!         if *n == 0 {
//!             return Err(TaskError::validation("input must be non-zero"));
//!         }
//!         Ok(())
//!     })
//!     .arc();
//! ```

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::callback::{Callback, CallbackRef};

type ValidateFn<T> = Box<dyn Fn(&T) -> Result<(), TaskError> + Send + Sync>;
type PreprocessFn<T> = Box<dyn Fn(&mut T) -> Result<(), TaskError> + Send + Sync>;
type ExecuteFn<T, R> = Box<dyn Fn(T) -> Result<R, TaskError> + Send + Sync>;
type PostprocessFn<R> = Box<dyn Fn(&R) -> Result<(), TaskError> + Send + Sync>;
type ErrorFn = Box<dyn Fn(&TaskError) + Send + Sync>;

/// Closure-backed callback implementation.
///
/// Optional stages left unset fall back to the [`Callback`] defaults.
pub struct CallbackFn<T, R> {
    validate: Option<ValidateFn<T>>,
    preprocess: Option<PreprocessFn<T>>,
    execute: ExecuteFn<T, R>,
    postprocess: Option<PostprocessFn<R>>,
    on_error: Option<ErrorFn>,
}

impl<T, R> CallbackFn<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Creates a callback from the required `execute` closure.
    pub fn new(execute: impl Fn(T) -> Result<R, TaskError> + Send + Sync + 'static) -> Self {
        Self {
            validate: None,
            preprocess: None,
            execute: Box::new(execute),
            postprocess: None,
            on_error: None,
        }
    }

    /// Attaches a `validate` stage.
    pub fn with_validate(
        mut self,
        f: impl Fn(&T) -> Result<(), TaskError> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(f));
        self
    }

    /// Attaches a `preprocess` stage.
    pub fn with_preprocess(
        mut self,
        f: impl Fn(&mut T) -> Result<(), TaskError> + Send + Sync + 'static,
    ) -> Self {
        self.preprocess = Some(Box::new(f));
        self
    }

    /// Attaches a `postprocess` stage.
    pub fn with_postprocess(
        mut self,
        f: impl Fn(&R) -> Result<(), TaskError> + Send + Sync + 'static,
    ) -> Self {
        self.postprocess = Some(Box::new(f));
        self
    }

    /// Attaches an error hook.
    pub fn with_on_error(mut self, f: impl Fn(&TaskError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Returns the callback as a shared handle (`Arc<dyn Callback>`).
    pub fn arc(self) -> CallbackRef<T, R> {
        std::sync::Arc::new(self)
    }
}

#[async_trait]
impl<T, R> Callback<T, R> for CallbackFn<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    async fn validate(&self, input: &T) -> Result<(), TaskError> {
        match &self.validate {
            Some(f) => f(input),
            None => Ok(()),
        }
    }

    async fn preprocess(&self, input: &mut T) -> Result<(), TaskError> {
        match &self.preprocess {
            Some(f) => f(input),
            None => Ok(()),
        }
    }

    async fn execute(&self, input: T) -> Result<R, TaskError> {
        (self.execute)(input)
    }

    async fn postprocess(&self, result: &R) -> Result<(), TaskError> {
        match &self.postprocess {
            Some(f) => f(result),
            None => Ok(()),
        }
    }

    async fn on_error(&self, error: &TaskError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn unset_stages_are_idempotent_noops() {
        let cb = CallbackFn::<u32, u32>::new(|n| Ok(n + 1));

        let mut input = 7;
        for _ in 0..3 {
            assert!(cb.validate(&input).await.is_ok());
            assert!(cb.preprocess(&mut input).await.is_ok());
            assert!(cb.postprocess(&41).await.is_ok());
            cb.on_error(&TaskError::fail("ignored")).await;
        }
        assert_eq!(input, 7, "default stages must not touch the input");
        assert_eq!(cb.execute(input).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn configured_stages_apply_in_order() {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);

        let cb = CallbackFn::<u32, u32>::new(|n| Ok(n * 10))
            .with_preprocess(|n: &mut u32| {
                *n += 1;
                Ok(())
            })
            .with_postprocess(move |r: &u32| {
                assert_eq!(*r, 30);
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let mut input = 2;
        cb.validate(&input).await.unwrap();
        cb.preprocess(&mut input).await.unwrap();
        let result = cb.execute(input).await.unwrap();
        cb.postprocess(&result).await.unwrap();

        assert_eq!(result, 30);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validate_rejects_and_hook_observes() {
        let observed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&observed);

        let cb = CallbackFn::<u32, u32>::new(|n| Ok(n))
            .with_validate(|n: &u32| {
                if *n % 2 == 1 {
                    return Err(TaskError::validation("odd input"));
                }
                Ok(())
            })
            .with_on_error(move |_e| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let err = cb.validate(&3).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation { .. }));
        cb.on_error(&err).await;
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }
}
