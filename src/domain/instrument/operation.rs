//! Operation trait and the counting / history decorators

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, error, warn};

use crate::domain::store::ValueStore;
use crate::domain::DomainError;

use super::normalize::Normalize;

/// An operation that can be decorated with instrumentation
///
/// The identity names the counter and history lists in the store, so it
/// must stay fixed for the lifetime of the process.
#[async_trait]
pub trait Operation: Send + Sync + Debug {
    type Args: Normalize + Send + 'static;
    type Output: Normalize + Send;

    fn identity(&self) -> &str;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, DomainError>;
}

/// Store key of the history list of recorded inputs
pub fn inputs_key(identity: &str) -> String {
    format!("{}:inputs", identity)
}

/// Store key of the history list of recorded outputs
pub fn outputs_key(identity: &str) -> String {
    format!("{}:outputs", identity)
}

/// Output recorded when the wrapped operation fails
pub fn error_marker(error: &DomainError) -> String {
    format!("<error: {}>", error)
}

/// Increments the invocation counter before every call
///
/// Attempts are counted, not successes: the counter moves even when the
/// wrapped operation then fails.
#[derive(Debug)]
pub struct Counted<O> {
    inner: O,
    store: Arc<dyn ValueStore>,
}

impl<O: Operation> Counted<O> {
    pub fn new(inner: O, store: Arc<dyn ValueStore>) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: Operation> Operation for Counted<O> {
    type Args = O::Args;
    type Output = O::Output;

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, DomainError> {
        let identity = self.identity();
        let count = self.store.increment(identity).await?;

        counter!("recall_cache_invocations_total", "identity" => identity.to_string())
            .increment(1);
        debug!(identity, count, "Counted invocation");

        self.inner.call(args).await
    }
}

/// Appends normalized inputs and outputs to the call history
///
/// The arguments are normalized before the wrapped call. Once it returns,
/// input and output are written with a single `append_pair`, so the two
/// lists always have the same length and a failed history write leaves
/// neither behind. A failed call records an error marker as its output and
/// the error is returned unchanged.
#[derive(Debug)]
pub struct Recorded<O> {
    inner: O,
    store: Arc<dyn ValueStore>,
}

impl<O: Operation> Recorded<O> {
    pub fn new(inner: O, store: Arc<dyn ValueStore>) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: Operation> Operation for Recorded<O> {
    type Args = O::Args;
    type Output = O::Output;

    fn identity(&self) -> &str {
        self.inner.identity()
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, DomainError> {
        let identity = self.identity();
        let input = args.normalize();

        let result = self.inner.call(args).await;
        let output = match &result {
            Ok(output) => output.normalize(),
            Err(err) => error_marker(err),
        };

        let recorded = self
            .store
            .append_pair(
                &inputs_key(identity),
                input.as_bytes(),
                &outputs_key(identity),
                output.as_bytes(),
            )
            .await;

        match (result, recorded) {
            (Ok(value), Ok(())) => {
                debug!(identity, input = %input, output = %output, "Recorded call");
                Ok(value)
            }
            (Ok(_), Err(store_err)) => {
                error!(identity, input = %input, error = %store_err, "Failed to record call");
                Err(store_err)
            }
            (Err(err), Ok(())) => {
                warn!(identity, input = %input, error = %err, "Recorded failed call");
                Err(err)
            }
            (Err(err), Err(store_err)) => {
                error!(
                    identity,
                    input = %input,
                    error = %err,
                    store_error = %store_err,
                    "Failed to record failed call"
                );
                Err(err)
            }
        }
    }
}

/// Wraps `op` with counting (outermost) and history recording (innermost)
pub fn instrument<O: Operation>(op: O, store: Arc<dyn ValueStore>) -> Counted<Recorded<O>> {
    Counted::new(Recorded::new(op, store.clone()), store)
}
