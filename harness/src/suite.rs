//! Declarative suite tree.
//!
//! A suite is a named, ordered list of cases built with a fluent API. Case
//! bodies are async functions receiving a [`TestContext`] clone; registration
//! is purely declarative — nothing runs until the [`Runner`](crate::Runner)
//! executes the tree.

use std::future::Future;

use futures::future::BoxFuture;

use crate::context::TestContext;
use crate::environment::Environment;

type CaseBody<E> = Box<dyn Fn(TestContext<E>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

pub(crate) struct Case<E> {
    pub(crate) name: String,
    pub(crate) body: CaseBody<E>,
}

/// A named group of cases sharing one setup hook and one [`TestContext`].
///
/// # Example
///
/// ```rust,ignore
/// let suite = Suite::new("token unit tests")
///     .case("deploys with expected supply", |cx| async move {
///         let bundle = cx.load_fixture(deploy_token).await?;
///         cx.contracts().insert("token", bundle.token);
///         Ok(())
///     })
///     .case("mints to an account", |cx| async move {
///         // runs after the previous case, same context
///         Ok(())
///     });
/// ```
pub struct Suite<E> {
    name: String,
    pub(crate) cases: Vec<Case<E>>,
}

impl<E: Environment> Suite<E> {
    /// Start an empty suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Append a case. Cases execute sequentially in declaration order.
    pub fn case<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(TestContext<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.cases.push(Case {
            name: name.into(),
            body: Box::new(move |cx| Box::pin(body(cx))),
        });
        self
    }

    /// The suite's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the suite has no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
