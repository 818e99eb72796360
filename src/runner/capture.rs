//! Argument capture
//!
//! Splits the positional words of an invocation into the requested task and
//! the trailing arguments forwarded to its recipe.

use crate::error::{ResolveError, ResolveResult};
use crate::runner::RuleStore;

/// A parsed invocation: `<task> [args...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Requested task identifier
    pub task: String,
    /// Words after the task identifier, verbatim
    pub args: Vec<String>,
}

impl Invocation {
    /// Split raw tokens into the task identifier and trailing arguments
    pub fn parse<I, S>(tokens: I) -> ResolveResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);
        let task = tokens.next().ok_or(ResolveError::MissingTask)?;
        if task.is_empty() {
            return Err(ResolveError::MissingTask);
        }

        Ok(Invocation {
            task,
            args: tokens.collect(),
        })
    }
}

/// Parse an invocation and register placeholders for its trailing words
///
/// Each trailing word that is not already a task identifier becomes a
/// phony, recipe-less task, so the store never reports it as unknown.
/// Declared tasks keep their identity when they appear as trailing words.
/// Only [`Invocation::task`] should be handed to the resolver.
pub fn capture<I, S>(store: &mut RuleStore, tokens: I) -> ResolveResult<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let invocation = Invocation::parse(tokens)?;

    for arg in &invocation.args {
        store.synthesize(arg);
    }

    Ok(invocation)
}
