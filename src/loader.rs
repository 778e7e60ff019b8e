use crate::error::PolicyError;
use crate::types::{Statement, StatementKind};

/// Parse a list of statement strings of one kind.
///
/// The first malformed statement aborts the whole list; nothing is dropped
/// silently.
///
/// Example:
/// ```rust
/// use latchkey_core::{compile_statements, StatementKind};
/// let statements = compile_statements(["*.users.read.*", "*.users.update.*"], StatementKind::Role).unwrap();
/// assert_eq!(statements.len(), 2);
/// ```
pub fn compile_statements<I, S>(
    definitions: I,
    kind: StatementKind,
) -> Result<Vec<Statement>, PolicyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    definitions
        .into_iter()
        .map(|definition| Statement::parse(definition.as_ref(), kind))
        .collect()
}
