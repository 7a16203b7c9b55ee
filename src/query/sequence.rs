use std::fmt;
use std::path::Path;

use super::statement::Statement;
use crate::client::{Client, Transport};
use crate::error::SubmitError;

/// Ordered list of statements; the unit that gets submitted. Statement
/// order is execution order, so each statement sees the implicit result
/// of the one before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    statements: Vec<Statement>,
    compiled: String,
}

impl Sequence {
    pub fn new(statements: impl IntoIterator<Item = Statement>) -> Self {
        let mut sequence = Self {
            statements: statements.into_iter().collect(),
            compiled: String::new(),
        };
        sequence.compiled = sequence.compile();
        sequence
    }

    pub fn append(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
        self.compiled = self.compile();
    }

    fn compile(&self) -> String {
        self.statements.iter().map(Statement::compiled).collect()
    }

    pub fn compiled(&self) -> &str {
        &self.compiled
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Submit and return the response as text.
    pub fn execute<T: Transport>(&self, client: &Client<T>) -> Result<String, SubmitError> {
        client.submit(&self.compiled)
    }

    /// Submit and return the raw response bytes.
    pub fn execute_bytes<T: Transport>(&self, client: &Client<T>) -> Result<Vec<u8>, SubmitError> {
        client.submit_bytes(&self.compiled)
    }

    /// Submit, write the response to `path`, and return it as text.
    pub fn execute_and_export<T: Transport>(
        &self,
        client: &Client<T>,
        path: impl AsRef<Path>,
    ) -> Result<String, SubmitError> {
        client.submit_and_export(&self.compiled, path)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compiled)
    }
}
