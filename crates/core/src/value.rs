//! Values crossing the host boundary.
//!
//! Arguments travel as an ordered list of JSON values; typed parameters are encoded on
//! the redirect side and decoded again inside the registry entry.

use crate::error::{ModuleError, ModuleErrorExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
pub use serde_json::Value;

/// Ordered call arguments, forwarded unchanged from a redirect to its entry.
pub type Args = Vec<Value>;

/// Options fixed on a mutation at declaration time and passed along with every commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOptions {
    /// Skip mutation subscribers for this commit.
    pub silent: bool,
}

/// Encodes a value for the host boundary.
///
/// # Errors
/// Returns [`ModuleError::Serialization`] if `value` cannot be represented as JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, ModuleError> {
    serde_json::to_value(value).context("encoding a value for the host")
}

/// Decodes a value received from the host.
///
/// # Errors
/// Returns [`ModuleError::Serialization`] if `value` does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ModuleError> {
    serde_json::from_value(value).context("decoding a value from the host")
}

/// Sequential decoder for the arguments of one operation call.
///
/// Missing trailing arguments decode from `null`, so `Option<T>` parameters may be omitted.
#[derive(Debug)]
pub struct ArgReader {
    operation: &'static str,
    position: usize,
    args: std::vec::IntoIter<Value>,
}

impl ArgReader {
    #[must_use]
    pub fn new(operation: &'static str, args: Args) -> Self {
        Self { operation, position: 0, args: args.into_iter() }
    }

    /// Decodes the next argument.
    ///
    /// # Errors
    /// Returns [`ModuleError::Serialization`] naming the operation and the argument position.
    pub fn next_arg<T: DeserializeOwned>(&mut self) -> Result<T, ModuleError> {
        let position = self.position;
        self.position += 1;
        let value = self.args.next().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .context(format!("argument {position} of `{}`", self.operation))
    }
}

/// Renders arguments the way trace output shows them: `a, b, c`.
///
/// Strings appear bare; every other value is shown as JSON.
#[must_use]
pub fn describe(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
