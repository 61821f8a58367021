//! Context-bound handles over the logging backend

use crate::field::{Field, KeyValue, Severity};
use crate::sink::Sink;
use std::fmt;
use std::sync::Arc;

/// A handle to the logging backend carrying an immutable, ordered set of
/// bound fields.
///
/// Cloning is cheap (two `Arc`s). Deriving a handle with additional fields
/// copies the bound context once and leaves the parent untouched, so many
/// threads may derive from the same handle without locking.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
    context: Arc<[Field]>,
}

impl Logger {
    pub fn new(sink: Arc<dyn Sink>) -> Logger {
        Logger {
            sink,
            context: Arc::from(Vec::new()),
        }
    }

    /// Derive a new handle whose context is this handle's context with
    /// `fields` appended, in order.
    pub fn with_fields(&self, fields: &[Field]) -> Logger {
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend_from_slice(&self.context);
        context.extend_from_slice(fields);

        Logger {
            sink: Arc::clone(&self.sink),
            context: context.into(),
        }
    }

    /// Derive a new handle from caller-supplied string pairs.
    pub fn with_pairs(&self, pairs: &[KeyValue]) -> Logger {
        let fields: Vec<Field> = pairs.iter().map(Field::from).collect();
        self.with_fields(&fields)
    }

    /// The fields bound to this handle.
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    /// Emit exactly one record. The record's field sequence is the bound
    /// context followed by `fields`.
    pub fn log(&self, severity: Severity, message: &str, fields: &[Field]) {
        self.sink.emit(severity, message, &self.context, fields);
    }

    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[Field]) {
        self.log(Severity::Error, message, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
