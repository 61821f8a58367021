//! Cross-cutting handler capabilities: error reporting and context binding

use crate::field::{Field, KeyValue};
use crate::logger::Logger;

/// Minimal capability shared by every diagnostic handler: report a failed
/// operation as one error record.
pub trait ErrorDiagnostic {
    /// Emit a single error record carrying `msg`, a field with `err`'s
    /// description, and every context pair in order.
    fn error(&self, msg: &str, err: &dyn std::error::Error, ctx: &[KeyValue]);
}

/// Context-binding protocol: derive a new handler of the same type with
/// the given pairs appended to its bound fields. The receiver is never
/// modified and remains independently usable.
pub trait WithContext: Sized {
    fn with_context(&self, ctx: &[KeyValue]) -> Self;
}

/// Emit an error record through `logger`.
///
/// Arities 0, 1, and 2 are the call shapes seen in practice; they go
/// through fixed-size arrays so no intermediate collection is allocated.
/// Every path produces an identical field sequence for the same input.
pub(crate) fn error_with_context(
    logger: &Logger,
    msg: &str,
    err: &dyn std::error::Error,
    ctx: &[KeyValue],
) {
    match ctx {
        [] => logger.error(msg, &[Field::error(err)]),
        [a] => logger.error(msg, &[Field::error(err), Field::from(a)]),
        [a, b] => logger.error(msg, &[Field::error(err), Field::from(a), Field::from(b)]),
        _ => {
            let mut fields = Vec::with_capacity(ctx.len() + 1);
            fields.push(Field::error(err));
            fields.extend(ctx.iter().map(Field::from));
            logger.error(msg, &fields);
        }
    }
}
