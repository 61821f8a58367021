//! Logging backend boundary and the built-in sinks

use crate::config::LogFormat;
use crate::field::{Field, Severity, Value};
use chrono::{SecondsFormat, Utc};
use std::io::{self, Write};
use std::sync::Mutex;

/// Backend boundary: accepts structured records at a severity level.
///
/// `context` holds the fields bound to the emitting handle and `fields` the
/// per-call fields; the record's field sequence is `context` followed by
/// `fields`, in order. Implementations must never surface failures to the
/// caller — a record that cannot be written is dropped inside the backend.
pub trait Sink: Send + Sync {
    fn emit(&self, severity: Severity, message: &str, context: &[Field], fields: &[Field]);
}

/// One emitted record, with the bound context and per-call fields flattened
/// into a single ordered sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub severity: Severity,
    pub message: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// First value recorded under `key`, if any.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.key() == key)
            .map(|f| f.value())
    }
}

/// Line-oriented sink: encodes each record as one line of JSON or compact
/// `key=value` text and writes it to the wrapped writer.
///
/// Records below the configured severity are dropped. Duplicate keys within
/// one record are written as-is.
pub struct WriterSink {
    writer: Mutex<Box<dyn Write + Send>>,
    format: LogFormat,
    level: Severity,
    timestamps: bool,
}

impl WriterSink {
    pub fn new(writer: Box<dyn Write + Send>, format: LogFormat, level: Severity) -> WriterSink {
        WriterSink {
            writer: Mutex::new(writer),
            format,
            level,
            timestamps: true,
        }
    }

    pub fn stderr(format: LogFormat, level: Severity) -> WriterSink {
        WriterSink::new(Box::new(io::stderr()), format, level)
    }

    pub fn with_timestamps(mut self, include: bool) -> WriterSink {
        self.timestamps = include;
        self
    }

    fn encode_json(
        &self,
        severity: Severity,
        message: &str,
        context: &[Field],
        fields: &[Field],
    ) -> String {
        let mut line = String::with_capacity(128);
        line.push('{');
        if self.timestamps {
            line.push_str("\"ts\":");
            line.push_str(&json_escaped(
                &Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            ));
            line.push(',');
        }
        line.push_str("\"level\":");
        line.push_str(&json_escaped(severity.as_str()));
        line.push_str(",\"msg\":");
        line.push_str(&json_escaped(message));
        for field in context.iter().chain(fields) {
            line.push(',');
            line.push_str(&json_escaped(field.key()));
            line.push(':');
            line.push_str(&json_value(field.value()));
        }
        line.push('}');
        line
    }

    fn encode_compact(
        &self,
        severity: Severity,
        message: &str,
        context: &[Field],
        fields: &[Field],
    ) -> String {
        let mut line = String::with_capacity(128);
        if self.timestamps {
            line.push_str(&format!("{} ", Utc::now().format("%H:%M:%S%.3f")));
        }
        line.push_str(&format!(
            "{:5} {}",
            severity.as_str().to_uppercase(),
            message
        ));
        for field in context.iter().chain(fields) {
            line.push_str(&format!(" {}={}", field.key(), compact_value(field.value())));
        }
        line
    }
}

impl Sink for WriterSink {
    fn emit(&self, severity: Severity, message: &str, context: &[Field], fields: &[Field]) {
        if severity < self.level {
            return;
        }

        let line = match self.format {
            LogFormat::Json => self.encode_json(severity, message, context, fields),
            LogFormat::Compact => self.encode_compact(severity, message, context, fields),
        };

        // Write and lock failures stay inside the backend.
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

fn json_escaped(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn json_value(value: &Value) -> String {
    match value {
        Value::Str(s) => json_escaped(s),
        Value::Int(i) => i.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Duration(d) => d.as_secs_f64().to_string(),
        Value::Timestamp(t) => json_escaped(&t.to_rfc3339_opts(SecondsFormat::Micros, true)),
    }
}

fn compact_value(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Duration(d) => format!("{:?}", d),
        Value::Timestamp(t) => t.to_rfc3339_opts(SecondsFormat::Micros, true),
    }
}

/// In-memory backend capturing every record, for test assertions.
#[derive(Debug, Default)]
pub struct CaptureSink {
    records: Mutex<Vec<Record>>,
}

impl CaptureSink {
    pub fn new() -> CaptureSink {
        CaptureSink::default()
    }

    /// Snapshot of everything captured so far.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Sink for CaptureSink {
    fn emit(&self, severity: Severity, message: &str, context: &[Field], fields: &[Field]) {
        let mut all = Vec::with_capacity(context.len() + fields.len());
        all.extend_from_slice(context);
        all.extend_from_slice(fields);

        if let Ok(mut records) = self.records.lock() {
            records.push(Record {
                severity,
                message: message.to_string(),
                fields: all,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_encoding() {
        let buf = SharedBuf::default();
        let sink = WriterSink::new(
            Box::new(buf.clone()),
            LogFormat::Json,
            Severity::Debug,
        )
        .with_timestamps(false);

        sink.emit(
            Severity::Info,
            "started task",
            &[Field::str("service", "engine")],
            &[
                Field::str("task", "t1"),
                Field::int("count", 3),
                Field::bool("enabled", true),
            ],
        );

        let line = buf.contents();
        assert_eq!(
            line.trim_end(),
            r#"{"level":"info","msg":"started task","service":"engine","task":"t1","count":3,"enabled":true}"#
        );
    }

    #[test]
    fn test_json_escaping() {
        let buf = SharedBuf::default();
        let sink = WriterSink::new(
            Box::new(buf.clone()),
            LogFormat::Json,
            Severity::Debug,
        )
        .with_timestamps(false);

        sink.emit(
            Severity::Error,
            "bad \"input\"",
            &[],
            &[Field::str("body", "line1\nline2")],
        );

        let line = buf.contents();
        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["msg"], "bad \"input\"");
        assert_eq!(parsed["body"], "line1\nline2");
    }

    #[test]
    fn test_compact_encoding() {
        let buf = SharedBuf::default();
        let sink = WriterSink::new(
            Box::new(buf.clone()),
            LogFormat::Compact,
            Severity::Debug,
        )
        .with_timestamps(false);

        sink.emit(
            Severity::Warn,
            "slow write",
            &[Field::str("service", "storage")],
            &[Field::duration("elapsed", Duration::from_millis(15))],
        );

        let line = buf.contents();
        assert_eq!(line.trim_end(), "WARN  slow write service=storage elapsed=15ms");
    }

    #[test]
    fn test_level_filtering() {
        let buf = SharedBuf::default();
        let sink = WriterSink::new(Box::new(buf.clone()), LogFormat::Json, Severity::Warn);

        sink.emit(Severity::Info, "filtered", &[], &[]);
        assert!(buf.contents().is_empty());

        sink.emit(Severity::Error, "kept", &[], &[]);
        assert!(buf.contents().contains("kept"));
    }

    #[test]
    fn test_capture_sink_flattens_in_order() {
        let sink = CaptureSink::new();
        sink.emit(
            Severity::Debug,
            "closing edge",
            &[Field::str("task", "t1")],
            &[Field::int("collected", 10), Field::int("emitted", 9)],
        );

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "closing edge");

        let keys: Vec<&str> = records[0].fields.iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["task", "collected", "emitted"]);

        sink.clear();
        assert!(sink.records().is_empty());
    }
}
