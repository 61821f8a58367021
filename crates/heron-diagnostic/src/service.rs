//! Diagnostics factory

use crate::config::{DiagnosticConfig, LogFormat, LogOutput};
use crate::field::{Field, Severity};
use crate::handlers::{
    AlertHandler, AlertaHandler, EngineHandler, HipChatHandler, HttpHandler, PagerDutyHandler,
    ReportingHandler, SlackHandler, StorageHandler, TaskStoreHandler, UdfHandler, VictorOpsHandler,
};
use crate::logger::Logger;
use crate::sink::{Sink, WriterSink};
use crate::Result;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::sync::Arc;

/// Process-wide factory producing one typed diagnostic handler per
/// subsystem.
///
/// Constructed once at startup and passed down to subsystems as an
/// explicit dependency. Every accessor derives a fresh child of the root
/// backend bound with a `service` field naming the subsystem; accessors
/// cannot fail and have no side effect beyond that binding.
pub struct Service {
    root: Logger,
}

impl Service {
    /// Backend with default settings: JSON lines to stderr at info level.
    pub fn new() -> Service {
        Service::with_sink(Arc::new(WriterSink::stderr(LogFormat::Json, Severity::Info)))
    }

    /// Use a caller-provided backend. Test suites pass a
    /// [`CaptureSink`](crate::sink::CaptureSink) here.
    pub fn with_sink(sink: Arc<dyn Sink>) -> Service {
        Service {
            root: Logger::new(sink),
        }
    }

    /// Build the backend described by `config`. Opening a configured log
    /// file is the one construction step that can fail.
    pub fn from_config(config: &DiagnosticConfig) -> Result<Service> {
        config.validate()?;

        let writer: Box<dyn Write + Send> = match &config.output {
            LogOutput::Stderr => Box::new(io::stderr()),
            LogOutput::Stdout => Box::new(io::stdout()),
            LogOutput::File(path) => {
                Box::new(OpenOptions::new().create(true).append(true).open(path)?)
            }
        };

        let sink = WriterSink::new(writer, config.format, config.level)
            .with_timestamps(config.include_timestamps);

        Ok(Service::with_sink(Arc::new(sink)))
    }

    fn scoped(&self, service: &'static str) -> Logger {
        self.root.with_fields(&[Field::str("service", service)])
    }

    pub fn new_engine_handler(&self) -> EngineHandler {
        EngineHandler::new(self.scoped("engine"))
    }

    pub fn new_http_handler(&self) -> HttpHandler {
        HttpHandler::new(self.scoped("http"))
    }

    pub fn new_alert_handler(&self) -> AlertHandler {
        AlertHandler::new(self.scoped("alert"))
    }

    pub fn new_victorops_handler(&self) -> VictorOpsHandler {
        VictorOpsHandler::new(self.scoped("victorops"))
    }

    pub fn new_slack_handler(&self) -> SlackHandler {
        SlackHandler::new(self.scoped("slack"))
    }

    pub fn new_hipchat_handler(&self) -> HipChatHandler {
        HipChatHandler::new(self.scoped("hipchat"))
    }

    pub fn new_alerta_handler(&self) -> AlertaHandler {
        AlertaHandler::new(self.scoped("alerta"))
    }

    pub fn new_pagerduty_handler(&self) -> PagerDutyHandler {
        PagerDutyHandler::new(self.scoped("pagerduty"))
    }

    pub fn new_storage_handler(&self) -> StorageHandler {
        StorageHandler::new(self.scoped("storage"))
    }

    pub fn new_task_store_handler(&self) -> TaskStoreHandler {
        TaskStoreHandler::new(self.scoped("task_store"))
    }

    pub fn new_reporting_handler(&self) -> ReportingHandler {
        ReportingHandler::new(self.scoped("reporting"))
    }

    pub fn new_udf_handler(&self) -> UdfHandler {
        UdfHandler::new(self.scoped("udf"))
    }
}

impl Default for Service {
    fn default() -> Self {
        Service::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogOutput;
    use crate::dispatch::ErrorDiagnostic;
    use crate::field::Value;
    use crate::sink::CaptureSink;
    use tempfile::TempDir;

    #[test]
    fn test_accessors_bind_service_field() {
        let sink = Arc::new(CaptureSink::new());
        let service = Service::with_sink(sink.clone());
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");

        service.new_engine_handler().error("e", &err, &[]);
        service.new_http_handler().error("e", &err, &[]);
        service.new_alert_handler().error("e", &err, &[]);
        service.new_victorops_handler().error("e", &err, &[]);
        service.new_slack_handler().error("e", &err, &[]);
        service.new_hipchat_handler().error("e", &err, &[]);
        service.new_alerta_handler().error("e", &err, &[]);
        service.new_pagerduty_handler().error("e", &err, &[]);
        service.new_storage_handler().error("e", &err, &[]);
        service.new_task_store_handler().error("e", &err, &[]);
        service.new_reporting_handler().error("e", &err, &[]);
        service.new_udf_handler().error("e", &err, &[]);

        let expected = [
            "engine",
            "http",
            "alert",
            "victorops",
            "slack",
            "hipchat",
            "alerta",
            "pagerduty",
            "storage",
            "task_store",
            "reporting",
            "udf",
        ];

        let records = sink.records();
        assert_eq!(records.len(), expected.len());
        for (record, name) in records.iter().zip(expected) {
            assert_eq!(
                record.field("service"),
                Some(&Value::Str(name.to_string())),
                "service {}",
                name
            );
        }
    }

    #[test]
    fn test_each_accessor_call_is_fresh() {
        let sink = Arc::new(CaptureSink::new());
        let service = Service::with_sink(sink.clone());

        let scoped = service.new_engine_handler().with_task_context("t1");
        scoped.task_master_opened();

        let fresh = service.new_engine_handler();
        fresh.task_master_opened();

        let records = sink.records();
        assert!(records[0].field("task").is_some());
        assert!(records[1].field("task").is_none());
    }

    #[test]
    fn test_from_config_writes_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("heron.log");

        let config = DiagnosticConfig {
            output: LogOutput::File(path.clone()),
            ..DiagnosticConfig::default()
        };

        let service = Service::from_config(&config).unwrap();
        service.new_engine_handler().started_task("t1");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"msg\":\"started task\""));
        assert!(content.contains("\"service\":\"engine\""));
        assert!(content.contains("\"task\":\"t1\""));
    }
}
