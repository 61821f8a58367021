//! Per-subsystem diagnostic handlers
//!
//! One handler type per subsystem, each wrapping a [`Logger`] bound with a
//! `service` field by the factory. Handlers are stateless apart from their
//! immutable bound context; every event method emits exactly one record at
//! a fixed severity.

use crate::dispatch::{error_with_context, ErrorDiagnostic, WithContext};
use crate::field::{Field, KeyValue, Severity};
use crate::logger::Logger;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

macro_rules! impl_error_diagnostic {
    ($($handler:ty),* $(,)?) => {
        $(
            impl ErrorDiagnostic for $handler {
                fn error(&self, msg: &str, err: &dyn std::error::Error, ctx: &[KeyValue]) {
                    error_with_context(&self.logger, msg, err, ctx);
                }
            }
        )*
    };
}

macro_rules! impl_with_context {
    ($($handler:ident),* $(,)?) => {
        $(
            impl WithContext for $handler {
                fn with_context(&self, ctx: &[KeyValue]) -> Self {
                    $handler {
                        logger: self.logger.with_pairs(ctx),
                    }
                }
            }
        )*
    };
}

/// Task-execution core handler (`service = "engine"`)
#[derive(Debug, Clone)]
pub struct EngineHandler {
    logger: Logger,
}

impl EngineHandler {
    pub(crate) fn new(logger: Logger) -> EngineHandler {
        EngineHandler { logger }
    }

    /// Bind to a task identifier.
    pub fn with_task_context(&self, task: &str) -> EngineHandler {
        EngineHandler {
            logger: self.logger.with_fields(&[Field::str("task", task)]),
        }
    }

    /// Bind to a task-master identifier.
    pub fn with_task_master_context(&self, task_master: &str) -> EngineHandler {
        EngineHandler {
            logger: self
                .logger
                .with_fields(&[Field::str("task_master", task_master)]),
        }
    }

    /// Bind to an execution node identifier.
    pub fn with_node_context(&self, node: &str) -> EngineHandler {
        EngineHandler {
            logger: self.logger.with_fields(&[Field::str("node", node)]),
        }
    }

    /// Bind to a graph edge between two nodes of a task.
    pub fn with_edge_context(&self, task: &str, parent: &str, child: &str) -> EngineHandler {
        EngineHandler {
            logger: self.logger.with_fields(&[
                Field::str("task", task),
                Field::str("parent", parent),
                Field::str("child", child),
            ]),
        }
    }

    pub fn task_master_opened(&self) {
        self.logger.info("opened task master", &[]);
    }

    pub fn task_master_closed(&self) {
        self.logger.info("closed task master", &[]);
    }

    pub fn starting_task(&self, task: &str) {
        self.logger.debug("starting task", &[Field::str("task", task)]);
    }

    pub fn started_task(&self, task: &str) {
        self.logger.info("started task", &[Field::str("task", task)]);
    }

    pub fn stopped_task(&self, task: &str) {
        self.logger.info("stopped task", &[Field::str("task", task)]);
    }

    pub fn stopped_task_with_error(&self, task: &str, err: &dyn std::error::Error) {
        self.logger.error(
            "failed to stop task",
            &[Field::str("task", task), Field::error(err)],
        );
    }

    pub fn task_master_dot(&self, dot: &str) {
        self.logger.debug("listing dot", &[Field::str("dot", dot)]);
    }

    pub fn closing_edge(&self, collected: i64, emitted: i64) {
        self.logger.debug(
            "closing edge",
            &[
                Field::int("collected", collected),
                Field::int("emitted", emitted),
            ],
        );
    }

    pub fn alert_triggered(
        &self,
        level: &dyn fmt::Display,
        id: &str,
        message: &str,
        data: &dyn fmt::Debug,
    ) {
        self.logger.debug(
            "alert triggered",
            &[
                Field::display("level", level),
                Field::str("id", id),
                Field::str("event_message", message),
                Field::debug("data", data),
            ],
        );
    }

    pub fn setting_replicas(&self, new: i64, old: i64, id: &str) {
        self.logger.debug(
            "setting replicas",
            &[
                Field::int("new", new),
                Field::int("old", old),
                Field::str("id", id),
            ],
        );
    }

    pub fn starting_batch_query(&self, query: &str) {
        self.logger
            .debug("starting next batch query", &[Field::str("query", query)]);
    }

    pub fn cannot_perform_derivative(&self, reason: &str) {
        self.logger
            .error("cannot perform derivative", &[Field::str("reason", reason)]);
    }

    pub fn missing_tag_for_flatten_op(&self, tag: &str) {
        self.logger.error(
            "point missing tag for flatten operation",
            &[Field::str("tag", tag)],
        );
    }

    pub fn index_out_of_range_for_row(&self, index: i64) {
        self.logger.error(
            "index out of range for row update",
            &[Field::int("index", index)],
        );
    }

    pub fn loopback_write_failed(&self) {
        self.logger.error("failed to write point over loopback", &[]);
    }

    /// Relay a data listing at the severity named by `level`; unknown
    /// level names are treated as info.
    pub fn log_data(&self, level: &str, prefix: &str, data: &str) {
        let severity = level.parse().unwrap_or(Severity::Info);
        self.logger.log(
            severity,
            "listing data",
            &[Field::str("prefix", prefix), Field::str("data", data)],
        );
    }

    pub fn udf_log(&self, text: &str) {
        self.logger.info("UDF log", &[Field::str("text", text)]);
    }
}

/// Alert handler registry and spec-migration handler (`service = "alert"`)
#[derive(Debug, Clone)]
pub struct AlertHandler {
    logger: Logger,
}

impl AlertHandler {
    pub(crate) fn new(logger: Logger) -> AlertHandler {
        AlertHandler { logger }
    }

    /// Bind to a specific alert handler instance.
    pub fn with_handler_context(&self, ctx: &[KeyValue]) -> AlertHandler {
        AlertHandler {
            logger: self.logger.with_pairs(ctx),
        }
    }

    pub fn migrating_handler_specs(&self) {
        self.logger.debug("migrating old handler specs", &[]);
    }

    pub fn migrating_old_handler_spec(&self, spec: &str) {
        self.logger
            .debug("migrating old handler spec", &[Field::str("handler", spec)]);
    }

    pub fn found_handler_rows(&self, count: usize) {
        self.logger.debug(
            "found handler rows",
            &[Field::int("handler_row_count", count as i64)],
        );
    }

    pub fn creating_new_handlers(&self, count: usize) {
        self.logger.debug(
            "creating new handlers in place of old handlers",
            &[Field::int("handler_row_count", count as i64)],
        );
    }

    pub fn found_new_handler(&self, key: &str) {
        self.logger
            .debug("found new handler skipping", &[Field::str("handler", key)]);
    }
}

/// HTTP service handler (`service = "http"`)
#[derive(Debug, Clone)]
pub struct HttpHandler {
    logger: Logger,
}

impl HttpHandler {
    pub(crate) fn new(logger: Logger) -> HttpHandler {
        HttpHandler { logger }
    }

    pub fn starting_service(&self) {
        self.logger.info("starting HTTP service", &[]);
    }

    pub fn stopped_service(&self) {
        self.logger.info("closed HTTP service", &[]);
    }

    pub fn shutdown_timeout(&self) {
        self.logger.error(
            "shutdown timed out, forcefully closing all remaining connections",
            &[],
        );
    }

    pub fn authentication_enabled(&self, enabled: bool) {
        self.logger
            .info("authentication", &[Field::bool("enabled", enabled)]);
    }

    pub fn listening_on(&self, addr: &str, protocol: &str) {
        self.logger.info(
            "listening on",
            &[Field::str("addr", addr), Field::str("protocol", protocol)],
        );
    }

    pub fn write_body_received(&self, body: &str) {
        self.logger
            .debug("write body received by handler", &[Field::str("body", body)]);
    }

    /// Access-log record. All eleven request attributes are always
    /// attached; empty strings stay present as empty fields.
    #[allow(clippy::too_many_arguments)]
    pub fn http(
        &self,
        host: &str,
        username: &str,
        start: DateTime<Utc>,
        method: &str,
        uri: &str,
        protocol: &str,
        status: i64,
        referer: &str,
        user_agent: &str,
        request_id: &str,
        duration: Duration,
    ) {
        self.logger.info(
            "http request",
            &[
                Field::str("host", host),
                Field::str("username", username),
                Field::timestamp("start", start),
                Field::str("method", method),
                Field::str("uri", uri),
                Field::str("protocol", protocol),
                Field::int("status", status),
                Field::str("referer", referer),
                Field::str("user-agent", user_agent),
                Field::str("request-id", request_id),
                Field::duration("duration", duration),
            ],
        );
    }

    /// Panic recovered while serving a request; carries the same
    /// attributes as the access log plus the recovered error text.
    #[allow(clippy::too_many_arguments)]
    pub fn recovery_error(
        &self,
        msg: &str,
        error: &str,
        host: &str,
        username: &str,
        start: DateTime<Utc>,
        method: &str,
        uri: &str,
        protocol: &str,
        status: i64,
        referer: &str,
        user_agent: &str,
        request_id: &str,
        duration: Duration,
    ) {
        self.logger.error(
            msg,
            &[
                Field::str("error", error),
                Field::str("host", host),
                Field::str("username", username),
                Field::timestamp("start", start),
                Field::str("method", method),
                Field::str("uri", uri),
                Field::str("protocol", protocol),
                Field::int("status", status),
                Field::str("referer", referer),
                Field::str("user-agent", user_agent),
                Field::str("request-id", request_id),
                Field::duration("duration", duration),
            ],
        );
    }
}

/// Task store handler (`service = "task_store"`)
#[derive(Debug, Clone)]
pub struct TaskStoreHandler {
    logger: Logger,
}

impl TaskStoreHandler {
    pub(crate) fn new(logger: Logger) -> TaskStoreHandler {
        TaskStoreHandler { logger }
    }

    pub fn starting_task(&self, task: &str) {
        self.logger
            .debug("starting enabled task on startup", &[Field::str("task", task)]);
    }

    pub fn started_task(&self, task: &str) {
        self.logger
            .debug("started task during startup", &[Field::str("task", task)]);
    }

    pub fn finished_task(&self, task: &str) {
        self.logger.debug("task finished", &[Field::str("task", task)]);
    }

    pub fn debug(&self, msg: &str) {
        self.logger.debug(msg, &[]);
    }

    pub fn already_migrated(&self, kind: &str, id: &str) {
        self.logger.debug(
            "entity has already been migrated skipping",
            &[Field::str("kind", kind), Field::str("id", id)],
        );
    }

    pub fn migrated(&self, kind: &str, id: &str) {
        self.logger.debug(
            "entity was migrated to new storage service",
            &[Field::str("kind", kind), Field::str("id", id)],
        );
    }
}

/// VictorOps notification handler (`service = "victorops"`)
#[derive(Debug, Clone)]
pub struct VictorOpsHandler {
    logger: Logger,
}

impl VictorOpsHandler {
    pub(crate) fn new(logger: Logger) -> VictorOpsHandler {
        VictorOpsHandler { logger }
    }
}

/// Slack notification handler (`service = "slack"`)
#[derive(Debug, Clone)]
pub struct SlackHandler {
    logger: Logger,
}

impl SlackHandler {
    pub(crate) fn new(logger: Logger) -> SlackHandler {
        SlackHandler { logger }
    }

    pub fn insecure_skip_verify(&self) {
        self.logger
            .warn("service is configured to skip ssl verification", &[]);
    }
}

/// HipChat notification handler (`service = "hipchat"`)
#[derive(Debug, Clone)]
pub struct HipChatHandler {
    logger: Logger,
}

impl HipChatHandler {
    pub(crate) fn new(logger: Logger) -> HipChatHandler {
        HipChatHandler { logger }
    }
}

/// Alerta notification handler (`service = "alerta"`)
#[derive(Debug, Clone)]
pub struct AlertaHandler {
    logger: Logger,
}

impl AlertaHandler {
    pub(crate) fn new(logger: Logger) -> AlertaHandler {
        AlertaHandler { logger }
    }

    pub fn template_error(&self, err: &dyn std::error::Error, kv: &KeyValue) {
        self.logger.error(
            "failed to evaluate Alerta template",
            &[Field::error(err), Field::from(kv)],
        );
    }
}

/// PagerDuty notification handler (`service = "pagerduty"`)
#[derive(Debug, Clone)]
pub struct PagerDutyHandler {
    logger: Logger,
}

impl PagerDutyHandler {
    pub(crate) fn new(logger: Logger) -> PagerDutyHandler {
        PagerDutyHandler { logger }
    }
}

/// Persistent storage handler (`service = "storage"`)
#[derive(Debug, Clone)]
pub struct StorageHandler {
    logger: Logger,
}

impl StorageHandler {
    pub(crate) fn new(logger: Logger) -> StorageHandler {
        StorageHandler { logger }
    }
}

/// Usage reporting handler (`service = "reporting"`)
#[derive(Debug, Clone)]
pub struct ReportingHandler {
    logger: Logger,
}

impl ReportingHandler {
    pub(crate) fn new(logger: Logger) -> ReportingHandler {
        ReportingHandler { logger }
    }
}

/// User-defined-function service handler (`service = "udf"`)
#[derive(Debug, Clone)]
pub struct UdfHandler {
    logger: Logger,
}

impl UdfHandler {
    pub(crate) fn new(logger: Logger) -> UdfHandler {
        UdfHandler { logger }
    }

    pub fn loaded_udf_info(&self, udf: &str) {
        self.logger.debug("loaded UDF info", &[Field::str("udf", udf)]);
    }
}

impl_error_diagnostic!(
    EngineHandler,
    AlertHandler,
    HttpHandler,
    TaskStoreHandler,
    VictorOpsHandler,
    SlackHandler,
    HipChatHandler,
    AlertaHandler,
    PagerDutyHandler,
    StorageHandler,
    ReportingHandler,
    UdfHandler,
);

impl_with_context!(
    VictorOpsHandler,
    SlackHandler,
    HipChatHandler,
    AlertaHandler,
    PagerDutyHandler,
);
