//! Statement logging through `tracing`, target `pgcompose.sql`.

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::stmt::StatementKind;

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

#[cfg(feature = "tracing")]
pub(crate) fn statement_built(
    config: &BuildConfig,
    kind: StatementKind,
    sql: &str,
    param_count: usize,
) {
    use tracing::Level;

    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let sql = truncate_sql(sql, config.max_logged_sql_len);
    emit_at_level!(
        config.log_level,
        target: "pgcompose.sql",
        kind = %kind,
        param_count,
        sql = %sql,
        "statement built"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn statement_built(
    _config: &BuildConfig,
    _kind: StatementKind,
    _sql: &str,
    _param_count: usize,
) {
}

#[cfg(feature = "tracing")]
pub(crate) fn statement_rejected(kind: StatementKind, err: &BuildError) {
    tracing::debug!(target: "pgcompose.sql", kind = %kind, error = %err, "statement rejected");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn statement_rejected(_kind: StatementKind, _err: &BuildError) {}

#[cfg(feature = "tracing")]
pub(crate) fn recursion_inferred(clause: &str) {
    tracing::trace!(target: "pgcompose.sql", clause, "CTE clause references itself; adding RECURSIVE");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn recursion_inferred(_clause: &str) {}
