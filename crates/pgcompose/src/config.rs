/// PostgreSQL's limit on bind parameters in one statement.
pub const MAX_BIND_PARAMS: usize = 65535;

/// Options for [`Statement::build_with`](crate::Statement::build_with).
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Reject statements binding more parameters than this.
    pub max_params: usize,
    /// Truncate logged SQL (in bytes). `None` logs the full text.
    pub max_logged_sql_len: Option<usize>,
    /// Tracing event level for built statements.
    #[cfg(feature = "tracing")]
    pub log_level: tracing::Level,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_params: MAX_BIND_PARAMS,
            max_logged_sql_len: Some(200),
            #[cfg(feature = "tracing")]
            log_level: tracing::Level::DEBUG,
        }
    }
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_params(mut self, max: usize) -> Self {
        self.max_params = max;
        self
    }

    pub fn with_max_logged_sql_len(mut self, len: usize) -> Self {
        self.max_logged_sql_len = Some(len);
        self
    }

    /// Log full SQL text.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_len = None;
        self
    }

    #[cfg(feature = "tracing")]
    pub fn with_log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = level;
        self
    }
}
