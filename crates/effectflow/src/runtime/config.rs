//! Runtime configuration.

/// Configuration for interpreting workflows.
///
/// # Example
///
/// ```
/// use effectflow::RuntimeConfig;
///
/// let config = RuntimeConfig {
///     max_steps: 16,
///     ..Default::default()
/// };
/// assert!(!config.log_payloads);
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum number of effects a single run may execute.
    ///
    /// Workflows are finite state machines, so hitting this limit means a
    /// workflow loops on its own yields. The run stops with
    /// [`Error::StepLimitExceeded`](crate::Error::StepLimitExceeded).
    /// Default: 64.
    pub max_steps: u32,

    /// Include serialized operation and action payloads in debug logs.
    ///
    /// Payloads can carry connection strings or identifiers; leave this off
    /// outside local debugging. Default: `false`.
    pub log_payloads: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_steps: 64,
            log_payloads: false,
        }
    }
}
