//! Shared test support for effectflow workflows.
//!
//! - [`RecordingDispatcher`] — store double that keeps every emitted action
//! - [`ScriptedHandler`] — bound operations answering from a script
//! - [`init_test_tracing`] — idempotent log setup for tests
//! - [`flow_test!`] — async test with tracing and an `anyhow::Result` body

mod doubles;

pub use doubles::{RecordingDispatcher, ScriptedHandler};

/// Initialize tracing for tests. Safe to call multiple times.
///
/// Uses a standard filter for engine and workflow debugging, overridable via
/// `RUST_LOG`. The `try_init()` call is idempotent - subsequent calls are
/// no-ops if already initialized.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "effectflow=debug,device_workflows=debug".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Macro to define an async workflow test.
///
/// Usage:
///
/// ```ignore
/// use test_utils::flow_test;
///
/// flow_test!(deletes_once, {
///     let status = interpreter.run(instance).await?;
///     assert!(status.is_completed());
///     Ok(())
/// });
/// ```
///
/// This expands to:
/// - `#[tokio::test]`
/// - a call to [`init_test_tracing`]
/// - the body, returning `anyhow::Result<()>`
#[macro_export]
macro_rules! flow_test {
    ($name:ident, $body:block) => {
        #[tokio::test]
        async fn $name() -> anyhow::Result<()> {
            $crate::init_test_tracing();
            $body
        }
    };
}
