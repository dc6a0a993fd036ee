#![deny(missing_docs)]
//! Shared logging utilities for the dashboard workspace.
//!
//! This crate provides the `dash_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local label of the dashboard page whose work is being logged.
    static PAGE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the page label for log lines emitted from the current thread.
pub fn set_page_context(page: impl Into<String>) {
    PAGE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(page.into()));
}

/// Clears the page label for the current thread.
pub fn clear_page_context() {
    PAGE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Returns the page label for the current thread, or `"-"` when unset.
pub fn page_context() -> String {
    PAGE_CONTEXT.with(|ctx| ctx.borrow().clone().unwrap_or_else(|| "-".to_string()))
}

/// Future that carries a page label across `.await` points.
///
/// The label is installed around every poll of the inner future and the
/// previous label is restored afterwards, so log lines keep their page even
/// when an async runtime moves the task between worker threads.
pub struct PageScoped<F> {
    page: String,
    inner: Pin<Box<F>>,
}

/// Wraps `future` so that log lines emitted while it runs carry `page`.
pub fn in_page_context<F: Future>(page: impl Into<String>, future: F) -> PageScoped<F> {
    PageScoped {
        page: page.into(),
        inner: Box::pin(future),
    }
}

impl<F: Future> Future for PageScoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let previous = PAGE_CONTEXT.with(|ctx| ctx.replace(Some(this.page.clone())));
        let result = this.inner.as_mut().poll(cx);
        PAGE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
        result
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dash_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[{}] {}", $crate::page_context(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dash_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[{}] {}", $crate::page_context(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dash_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[{}] {}", $crate::page_context(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dash_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[{}] {}", $crate::page_context(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dash_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[{}] {}", $crate::page_context(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::pin;
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    use super::{clear_page_context, in_page_context, page_context, set_page_context};

    struct NoopWaker;

    impl Wake for NoopWaker {
        fn wake(self: Arc<Self>) {}
    }

    #[test]
    fn page_context_defaults_to_dash() {
        clear_page_context();
        assert_eq!(page_context(), "-");
    }

    #[test]
    fn page_context_is_set_per_thread() {
        set_page_context("artists");
        assert_eq!(page_context(), "artists");

        let other = std::thread::spawn(page_context).join().unwrap();
        assert_eq!(other, "-");
        clear_page_context();
    }

    #[test]
    fn scoped_future_sees_its_page_and_restores_the_caller() {
        set_page_context("caller");
        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);

        let mut future = pin!(in_page_context("logs", async { page_context() }));
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(seen) => assert_eq!(seen, "logs"),
            Poll::Pending => panic!("ready future stayed pending"),
        }
        assert_eq!(page_context(), "caller");
        clear_page_context();
    }

    #[test]
    fn scoped_future_labels_another_thread() {
        let seen = std::thread::spawn(|| {
            let waker = Waker::from(Arc::new(NoopWaker));
            let mut cx = Context::from_waker(&waker);
            let mut future = pin!(in_page_context("emails", async { page_context() }));
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(seen) => (seen, page_context()),
                Poll::Pending => panic!("ready future stayed pending"),
            }
        })
        .join()
        .unwrap();
        assert_eq!(seen, ("emails".to_string(), "-".to_string()));
    }
}
