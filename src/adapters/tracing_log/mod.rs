// Tracing log adapter - Structured logging using tracing crate

use tracing::{debug, error, info, trace, warn};

use crate::ports::*;

/// Tracing log adapter with its own minimum level
pub struct TracingLogAdapter {
    current_level: LogLevel,
    component: &'static str,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter for `component`
    pub fn new(component: &'static str, current_level: LogLevel) -> Self {
        Self {
            current_level,
            component,
        }
    }

    /// Check if log level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level >= self.current_level
    }
}

impl LogPort for TracingLogAdapter {
    fn log(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }

        let component = self.component;
        match level {
            LogLevel::Error => error!(component = component, "{}", message),
            LogLevel::Warn => warn!(component = component, "{}", message),
            LogLevel::Info => info!(component = component, "{}", message),
            LogLevel::Debug => debug!(component = component, "{}", message),
            LogLevel::Trace => trace!(component = component, "{}", message),
        }
    }
}
