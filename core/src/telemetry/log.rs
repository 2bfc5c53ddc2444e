use log::{debug, info, warn};

/// Prefixes log lines with the flow they belong to (machine, bearing, ...).
#[derive(Debug, Clone)]
pub struct LogManager {
    scope: String,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            scope: "core".to_string(),
        }
    }

    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    /// Narrower scope nested under this one.
    pub fn child(&self, scope: impl AsRef<str>) -> Self {
        Self {
            scope: format!("{}/{}", self.scope, scope.as_ref()),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn degraded(&self, message: &str) {
        warn!("[{}] {}", self.scope, message);
    }

    pub fn trace(&self, message: &str) {
        debug!("[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_nests_under_parent() {
        let machine = LogManager::scoped("machine m-1");
        assert_eq!(machine.child("bearing b-7").scope(), "machine m-1/bearing b-7");
    }
}
