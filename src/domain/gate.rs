use serde::{Deserialize, Serialize};

/// A quality gate: a named command that must exit successfully.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Gate {
    pub name: String,
    pub command: Vec<String>,
}

impl Gate {
    pub fn new(name: impl Into<String>, command: &[&str]) -> Self {
        Gate {
            name: name.into(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The command as it would be typed in a shell, for display.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Outcome of running one gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl GateResult {
    pub fn passed(name: impl Into<String>) -> Self {
        GateResult {
            name: name.into(),
            passed: true,
            message: String::new(),
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        GateResult {
            name: name.into(),
            passed: false,
            message: message.into(),
        }
    }
}

/// The gates run when no configuration overrides them.
pub fn default_gates() -> Vec<Gate> {
    vec![
        Gate::new("test", &["cargo", "test", "--all-features"]),
        Gate::new("fmt", &["cargo", "fmt", "--all", "--", "--check"]),
        Gate::new(
            "clippy",
            &[
                "cargo",
                "clippy",
                "--all-targets",
                "--all-features",
                "--",
                "-D",
                "warnings",
            ],
        ),
        Gate::new("doc", &["cargo", "doc", "--no-deps", "--all-features"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gate_order() {
        let names: Vec<_> = default_gates().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["test", "fmt", "clippy", "doc"]);
    }

    #[test]
    fn test_clippy_denies_warnings() {
        let gates = default_gates();
        let clippy = gates.iter().find(|g| g.name == "clippy").unwrap();
        assert!(clippy.command_line().ends_with("-- -D warnings"));
    }

    #[test]
    fn test_gate_result_constructors() {
        assert!(GateResult::passed("fmt").passed);
        let failed = GateResult::failed("doc", "broken link");
        assert!(!failed.passed);
        assert_eq!(failed.message, "broken link");
    }
}
