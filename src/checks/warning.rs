//! Warnings emitted by configured checks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How certain a check is that the matched call is exploitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Weak,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Weak => "weak",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(label)
    }
}

/// One finding: a matched call record plus the emitting check's identity.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub check: String,
    pub warning_type: String,
    pub code: u32,
    pub message: String,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}, code {:04}, confidence {})",
            self.warning_type, self.message, self.check, self.code, self.confidence,
        )?;
        if let Some(file) = &self.file {
            write!(f, " at {file}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Weak);
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning {
            check: "SqlInjection".into(),
            warning_type: "SQL Injection".into(),
            code: 42,
            message: "User input in SQL query".into(),
            confidence: Confidence::High,
            file: Some("app/models/user.rb".into()),
            line: Some(7),
        };
        let rendered = warning.to_string();
        assert!(rendered.contains("SQL Injection"));
        assert!(rendered.contains("app/models/user.rb:7"));
        assert!(rendered.contains("confidence high"));
    }
}
