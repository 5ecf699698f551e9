//! Printing of command results
//!
//! Commands report a layout, a settings summary, or a one-line confirmation.
//! `--json` prints each of these as a single JSON object per line; `--quiet`
//! prints nothing and leaves the exit status to speak. Secrets such as the
//! access token only ever appear through [`redact`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

impl OutputFormat {
    /// `--quiet` wins over `--json`
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Confirm a finished maintenance action such as `logout` or `clear`
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a JSON document in JSON mode, or run `human` otherwise
    pub fn document(&self, json: serde_json::Value, human: impl FnOnce()) {
        match self.format {
            OutputFormat::Json => println!("{}", json),
            OutputFormat::Human => human(),
            OutputFormat::Quiet => {}
        }
    }
}

/// Hide all but the first few characters of a secret
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

/// Placeholder for empty values in human output
pub fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact(""), "(not set)");
        assert_eq!(redact("syt_YWxpY2U_secret"), "syt_****");
        assert_eq!(redact("ab"), "ab****");
    }

    #[test]
    fn test_or_unset() {
        assert_eq!(or_unset(""), "(not set)");
        assert_eq!(or_unset("value"), "value");
    }
}
