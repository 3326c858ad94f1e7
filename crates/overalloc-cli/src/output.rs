//! Output formatting for CLI commands

use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for automation
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Something a command can print either as text or as one JSON line.
pub trait Render: Serialize {
    fn render_text(&self) -> String;
}

impl OutputFormat {
    pub fn render<T: Render>(&self, value: &T) -> Result<String, serde_json::Error> {
        match self {
            Self::Text => Ok(value.render_text()),
            Self::Json => serde_json::to_string(value),
        }
    }

    pub fn print<T: Render>(&self, value: &T) -> Result<(), serde_json::Error> {
        println!("{}", self.render(value)?);
        Ok(())
    }
}
