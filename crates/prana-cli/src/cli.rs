use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the prana binary
#[derive(Debug, Parser)]
#[command(name = "prana")]
#[command(about = "Safety-aware yoga and wellness assistant grounded in a knowledge base", long_about = None)]
pub struct Cli {
    /// Config file to use instead of `~/.prana/config.toml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Chunk, embed and index the knowledge base")]
    Build {
        #[arg(long, help = "Rebuild even when a snapshot exists")]
        force: bool,
    },

    #[command(about = "Ask a question")]
    Ask {
        #[arg(help = "The question to answer")]
        question: String,

        #[arg(long, help = "Session identifier recorded in the query log")]
        session: Option<String>,
    },

    #[command(about = "Show the chunks a query retrieves without generating an answer")]
    Search {
        #[arg(help = "The query to embed and search for")]
        query: String,

        #[arg(long, help = "Maximum number of results (overrides config)")]
        top_k: Option<usize>,

        #[arg(long, help = "Minimum cosine similarity (overrides config)")]
        threshold: Option<f32>,
    },

    #[command(about = "Screen text for health-risk topics")]
    Classify {
        #[arg(help = "Text to screen")]
        text: String,

        #[arg(long, help = "Pose to suggest gentler alternatives for")]
        pose: Option<String>,
    },

    #[command(about = "Show index and model status")]
    Status,

    #[command(about = "Summarise the query log")]
    Stats {
        #[arg(long, default_value_t = 10, help = "Number of recent queries to include")]
        recent: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_session() {
        let cli = Cli::try_parse_from(["prana", "ask", "Is cobra safe?", "--session", "abc"])
            .unwrap();
        match cli.command {
            Commands::Ask { question, session } => {
                assert_eq!(question, "Is cobra safe?");
                assert_eq!(session.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["prana", "build", "--force", "--config", "alt.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::Build { force: true }));
    }

    #[test]
    fn test_search_overrides() {
        let cli = Cli::try_parse_from([
            "prana",
            "search",
            "breathing",
            "--top-k",
            "3",
            "--threshold",
            "0.4",
        ])
        .unwrap();
        let Commands::Search {
            top_k, threshold, ..
        } = cli.command
        else {
            panic!("expected search");
        };
        assert_eq!(top_k, Some(3));
        assert_eq!(threshold, Some(0.4));
    }

    #[test]
    fn test_stats_default_recent() {
        let cli = Cli::try_parse_from(["prana", "stats"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats { recent: 10 }));
    }

    #[test]
    fn test_missing_question_is_rejected() {
        assert!(Cli::try_parse_from(["prana", "ask"]).is_err());
    }
}
