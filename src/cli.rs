use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "yt-assistant")]
#[command(about = "YouTube Video Summarizer and Q&A Assistant")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Completion model (overrides GROQ_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Attempts per connection candidate (overrides YT_MAX_ATTEMPTS)
    #[arg(long, global = true)]
    pub max_attempts: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a video's transcript
    Summarize {
        /// YouTube video URL
        url: String,

        /// Keep the summary in the transcript's language
        #[arg(long)]
        no_translate: bool,
    },

    /// Answer a question about a video
    Ask {
        /// YouTube video URL
        url: String,

        /// Question to answer from the transcript
        question: String,
    },

    /// Print the fetched transcript
    Transcript {
        /// YouTube video URL
        url: String,
    },

    /// Open TUI interface
    Tui,
}
