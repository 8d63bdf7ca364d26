use clap::{Args, Parser, Subcommand};

pub const DEFAULT_SITE_ORIGIN: &str = "https://studio37.cc";
pub const DEFAULT_MAX_KEYWORDS: usize = crate::extractor::DEFAULT_MAX_KEYWORDS;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT: &str = "text";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LIMIT: u32 = 30;
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

#[derive(Parser, Debug, Clone)]
#[command(name = "studiolens")]
#[command(about = "On-site SEO and content analyzer for studio websites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Site origin that every fetched page must belong to
    #[arg(long, global = true, default_value = DEFAULT_SITE_ORIGIN)]
    pub site_origin: String,

    /// Maximum number of keywords and phrases to rank (default: 20)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_KEYWORDS)]
    pub max_keywords: usize,

    /// Request timeout in seconds when fetching pages (default: 30)
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Output format: text or json
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Save report to file
    #[arg(short, long, global = true)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Analyze the SEO signals of a single page
    Analyze(PageSource),

    /// Score the readability of a page's visible text
    Readability(PageSource),

    /// Analyze several pages of the site and summarize the results
    Audit {
        /// Page URLs or site-relative paths
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,

        /// Number of concurrent requests (default: 4)
        #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Rate limit for requests per second (optional, e.g., 1.0 for 1 req/s)
        #[arg(short = 'r', long)]
        rate_limit: Option<f64>,
    },

    /// Run the rate-limited HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,

        /// Port to listen on (default: 8080)
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Requests accepted per client and route in each window (default: 30)
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        /// Rate-limit window length in milliseconds (default: 60000)
        #[arg(long, default_value_t = DEFAULT_WINDOW_MS)]
        window_ms: u64,

        /// Key clients by Forwarded/X-Forwarded-For instead of the socket address.
        /// Only enable behind a reverse proxy that overwrites these headers.
        #[arg(long)]
        trust_proxy: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PageSource {
    /// Page URL or site-relative path to fetch
    #[arg(value_name = "TARGET", required_unless_present = "file", conflicts_with = "file")]
    pub target: Option<String>,

    /// Read HTML from a local file instead of fetching it
    #[arg(short, long)]
    pub file: Option<String>,
}
