mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lingo-kit")]
#[command(version, about = "Translation and locale-aware serving for static sites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Scaffold lingo.toml and a starter translation table
    Init {
        /// Path to the site directory
        path: PathBuf,
    },

    /// Validate configuration and translation coverage
    Validate {
        /// Path to the site directory
        path: PathBuf,
    },

    /// Generate translated copies of the site
    Translate {
        /// Path to the site directory
        path: PathBuf,

        /// Languages to translate into (defaults to lingo.toml, then "en")
        #[arg(short, long, value_delimiter = ',', num_args = 1..)]
        languages: Vec<String>,

        /// Create translated/<lang>/ directories and copy assets
        #[arg(long)]
        setup: bool,

        /// Translate the index page
        #[arg(long)]
        index: bool,

        /// Translate the integration pages (English only)
        #[arg(long)]
        integrations: bool,

        /// Run every step
        #[arg(long)]
        all: bool,
    },

    /// Show the locale resolved for a set of request signals
    Locale {
        /// Path to the site directory
        path: PathBuf,

        /// Client IP address
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,

        /// Accept-Language header value
        #[arg(long)]
        accept_language: Option<String>,

        /// CF-IPCountry header value
        #[arg(long)]
        country: Option<String>,

        /// Value of the language cookie
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Serve the site with language detection
    Serve {
        /// Path to the site directory
        path: PathBuf,

        /// Address to bind (defaults to lingo.toml, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on (defaults to lingo.toml, then 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Log the detection signals of every request
        #[arg(long)]
        debug: bool,

        /// Generate all translations before serving
        #[arg(long)]
        generate: bool,

        /// Re-translate pages when their source changes
        #[arg(long)]
        watch: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingo_kit=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { path } => commands::init::run(path).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Translate {
            path,
            languages,
            setup,
            index,
            integrations,
            all,
        } => {
            let steps = commands::translate::Steps {
                setup: setup || all,
                index: index || all,
                integrations: integrations || all,
            };
            commands::translate::run(path, languages, steps).await
        }
        Command::Locale {
            path,
            ip,
            accept_language,
            country,
            cookie,
        } => commands::locale::run(path, ip, accept_language, country, cookie).await,
        Command::Serve {
            path,
            host,
            port,
            debug,
            generate,
            watch,
        } => {
            let options = commands::serve::ServeOptions {
                host,
                port,
                debug,
                generate,
                watch,
            };
            commands::serve::run(path, options).await
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "lingo-kit", &mut io::stdout());
            Ok(())
        }
    }
}
