//! kvlin CLI
//!
//! Checks recorded key-value histories for linearizability. Several files
//! are merged into one history first. Exits 0 only when the history is
//! proven linearizable.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::Parser;
use color_eyre::Result;
use console::{style, StyledObject};
use kvlin_check::{report_lines, summary_line, CheckConfig, CheckRun, Orchestrator};
use kvlin_engine::Verdict;
use kvlin_server::{ServerConfig, ViewerServer, DEFAULT_PORT};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kvlin")]
#[command(about = "Linearizability checker for key-value store histories", long_about = None)]
struct Cli {
    /// History files; more than one are merged before checking
    #[arg(required = true, value_name = "HISTORY")]
    histories: Vec<PathBuf>,

    /// Serve the rendered report after checking
    #[arg(long)]
    serve: bool,

    /// Port for the report server
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Search deadline in seconds (0 = none)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Skip rendering the HTML report
    #[arg(long)]
    no_visualize: bool,

    /// JSON check configuration; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn check_config(&self) -> Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) => CheckConfig::from_file(path)?,
            None => CheckConfig::default(),
        };
        if let Some(secs) = self.timeout {
            config = config.with_timeout_secs(secs);
        }
        if self.no_visualize {
            config = config.with_visualize(false);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = run(&cli)?;
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kvlin=debug" } else { "kvlin=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let config = cli.check_config()?;
    debug!(?config, "check configuration");

    let run = Orchestrator::new().with_config(config).run(&cli.histories)?;
    print_run(&run, cli.histories.len());

    let result = &run.result;
    match (&result.html_path, cli.serve) {
        (Some(html), true) => {
            let server = ViewerServer::new(ServerConfig::new(html).with_port(cli.port))?;
            println!();
            println!("{}", style(format!("Serving report on {}", server.config().url())).blue());
            println!("{}", style("Press Ctrl+C to stop the server").yellow());
            tokio::runtime::Runtime::new()?.block_on(server.serve())?;
        }
        (Some(html), false) => {
            println!();
            println!(
                "{}",
                style(format!("Open {} in your browser to view the report", html.display())).blue()
            );
        }
        (None, true) => {
            println!();
            println!("{}", style("No report was rendered, nothing to serve").yellow());
        }
        (None, false) => {}
    }

    Ok(result.exit_code())
}

fn paint<D>(verdict: Verdict, text: D) -> StyledObject<D> {
    match verdict {
        Verdict::Linearizable => style(text).green(),
        Verdict::NotLinearizable => style(text).red(),
        Verdict::Unknown => style(text).yellow(),
    }
}

fn print_run(run: &CheckRun, inputs: usize) {
    if let Some(merged) = &run.merged {
        println!(
            "{}",
            style(format!("Merged {inputs} histories into {}", merged.display())).green()
        );
    }

    let result = &run.result;
    println!();
    println!("{}", style(format!("Checked {}", result.path.display())).cyan());
    for line in report_lines(result) {
        println!("  {}", paint(result.verdict, line));
    }
    match &result.html_path {
        Some(html) => println!("  Report: {}", html.display()),
        None if result.total_ops > 0 => {
            println!("  {}", style("Report unavailable").yellow());
        }
        None => {}
    }

    println!();
    println!("{}", style("Summary").bold().blue());
    println!("{}", paint(result.verdict, summary_line(result)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_requires_a_history() {
        assert!(Cli::try_parse_from(["kvlin"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["kvlin", "a.json", "b.json"]).unwrap();
        assert_eq!(cli.histories.len(), 2);
        assert_eq!(cli.port, 8080);
        assert!(!cli.serve);

        let config = cli.check_config().unwrap();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "kvlin",
            "--serve",
            "--port",
            "9000",
            "--timeout",
            "0",
            "--no-visualize",
            "h.json",
        ])
        .unwrap();
        assert!(cli.serve);
        assert_eq!(cli.port, 9000);

        let config = cli.check_config().unwrap();
        assert_eq!(config.timeout(), None);
        assert!(!config.visualize);
    }
}
