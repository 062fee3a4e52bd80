use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use benchlog_client::{BenchmarkRow, Config, Inserted};
use benchlog_payloads::hardware::HardwareConfig;

const USAGE: &str = "Usage: logger '<json_row>'";

/// Insert one benchmark row into the phase1_benchmarks table.
///
/// Reads SUPABASE_URL and SUPABASE_KEY (the service role key) from the environment.
#[derive(Parser, Debug)]
#[clap(name = "logger", version)]
struct Args {
    /// The row, as a JSON object.
    row: String,

    /// Give up on the request after this many seconds.
    #[clap(long = "timeout", value_name = "SECS")]
    timeout: Option<u64>,

    /// Fill in hardware_config from this machine if the row doesn't have one.
    #[clap(long = "attach-hardware")]
    attach_hardware: bool,
}

fn attach_hardware(row: &mut BenchmarkRow) -> Result<()> {
    if row.contains_key("hardware_config") {
        return Ok(());
    }

    let hardware = serde_json::to_value(HardwareConfig::detect())?;
    row.insert("hardware_config", hardware);
    Ok(())
}

fn run<F>(args: &Args, lookup: F) -> Result<Inserted>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::from_lookup(lookup)?;
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    log::debug!("Using {:?}", config);

    let mut row: BenchmarkRow = args
        .row
        .parse()
        .context("Could not read the row argument")?;
    if args.attach_hardware {
        attach_hardware(&mut row)?;
    }

    let inserted = benchlog_client::log_row(&row, &config).context("Could not insert the row")?;
    Ok(inserted)
}

/// Turn a bad command line into an exit code.  `--help` and `--version` also arrive here, as successes.
fn report_usage(e: &clap::Error, out: &mut impl Write, err: &mut impl Write) -> i32 {
    if !e.use_stderr() {
        let _ = write!(out, "{}", e);
        return 0;
    }

    let _ = writeln!(err, "{}", USAGE);
    let _ = write!(err, "{}", e);
    1
}

/// Render an error and its causes on one line.  reqwest and hyper already fold their sources into their own
/// messages, so a cause whose text we have printed is skipped.
fn render_error(e: &anyhow::Error) -> String {
    let mut rendered = String::new();
    for cause in e.chain() {
        let text = cause.to_string();
        if rendered.contains(&text) {
            continue;
        }
        if !rendered.is_empty() {
            rendered.push_str(": ");
        }
        rendered.push_str(&text);
    }
    rendered
}

fn report(result: Result<Inserted>, out: &mut impl Write, err: &mut impl Write) -> i32 {
    match result {
        Ok(inserted) => {
            let _ = writeln!(out, "Inserted: {}", inserted);
            0
        }
        Err(e) => {
            let _ = writeln!(err, "ERROR: {}", render_error(&e));
            1
        }
    }
}

fn main() {
    env_logger::init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let code = match Args::try_parse() {
        Ok(args) => report(
            run(&args, |name| std::env::var(name).ok()),
            &mut stdout,
            &mut stderr,
        ),
        Err(e) => report_usage(&e, &mut stdout, &mut stderr),
    };

    std::process::exit(code);
}
