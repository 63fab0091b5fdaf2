use clap::Parser;
use log::info;
use std::{io, path::PathBuf};
use tui_logger::{TuiLoggerFile, TuiLoggerLevelOutput, init_logger, set_default_level, set_log_file};

use crate::{
    app::{App, StopSignal},
    config::MonitorConfig,
    ui::terminal::TerminalRenderer,
};

pub mod app;
pub mod config;
pub mod history;
pub mod metrics;
pub mod proc;
pub mod scale;
pub mod select;
pub mod ui;

#[derive(Parser, Debug)]
#[command(about)]
struct Cli {
    /// Process to monitor; prompts with a process list when omitted
    pid: Option<u32>,
    /// Optional TOML file with display and logging settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        std::process::exit(code)
    })
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = parse_cli();
    let config = MonitorConfig::load(cli.config.as_deref())?;
    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let level = config.level_filter()?;
    init_logger(level)?;
    set_default_level(level);
    let file_options = TuiLoggerFile::new(&config.log_file)
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_file(false)
        .output_separator(':');
    set_log_file(file_options);
    info!("Logging started");

    let mut inspector = config.inspector.build();
    let pid = match cli.pid {
        Some(pid) => pid,
        None => match select::choose_process(inspector.as_mut(), io::stdin().lock(), io::stdout())? {
            Some(pid) => pid,
            None => return Ok(()),
        },
    };

    let mut app = App::new(pid, inspector)?;
    let stop = StopSignal::default();
    stop.listen_for_ctrl_c();

    let mut renderer = TerminalRenderer::stdout(&config)?;
    let reason = app.run(&mut renderer, &stop).await;
    renderer.restore(&config)?;
    println!("{}", app.farewell(reason));
    Ok(())
}
