//! `logicaudit` - CLI for the code review flashcard deck
//!
//! This binary runs interactive audit sessions and prints scenarios from the
//! built-in deck.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use logicaudit::cli::{Cli, Command, ConfigCommand, ListCommand, RunCommand, ShowCommand};
use logicaudit::config::PanelFormat;
use logicaudit::{
    init_logging, report, CommandSource, Config, Dataset, JsonPresenter, Presenter,
    ScriptedSource, Session, SessionOptions, StdinSource, TerminalPresenter,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Validation must report a broken file, not fail loading it
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        let path = file
            .clone()
            .or_else(|| cli.config.clone())
            .unwrap_or_else(Config::default_config_path);
        print!("{}", report::validation(&path));
        return Ok(());
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Run(run_cmd) => handle_run(&config, &run_cmd).await,
        Command::List(list_cmd) => handle_list(&list_cmd),
        Command::Show(show_cmd) => handle_show(&show_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_run(config: &Config, cmd: &RunCommand) -> anyhow::Result<()> {
    let dataset = Dataset::builtin().context("loading built-in deck")?;
    let format = cmd.format.unwrap_or(config.display.format);
    let mut options = SessionOptions::from(&config.session);
    options.allow_skip |= cmd.allow_skip;

    let presenter: Box<dyn Presenter> = match format {
        PanelFormat::Plain => Box::new(TerminalPresenter::new(
            std::io::stdout(),
            config.display.rule_width,
        )),
        PanelFormat::Json => Box::new(JsonPresenter::new(std::io::stdout())),
    };
    let source: Box<dyn CommandSource> = if cmd.tour {
        Box::new(ScriptedSource::tour(dataset.len()))
    } else {
        Box::new(StdinSource::spawn().context("reading stdin")?)
    };

    let summary = Session::new(dataset, presenter, source, options).run().await;

    match format {
        PanelFormat::Plain => print!("{}", report::summary_text(&summary)),
        PanelFormat::Json => println!("{}", report::summary_json(&summary)?),
    }
    Ok(())
}

fn handle_list(cmd: &ListCommand) -> anyhow::Result<()> {
    let dataset = Dataset::builtin().context("loading built-in deck")?;
    print!("{}", report::listing(&dataset, cmd.format)?);
    Ok(())
}

fn handle_show(cmd: &ShowCommand) -> anyhow::Result<()> {
    let dataset = Dataset::builtin().context("loading built-in deck")?;
    let record = dataset.require(cmd.id)?;
    print!("{}", report::scenario_detail(record, cmd.json)?);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Display]");
                println!("  Format:             {}", config.display.format);
                println!("  Rule width:         {}", config.display.rule_width);
                println!();
                println!("[Session]");
                println!("  Allow skip:         {}", config.session.allow_skip);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            print!("{}", report::validation(&path));
        }
    }
    Ok(())
}
