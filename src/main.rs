//! bq-agent - Natural-language analyst for a single BigQuery table.

mod cli;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use bq_agent::agent::Agent;
use bq_agent::config::{Config, TableTarget};
use bq_agent::llm::{create_client, LlmClient, MockLlmClient};
use bq_agent::logging::{self, LogSink};
use bq_agent::warehouse::{self, MockWarehouseClient, WarehouseClient};
use cli::Cli;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    logging::init(LogSink::for_session(cli.is_interactive()));

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // Precedence: CLI flags, then config file, then environment
    cli.apply_overrides(&mut config);
    config.warehouse.apply_env_defaults();

    let (target, warehouse, llm) = build_backends(&cli, &config)?;
    info!(table = %target.qualified_name(), mock = cli.mock, "Agent ready");

    let mut agent = Agent::new(llm, warehouse, &target);

    if let Some(sql) = &cli.sql {
        let rows = agent.run_sql(sql).await?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if let Some(question) = &cli.question {
        let answer = agent.ask(question).await?;
        println!("{}", answer);
        return Ok(());
    }

    repl(&mut agent).await
}

type Backends = (TableTarget, Box<dyn WarehouseClient>, Box<dyn LlmClient>);

fn build_backends(cli: &Cli, config: &Config) -> anyhow::Result<Backends> {
    if cli.mock {
        let target = TableTarget::new(
            config.warehouse.project.as_deref().unwrap_or("mock-project"),
            config.warehouse.dataset.as_deref().unwrap_or("mock_dataset"),
            &config.warehouse.table,
        );
        return Ok((
            target,
            Box::new(MockWarehouseClient::new()),
            Box::new(MockLlmClient::new()),
        ));
    }

    let target = config.resolved_target()?;
    let warehouse =
        warehouse::connect(&config.warehouse).context("Failed to set up BigQuery client")?;
    let llm = create_client(&config.llm).context("Failed to set up LLM client")?;
    Ok((target, warehouse, llm))
}

/// Reads questions from stdin until EOF or `exit`.
async fn repl(agent: &mut Agent) -> anyhow::Result<()> {
    println!("Ask a question about the table. Type 'reset' to clear history, 'exit' to quit.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let question = line.trim();

        match question {
            "" => continue,
            "exit" | "quit" => break,
            "reset" => {
                agent.reset();
                println!("History cleared.");
                continue;
            }
            _ => {}
        }

        match agent.ask(question).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => {
                error!("{}: {}", e.category(), e);
                println!("{}: {}\n", e.category(), e);
            }
        }
    }

    Ok(())
}
