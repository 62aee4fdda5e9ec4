use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ecograph_ai::{GenerationConfig, LLMProviderFactory};
use ecograph_core::{ConfigManager, EcoGraphConfig, LoggingConfig};
use ecograph_graph::{GraphStore, SchemaDescriptor, StoreHandle};
use ecograph_query::{
    sanitize, AssistantTool, PipelineError, PipelineResult, QueryPipeline, TemplateSelector,
    ToolCall, ToolRouter,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser, Debug)]
#[command(
    name = "ecograph",
    version,
    author,
    about = "EcoGraph - ask questions about a Play-to-Earn game economy",
    long_about = "EcoGraph turns natural-language questions into Cypher, runs them against the \
                  game-economy knowledge graph in Neo4j and answers from the returned rows."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Ask a question about the game economy")]
    Ask {
        #[arg(help = "The question to answer")]
        question: String,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,

        #[arg(long, help = "Maximum rows forwarded to answer synthesis")]
        top_k: Option<usize>,

        #[arg(long, help = "Skip live schema introspection")]
        static_schema: bool,

        #[arg(
            long,
            help = "Tool to run: graph_query or general_chat",
            default_value = "graph_query"
        )]
        tool: String,
    },

    #[command(about = "Show which generation template a question selects")]
    Classify {
        #[arg(help = "The question to classify")]
        question: String,
    },

    #[command(about = "Clean raw model output down to its Cypher query")]
    Sanitize {
        #[arg(help = "File with raw model output, or '-' for stdin")]
        input: Option<PathBuf>,
    },

    #[command(about = "Print the schema description used in prompts")]
    Schema {
        #[arg(long, help = "Introspect the connected database")]
        live: bool,
    },

    #[command(about = "Check Neo4j connectivity")]
    DbCheck,

    #[command(about = "Write a configuration file populated with defaults")]
    InitConfig {
        #[arg(help = "Target path (default: ~/.ecograph/config.toml)")]
        path: Option<PathBuf>,

        #[arg(short, long, help = "Overwrite an existing file")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { path, force } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            handle_init_config(path, force)
        }
        Commands::Sanitize { input } => {
            init_logging(&LoggingConfig::default(), cli.verbose);
            handle_sanitize(input)
        }
        command => {
            let config_mgr = ConfigManager::load_from(cli.config.as_deref())
                .context("Failed to load configuration")?;
            let config = config_mgr.config().clone();
            init_logging(&config.logging, cli.verbose);
            if let Some(path) = config_mgr.config_path() {
                debug!(config_file = %path.display(), "Using configuration file");
            }

            match command {
                Commands::Ask {
                    question,
                    json,
                    top_k,
                    static_schema,
                    tool,
                } => handle_ask(config, question, json, top_k, static_schema, &tool).await,
                Commands::Classify { question } => handle_classify(&config, &question),
                Commands::Schema { live } => handle_schema(&config, live).await,
                Commands::DbCheck => handle_db_check(&config).await,
                Commands::InitConfig { .. } | Commands::Sanitize { .. } => Ok(()),
            }
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let fmt_layer = match logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .boxed(),
        "compact" => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}

async fn handle_ask(
    config: EcoGraphConfig,
    question: String,
    json: bool,
    top_k: Option<usize>,
    static_schema: bool,
    tool: &str,
) -> Result<()> {
    let tool = AssistantTool::parse(tool).with_context(|| {
        format!(
            "Unknown tool '{}'. Available: {}",
            tool,
            AssistantTool::all()
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let result = answer(config, question, top_k, static_schema, tool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

/// Input is validated before the provider is built or the store is contacted
async fn answer(
    mut config: EcoGraphConfig,
    question: String,
    top_k: Option<usize>,
    static_schema: bool,
    tool: AssistantTool,
) -> Result<PipelineResult> {
    if let Some(top_k) = top_k {
        if top_k == 0 {
            bail!("--top-k must be a positive integer");
        }
        config.pipeline.top_k = top_k;
    }

    let call = match tool {
        AssistantTool::GraphQuery => ToolCall::GraphQuery { question },
        AssistantTool::GeneralChat => ToolCall::GeneralChat { message: question },
    };
    if let Some(rejected) = call.rejection(config.pipeline.max_question_chars) {
        debug!(tool = tool.name(), "Input rejected before setup");
        return Ok(rejected);
    }

    let llm = match LLMProviderFactory::create_from_config(&config.llm) {
        Ok(llm) => llm,
        Err(e) => {
            warn!(provider = %config.llm.provider, error = %e, "Failed to create LLM provider");
            let err = PipelineError::ModelUnavailable {
                reason: format!("{:#}", e),
            };
            return Ok(PipelineResult::failure(&err, None, None));
        }
    };
    let generation = GenerationConfig::from_llm_config(&config.llm);

    let store = StoreHandle::connect(&config.graph).await;
    let live = config.graph.live_schema && !static_schema;
    let schema = SchemaDescriptor::resolve(&store, live).await;
    info!(
        provider = llm.provider_name(),
        model = llm.model_name(),
        store_available = store.is_available(),
        live_schema = schema.is_live(),
        "Assistant ready"
    );

    let pipeline = Arc::new(QueryPipeline::new(
        llm.clone(),
        store,
        schema,
        &config.pipeline,
        generation.clone(),
    ));
    let router = ToolRouter::new(pipeline, llm, generation);

    Ok(router.dispatch(call).await)
}

fn print_result(result: &PipelineResult) {
    if let Some(template) = result.template {
        println!("{} {}", "Template:".dimmed(), template.as_str().dimmed());
    }

    if result.error {
        println!("{}", result.answer.red());
    } else {
        println!("{}", result.answer);
    }

    if let Some(query) = &result.query {
        println!();
        println!("{}", "Generated Cypher:".blue().bold());
        println!("{}", query.cyan());
    }
}

fn handle_classify(config: &EcoGraphConfig, question: &str) -> Result<()> {
    let selector = TemplateSelector::with_threshold(config.pipeline.template_threshold);
    let (choice, score) = selector.classify(question);

    println!("{} {}", "Template:".green().bold(), choice.as_str());
    println!("{} {:.2}", "Score:".green().bold(), score);
    println!("{} {:.2}", "Threshold:".dimmed(), selector.threshold());
    Ok(())
}

fn handle_sanitize(input: Option<PathBuf>) -> Result<()> {
    let raw = read_input(input.as_deref())?;
    let sanitized = sanitize(&raw);

    eprintln!("{} {}", "Strategy:".dimmed(), sanitized.strategy);
    if sanitized.is_empty() {
        bail!("No query could be extracted from the input");
    }
    println!("{}", sanitized.text);
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

async fn handle_schema(config: &EcoGraphConfig, live: bool) -> Result<()> {
    let schema = if live {
        let store = StoreHandle::connect(&config.graph).await;
        if let StoreHandle::Unavailable { reason } = &store {
            eprintln!(
                "{} {}",
                "⚠️  Graph store unavailable, showing curated schema:".yellow(),
                reason
            );
        }
        SchemaDescriptor::resolve(&store, true).await
    } else {
        SchemaDescriptor::game_economy()
    };

    println!("{}", schema.render());
    Ok(())
}

async fn handle_db_check(config: &EcoGraphConfig) -> Result<()> {
    match StoreHandle::connect(&config.graph).await {
        StoreHandle::Connected(store) => {
            store
                .ping()
                .await
                .with_context(|| format!("Ping against {} failed", config.graph.uri))?;
            println!(
                "✓ {} connectivity verified ({})",
                store.backend_name(),
                config.graph.uri
            );
            Ok(())
        }
        StoreHandle::Unavailable { reason } => {
            bail!("Graph store at {} is unavailable: {}", config.graph.uri, reason)
        }
    }
}

fn handle_init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".ecograph")
            .join("config.toml"),
    };

    if path.exists() && !force {
        println!(
            "⚠️  Configuration file already exists: {}",
            path.display()
        );
        println!("   Use --force to overwrite");
        return Ok(());
    }

    ConfigManager::create_default_config(&path).context("Failed to create config.toml")?;
    println!("✓ Created config file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_flags_parse() {
        let cli = Cli::try_parse_from([
            "ecograph",
            "--verbose",
            "ask",
            "Top tokens?",
            "--json",
            "--top-k",
            "5",
            "--static-schema",
        ])
        .expect("parses");

        assert!(cli.verbose);
        match cli.command {
            Commands::Ask {
                question,
                json,
                top_k,
                static_schema,
                tool,
            } => {
                assert_eq!(question, "Top tokens?");
                assert!(json);
                assert_eq!(top_k, Some(5));
                assert!(static_schema);
                assert_eq!(tool, "graph_query");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["ecograph", "db-check", "--config", "/tmp/eco.toml"])
            .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/eco.toml")));
        assert!(matches!(cli.command, Commands::DbCheck));
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["ecograph", "ask"]).is_err());
    }

    fn anthropic_without_key() -> EcoGraphConfig {
        let mut config = EcoGraphConfig::default();
        config.llm.provider = "anthropic".to_string();
        config.llm.anthropic_api_key = None;
        config
    }

    #[tokio::test]
    async fn test_blank_question_is_answered_before_provider_setup() {
        let result = answer(
            anthropic_without_key(),
            String::new(),
            None,
            true,
            AssistantTool::GraphQuery,
        )
        .await
        .expect("answers");

        assert!(result.error);
        assert!(result.answer.contains("Please enter a question"));
        assert!(result.query.is_none());
        assert!(result.template.is_none());
    }

    #[tokio::test]
    async fn test_provider_setup_failure_is_an_error_result() {
        let result = answer(
            anthropic_without_key(),
            "Top tokens by volume?".to_string(),
            None,
            true,
            AssistantTool::GraphQuery,
        )
        .await
        .expect("answers");

        assert!(result.error);
        assert!(result.answer.contains("language model"));
        assert!(result.answer.contains("Anthropic API key"));
    }

    #[tokio::test]
    async fn test_zero_top_k_is_a_usage_error() {
        let err = answer(
            EcoGraphConfig::default(),
            "Top tokens?".to_string(),
            Some(0),
            true,
            AssistantTool::GraphQuery,
        )
        .await
        .expect_err("rejects --top-k 0");
        assert!(err.to_string().contains("--top-k"));
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("raw.txt");
        std::fs::write(&path, "Here is the query:\nMATCH (n) RETURN n").expect("write");

        let raw = read_input(Some(&path)).expect("reads");
        assert_eq!(sanitize(&raw).text, "MATCH (n) RETURN n");
    }

    #[test]
    fn test_init_config_respects_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        handle_init_config(Some(path.clone()), false).expect("creates");
        let written = std::fs::read_to_string(&path).expect("written");
        assert!(written.contains("[pipeline]"));

        std::fs::write(&path, "# edited").expect("edit");
        handle_init_config(Some(path.clone()), false).expect("keeps");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "# edited");

        handle_init_config(Some(path.clone()), true).expect("overwrites");
        assert_ne!(std::fs::read_to_string(&path).expect("read"), "# edited");
    }
}
