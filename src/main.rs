use axum::{Extension, Router};
use script_studio::agent::{AgentRuntime, ToolExecutor, ToolRegistry};
use script_studio::config::PromptConfig;
use script_studio::notion_client::NotionClient;
use script_studio::openai_client::OpenAiClient;
use script_studio::tasks::TaskManager;
use script_studio::tavily_client::TavilyClient;
use script_studio::{handlers, AppState};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    // Ensure working directories exist
    for dir in ["outputs", "uploads"] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!("Failed to create {} directory: {}", dir, e);
        }
    }

    // Load agent/task prompt templates (immutable after this point)
    let prompts = PromptConfig::load(Path::new("config"))
        .expect("Failed to load prompt configuration from config/");
    tracing::info!("✅ Prompt templates loaded");

    // The chat-completions client is the one hard requirement
    let openai_api_key =
        std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set to generate scripts");
    let openai_client = OpenAiClient::new(openai_api_key);
    tracing::info!("Initializing chat client (model: {})...", openai_client.model());

    // Web search for the researcher agent
    let tavily_client = match std::env::var("TAVILY_API_KEY").ok() {
        Some(api_key) if !api_key.is_empty() => {
            tracing::info!("Initializing Tavily web search client...");
            Some(TavilyClient::new(api_key))
        }
        _ => {
            tracing::warn!("TAVILY_API_KEY not found. Research will run without web search.");
            None
        }
    };

    // Optional Notion export for the screenwriter agent
    let notion_client = match (
        std::env::var("NOTION_TOKEN").ok(),
        std::env::var("NOTION_DB_ID").ok(),
    ) {
        (Some(token), Some(database_id)) if !token.is_empty() => {
            tracing::info!("Initializing Notion export client...");
            Some(NotionClient::new(token, database_id))
        }
        _ => {
            tracing::info!("Notion export disabled (set NOTION_TOKEN and NOTION_DB_ID to enable)");
            None
        }
    };

    let registry = ToolRegistry::new(notion_client.is_some());
    let tools = Arc::new(ToolExecutor::new(tavily_client, notion_client));

    let runtime = Arc::new(AgentRuntime {
        openai: Arc::new(openai_client),
        registry,
        tools,
        prompts: Arc::new(prompts),
    });

    let task_manager = Arc::new(TaskManager::new());

    let shared_state = Arc::new(AppState {
        runtime,
        task_manager,
    });

    // Periodically drop finished tasks so the in-memory store stays bounded
    let cleanup_state = shared_state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
            cleanup_state.task_manager.cleanup_old_tasks(24).await;
        }
    });

    let app = Router::new()
        .merge(handlers::generate::script_routes())
        .merge(handlers::stream::stream_routes())
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .unwrap();
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,script_studio=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,script_studio=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("🎬 ScriptStudio starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Configuration - OpenAI: {}, Tavily: {}, Notion: {}",
        if std::env::var("OPENAI_API_KEY").is_ok() { "✅" } else { "❌" },
        if std::env::var("TAVILY_API_KEY").is_ok() { "✅" } else { "❌" },
        if std::env::var("NOTION_TOKEN").is_ok() { "✅" } else { "❌" }
    );

    Ok(())
}
