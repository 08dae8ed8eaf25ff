use std::io::Write;
use std::path::PathBuf;

use agentswarm::agent::Message;
use agentswarm::utils::LoggingConfig;
use agentswarm::{
    create_llm_client, create_swarm, AgentResponse, AgentRole, FileContext, LlmConfig,
    LlmProviderKind, RolePreset, RunOptions, StopReason, SwarmEventKind, SwarmFile, SwarmOptions,
    SwarmOrchestrator, ToolRegistry,
};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "agentswarm", version, about = "Multi-agent coding swarm", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a task through the swarm until it completes or stops
    Run {
        task: String,
        #[command(flatten)]
        swarm: SwarmArgs,
        /// Agent id that takes the first turn
        #[arg(long)]
        start_agent: Option<String>,
        /// Files passed to every agent as reference material
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Print responses as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive conversation; `/reset` starts over, `/exit` quits
    Chat {
        #[command(flatten)]
        swarm: SwarmArgs,
    },
    /// Stream a single reply from one role preset
    Stream {
        prompt: String,
        #[arg(long, default_value = "planner")]
        role: String,
        #[command(flatten)]
        llm: LlmArgs,
    },
}

#[derive(Args)]
struct LlmArgs {
    #[arg(long, default_value = "mock")]
    provider: String,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(long)]
    max_tokens: Option<u32>,
}

impl LlmArgs {
    fn to_config(&self) -> anyhow::Result<LlmConfig> {
        let provider: LlmProviderKind = self.provider.parse()?;
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        let mut config = LlmConfig::new(provider, model);
        config.api_key = self.api_key.clone();
        config.base_url = self.base_url.clone();
        config.temperature = self.temperature;
        config.max_tokens = self.max_tokens;
        Ok(config)
    }
}

#[derive(Args)]
struct SwarmArgs {
    #[command(flatten)]
    llm: LlmArgs,
    #[arg(long)]
    max_iterations: Option<usize>,
    /// JSON swarm description; overrides the LLM flags
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    debug: bool,
}

impl SwarmArgs {
    async fn build(&self) -> anyhow::Result<SwarmOrchestrator> {
        let swarm = match &self.config {
            Some(path) => {
                let file = SwarmFile::load(path)
                    .await
                    .with_context(|| format!("failed to load swarm file `{}`", path.display()))?;
                let mut config = file.into_config(&ToolRegistry::with_builtin())?;
                if let Some(max_iterations) = self.max_iterations {
                    config = config.with_max_iterations(max_iterations);
                }
                if self.debug {
                    config = config.with_debug(true);
                }
                SwarmOrchestrator::new(config)?
            }
            None => create_swarm(
                self.llm.to_config()?,
                SwarmOptions {
                    max_iterations: self.max_iterations,
                    debug: Some(self.debug),
                    ..SwarmOptions::default()
                },
            )?,
        };

        swarm.on(SwarmEventKind::Handoff, |event| {
            if let agentswarm::SwarmEventPayload::Handoff { next_agent } = &event.payload {
                eprintln!("-> {} hands off to {}", event.agent_id, next_agent);
            }
        });
        swarm.on(SwarmEventKind::ToolCall, |event| {
            eprintln!("-> {} used a tool", event.agent_id);
        });
        Ok(swarm)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            task,
            swarm,
            start_agent,
            files,
            json,
        } => handle_run(task, swarm, start_agent, files, json).await?,
        Command::Chat { swarm } => handle_chat(swarm).await?,
        Command::Stream { prompt, role, llm } => handle_stream(prompt, role, llm).await?,
    }
    Ok(())
}

async fn handle_run(
    task: String,
    args: SwarmArgs,
    start_agent: Option<String>,
    paths: Vec<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let mut swarm = args.build().await?;

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = FileContext::load(path)
            .await
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        files.push(file);
    }

    let mut options = RunOptions::new().with_files(files);
    options.start_agent = start_agent;

    let outcome = swarm.run(&task, options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.responses)?);
    } else {
        for response in &outcome.responses {
            render_response(response);
        }
    }

    match &outcome.stop {
        StopReason::Completed => eprintln!("Task completed after {} turns", outcome.responses.len()),
        StopReason::AgentError => eprintln!("Stopped: an agent reported an error"),
        StopReason::AgentNotFound(id) => eprintln!("Stopped: agent `{}` not found", id),
        StopReason::MaxIterations => eprintln!("Stopped: max iterations reached"),
    }
    Ok(())
}

async fn handle_chat(args: SwarmArgs) -> anyhow::Result<()> {
    let mut swarm = args.build().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a message, `/reset` to start over, `/exit` to quit.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                swarm.reset();
                println!("Conversation reset.");
            }
            message => {
                let response = swarm.chat(message).await?;
                render_response(&response);
            }
        }
    }
    Ok(())
}

async fn handle_stream(prompt: String, role: String, args: LlmArgs) -> anyhow::Result<()> {
    let role: AgentRole = role.parse()?;
    let Some(preset) = RolePreset::for_role(role) else {
        bail!("role `{}` has no built-in preset", role);
    };

    let client = create_llm_client(&args.to_config()?)?;
    let messages = vec![Message::system(preset.system_prompt), Message::user(prompt)];

    let mut stream = client.stream(&messages);
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        write!(stdout, "{}", chunk?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn render_response(response: &AgentResponse) {
    println!("=== {} ({:?}) ===", response.agent_id, response.status);
    println!("{}", response.content);
    for call in &response.tool_calls {
        match &call.result {
            Some(result) if result.success => println!("[tool {}] ok", call.tool_name),
            Some(result) => println!(
                "[tool {}] failed: {}",
                call.tool_name,
                result.error.as_deref().unwrap_or("unknown error")
            ),
            None => println!("[tool {}] not configured", call.tool_name),
        }
    }
    println!();
}
