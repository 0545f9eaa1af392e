use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use voice_monitor::mqtt::MonitorConnection;
use voice_monitor::publisher::{self, templates, Publisher, Template};
use voice_monitor::ui::{Console, TerminalSink};
use voice_monitor::{MonitorSession, Overrides, Settings, SubscriptionFilter};

#[derive(Parser, Debug)]
#[command(name = "voice-monitor", version, about = "Watch and test the voice assistant's MQTT traffic")]
struct Cli {
    /// Settings file (defaults to ~/.config/voice-monitor/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write plain text without terminal colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Broker host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Broker port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// First topic level of the assistant
    #[arg(long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch live traffic and print one entry per message
    Monitor {
        /// Only show messages whose owner level equals this value
        #[arg(short, long)]
        user: Option<String>,

        /// Show every owner, even if the settings file names one
        #[arg(long, conflicts_with = "user")]
        all_users: bool,

        /// Append the full payload to every entry
        #[arg(short, long)]
        verbose: bool,
    },

    /// Send a canned message (or the whole voice command sequence)
    Publish {
        #[arg(value_enum)]
        kind: PublishKind,

        /// Owner level for the topics
        #[arg(short, long, default_value = "single-user")]
        user: String,

        /// Pause between sequence steps
        #[arg(long, default_value_t = 2)]
        delay_secs: u64,
    },

    /// Send a free-form message; plain text is wrapped into JSON
    PublishCustom {
        #[arg(long)]
        topic: String,

        #[arg(long)]
        payload: String,
    },

    /// Write the default settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PublishKind {
    Transcription,
    Status,
    Notification,
    Task,
    Emotion,
    Flutter,
    System,
    Sequence,
}

impl PublishKind {
    fn template(self) -> Option<Template> {
        match self {
            PublishKind::Transcription => Some(Template::Transcription),
            PublishKind::Status => Some(Template::Status),
            PublishKind::Notification => Some(Template::Notification),
            PublishKind::Task => Some(Template::Task),
            PublishKind::Emotion => Some(Template::Emotion),
            PublishKind::Flutter => Some(Template::ClientApp),
            PublishKind::System => Some(Template::System),
            PublishKind::Sequence => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup()?;

    let console = Console::new(!cli.no_color);
    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);

    if let Command::InitConfig { force } = cli.command {
        setup_logging_env(Level::INFO);
        return init_config(&console, &config_path, force).await;
    }

    let mut settings = Settings::load(&config_path).await?;
    let mut overrides = Overrides {
        host: cli.host,
        port: cli.port,
        namespace: cli.namespace,
        ..Overrides::default()
    };
    if let Command::Monitor {
        user,
        all_users,
        verbose,
    } = &cli.command
    {
        overrides.user = user.clone();
        overrides.all_users = *all_users;
        overrides.verbose = *verbose;
    }
    settings.apply(overrides);

    setup_logging_env(log_level(&settings));
    debug!("Settings resolved from {}", config_path.display());

    match cli.command {
        Command::Monitor { .. } => run_monitor(&console, &settings).await,
        Command::Publish {
            kind,
            user,
            delay_secs,
        } => run_publish(&console, &settings, kind, &user, Duration::from_secs(delay_secs)).await,
        Command::PublishCustom { topic, payload } => {
            run_publish_custom(&console, &settings, &topic, &payload).await
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    Ok(())
}

/// Verbose monitoring, from the file or `-v`, also turns on debug logs
fn log_level(settings: &Settings) -> Level {
    if settings.monitor.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

fn setup_logging_env(level: Level) {
    // stdout belongs to the monitor output
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn init_config(console: &Console, path: &std::path::Path, force: bool) -> Result<()> {
    if Settings::write_default(path, force).await? {
        console.success(&format!("Wrote default settings to {}", path.display()));
    } else {
        console.warn(&format!(
            "⚠️  {} already exists, use --force to overwrite",
            path.display()
        ));
    }
    Ok(())
}

async fn run_monitor(console: &Console, settings: &Settings) -> Result<()> {
    let namespace = &settings.monitor.namespace;
    let filter = SubscriptionFilter::from_option(settings.monitor.user.clone());
    let pattern = filter.subscription_pattern(namespace);
    let mqtt_config = settings.mqtt_config();

    let subtitle = match filter.owner() {
        Some(owner) => format!("Watching user: {}", owner),
        None => format!("Watching all {}/* topics", namespace),
    };
    console.banner("📡 VOICE ASSISTANT MQTT MONITOR", &subtitle);
    console.warn(&format!("📡 Connecting to {}", mqtt_config));
    console.info(&format!("🔍 Pattern: {}", pattern));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ctrl_c.cancel(),
            Err(e) => warn!("Unable to listen for Ctrl+C: {}", e),
        }
    });

    let connecting = MonitorConnection::create(&mqtt_config, pattern.clone()).connect();
    let connection = tokio::select! {
        _ = cancel.cancelled() => {
            console.warn("👋 Cancelled before the broker answered");
            return Ok(());
        }
        connected = connecting => match connected {
            Ok(connection) => connection,
            Err(e) => {
                console.failure(&format!("Could not connect to {}: {}", mqtt_config, e));
                return Err(e.into());
            }
        }
    };

    console.success("Connected to MQTT broker");
    console.success(&format!("Subscribed to: {}", pattern));
    console.warn("🔄 Waiting for messages... (Ctrl+C to stop)");
    console.rule();

    let mut session = MonitorSession::new(filter, settings.monitor.verbose);
    let mut sink = TerminalSink::stdout(console.colored());

    let outcome = connection
        .run_until_cancelled(&mut session, &mut sink, cancel)
        .await;

    match &outcome {
        Ok(closed) => {
            debug!("{} publishes received", closed.messages_received());
            console.warn("\n👋 Monitor stopped");
        }
        Err(e) => {
            console.failure(&format!("Connection ended: {}", e));
            console.info("Start the monitor again to reconnect");
        }
    }
    console.info(&format!(
        "📊 Total messages captured: {}",
        session.accepted()
    ));
    if session.decode_failures() > 0 {
        console.warn(&format!(
            "❓ {} payloads could not be decoded",
            session.decode_failures()
        ));
    }

    outcome.map(|_| ()).map_err(|e| e.into())
}

async fn run_publish(
    console: &Console,
    settings: &Settings,
    kind: PublishKind,
    owner: &str,
    delay: Duration,
) -> Result<()> {
    let namespace = &settings.monitor.namespace;
    let mqtt_config = settings.mqtt_config();
    let publisher = connect_publisher(console, &mqtt_config).await?;

    match kind.template() {
        Some(template) => {
            let audio_id = templates::generate_audio_id();
            let topic = template.topic(namespace, owner);
            let payload = template.payload(&audio_id, owner);
            publisher.publish_json(&topic, &payload).await?;
            console.success(&format!("{} message sent", template.category().descriptor().label));
            console.info(&format!("   Topic: {}", topic));
        }
        None => {
            let steps = publisher::voice_command_sequence(namespace, owner);
            console.warn(&format!("🎬 Sending {} steps for user {}", steps.len(), owner));
            publisher
                .publish_sequence(&steps, delay, |n, step| {
                    console.info(&format!("{}. {} → {}", n, step.description, step.topic));
                })
                .await?;
            console.success("Sequence complete");
        }
    }

    publisher.shutdown().await?;
    Ok(())
}

async fn run_publish_custom(
    console: &Console,
    settings: &Settings,
    topic: &str,
    payload: &str,
) -> Result<()> {
    let topic = publisher::custom_topic(&settings.monitor.namespace, topic);
    let body = custom_payload(payload);
    let mqtt_config = settings.mqtt_config();
    let publisher = connect_publisher(console, &mqtt_config).await?;

    publisher.publish_json(&topic, &body).await?;
    console.success(&format!("Custom message sent to {}", topic));

    publisher.shutdown().await?;
    Ok(())
}

async fn connect_publisher(
    console: &Console,
    mqtt_config: &voice_monitor::mqtt::MqttConfig,
) -> Result<Publisher> {
    info!("Publishing through {}", mqtt_config);
    Publisher::connect(mqtt_config).await.map_err(|e| {
        console.failure(&format!("Could not connect to {}: {}", mqtt_config, e));
        eyre!("Publisher connection failed: {}", e)
    })
}

/// JSON is sent as given; anything else is wrapped as a text message
fn custom_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| {
        json!({
            "text": raw,
            "timestamp": templates::timestamp(),
            "source": "test-tool",
        })
    })
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
    fn test_publish_kind_parsing() {
        let cli = Cli::parse_from(["voice-monitor", "publish", "flutter", "--user", "u1"]);
        match cli.command {
            Command::Publish { kind, user, delay_secs } => {
                assert_eq!(kind.template(), Some(Template::ClientApp));
                assert_eq!(user, "u1");
                assert_eq!(delay_secs, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_level_follows_merged_settings() {
        let mut settings = Settings::from_toml("[monitor]\nverbose = true\n").unwrap();
        assert_eq!(log_level(&settings), Level::DEBUG);

        settings.monitor.verbose = false;
        assert_eq!(log_level(&settings), Level::INFO);

        settings.apply(Overrides {
            verbose: true,
            ..Overrides::default()
        });
        assert_eq!(log_level(&settings), Level::DEBUG);
    }

    #[test]
    fn test_custom_payload() {
        let json = custom_payload(r#"{"status":"ok"}"#);
        assert_eq!(json, json!({"status": "ok"}));

        let text = custom_payload("hello there");
        assert_eq!(text["text"], "hello there");
        assert_eq!(text["source"], "test-tool");
    }
}
