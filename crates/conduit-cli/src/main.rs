use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use conduit_core::observability::init_tracing;
use conduit_core::{ChatForwarding, ChatMessage, Message, OutgoingMessage, Run, TurnToken};

#[derive(Parser, Debug)]
#[command(name = "conduit")]
#[command(version, about = "Forward chat inputs through a conduit executor", long_about = None)]
struct Cli {
    /// User text; each value is dispatched as one string message
    #[arg(value_name = "TEXT")]
    inputs: Vec<String>,

    /// Dispatch a TurnToken after the inputs
    #[arg(long)]
    turn: bool,

    /// Id of the forwarding executor
    #[arg(long, env = "CONDUIT_EXECUTOR_ID", default_value = "forward")]
    executor_id: String,

    /// Default tracing level when RUST_LOG is not set
    #[arg(long, env = "CONDUIT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// 出力の JSON 形
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum Emitted<'a> {
    ChatMessage(&'a ChatMessage),
    ChatMessages(&'a Vec<ChatMessage>),
    TurnToken(&'a TurnToken),
    Unknown(&'a str),
}

fn describe(outgoing: &OutgoingMessage) -> Emitted<'_> {
    let message = &outgoing.message;
    if let Some(m) = message.downcast_ref::<ChatMessage>() {
        Emitted::ChatMessage(m)
    } else if let Some(m) = message.downcast_ref::<Vec<ChatMessage>>() {
        Emitted::ChatMessages(m)
    } else if let Some(t) = message.downcast_ref::<TurnToken>() {
        Emitted::TurnToken(t)
    } else {
        Emitted::Unknown(message.message_type().name())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // (A) 入力: 文字列を順に、--turn なら最後に TurnToken
    let mut inputs: Vec<Message> = cli.inputs.into_iter().map(Message::new).collect();
    if cli.turn {
        inputs.push(Message::new(TurnToken::default()));
    }

    // (B) forwarding executor を run にバインド
    let executor = ChatForwarding::executor(cli.executor_id.clone())
        .context("failed to build forwarding executor")?;
    let executor = Arc::new(executor);
    tracing::info!(protocol = ?executor.describe_protocol(), "executor ready");

    let mut run = Run::new();
    run.bind(executor)?;

    // (C) 1 件ずつ dispatch して、送信されたものを JSON 行で出力
    for message in inputs {
        run.dispatch(&cli.executor_id, message)
            .await
            .with_context(|| format!("dispatch to {} failed", cli.executor_id))?;
        for outgoing in run.take_outgoing() {
            println!("{}", serde_json::to_string(&describe(&outgoing))?);
        }
    }

    Ok(())
}
