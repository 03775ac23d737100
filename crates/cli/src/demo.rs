//! Demo scenarios exercising the runtime end to end.

use ak_core::agents::MockAgent;
use ak_core::{AgentRuntime, Message, MessageType, Response, RuntimeResult};
use ak_protocol::config_models::RuntimeConfig;
use colored::Colorize;
use std::time::Duration;

#[derive(Debug)]
struct Ping;

#[derive(Debug)]
struct Pong;

#[derive(Debug)]
struct Broadcast;

pub async fn run(config: RuntimeConfig) -> color_eyre::Result<()> {
    let runtime = AgentRuntime::new(config);
    tracing::debug!("Registering demo agents");

    runtime
        .register(MockAgent::echo("echo", vec![MessageType::of::<Ping>()]))
        .await?;
    runtime
        .register(MockAgent::failing(
            "a",
            vec![MessageType::of::<Broadcast>()],
            "agent a refuses broadcasts",
        ))
        .await?;
    runtime
        .register(MockAgent::echo("b", vec![MessageType::of::<Broadcast>()]))
        .await?;
    runtime
        .register(MockAgent::delayed(
            "slow",
            vec![MessageType::of::<Pong>()],
            Duration::from_secs(60),
        ))
        .await?;

    println!("{}", "== send".bold());
    report("send(Ping, echo)", &runtime.send(Message::new(Ping), "echo").await);
    report("send(Pong, echo)", &runtime.send(Message::new(Pong), "echo").await);
    report("send(Ping, missing)", &runtime.send(Message::new(Ping), "missing").await);

    println!("{}", "== publish".bold());
    for result in runtime.publish(Message::new(Broadcast)).await {
        report(&format!("publish(Broadcast) -> {}", result.agent), &result.outcome);
    }

    println!("{}", "== cancel".bold());
    let call = runtime.dispatch(Message::new(Pong), "slow").await?;
    call.cancel_after(Duration::from_millis(50));
    report("send(Pong, slow) with 50ms deadline", &call.response().await);

    let agents = runtime.agent_count().await;
    tracing::info!(agents, "Demo finished, shutting down");
    runtime.shutdown().await;
    Ok(())
}

fn report(label: &str, outcome: &RuntimeResult<Response>) {
    match outcome {
        Ok(response) => println!("{} {}: {:?}", "ok".green(), label, response),
        Err(e) if e.is_cancelled() => println!("{} {}: {}", "cancelled".yellow(), label, e),
        Err(e) => println!("{} {}: {}", "error".red(), label, e),
    }
}
