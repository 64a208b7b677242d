use colored::*;
use serde_json::{json, Value};

use game_agent_sdk::agent::{Agent, AgentOptions, StepOutcome, WorkerConfig};
use game_agent_sdk::api::{ClientConfig, GameClient};
use game_agent_sdk::functions::{Argument, Function, FunctionResult, FunctionResultStatus, InfoMap};
use game_agent_sdk::logging;

const SITTABLE: &[&str] = &["chair", "bench", "stool", "couch", "sofa", "bed"];
const FRUITS: &[&str] = &["apple", "banana", "orange", "pear", "mango", "grape"];
const FURNITURE: &[&str] = &["chair", "table", "stool", "lamp", "vase", "cushion"];

/// Room contents; the same static state serves the agent and both workers
fn room_state(_result: Option<&FunctionResult>, _previous: Option<&Value>) -> Value {
    json!({
        "objects": [
            { "name": "apple", "description": "A red apple", "type": ["item", "food"] },
            { "name": "banana", "description": "A yellow banana", "type": ["item", "food"] },
            { "name": "orange", "description": "A juicy orange", "type": ["item", "food"] },
            { "name": "chair", "description": "A chair", "type": ["sittable"] },
            { "name": "table", "description": "A table", "type": ["sittable"] },
        ]
    })
}

fn done(message: String) -> anyhow::Result<(FunctionResultStatus, String, InfoMap)> {
    Ok((FunctionResultStatus::Done, message, InfoMap::new()))
}

fn failed(message: String) -> anyhow::Result<(FunctionResultStatus, String, InfoMap)> {
    Ok((FunctionResultStatus::Failed, message, InfoMap::new()))
}

fn take_fn() -> Function {
    Function::new("take", "Take object")
        .with_arg(Argument::new("object", "Object to take").with_type("item"))
        .with_fn(|args| {
            let object = args.get_str("object")?;
            if object.is_empty() {
                return failed("No object specified".into());
            }
            done(format!("Successfully took the {}", object))
        })
}

fn sit_fn() -> Function {
    Function::new("sit", "Sit on object")
        .with_arg(Argument::new("object", "Object to sit on").with_type("sittable"))
        .with_fn(|args| {
            let object = args.get_str("object")?;
            if object.is_empty() {
                return failed("No object specified".into());
            }
            if SITTABLE.contains(&object.to_lowercase().as_str()) {
                return done(format!("Successfully sat on the {}", object));
            }
            failed(format!("Cannot sit on {} - not a sittable object", object))
        })
}

fn throw_fruit_fn() -> Function {
    Function::new("throw_fruit", "Throw fruit only")
        .with_arg(Argument::new("object", "Fruit to throw").with_type("item"))
        .with_fn(|args| {
            let object = args.get_str("object")?;
            if object.is_empty() {
                return failed("No fruit specified".into());
            }
            if FRUITS.contains(&object.to_lowercase().as_str()) {
                return done(format!("Successfully threw the {} across the room!", object));
            }
            failed(format!("Cannot throw {} - not a fruit", object))
        })
}

fn throw_furniture_fn() -> Function {
    Function::new("throw_furniture", "Throw furniture only")
        .with_arg(Argument::new("object", "Furniture to throw").with_type("item"))
        .with_fn(|args| {
            let object = args.get_str("object")?;
            if object.is_empty() {
                return failed("No furniture specified".into());
            }
            if FURNITURE.contains(&object.to_lowercase().as_str()) {
                return done(format!("Powerfully threw the {} across the room!", object));
            }
            failed(format!("Cannot throw {} - not a furniture item", object))
        })
}

fn print_outcome(worker_id: &str, outcome: &StepOutcome) {
    print!("{} {} ", format!("[{}]", worker_id).bright_blue(), outcome.kind.to_string().bold());
    match &outcome.function_result {
        Some(result) if result.is_done() => {
            println!("{}", result.feedback_message.as_deref().unwrap_or("").green())
        }
        Some(result) => println!("{}", result.feedback_message.as_deref().unwrap_or("").red()),
        None => println!(),
    }
    if let Some(task) = &outcome.planner_state.current_task {
        println!("  {} {}", "Task:".bright_black(), task.task.bright_black());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init_logging()?;

    let config = ClientConfig::from_env()?;
    let client = std::sync::Arc::new(GameClient::new(config));

    let fruit_thrower = WorkerConfig::new(
        "fruit_thrower",
        "A worker specialized in throwing fruits ONLY with precision",
        room_state,
        vec![take_fn(), sit_fn(), throw_fruit_fn()],
    );
    let furniture_thrower = WorkerConfig::new(
        "furniture_thrower",
        "A strong worker specialized in throwing furniture",
        room_state,
        vec![take_fn(), sit_fn(), throw_furniture_fn()],
    );

    let mut agent = Agent::new(
        client,
        AgentOptions::new(
            "Chaos",
            "Conquer the world by causing chaos.",
            "You are a mischievous master of chaos is very strong but with a very short attention span, and not so much brains",
        ),
        room_state,
        vec![fruit_thrower, furniture_thrower],
    )
    .await?;

    // Standalone mode: --worker <id> <task>
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [flag, worker_id, task @ ..] = args.as_slice() {
        if flag == "--worker" {
            let task = if task.is_empty() {
                "make a mess and rest!".to_string()
            } else {
                task.join(" ")
            };

            let mut worker = agent.get_worker(worker_id).await?;
            worker.set_task(&task).await?;
            println!("{} {}", "Task:".yellow().bold(), task);

            while worker.has_task() {
                let outcome = worker.step().await?;
                print_outcome(worker_id, &outcome);
            }
            return Ok(());
        }
    }

    let map_id = agent.compile().await?;
    println!("{} {}", "Compiled map:".yellow().bold(), map_id);

    agent.reset();
    loop {
        let worker_id = agent.current_worker_id().unwrap_or_default().to_string();
        let outcome = agent.step().await?;
        print_outcome(&worker_id, &outcome);
    }
}
