//! `cipherbank demo` - walk one task through its whole life
//!
//! Grants roles, registers keys, creates/completes/publishes an audit task
//! and exchanges a payload through data storage, printing each event.

use anyhow::Context;
use cipherbank_core::{Deployment, EventBusConfig, Principal, RegistryEvent};
use colored::*;
use rand::RngCore;

use crate::client::KeyGenClient;
use crate::display;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Run the scenario and return every event it emitted
pub async fn run(
    events: &EventBusConfig,
    keygen: Option<&KeyGenClient>,
) -> anyhow::Result<Vec<RegistryEvent>> {
    println!("{}", "Cipherbank demo: audit task lifecycle".bright_white().bold());

    let admin = Principal::random();
    let bank = Principal::random();
    let user = Principal::random();
    let d = Deployment::provision(admin, events);

    display::section("Step 1: Grant roles");
    d.access_control.add_bank(&admin, bank).await?;
    d.access_control.register_user(&admin, user).await?;
    display::kv("administrator", &admin.to_string());
    display::kv("bank", &bank.to_string());
    display::kv("user", &user.to_string());

    display::section("Step 2: Register keys");
    let bank_id = d.bank_registry.register_bank(&bank, random_bytes(32)).await?;
    display::success(&format!("Bank registered with id {bank_id}"));

    let fhe_public_key = match keygen {
        Some(client) => {
            let keys = client
                .generate_keys(&user.to_string())
                .await
                .context("Failed to obtain FHE keys for the demo user")?;
            display::info("FHE public key obtained from key-generation service");
            keys.public_key.into_bytes()
        }
        None => random_bytes(64),
    };
    let user_id = d
        .user_registry
        .register_user(&user, random_bytes(32), fhe_public_key, random_bytes(64))
        .await?;
    display::success(&format!("User registered with id {user_id}"));

    display::section("Step 3: Task lifecycle");
    let task_id = d.task_management.create_task(&user, bank, "audit").await?;
    display::success(&format!("Task {task_id} created"));

    let input_key = format!("task:{task_id}:input");
    d.data_storage.store(&user, &input_key, random_bytes(48)).await?;
    let ciphertext = d.data_storage.retrieve(&bank, &input_key).await?;
    display::info(&format!("Bank read {} encrypted bytes from {input_key}", ciphertext.len()));

    d.task_management
        .complete_task(&bank, task_id, random_bytes(32))
        .await?;
    display::success(&format!("Task {task_id} completed by bank"));

    d.task_management
        .publish_task_result(&user, task_id, random_bytes(32))
        .await?;
    let task = d.task_management.get_task(task_id).await?;
    display::success(&format!("Task {task_id} is {}", task.state()));

    display::section("Events");
    let history = d.events.history().await;
    for event in &history {
        display::event(event);
    }

    Ok(history)
}
