use crate::console::run_console;
use crate::session::{Session, Setup};
use anyhow::Context;
use rand::RngCore;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

mod console;
mod error;
mod game;
mod session;
mod time;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    if let Err(err) = run().await {
        log::error!("{:#}", err);
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::var("WEREWOLF_SETUP").unwrap_or_else(|_| "setup.json".to_string());
    let setup = std::fs::read_to_string(&path).with_context(|| format!("could not read setup file {}", path))?;
    let setup: Setup = serde_json::from_str(&setup).with_context(|| format!("invalid setup file {}", path))?;

    let seed = match std::env::var("WEREWOLF_SEED") {
        Ok(seed) => seed.parse::<u64>().context("WEREWOLF_SEED is not a number")?,
        Err(_) => rand::thread_rng().next_u64(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = Session::new(setup, seed, tx).context("could not start the game")?;

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(update) = rx.recv().await {
            let line = format!("{}\n", update);
            if stdout.write_all(line.as_bytes()).await.is_err() {
                log::error!("Could not write update");
                break;
            }
            stdout.flush().await.ok();
        }
    });

    run_console(session, BufReader::new(tokio::io::stdin())).await;
    writer.await.context("update writer panicked")?;
    Ok(())
}
