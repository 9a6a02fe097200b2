//! # Example: save_restore
//!
//! Demonstrates the persistence boundary: pending tasks externalized to
//! records on "save" and reconstructed through a [`KindRegistry`] on "load",
//! with delays kept relative to the current tick.
//!
//! Shows how to:
//! - Implement [`SavableTask`] for a durable task kind.
//! - Register its factory once at startup.
//! - Capture an entity by key with [`CaptureTask`], resolved at run time.
//! - Snapshot, "restart", restore on a scheduler with a different absolute
//!   tick count, and watch the same effects fire.
//!
//! ## Flow
//! ```text
//! register("announce"), register("greet-player")
//! schedule announce @ +2, capture(greet alice) @ +4
//!
//! snapshot() ─► [{announce, 2, ..}, {greet-player, 4, {key: 7}}]
//!    │  (process "restarts"; new scheduler starts at tick 500)
//!    ▼
//! restore(records)
//! tick ×4 ─► announce at +2, greet at +4 (key 7 resolved to alice)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example save_restore --features logging
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use tickvisor::{
    CaptureTask, Config, KindRegistry, LogWriter, PersistError, Payload, SavableTask, Schedule,
    Subscribe, Task, TaskError, TaskRef, TickedScheduler,
};

/// Durable one-shot that announces a message.
struct Announce {
    message: String,
}

#[async_trait]
impl Task for Announce {
    fn name(&self) -> &str {
        "announce"
    }

    async fn run(&self, _ctx: CancellationToken) -> Result<(), TaskError> {
        println!("[announce] {}", self.message);
        Ok(())
    }

    fn as_savable(&self) -> Option<&dyn SavableTask> {
        Some(self)
    }
}

impl SavableTask for Announce {
    fn kind(&self) -> &str {
        "announce"
    }

    fn save(&self) -> Result<Payload, PersistError> {
        let mut data = Payload::new();
        data.insert("message".into(), self.message.clone().into());
        Ok(data)
    }
}

#[derive(Clone)]
struct Player {
    id: u64,
    name: String,
}

/// Builds the capture task binding one player by id.
fn greet_player(
    players: Arc<HashMap<u64, Player>>,
    player: &Player,
) -> Arc<CaptureTask<u64, Player>> {
    CaptureTask::arc(
        "greet-player",
        player,
        |p| p.id,
        move |id| players.get(id).cloned(),
        |player: Player, _ctx| async move {
            println!("[greet] hello, {}", player.name);
            Ok::<_, TaskError>(())
        },
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. The "world": entities the captures resolve against at run time
    let players: Arc<HashMap<u64, Player>> = Arc::new(HashMap::from([(
        7,
        Player { id: 7, name: "alice".into() },
    )]));

    // 2. Register every durable kind once, at startup
    let mut registry = KindRegistry::new();
    registry.register("announce", |data, _ctx| {
        let message = data
            .get("message")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| PersistError::malformed("announce", "missing message"))?;
        Ok(Arc::new(Announce { message: message.to_string() }) as TaskRef)
    });
    let players_for_factory = players.clone();
    registry.register("greet-player", move |data, _ctx| {
        let players = players_for_factory.clone();
        let capture = CaptureTask::restore(
            "greet-player",
            data,
            move |id: &u64| players.get(id).cloned(),
            |player: Player, _ctx| async move {
                println!("[greet] hello, {}", player.name);
                Ok::<_, TaskError>(())
            },
        )?;
        Ok(Arc::new(capture) as TaskRef)
    });

    // 3. First session: schedule work, then "save the world"
    let session = TickedScheduler::new(Config::default());
    session.schedule(
        2,
        Arc::new(Announce { message: "the sun sets in two ticks".into() }) as TaskRef,
    );
    session.schedule(4, greet_player(players.clone(), &players[&7]));

    let records = session.snapshot(&registry);
    println!("saved {} records: {}", records.len(), serde_json::to_string(&records)?);

    // 4. "Restart": a fresh scheduler at a completely different absolute tick,
    //    with a LogWriter attached to show the event stream
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let reloaded = TickedScheduler::builder(Config { start_tick: 500, ..Config::default() })
        .with_subscribers(subs)
        .build();
    reloaded.restore(records, &registry);

    // 5. Drive the new session: announce at +2, greet at +4
    for _ in 0..5 {
        reloaded.tick().await;
    }

    // give the log worker a moment to drain before exiting
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    Ok(())
}
