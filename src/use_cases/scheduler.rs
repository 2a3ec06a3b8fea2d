// Periodic simulation tasks: enemy spawning, enemy movement, bullet flight.

use super::game::Game;
use crate::domain::World;
use crate::domain::systems::SpawnOutcome;
use crate::domain::PlayState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, info};

/// Starts the three session tasks. Called once per session.
pub(crate) fn spawn_tasks(game: Game) {
    let settings = game.settings().clone();
    info!(
        spawn_ms = settings.enemy.spawn_interval.as_millis() as u64,
        move_ms = settings.enemy.move_interval.as_millis() as u64,
        bullet_ms = settings.bullet.tick_interval.as_millis() as u64,
        "starting session tasks"
    );

    tokio::spawn(run_periodic(
        game.clone(),
        "enemy_spawn",
        settings.enemy.spawn_interval,
        |world: &mut World| match world.spawn_enemy() {
            SpawnOutcome::CapReached => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        },
    ));

    let mut rng = match settings.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    tokio::spawn(run_periodic(
        game.clone(),
        "enemy_movement",
        settings.enemy.move_interval,
        move |world: &mut World| {
            world.move_enemies(&mut rng);
            ControlFlow::Continue(())
        },
    ));

    tokio::spawn(run_periodic(
        game,
        "bullets",
        settings.bullet.tick_interval,
        |world: &mut World| {
            world.tick_bullets();
            ControlFlow::Continue(())
        },
    ));
}

// Fixed-period loop gated by the play state. The first tick fires immediately;
// ticks that land while paused are skipped.
async fn run_periodic<F>(game: Game, task: &'static str, period: Duration, mut step: F)
where
    F: FnMut(&mut World) -> ControlFlow<()> + Send + 'static,
{
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = game.stopped() => {
                break;
            }
            _ = interval.tick() => {}
        }

        // Catch a shutdown that fired between two waits.
        if game.is_stopping() {
            break;
        }
        match game.state() {
            PlayState::Playing => {}
            PlayState::Paused => continue,
            PlayState::Finished(_) => break,
        }

        if game.with_world(|world| step(world)).await.is_break() {
            break;
        }
    }

    debug!(task, "session task stopped");
}
