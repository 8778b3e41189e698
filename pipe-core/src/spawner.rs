//! Population control for the pipe screensaver.
//!
//! [`PipeSpawner`] owns every branch and drives them from a single
//! [`PipeSpawner::tick`]. One tick runs, in order:
//!
//! 1. **Growth**: every live branch advances one frame. Splits are linked
//!    into the forest and started right away; finished families are
//!    dispatched before the next branch moves.
//! 2. **Fade**: fading objects step their opacity and are released once
//!    fully transparent (done in the same pass as growth).
//! 3. **Spawn**: if the spawn task is due and the population is under
//!    target, one new pipe appears and the task sleeps for a random
//!    stagger.
//!
//! Finished families queue up in a FIFO. Whenever the total of active and
//! finished families would exceed `max_on_screen`, the oldest finished
//! family fades out.

use crate::{
    config::SpawnerConfig,
    family::{FamilySignal, FinishedHandler, SubscriptionId},
    forest::PipeForest,
    mesh::Mesh,
    pipe::{Growth, PipeBranch},
    types::BranchId,
};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{cell::RefCell, collections::VecDeque, fmt, rc::Rc};

pub struct PipeSpawner {
    config: SpawnerConfig,
    forest: PipeForest,
    rng: StdRng,

    active: usize,
    finished: VecDeque<BranchId>,
    paused: bool,

    clock: f32,
    /// When the spawn task wakes next. `None` while the task is stopped.
    next_spawn_at: Option<f32>,

    /// Finished events land here from the family signals and are handled
    /// once the firing branch is back in the forest.
    inbox: Rc<RefCell<Vec<BranchId>>>,
    subscriptions: Vec<(FamilySignal, SubscriptionId)>,
    listeners: Vec<FinishedHandler>,
}

impl fmt::Debug for PipeSpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSpawner")
            .field("active", &self.active)
            .field("finished", &self.finished)
            .field("paused", &self.paused)
            .field("branches", &self.forest.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl PipeSpawner {
    /// Creates a spawner seeded from the thread RNG. The first pipe appears
    /// on the first tick.
    pub fn new(config: SpawnerConfig) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`PipeSpawner::new`] with a fixed seed.
    pub fn with_seed(config: SpawnerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SpawnerConfig, rng: StdRng) -> Self {
        let mut spawner = Self {
            config: config.clamped(),
            forest: PipeForest::new(),
            rng,
            active: 0,
            finished: VecDeque::new(),
            paused: false,
            clock: 0.0,
            next_spawn_at: None,
            inbox: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Vec::new(),
            listeners: Vec::new(),
        };
        spawner.start_spawn_loop();
        spawner
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn forest(&self) -> &PipeForest {
        &self.forest
    }

    /// Every live branch, growing, finished or fading.
    pub fn branches(&self) -> impl Iterator<Item = &PipeBranch> {
        self.forest.iter()
    }

    /// Families still growing.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Finished families still on screen and not yet fading.
    pub fn finished_count(&self) -> usize {
        self.finished.len()
    }

    /// Finished families, oldest first.
    pub fn finished(&self) -> impl Iterator<Item = BranchId> + '_ {
        self.finished.iter().copied()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Simulated seconds since creation.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Registers a listener called with the finishing branch id whenever a
    /// family finishes, after the spawner's own bookkeeping.
    pub fn on_finished(&mut self, listener: impl FnMut(BranchId) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs one frame of `dt` simulated seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt;

        for id in self.forest.ids() {
            // Taken out so the rest of the forest can serve as its scene.
            let Some(mut branch) = self.forest.remove(id) else {
                continue;
            };
            let growth = branch.advance(dt, &self.forest, &mut self.rng);

            if branch.advance_fade(dt) {
                info!("released branch {id}");
            } else {
                self.forest.restore(branch);
            }

            if let Growth::Split(child) = growth {
                self.adopt(id, *child);
            }
            self.dispatch_finished();
        }

        self.run_spawn_task();
    }

    /// Links a split-off child below `parent` and starts it. A child that
    /// splits again on its first decision is handled the same way.
    fn adopt(&mut self, parent: BranchId, child: PipeBranch) {
        let mut pending = Some((parent, child));
        while let Some((parent, child)) = pending.take() {
            let id = self.forest.add_child(parent, child);
            let Some(mut branch) = self.forest.remove(id) else {
                break;
            };
            let growth = branch.start(&self.forest, &mut self.rng);
            self.forest.restore(branch);

            if let Growth::Split(next) = growth {
                pending = Some((id, *next));
            }
        }
    }

    /// Starts the spawn task unless it is already waiting.
    fn start_spawn_loop(&mut self) {
        if self.next_spawn_at.is_none() {
            self.next_spawn_at = Some(self.clock);
        }
    }

    fn run_spawn_task(&mut self) {
        let Some(due) = self.next_spawn_at else {
            return;
        };
        if self.clock < due {
            return;
        }
        if self.paused || self.active >= self.config.desired_active {
            self.next_spawn_at = None;
            return;
        }

        let (lo, hi) = self.config.spawn_delay;
        self.next_spawn_at = Some(self.clock + self.rng.random_range(lo..=hi));
        self.spawn_pipe();
    }

    /// Creates, registers and starts a new root branch.
    fn spawn_pipe(&mut self) -> BranchId {
        // Make room for the newcomer first.
        self.clear_pipes(1);

        let cfg = self.config;
        let position = cfg.bounds.random_point(&mut self.rng);
        let mut mesh = Mesh::cube(cfg.pipe_size).with_origin(position);
        mesh.set_material(cfg.material);

        let turns = self.rng.random_range(cfg.min_turns..=cfg.max_turns);
        let branch = PipeBranch::new(mesh, cfg.pipe_config(turns));

        let inbox = Rc::clone(&self.inbox);
        let subscription = branch
            .family()
            .subscribe(move |id| inbox.borrow_mut().push(id));
        self.subscriptions
            .push((branch.family().clone(), subscription));

        let id = self.forest.insert(branch);
        self.active += 1;
        info!(
            "spawned pipe {id} at {position:?} with {turns} turns ({} active)",
            self.active
        );

        if let Some(mut branch) = self.forest.remove(id) {
            let growth = branch.start(&self.forest, &mut self.rng);
            self.forest.restore(branch);
            if let Growth::Split(child) = growth {
                self.adopt(id, *child);
            }
        }
        self.dispatch_finished();
        id
    }

    /// Handles every queued finished event, including ones raised while
    /// handling earlier events.
    fn dispatch_finished(&mut self) {
        loop {
            let events = std::mem::take(&mut *self.inbox.borrow_mut());
            if events.is_empty() {
                break;
            }
            for id in events {
                self.on_pipe_finished(id);
            }
        }
    }

    fn on_pipe_finished(&mut self, id: BranchId) {
        self.subscriptions.retain(|(signal, subscription)| {
            if signal.has_fired() {
                signal.unsubscribe(*subscription);
                false
            } else {
                true
            }
        });

        self.active = self.active.saturating_sub(1);
        self.finished.push_back(id);
        debug!(
            "pipe {id} finished ({} active, {} finished)",
            self.active,
            self.finished.len()
        );
        self.clear_pipes(0);

        for listener in self.listeners.iter_mut() {
            listener(id);
        }

        if !self.paused && self.active < self.config.desired_active {
            self.start_spawn_loop();
        }
    }

    /// Fades the oldest finished families until `reserve` more active pipes
    /// would fit under `max_on_screen`.
    fn clear_pipes(&mut self, reserve: usize) {
        while self.active + reserve + self.finished.len() > self.config.max_on_screen {
            let Some(id) = self.finished.pop_front() else {
                break;
            };
            self.fade_family(id);
        }
    }

    /// Fades the whole family of `id` right away.
    ///
    /// A family still growing is ended first, so it is counted as finished
    /// and its slot gets refilled. The family leaves the finished queue.
    pub fn fade_out(&mut self, id: BranchId) {
        let leaf = self.forest.newest_descendant(id);
        if self.forest.get(leaf).is_some_and(|b| !b.is_paused()) {
            self.end_family(leaf);
        }

        let members = self.forest.family_members(id);
        self.finished.retain(|f| !members.contains(f));
        self.fade_family(id);
    }

    /// Fades the whole family of `id` as one unit, root included.
    fn fade_family(&mut self, id: BranchId) {
        let members = self.forest.family_members(id);
        info!("fading family of pipe {id} ({} objects)", members.len());

        let SpawnerConfig {
            fade_time,
            fade_material,
            ..
        } = self.config;
        for member in members {
            if let Some(branch) = self.forest.get_mut(member) {
                branch.fade_out(fade_time, 0.0, fade_material);
            }
        }
    }

    /// Ends the family of `id` at its newest branch.
    fn end_family(&mut self, id: BranchId) {
        let leaf = self.forest.newest_descendant(id);
        if let Some(branch) = self.forest.get_mut(leaf) {
            branch.end();
        }
        self.dispatch_finished();
    }

    /// Ids of the branches currently carrying growth, one per active family.
    fn growing_ids(&self) -> Vec<BranchId> {
        self.forest
            .iter()
            .filter(|b| !b.is_paused())
            .map(PipeBranch::id)
            .collect()
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Pausing drops every branch's speed to zero; resuming restores the
    /// configured speed and refills the population.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        info!("{}", if paused { "paused" } else { "resumed" });
        self.propagate_speed();

        if !paused && self.active < self.config.desired_active {
            self.start_spawn_loop();
        }
    }

    fn propagate_speed(&mut self) {
        let speed = if self.paused {
            0.0
        } else {
            self.config.pipe_speed
        };
        for branch in self.forest.iter_mut() {
            branch.set_speed(speed);
        }
    }

    /// Changes the target number of growing families.
    ///
    /// Lowering it ends exactly the excess families right away. Raising it
    /// wakes the spawn task.
    pub fn set_desired_active(&mut self, desired: usize) {
        let desired = desired.max(1);
        self.config.desired_active = desired;
        self.config.max_on_screen = self.config.max_on_screen.max(desired);

        if self.active > desired {
            let excess = self.active - desired;
            for id in self.growing_ids().into_iter().take(excess) {
                self.end_family(id);
            }
        }
        self.clear_pipes(0);

        if !self.paused && self.active < desired {
            self.start_spawn_loop();
        }
    }

    /// Clamped to at least the desired active count.
    pub fn set_max_on_screen(&mut self, max: usize) {
        self.config.max_on_screen = max.max(self.config.desired_active);
        self.clear_pipes(0);
        if !self.paused && self.active < self.config.desired_active {
            self.start_spawn_loop();
        }
    }

    /// Sets the growth speed for new and live branches. While paused the
    /// value is stored and applied on resume.
    pub fn set_speed(&mut self, speed: f32) {
        self.config.pipe_speed = speed.max(0.0);
        if !self.paused {
            self.propagate_speed();
        }
    }

    /// Ends every growing family. Replacements spawn as usual.
    pub fn reset(&mut self) {
        info!("reset");
        for id in self.growing_ids() {
            self.end_family(id);
        }
    }
}
