//! Per-actor orchestration of looping and one-shot animations
//!
//! An [`AnimationSet`] wires every animation a model offers into one root
//! [`BlendController`]: a fixed group of looping slots blended from the
//! actor's movement, plus one-shot animations of which at most one plays at
//! a time. Each frame it arbitrates the one-shots, eases the looping
//! weights, schedules idle entertainment and advances the blend tree.

use crate::config::AnimationSetConfig;
use crate::controller::{BlendController, SimpleController};
use crate::instance::AnimationInstance;
use crate::rig::Rig;
use crate::weights::{ease_weight, LoopedWeights};
use armature_core::FrameTime;
use glam::Mat4;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Looping animations, in the order they join the blend tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopSlot {
    Idle,
    IdleWhileOpen,
    Produce,
    ProduceWhileOpen,
    Forward,
    Backwards,
    Left,
    Right,
    Inspect,
    Beam,
    Scan,
}

impl LoopSlot {
    pub const ALL: [LoopSlot; 11] = [
        LoopSlot::Idle,
        LoopSlot::IdleWhileOpen,
        LoopSlot::Produce,
        LoopSlot::ProduceWhileOpen,
        LoopSlot::Forward,
        LoopSlot::Backwards,
        LoopSlot::Left,
        LoopSlot::Right,
        LoopSlot::Inspect,
        LoopSlot::Beam,
        LoopSlot::Scan,
    ];

    /// Slots that share one normalized weight budget
    const NORMALIZED: [LoopSlot; 8] = [
        LoopSlot::Idle,
        LoopSlot::Forward,
        LoopSlot::Backwards,
        LoopSlot::Right,
        LoopSlot::Left,
        LoopSlot::Inspect,
        LoopSlot::Beam,
        LoopSlot::Scan,
    ];

    pub fn animation_name(self) -> &'static str {
        match self {
            LoopSlot::Idle => "idle",
            LoopSlot::IdleWhileOpen => "idlewhileopen",
            LoopSlot::Produce => "produce",
            LoopSlot::ProduceWhileOpen => "producewhileopen",
            LoopSlot::Forward => "forward",
            LoopSlot::Backwards => "backwards",
            LoopSlot::Left => "left",
            LoopSlot::Right => "right",
            LoopSlot::Inspect => "inspect",
            LoopSlot::Beam => "beam",
            LoopSlot::Scan => "scan",
        }
    }

    // Action loops always start from their first frame
    fn random_start(self) -> bool {
        !matches!(self, LoopSlot::Inspect | LoopSlot::Beam | LoopSlot::Scan)
    }
}

/// One-shot animation families, in arbitration priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneShotKind {
    Close,
    Open,
    IdleClose,
    IdleOpen,
    ProduceClose,
    ProduceOpen,
    Jump,
    Land,
    CursorReact,
    Rocket,
    Happy,
    Surprise,
    Fear,
    Excitement,
    Anger,
    Sadness,
    Dizziness,
    RapidFire,
    Eat,
    Kick,
    Grabbing,
    Throw,
    Give,
    Drop,
    Entertainment,
}

impl OneShotKind {
    pub const ALL: [OneShotKind; 25] = [
        OneShotKind::Close,
        OneShotKind::Open,
        OneShotKind::IdleClose,
        OneShotKind::IdleOpen,
        OneShotKind::ProduceClose,
        OneShotKind::ProduceOpen,
        OneShotKind::Jump,
        OneShotKind::Land,
        OneShotKind::CursorReact,
        OneShotKind::Rocket,
        OneShotKind::Happy,
        OneShotKind::Surprise,
        OneShotKind::Fear,
        OneShotKind::Excitement,
        OneShotKind::Anger,
        OneShotKind::Sadness,
        OneShotKind::Dizziness,
        OneShotKind::RapidFire,
        OneShotKind::Eat,
        OneShotKind::Kick,
        OneShotKind::Grabbing,
        OneShotKind::Throw,
        OneShotKind::Give,
        OneShotKind::Drop,
        OneShotKind::Entertainment,
    ];

    /// Name of the first variant; later variants append 2, 3, ...
    pub fn animation_name(self) -> &'static str {
        match self {
            OneShotKind::Close => "close",
            OneShotKind::Open => "open",
            OneShotKind::IdleClose => "idleclose",
            OneShotKind::IdleOpen => "idleopen",
            OneShotKind::ProduceClose => "produceclose",
            OneShotKind::ProduceOpen => "produceopen",
            OneShotKind::Jump => "jump",
            OneShotKind::Land => "land",
            OneShotKind::CursorReact => "cursorreact",
            OneShotKind::Rocket => "rocket",
            OneShotKind::Happy => "happy",
            OneShotKind::Surprise => "surprise",
            OneShotKind::Fear => "fear",
            OneShotKind::Excitement => "excitement",
            OneShotKind::Anger => "anger",
            OneShotKind::Sadness => "sadness",
            OneShotKind::Dizziness => "dizziness",
            OneShotKind::RapidFire => "rapidfire",
            OneShotKind::Eat => "eat",
            OneShotKind::Kick => "kick",
            OneShotKind::Grabbing => "grabbing",
            OneShotKind::Throw => "throw",
            OneShotKind::Give => "give",
            OneShotKind::Drop => "drop",
            OneShotKind::Entertainment => "entertainment",
        }
    }
}

/// Action loops blended in on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLoop {
    Inspect,
    Beam,
    Scan,
}

impl ActionLoop {
    fn slot(self) -> LoopSlot {
        match self {
            ActionLoop::Inspect => LoopSlot::Inspect,
            ActionLoop::Beam => LoopSlot::Beam,
            ActionLoop::Scan => LoopSlot::Scan,
        }
    }
}

/// Something the host may want to react to, usually with a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCue {
    /// Entertainment variant index, starting at 0
    Entertainment(usize),
    Jump,
    CursorReact,
    Shoot,
    RapidFire,
    Open,
    Close,
}

/// Per-frame input from the actor's movement and actions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationDrive {
    /// Target weights for the movement loops
    pub looped: LoopedWeights,
    pub action: Option<ActionLoop>,
    pub start_jump: bool,
    pub start_land: bool,
}

/// All animation state of one actor.
///
/// A model without an `idle` animation gets an inert set: it still exposes
/// the bind-pose palette, but `update` and the starters do nothing.
#[derive(Debug)]
pub struct AnimationSet {
    instance: Option<AnimationInstance>,
    config: AnimationSetConfig,
    rng: StdRng,

    loops: [usize; LoopSlot::ALL.len()],
    one_shots: Vec<Vec<usize>>,
    all_one_shots: Vec<usize>,
    has_idle_while_open: bool,

    one_shot_active: bool,
    is_open: bool,
    /// 0 = idle, 1 = produce
    idle_produce_blend: f32,

    last_non_idle_time: Option<f64>,
    wait_time: f32,
    idle_ticks: i64,
    idle_ticks_at_entertainment: Option<i64>,
    backwards_attenuation: f32,

    cues: Vec<AnimationCue>,
}

impl AnimationSet {
    pub fn new(rig: Arc<Rig>, config: AnimationSetConfig) -> Self {
        Self::with_rng(rig, config, StdRng::from_os_rng())
    }

    /// Build with a caller-provided random source
    pub fn with_rng(rig: Arc<Rig>, config: AnimationSetConfig, rng: StdRng) -> Self {
        let mut set = Self {
            instance: AnimationInstance::try_make(rig),
            config,
            rng,
            loops: [0; LoopSlot::ALL.len()],
            one_shots: vec![Vec::new(); OneShotKind::ALL.len()],
            all_one_shots: Vec::new(),
            has_idle_while_open: false,
            one_shot_active: false,
            is_open: true,
            idle_produce_blend: 0.0,
            last_non_idle_time: None,
            wait_time: 0.0,
            idle_ticks: 0,
            idle_ticks_at_entertainment: None,
            backwards_attenuation: 1.0,
            cues: Vec::new(),
        };
        set.wait_time = set.next_wait_time();
        set.wire();
        set
    }

    fn wire(&mut self) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if !instance.has_animation(LoopSlot::Idle.animation_name()) {
            debug!("Model has no idle animation, animation set is inert");
            return;
        }

        let mut root = BlendController::new("animation_set");
        for slot in LoopSlot::ALL {
            let backup = (slot != LoopSlot::Idle).then_some(LoopSlot::Idle.animation_name());
            let Some(mut controller) = instance.try_make_controller(slot.animation_name(), backup)
            else {
                continue;
            };
            if self.config.randomize_loop_start && slot.random_start() {
                controller.set_to_random(&mut self.rng);
            }
            controller.set_weight(if slot == LoopSlot::Idle { 1.0 } else { 0.0 });
            self.loops[slot as usize] = root.add(controller);
        }

        self.has_idle_while_open = instance.has_animation(LoopSlot::IdleWhileOpen.animation_name());

        for kind in OneShotKind::ALL {
            let base = kind.animation_name();
            for variant in 1.. {
                let name = if variant == 1 {
                    base.to_string()
                } else {
                    format!("{base}{variant}")
                };
                let Some(animation) = instance.find_animation(&name) else {
                    break;
                };
                let mut controller = SimpleController::new(Arc::clone(animation));
                controller.set_to_end();
                controller.set_looping(false);
                controller.set_weight(0.0);
                let child = root.add(controller);
                self.one_shots[kind as usize].push(child);
                self.all_one_shots.push(child);
            }
        }

        debug!(
            "Animation set wired: {} looping slots, {} one-shot variants",
            LoopSlot::ALL.len(),
            self.all_one_shots.len()
        );
        instance.set_controller(root);
    }

    /// False for the inert set of a model without idle
    pub fn is_active(&self) -> bool {
        self.root().is_some()
    }

    pub fn config(&self) -> &AnimationSetConfig {
        &self.config
    }

    pub fn instance(&self) -> Option<&AnimationInstance> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut AnimationInstance> {
        self.instance.as_mut()
    }

    /// Skinning palette for this frame; empty when the model is not animated
    pub fn palette(&mut self) -> &[Mat4] {
        match self.instance.as_mut() {
            Some(instance) => instance.palette(),
            None => &[],
        }
    }

    pub fn world_transform(&mut self, bone: usize) -> Option<Mat4> {
        self.instance.as_mut()?.world_transform(bone)
    }

    pub fn one_shot_active(&self) -> bool {
        self.one_shot_active
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Only meant for initialization; later changes go through the open and
    /// close starters.
    pub fn set_is_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    pub fn idle_produce_blend(&self) -> f32 {
        self.idle_produce_blend
    }

    pub fn set_idle_produce_blend(&mut self, blend: f32) {
        self.idle_produce_blend = blend.clamp(0.0, 1.0);
    }

    pub fn loop_controller(&self, slot: LoopSlot) -> Option<&SimpleController> {
        self.simple(self.loops[slot as usize])
    }

    pub fn loop_weight(&self, slot: LoopSlot) -> f32 {
        self.loop_controller(slot).map_or(0.0, |c| c.weight())
    }

    /// Number of variants found for a one-shot kind
    pub fn one_shot_variants(&self, kind: OneShotKind) -> usize {
        self.one_shots[kind as usize].len()
    }

    pub fn one_shot_controller(&self, kind: OneShotKind, variant: usize) -> Option<&SimpleController> {
        let child = *self.one_shots[kind as usize].get(variant)?;
        self.simple(child)
    }

    /// Take every cue recorded since the last call
    pub fn drain_cues(&mut self) -> Vec<AnimationCue> {
        std::mem::take(&mut self.cues)
    }

    /// Reset to open, idle at full weight and every one-shot parked.
    pub fn init_defaults(&mut self) {
        self.is_open = true;
        self.one_shot_active = false;
        for slot in LoopSlot::ALL {
            let weight = if slot == LoopSlot::Idle { 1.0 } else { 0.0 };
            if let Some(c) = self.loop_mut(slot) {
                c.set_weight(weight);
                c.set_looping(true);
            }
        }
        for i in 0..self.all_one_shots.len() {
            if let Some(c) = self.simple_mut(self.all_one_shots[i]) {
                c.set_weight(0.0);
                c.set_looping(false);
            }
        }
    }

    /// Advance one frame.
    pub fn update(&mut self, frame: &FrameTime, drive: &AnimationDrive) {
        if !self.is_active() {
            return;
        }

        if drive.start_jump {
            self.start_jump();
        }
        if drive.start_land {
            self.start_land();
        }

        for action in [ActionLoop::Inspect, ActionLoop::Beam, ActionLoop::Scan] {
            let slot = action.slot();
            if drive.action == Some(action) {
                self.ease_loop(slot, 1.0, frame);
            } else if self.loop_weight(slot) > 0.0 {
                self.ease_loop(slot, 0.0, frame);
            }
        }

        self.arbitrate_one_shots();

        if self.one_shot_active {
            for slot in LoopSlot::ALL {
                self.set_loop_weight(slot, 0.0);
            }
        } else {
            self.blend_looped(&drive.looped, frame);
        }

        self.schedule_entertainment(frame);

        if self.has_idle_while_open {
            self.substitute_open_idle();
        }

        let delta = frame.delta_ticks();
        if let Some(root) = self.root_mut() {
            root.update(delta);
        }
        // Weights moved even when the clock did not (paused frames)
        if let Some(instance) = self.instance.as_mut() {
            instance.invalidate();
        }
    }

    fn arbitrate_one_shots(&mut self) {
        let was_active = self.one_shot_active;
        self.one_shot_active = false;
        if self.all_one_shots.is_empty() {
            return;
        }

        for i in 0..self.all_one_shots.len() {
            self.set_child_weight(self.all_one_shots[i], 0.0);
        }

        // Without an idle-while-open animation, closed means holding the
        // last frame of the close animation.
        let close = self.one_shots[OneShotKind::Close as usize].first().copied();
        match close {
            Some(close) if !self.is_open && !self.has_idle_while_open => {
                self.set_child_weight(close, 1.0);
                self.one_shot_active = true;
            }
            _ => {
                let playing = self
                    .all_one_shots
                    .iter()
                    .copied()
                    .find(|&child| self.simple(child).is_some_and(|c| !c.at_end()));
                if let Some(child) = playing {
                    self.set_child_weight(child, 1.0);
                    self.one_shot_active = true;
                }
            }
        }

        if was_active && !self.one_shot_active {
            debug!("One-shot finished, restarting looping animations");
            for slot in LoopSlot::ALL {
                let weight = if slot == LoopSlot::Idle { 1.0 } else { 0.0 };
                if let Some(c) = self.loop_mut(slot) {
                    c.set_weight(weight);
                    c.set_to_begin();
                }
            }
        }
    }

    fn blend_looped(&mut self, targets: &LoopedWeights, frame: &FrameTime) {
        self.ease_loop(LoopSlot::Idle, targets.idle, frame);
        self.ease_loop(LoopSlot::Forward, targets.forward, frame);
        self.ease_loop(LoopSlot::Backwards, targets.backwards, frame);
        self.ease_loop(LoopSlot::Right, targets.right, frame);
        self.ease_loop(LoopSlot::Left, targets.left, frame);

        // Damp backwards (used as wind by some models) ahead of an
        // entertainment animation, moving the lost weight to idle.
        let backwards = self.loop_weight(LoopSlot::Backwards);
        let damped = backwards * self.backwards_attenuation;
        self.set_loop_weight(LoopSlot::Backwards, damped);
        let idle = self.loop_weight(LoopSlot::Idle);
        self.set_loop_weight(LoopSlot::Idle, idle + (backwards - damped).clamp(0.0, 1.0));

        let sum: f32 = LoopSlot::NORMALIZED
            .iter()
            .map(|&slot| self.loop_weight(slot))
            .sum();
        if sum == 0.0 {
            warn!("Looping animation weights sum to zero");
        } else if sum != 1.0 {
            for slot in LoopSlot::NORMALIZED {
                let w = self.loop_weight(slot);
                self.set_loop_weight(slot, w / sum);
            }
        }
    }

    fn schedule_entertainment(&mut self, frame: &FrameTime) {
        let Some(idle) = self.loop_controller(LoopSlot::Idle) else {
            return;
        };
        let idle_now = idle.current_ticks();
        let idle_duration = idle.duration();

        // Backwards counts as idle since some models use it for wind
        let is_idle = self.loop_weight(LoopSlot::Idle) + self.loop_weight(LoopSlot::Backwards)
            > self.config.idle_threshold;

        match self.idle_ticks_at_entertainment {
            Some(start) => {
                self.backwards_attenuation = if idle_now < start {
                    0.0
                } else if idle_duration > start {
                    ((idle_duration - idle_now) as f32 / (idle_duration - start) as f32)
                        .clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }
            None if is_idle => {
                let t = frame.delta_seconds;
                self.backwards_attenuation += (1.0 - self.backwards_attenuation) * t;
            }
            None => {}
        }

        let last_non_idle = *self.last_non_idle_time.get_or_insert(frame.total_seconds);
        let elapsed = (frame.total_seconds - last_non_idle) as f32;

        // Waited long enough; hold off until idle wraps to avoid a pop
        if is_idle && elapsed > self.wait_time && self.idle_ticks_at_entertainment.is_none() {
            self.idle_ticks_at_entertainment = Some(idle_now);
        }

        if is_idle {
            if elapsed > self.wait_time && self.idle_ticks > idle_now {
                self.start_entertainment();
                self.idle_ticks_at_entertainment = None;
                self.wait_time = self.next_wait_time();
            }
        } else {
            self.last_non_idle_time = Some(frame.total_seconds);
        }
        self.idle_ticks = idle_now;
    }

    fn substitute_open_idle(&mut self) {
        let weight = self.loop_weight(LoopSlot::Idle);
        for slot in [
            LoopSlot::Idle,
            LoopSlot::IdleWhileOpen,
            LoopSlot::Produce,
            LoopSlot::ProduceWhileOpen,
        ] {
            self.set_loop_weight(slot, 0.0);
        }
        if weight > 0.0 {
            let produce = self.idle_produce_blend;
            let (idle_slot, produce_slot) = if self.is_open {
                (LoopSlot::IdleWhileOpen, LoopSlot::ProduceWhileOpen)
            } else {
                (LoopSlot::Idle, LoopSlot::Produce)
            };
            self.set_loop_weight(idle_slot, (1.0 - produce) * weight);
            self.set_loop_weight(produce_slot, produce * weight);
        }
    }

    pub fn start_entertainment(&mut self) {
        if let Some(index) = self.try_start(OneShotKind::Entertainment) {
            self.cues.push(AnimationCue::Entertainment(index));
        }
    }

    pub fn start_jump(&mut self) {
        if self.try_start(OneShotKind::Jump).is_some() {
            self.cues.push(AnimationCue::Jump);
        }
    }

    pub fn start_land(&mut self) {
        self.try_start(OneShotKind::Land);
    }

    pub fn start_cursor_react(&mut self) {
        if self.try_start(OneShotKind::CursorReact).is_some() {
            self.cues.push(AnimationCue::CursorReact);
        }
    }

    /// Start a rocket. If a rocket is already playing it turns into rapid
    /// fire; if rapid fire is playing it runs one more loop.
    pub fn start_rocket(&mut self) {
        if self.one_shot_variants(OneShotKind::Rocket) == 0 {
            return;
        }
        if !self.one_shot_active {
            self.try_start(OneShotKind::Rocket);
        } else if let Some(rocket) = self.first_playing(OneShotKind::Rocket) {
            if let Some(c) = self.simple_mut(rocket) {
                c.set_to_end();
            }
            self.one_shot_active = false;
            self.start_rapid_fire();
        } else if let Some(rapid) = self.first_playing(OneShotKind::RapidFire) {
            if let Some(c) = self.simple_mut(rapid) {
                c.set_one_more_loop(true);
            }
        }
        self.cues.push(AnimationCue::Shoot);
    }

    /// Start rapid fire, or extend the one already playing by a loop.
    pub fn start_rapid_fire(&mut self) {
        if self.one_shot_variants(OneShotKind::RapidFire) == 0 {
            return;
        }
        if self.one_shot_active {
            for i in 0..self.one_shots[OneShotKind::RapidFire as usize].len() {
                let child = self.one_shots[OneShotKind::RapidFire as usize][i];
                if let Some(c) = self.simple_mut(child) {
                    if c.weight() == 1.0 {
                        c.set_one_more_loop(true);
                    }
                }
            }
        } else {
            self.try_start(OneShotKind::RapidFire);
        }
        self.cues.push(AnimationCue::RapidFire);
    }

    pub fn start_happy(&mut self) {
        self.try_start(OneShotKind::Happy);
    }

    pub fn start_surprise(&mut self) {
        self.try_start(OneShotKind::Surprise);
    }

    pub fn start_fear(&mut self) {
        self.try_start(OneShotKind::Fear);
    }

    pub fn start_excitement(&mut self) {
        self.try_start(OneShotKind::Excitement);
    }

    pub fn start_anger(&mut self) {
        self.try_start(OneShotKind::Anger);
    }

    pub fn start_sadness(&mut self) {
        self.try_start(OneShotKind::Sadness);
    }

    pub fn start_dizziness(&mut self) {
        self.try_start(OneShotKind::Dizziness);
    }

    pub fn start_eat(&mut self) {
        self.try_start(OneShotKind::Eat);
    }

    pub fn start_kick(&mut self) {
        self.try_start(OneShotKind::Kick);
    }

    pub fn start_grabbing(&mut self) {
        self.try_start(OneShotKind::Grabbing);
    }

    pub fn start_throw(&mut self) {
        self.try_start(OneShotKind::Throw);
    }

    pub fn start_give(&mut self) {
        self.try_start(OneShotKind::Give);
    }

    pub fn start_drop(&mut self) {
        self.try_start(OneShotKind::Drop);
    }

    /// Open, stopping whatever one-shot is playing.
    pub fn start_open(&mut self) {
        let variant = if self.idle_produce_blend < 0.5 {
            OneShotKind::IdleOpen
        } else {
            OneShotKind::ProduceOpen
        };
        for kind in [OneShotKind::Open, variant] {
            if self.preempt(kind) {
                self.is_open = true;
                self.cues.push(AnimationCue::Open);
            }
        }
    }

    /// Close, stopping whatever one-shot is playing.
    pub fn start_close(&mut self) {
        let variant = if self.idle_produce_blend < 0.5 {
            OneShotKind::IdleClose
        } else {
            OneShotKind::ProduceClose
        };
        for kind in [OneShotKind::Close, variant] {
            if self.preempt(kind) {
                self.is_open = false;
                self.cues.push(AnimationCue::Close);
            }
        }
    }

    /// Start the one-shot at `index` in registration order.
    pub fn start_one_shot(&mut self, index: usize) {
        if self.one_shot_active {
            return;
        }
        if let Some(&child) = self.all_one_shots.get(index) {
            self.stop_any_one_shot();
            if let Some(c) = self.simple_mut(child) {
                c.set_to_begin();
            }
        }
    }

    /// Park the first open (or close) animation on its last frame.
    pub fn set_open_close_to_end(&mut self, open: bool) {
        let kind = if open {
            OneShotKind::Open
        } else {
            OneShotKind::Close
        };
        if let Some(&child) = self.one_shots[kind as usize].first() {
            if let Some(c) = self.simple_mut(child) {
                c.set_to_end();
            }
        }
    }

    /// Send every one-shot to its end.
    pub fn stop_any_one_shot(&mut self) {
        if !self.one_shot_active {
            return;
        }
        for i in 0..self.all_one_shots.len() {
            if let Some(c) = self.simple_mut(self.all_one_shots[i]) {
                c.set_to_end();
            }
        }
        self.one_shot_active = false;
    }

    // Start a random variant of `kind` unless a one-shot is already playing
    fn try_start(&mut self, kind: OneShotKind) -> Option<usize> {
        if self.one_shot_active {
            return None;
        }
        let index = self.begin_random_variant(kind);
        if index.is_none() {
            debug!("No '{}' animation to start", kind.animation_name());
        }
        index
    }

    // Start a random variant of `kind` after stopping any playing one-shot
    fn preempt(&mut self, kind: OneShotKind) -> bool {
        if self.one_shot_variants(kind) == 0 {
            return false;
        }
        self.stop_any_one_shot();
        self.begin_random_variant(kind).is_some()
    }

    fn begin_random_variant(&mut self, kind: OneShotKind) -> Option<usize> {
        let count = self.one_shot_variants(kind);
        if count == 0 {
            return None;
        }
        let index = self.rng.random_range(0..count);
        let child = self.one_shots[kind as usize][index];
        let c = self.simple_mut(child)?;
        c.set_to_begin();
        debug!("Starting one-shot '{}'", c.animation_name());
        Some(index)
    }

    fn first_playing(&self, kind: OneShotKind) -> Option<usize> {
        self.one_shots[kind as usize]
            .iter()
            .copied()
            .find(|&child| self.simple(child).is_some_and(|c| !c.at_end()))
    }

    fn next_wait_time(&mut self) -> f32 {
        self.config.min_entertainment_wait
            + self.config.entertainment_wait_jitter * self.rng.random::<f32>()
    }

    fn ease_loop(&mut self, slot: LoopSlot, target: f32, frame: &FrameTime) {
        let current = self.loop_weight(slot);
        let eased = ease_weight(current, target, frame, &self.config);
        self.set_loop_weight(slot, eased);
    }

    fn set_loop_weight(&mut self, slot: LoopSlot, weight: f32) {
        self.set_child_weight(self.loops[slot as usize], weight);
    }

    fn set_child_weight(&mut self, child: usize, weight: f32) {
        if let Some(c) = self.simple_mut(child) {
            c.set_weight(weight);
        }
    }

    fn loop_mut(&mut self, slot: LoopSlot) -> Option<&mut SimpleController> {
        self.simple_mut(self.loops[slot as usize])
    }

    fn root(&self) -> Option<&BlendController> {
        self.instance.as_ref()?.controller()?.as_blend()
    }

    fn root_mut(&mut self) -> Option<&mut BlendController> {
        self.instance.as_mut()?.controller_mut()?.as_blend_mut()
    }

    fn simple(&self, child: usize) -> Option<&SimpleController> {
        self.root()?.child(child)?.as_simple()
    }

    fn simple_mut(&mut self, child: usize) -> Option<&mut SimpleController> {
        self.root_mut()?.child_mut(child)?.as_simple_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{init_logging, rig_with_names};
    use armature_core::TICKS_PER_SECOND;

    fn quiet_config() -> AnimationSetConfig {
        AnimationSetConfig {
            randomize_loop_start: false,
            min_entertainment_wait: 1000.0,
            ..Default::default()
        }
    }

    fn make_set(names: &[&str], config: AnimationSetConfig) -> AnimationSet {
        AnimationSet::with_rng(rig_with_names(names), config, StdRng::seed_from_u64(42))
    }

    /// Quarter-second frames starting at `total`
    fn run(set: &mut AnimationSet, frames: usize, total: &mut f64) {
        for _ in 0..frames {
            *total += 0.25;
            set.update(&FrameTime::new(0.25, *total), &AnimationDrive::default());
        }
    }

    fn loop_sum(set: &AnimationSet) -> f32 {
        LoopSlot::NORMALIZED.iter().map(|&s| set.loop_weight(s)).sum()
    }

    #[test]
    fn model_without_idle_is_inert() {
        let mut set = make_set(&["walk"], quiet_config());
        assert!(!set.is_active());
        set.update(&FrameTime::new(0.25, 0.25), &AnimationDrive::default());
        set.start_jump();
        assert!(set.drain_cues().is_empty());
        // Bind pose palette is still available
        assert_eq!(set.palette().len(), 3);
    }

    #[test]
    fn missing_loops_fall_back_to_idle() {
        let set = make_set(&["idle"], quiet_config());
        assert!(set.is_active());
        for slot in LoopSlot::ALL {
            assert_eq!(set.loop_controller(slot).unwrap().animation_name(), "idle");
        }
        assert_eq!(set.loop_weight(LoopSlot::Idle), 1.0);
        assert_eq!(set.loop_weight(LoopSlot::Forward), 0.0);
    }

    #[test]
    fn collects_numbered_variants() {
        let set = make_set(&["idle", "happy", "happy2", "happy3", "happy5"], quiet_config());
        assert_eq!(set.one_shot_variants(OneShotKind::Happy), 3);
        let parked = set.one_shot_controller(OneShotKind::Happy, 2).unwrap();
        assert!(parked.at_end());
        assert!(!parked.looping());
        assert_eq!(parked.weight(), 0.0);
    }

    #[test]
    fn one_shot_suppresses_loops_then_restores_them() {
        init_logging();
        let mut set = make_set(&["idle", "forward", "jump"], quiet_config());
        let mut total = 0.0;
        run(&mut set, 3, &mut total);

        set.start_jump();
        assert_eq!(set.drain_cues(), vec![AnimationCue::Jump]);
        run(&mut set, 1, &mut total);
        assert!(set.one_shot_active());
        assert_eq!(set.one_shot_controller(OneShotKind::Jump, 0).unwrap().weight(), 1.0);
        assert_eq!(loop_sum(&set), 0.0);

        // A one-second jump ends after four quarter-second frames
        run(&mut set, 3, &mut total);
        assert!(set.one_shot_controller(OneShotKind::Jump, 0).unwrap().at_end());

        run(&mut set, 1, &mut total);
        assert!(!set.one_shot_active());
        assert_eq!(set.loop_weight(LoopSlot::Idle), 1.0);
        assert_eq!(set.loop_weight(LoopSlot::Forward), 0.0);
        assert_eq!(set.one_shot_controller(OneShotKind::Jump, 0).unwrap().weight(), 0.0);
        // Restarted from the beginning, then advanced by one frame
        let idle = set.loop_controller(LoopSlot::Idle).unwrap();
        assert_eq!(idle.current_ticks(), TICKS_PER_SECOND / 4);
    }

    #[test]
    fn second_one_shot_waits_for_the_first() {
        let mut set = make_set(&["idle", "jump", "happy"], quiet_config());
        let mut total = 0.0;
        set.start_jump();
        run(&mut set, 1, &mut total);
        set.start_happy();
        assert!(set.one_shot_controller(OneShotKind::Happy, 0).unwrap().at_end());
    }

    #[test]
    fn looping_weights_follow_the_drive_and_stay_normalized() {
        let mut set = make_set(&["idle", "forward", "left"], quiet_config());
        let drive = AnimationDrive {
            looped: LoopedWeights {
                idle: 0.0,
                forward: 0.5,
                backwards: 0.0,
                left: 0.5,
                right: 0.0,
            },
            ..Default::default()
        };
        let mut total = 0.0;
        for _ in 0..30 {
            total += 1.0 / 60.0;
            set.update(&FrameTime::new(1.0 / 60.0, total), &drive);
            assert!((loop_sum(&set) - 1.0).abs() < 1e-4);
        }
        assert!(set.loop_weight(LoopSlot::Idle) < 0.01);
        assert!((set.loop_weight(LoopSlot::Forward) - 0.5).abs() < 0.01);
    }

    #[test]
    fn action_loop_eases_in_and_out() {
        let mut set = make_set(&["idle", "beam"], quiet_config());
        let beam = AnimationDrive {
            action: Some(ActionLoop::Beam),
            ..Default::default()
        };
        set.update(&FrameTime::new(0.5, 0.5), &beam);
        assert!(set.loop_weight(LoopSlot::Beam) > 0.0);
        set.update(&FrameTime::new(0.5, 1.0), &AnimationDrive::default());
        assert_eq!(set.loop_weight(LoopSlot::Beam), 0.0);
    }

    #[test]
    fn rocket_turns_into_rapid_fire_then_extends_it() {
        let mut set = make_set(&["idle", "rocket", "rapidfire"], quiet_config());
        let mut total = 0.0;

        set.start_rocket();
        run(&mut set, 1, &mut total);
        assert_eq!(set.one_shot_controller(OneShotKind::Rocket, 0).unwrap().weight(), 1.0);

        set.start_rocket();
        assert!(set.one_shot_controller(OneShotKind::Rocket, 0).unwrap().at_end());
        assert!(!set.one_shot_controller(OneShotKind::RapidFire, 0).unwrap().at_end());
        run(&mut set, 1, &mut total);
        assert_eq!(set.one_shot_controller(OneShotKind::RapidFire, 0).unwrap().weight(), 1.0);

        set.start_rocket();
        let rapid = set.one_shot_controller(OneShotKind::RapidFire, 0).unwrap();
        assert!(rapid.playback().one_more_loop);
        assert_eq!(
            set.drain_cues(),
            vec![
                AnimationCue::Shoot,
                AnimationCue::RapidFire,
                AnimationCue::Shoot,
                AnimationCue::Shoot,
            ]
        );
    }

    #[test]
    fn close_holds_last_frame_without_idle_while_open() {
        let mut set = make_set(&["idle", "close", "open", "happy"], quiet_config());
        let mut total = 0.0;
        set.start_happy();
        run(&mut set, 1, &mut total);

        set.start_close();
        assert!(!set.is_open());
        assert!(set.one_shot_controller(OneShotKind::Happy, 0).unwrap().at_end());
        run(&mut set, 12, &mut total);
        assert!(set.one_shot_active());
        assert_eq!(set.one_shot_controller(OneShotKind::Close, 0).unwrap().weight(), 1.0);

        set.start_open();
        assert!(set.is_open());
        run(&mut set, 8, &mut total);
        assert!(!set.one_shot_active());
        assert_eq!(
            set.drain_cues(),
            vec![AnimationCue::Close, AnimationCue::Open]
        );
    }

    #[test]
    fn idle_while_open_takes_idle_weight() {
        let mut set = make_set(&["idle", "idlewhileopen", "producewhileopen"], quiet_config());
        let mut total = 0.0;
        run(&mut set, 1, &mut total);
        assert_eq!(set.loop_weight(LoopSlot::Idle), 0.0);
        assert_eq!(set.loop_weight(LoopSlot::IdleWhileOpen), 1.0);

        set.set_idle_produce_blend(0.25);
        set.set_is_open(false);
        run(&mut set, 1, &mut total);
        assert!((set.loop_weight(LoopSlot::Idle) - 0.75).abs() < 1e-5);
        assert!((set.loop_weight(LoopSlot::Produce) - 0.25).abs() < 1e-5);
        assert_eq!(set.loop_weight(LoopSlot::IdleWhileOpen), 0.0);
    }

    #[test]
    fn idle_actor_eventually_plays_entertainment() {
        let config = AnimationSetConfig {
            randomize_loop_start: false,
            min_entertainment_wait: 0.5,
            entertainment_wait_jitter: 0.0,
            ..Default::default()
        };
        let mut set = make_set(&["idle", "entertainment", "entertainment2"], config);
        let mut total = 0.0;
        let mut cues = Vec::new();
        for _ in 0..40 {
            run(&mut set, 1, &mut total);
            cues.extend(set.drain_cues());
            if !cues.is_empty() {
                break;
            }
        }
        assert!(matches!(cues.as_slice(), [AnimationCue::Entertainment(i)] if *i < 2));
        run(&mut set, 1, &mut total);
        assert!(set.one_shot_active());
    }

    #[test]
    fn init_defaults_resets_weights() {
        let mut set = make_set(&["idle", "forward", "jump"], quiet_config());
        set.start_jump();
        set.update(&FrameTime::new(0.1, 0.1), &AnimationDrive::default());
        set.init_defaults();
        assert!(!set.one_shot_active());
        assert!(set.is_open());
        assert_eq!(set.loop_weight(LoopSlot::Idle), 1.0);
        assert_eq!(set.one_shot_controller(OneShotKind::Jump, 0).unwrap().weight(), 0.0);
    }

    #[test]
    fn palette_tracks_the_blend() {
        let mut set = make_set(&["idle"], quiet_config());
        set.update(&FrameTime::new(0.1, 0.1), &AnimationDrive::default());
        assert_eq!(set.palette().len(), 3);
        assert!(set.world_transform(2).is_some());
    }
}
