//! Footstep cadence and playback.

use bevy::prelude::*;

use crate::controls::{ControlSystems, MovementState};
use crate::session::PlayerSession;

pub const WALK_STEP_INTERVAL: f32 = 0.5;
pub const SPRINT_STEP_INTERVAL: f32 = 0.3;

const FOOTSTEP_CLIP: &str = "audio/footstep.ogg";

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footstep {
    pub sprinting: bool,
}

/// Time since the last step while moving.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepTimer {
    elapsed: f32,
}

impl StepTimer {
    /// Advances the timer and returns a step once a full interval has passed.
    ///
    /// Standing still resets it, so the first step after stopping comes one
    /// whole interval after moving again. At most one step per call.
    pub fn tick(&mut self, dt: f32, movement: &MovementState) -> Option<Footstep> {
        if !movement.is_moving {
            self.elapsed = 0.0;
            return None;
        }
        let interval = if movement.is_sprinting {
            SPRINT_STEP_INTERVAL
        } else {
            WALK_STEP_INTERVAL
        };
        self.elapsed += dt;
        if self.elapsed < interval {
            return None;
        }
        self.elapsed = (self.elapsed - interval).min(interval);
        Some(Footstep {
            sprinting: movement.is_sprinting,
        })
    }
}

/// Somewhere footsteps can be played.
pub trait FootstepAudio: Send + Sync + 'static {
    fn play(&self, commands: &mut Commands, step: Footstep);
}

pub struct NullFootstepAudio;

impl FootstepAudio for NullFootstepAudio {
    fn play(&self, _commands: &mut Commands, _step: Footstep) {}
}

/// Plays a one-shot clip per step, a little faster when sprinting.
pub struct ClipFootstepAudio {
    clip: Handle<AudioSource>,
}

impl FootstepAudio for ClipFootstepAudio {
    fn play(&self, commands: &mut Commands, step: Footstep) {
        let speed = if step.sprinting { 1.3 } else { 1.0 };
        commands.spawn((
            AudioPlayer::new(self.clip.clone()),
            PlaybackSettings::DESPAWN.with_speed(speed),
        ));
    }
}

#[derive(Resource)]
pub struct FootstepSink(pub Box<dyn FootstepAudio>);

fn load_footstep_audio(mut commands: Commands, asset_server: Option<Res<AssetServer>>) {
    let sink: Box<dyn FootstepAudio> = match asset_server {
        Some(assets) => Box::new(ClipFootstepAudio {
            clip: assets.load(FOOTSTEP_CLIP),
        }),
        None => Box::new(NullFootstepAudio),
    };
    commands.insert_resource(FootstepSink(sink));
}

fn emit_footsteps(
    time: Res<Time>,
    session: Res<PlayerSession>,
    mut timer: Local<StepTimer>,
    mut steps: MessageWriter<Footstep>,
) {
    if let Some(step) = timer.tick(time.delta_secs(), &session.movement) {
        steps.write(step);
    }
}

fn play_footsteps(
    mut commands: Commands,
    mut steps: MessageReader<Footstep>,
    sink: Option<Res<FootstepSink>>,
) {
    let sink: &dyn FootstepAudio = match &sink {
        Some(sink) => sink.0.as_ref(),
        None => &NullFootstepAudio,
    };
    for step in steps.read() {
        sink.play(&mut commands, *step);
    }
}

pub struct FootstepsPlugin;

impl Plugin for FootstepsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<Footstep>()
            .add_systems(Startup, load_footstep_audio)
            .add_systems(
                Update,
                (emit_footsteps, play_footsteps)
                    .chain()
                    .in_set(ControlSystems::Meters),
            );
    }
}
