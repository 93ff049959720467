//! Pointer and keyboard input translated into gameplay messages.
//!
//! | Input                     | Message                              |
//! |---------------------------|--------------------------------------|
//! | Mouse / touch press       | `DragCommand::Begin`                 |
//! | Cursor / touch movement   | `DragCommand::Move`                  |
//! | Mouse / touch release     | `DragCommand::Release`               |
//! | `1`–`6`                   | `SelectPowerUp(Some(..))`            |
//! | `0`                       | `SelectPowerUp(None)`                |
//! | `F`                       | `SelectFlask(next in catalog)`       |
//! | `[` / `]`                 | `SetSolverPrecision(current ∓ 10)`   |

use crate::debug::SetSolverPrecision;
use crate::flask::{ActiveFlask, SelectFlask};
use crate::physics::SolverPrecision;
use crate::powerup::{PowerUpId, SelectPowerUp};
use crate::spawn::DragCommand;
use bevy::prelude::*;

const PRECISION_STEP: u8 = 10;

/// Last pointer x sent, so idle frames send nothing.
#[derive(Resource, Debug, Default)]
pub struct PointerState {
    last_x: Option<f32>,
}

fn world_x(
    cameras: &Query<(&Camera, &GlobalTransform)>,
    screen: Vec2,
) -> Option<f32> {
    let (camera, transform) = cameras.iter().next()?;
    camera
        .viewport_to_world_2d(transform, screen)
        .ok()
        .map(|p| p.x)
}

pub fn pointer_input_system(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerState>,
    mut drag: MessageWriter<DragCommand>,
) {
    // Touch.
    for touch in touches.iter_just_pressed() {
        if let Some(x) = world_x(&cameras, touch.position()) {
            drag.write(DragCommand::Begin { x });
        }
    }
    for touch in touches.iter() {
        if touch.delta() != Vec2::ZERO {
            if let Some(x) = world_x(&cameras, touch.position()) {
                drag.write(DragCommand::Move { x });
            }
        }
    }
    for touch in touches.iter_just_released() {
        if let Some(x) = world_x(&cameras, touch.position()) {
            drag.write(DragCommand::Release { x });
        }
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(x) = window
        .cursor_position()
        .and_then(|cursor| world_x(&cameras, cursor))
    else {
        return;
    };

    if buttons.just_pressed(MouseButton::Left) {
        drag.write(DragCommand::Begin { x });
    } else if pointer.last_x != Some(x) {
        drag.write(DragCommand::Move { x });
    }
    if buttons.just_released(MouseButton::Left) {
        drag.write(DragCommand::Release { x });
    }
    pointer.last_x = Some(x);
}

pub fn keyboard_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    flask: Res<ActiveFlask>,
    precision: Res<SolverPrecision>,
    mut select_power_up: MessageWriter<SelectPowerUp>,
    mut select_flask: MessageWriter<SelectFlask>,
    mut set_precision: MessageWriter<SetSolverPrecision>,
) {
    const POWER_UP_KEYS: [KeyCode; 6] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
    ];
    for (key, id) in POWER_UP_KEYS.iter().zip(PowerUpId::ALL) {
        if keys.just_pressed(*key) {
            select_power_up.write(SelectPowerUp(Some(id)));
        }
    }
    if keys.just_pressed(KeyCode::Digit0) {
        select_power_up.write(SelectPowerUp(None));
    }
    if keys.just_pressed(KeyCode::KeyF) {
        select_flask.write(SelectFlask(flask.id().cycled()));
    }
    if keys.just_pressed(KeyCode::BracketLeft) {
        set_precision.write(SetSolverPrecision(
            precision.slider().saturating_sub(PRECISION_STEP),
        ));
    }
    if keys.just_pressed(KeyCode::BracketRight) {
        set_precision.write(SetSolverPrecision(
            precision.slider().saturating_add(PRECISION_STEP).min(100),
        ));
    }
}
