//! `GameState` definition and the game-over overlay.
//!
//! ## States
//!
//! | State      | Description                                      |
//! |------------|--------------------------------------------------|
//! | `Playing`  | Initial state; all gameplay systems active       |
//! | `GameOver` | Board frozen; overlay shown until restart         |
//!
//! ## Systems (registered by `GameOverPlugin`)
//!
//! | System                    | Schedule                | Purpose                       |
//! |---------------------------|-------------------------|-------------------------------|
//! | `setup_game_over`         | `OnEnter(GameOver)`     | Spawn the overlay             |
//! | `cleanup_game_over`       | `OnExit(GameOver)`      | Despawn the overlay           |
//! | `game_over_button_system` | `Update / in GameOver`  | Play Again / Quit / Enter key |

use crate::scoring::ScoreBoard;
use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level application state machine.
///
/// Every gameplay system in [`crate::simulation::GameplayPlugin`] runs under
/// `.run_if(in_state(GameState::Playing))`, so the board is frozen while the
/// game-over overlay is displayed.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Active gameplay; the state the app starts in.
    #[default]
    Playing,
    /// A piece outstayed the danger zone; overlay shown.
    GameOver,
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the game-over overlay; despawned on `OnExit(GameOver)`.
#[derive(Component)]
pub struct GameOverRoot;

/// Tags the "Play Again" button.
#[derive(Component)]
pub struct PlayAgainButton;

/// Tags the "Quit" button.
#[derive(Component)]
pub struct QuitButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// UI for [`GameState::GameOver`].  Requires `GameplayPlugin` (which registers
/// the state) to be added first.
pub struct GameOverPlugin;

impl Plugin for GameOverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::GameOver), setup_game_over)
            .add_systems(OnExit(GameState::GameOver), cleanup_game_over)
            .add_systems(
                Update,
                game_over_button_system.run_if(in_state(GameState::GameOver)),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn again_bg() -> Color {
    Color::srgb(0.08, 0.36, 0.14)
}
fn again_border() -> Color {
    Color::srgb(0.18, 0.72, 0.28)
}
fn again_text() -> Color {
    Color::srgb(0.75, 1.0, 0.80)
}
fn quit_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn quit_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
fn quit_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}
fn subtitle_color() -> Color {
    Color::srgb(0.70, 0.70, 0.80)
}
fn hint_color() -> Color {
    Color::srgb(0.40, 0.40, 0.48)
}

// ── OnEnter(GameOver): spawn overlay ──────────────────────────────────────────

/// Spawn the overlay centred over the frozen board.
///
/// ```text
/// ┌──────────────────────────────┐
/// │          GAME OVER           │
/// │  Score 1234 · best tier 9    │
/// │       [ PLAY AGAIN ]         │
/// │          [ QUIT ]            │
/// │  Press Enter to play again   │
/// └──────────────────────────────┘
/// ```
pub fn setup_game_over(mut commands: Commands, board: Res<ScoreBoard>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.75)),
            ZIndex(300),
            GameOverRoot,
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(40.0)),
                        row_gap: Val::Px(16.0),
                        border: UiRect::all(Val::Px(2.0)),
                        min_width: Val::Px(320.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.05, 0.03, 0.08)),
                    BorderColor::all(Color::srgb(0.55, 0.10, 0.10)),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new("GAME OVER"),
                        TextFont {
                            font_size: 46.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.22, 0.22)),
                    ));

                    card.spawn((
                        Text::new(format!(
                            "Score {}  ·  {} merges  ·  best tier {}",
                            board.score,
                            board.merges,
                            board.best_tier.get()
                        )),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(subtitle_color()),
                    ));

                    button(card, "PLAY AGAIN", again_bg(), again_border(), again_text(), PlayAgainButton);
                    button(card, "QUIT", quit_bg(), quit_border(), quit_text(), QuitButton);

                    card.spawn((
                        Text::new("Press Enter to play again"),
                        TextFont {
                            font_size: 12.0,
                            ..default()
                        },
                        TextColor(hint_color()),
                    ));
                });
        });
}

fn button(
    parent: &mut ChildSpawnerCommands<'_>,
    label: &str,
    bg: Color,
    border: Color,
    text: Color,
    marker: impl Component,
) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(220.0),
                height: Val::Px(50.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(bg),
            BorderColor::all(border),
            marker,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(text),
            ));
        });
}

// ── OnExit(GameOver): despawn overlay ─────────────────────────────────────────

pub fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (GameOver only): buttons and Enter ─────────────────────────────────

/// Restart on Play Again or Enter; exit on Quit.
#[allow(clippy::type_complexity)]
pub fn game_over_button_system(
    play_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<PlayAgainButton>)>,
    quit_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<QuitButton>)>,
    mut btn_text: Query<&mut TextColor>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<bevy::app::AppExit>,
    keys: Res<ButtonInput<KeyCode>>,
) {
    let wants_play_again = keys.just_pressed(KeyCode::Enter)
        || play_query.iter().any(|(i, _)| *i == Interaction::Pressed);
    if wants_play_again {
        next_state.set(GameState::Playing);
        return;
    }

    for (interaction, children) in play_query.iter() {
        let color = match interaction {
            Interaction::Hovered => Color::WHITE,
            _ => again_text(),
        };
        for child in children.iter() {
            if let Ok(mut text) = btn_text.get_mut(child) {
                *text = TextColor(color);
            }
        }
    }

    for (interaction, children) in quit_query.iter() {
        let color = match interaction {
            Interaction::Pressed => {
                exit.write(bevy::app::AppExit::Success);
                continue;
            }
            Interaction::Hovered => Color::WHITE,
            Interaction::None => quit_text(),
        };
        for child in children.iter() {
            if let Ok(mut text) = btn_text.get_mut(child) {
                *text = TextColor(color);
            }
        }
    }
}
