use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::BoardError;
use crate::api::types::{Slot, Team, TokenId};
use crate::components::token::Token;
use crate::core::scene::SceneState;

/// Canonical token positions. Team A plays the left half; team B is the
/// mirror image (`x -> 100 - x`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterLayout {
    /// Team A default positions in slot order.
    pub team_a: [Vec2; 5],
    /// Where a free token of team A appears. Team B's is mirrored.
    pub free_spawn: Vec2,
}

impl Default for RosterLayout {
    fn default() -> Self {
        Self {
            team_a: [
                Vec2::new(42.0, 50.0), // PG
                Vec2::new(34.0, 22.0), // SG
                Vec2::new(34.0, 78.0), // SF
                Vec2::new(24.0, 36.0), // PF
                Vec2::new(20.0, 62.0), // C
            ],
            free_spawn: Vec2::new(25.0, 50.0),
        }
    }
}

impl RosterLayout {
    pub fn position(&self, team: Team, slot: Slot) -> Vec2 {
        mirror(team, self.team_a[slot.index()])
    }

    pub fn free_spawn(&self, team: Team) -> Vec2 {
        mirror(team, self.free_spawn)
    }
}

fn mirror(team: Team, p: Vec2) -> Vec2 {
    match team {
        Team::A => p,
        Team::B => Vec2::new(100.0 - p.x, p.y),
    }
}

/// Fixed identity of the roster token for a slot: team A uses 1-5,
/// team B 6-10. Free tokens are numbered from [`FIRST_FREE_ID`].
pub fn roster_id(team: Team, slot: Slot) -> TokenId {
    TokenId(team.code() * 5 + slot.index() as u32 + 1)
}

pub const FIRST_FREE_ID: u32 = 11;

/// Maps team × slot onto scene tokens and keeps disabled roster tokens
/// around so they can come back.
#[derive(Debug, Clone)]
pub struct Roster {
    layout: RosterLayout,
    dormant: HashMap<(Team, Slot), TokenId>,
}

impl Roster {
    pub fn new(layout: RosterLayout) -> Self {
        Self {
            layout,
            dormant: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &RosterLayout {
        &self.layout
    }

    /// Identity parked for a disabled slot.
    pub fn dormant(&self, team: Team, slot: Slot) -> Option<TokenId> {
        self.dormant.get(&(team, slot)).copied()
    }

    /// Fill an empty scene with the ten roster tokens, every slot enabled,
    /// ball with team A's point guard.
    pub fn spawn_initial(&mut self, scene: &mut SceneState) {
        scene.set_enabled(Default::default());
        self.restore_defaults(scene);
    }

    /// Put every enabled slot's token back at its canonical position and
    /// drop free tokens. Disabled slots keep their token dormant. The ball
    /// goes to team A's point guard, or the first token on court if that
    /// slot is off.
    pub fn restore_defaults(&mut self, scene: &mut SceneState) {
        self.dormant.clear();
        let mut tokens = Vec::with_capacity(10);
        for team in Team::ALL {
            for slot in Slot::ALL {
                let id = roster_id(team, slot);
                if scene.enabled().is_enabled(team, slot) {
                    tokens.push(Token::roster(id, team, slot).with_pos(self.layout.position(team, slot)));
                } else {
                    self.dormant.insert((team, slot), id);
                }
            }
        }
        let holder = tokens
            .iter()
            .find(|t| t.occupies(Team::A, Slot::PG))
            .or_else(|| tokens.first())
            .map(|t| t.id);

        scene.set_tokens(tokens);
        match holder {
            Some(id) => {
                scene.give_ball(id);
            }
            None => {
                scene.release_ball();
                scene.place_ball(Vec2::new(50.0, 50.0));
            }
        }
    }

    /// Switch a slot on or off and return its new state.
    ///
    /// Disabling the slot whose token holds the ball first hands the ball
    /// to another enabled token of the same team, then to the other team.
    /// With nobody to take it, the call is refused and nothing changes.
    pub fn toggle_slot(
        &mut self,
        scene: &mut SceneState,
        team: Team,
        slot: Slot,
    ) -> Result<bool, BoardError> {
        let occupant = scene.occupant(team, slot).map(|t| t.id);

        if scene.enabled().is_enabled(team, slot) {
            if let Some(id) = occupant {
                if scene.ball().holder == Some(id) {
                    let recipient = self
                        .find_recipient(scene, id)
                        .ok_or(BoardError::NoBallRecipient)?;
                    log::debug!("ball moves from {id:?} to {recipient:?} before disabling {team:?} {slot:?}");
                    scene.give_ball(recipient);
                }
            }
            scene.enabled_mut().set(team, slot, false);
            if let Some(id) = occupant {
                scene.despawn(id);
                self.dormant.insert((team, slot), id);
            }
            Ok(false)
        } else {
            scene.enabled_mut().set(team, slot, true);
            if occupant.is_none() {
                if let Some(id) = self.dormant.remove(&(team, slot)) {
                    scene.spawn(Token::roster(id, team, slot).with_pos(self.layout.position(team, slot)));
                }
            }
            Ok(true)
        }
    }

    /// First token that could take the ball from `from`: enabled teammates
    /// in roster order, then free teammates, then the same for the other team.
    pub fn find_recipient(&self, scene: &SceneState, from: TokenId) -> Option<TokenId> {
        let team = scene.get(from)?.team;
        self.first_of_team(scene, team, from)
            .or_else(|| self.first_of_team(scene, team.opponent(), from))
    }

    fn first_of_team(&self, scene: &SceneState, team: Team, exclude: TokenId) -> Option<TokenId> {
        scene
            .enabled()
            .enabled(team)
            .filter_map(|slot| scene.occupant(team, slot))
            .chain(scene.team(team).filter(|t| t.slot.is_none()))
            .map(|t| t.id)
            .find(|id| *id != exclude)
    }

    /// Forget dormant identities that are back on court (after undo/redo).
    pub fn reconcile(&mut self, scene: &SceneState) {
        self.dormant.retain(|_, id| !scene.contains(*id));
        for team in Team::ALL {
            for slot in Slot::ALL {
                if !scene.enabled().is_enabled(team, slot) && scene.occupant(team, slot).is_none() {
                    self.dormant.entry((team, slot)).or_insert_with(|| roster_id(team, slot));
                }
            }
        }
    }
}
