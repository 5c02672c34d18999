use serde::{Deserialize, Serialize};

use crate::api::types::{Slot, Team};

/// Which roster slots are switched on, per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledSlots {
    flags: [[bool; 5]; 2],
}

impl EnabledSlots {
    /// Every slot of both teams enabled.
    pub fn all() -> Self {
        Self { flags: [[true; 5]; 2] }
    }

    /// Every slot disabled.
    pub fn none() -> Self {
        Self { flags: [[false; 5]; 2] }
    }

    pub fn is_enabled(&self, team: Team, slot: Slot) -> bool {
        self.flags[team.code() as usize][slot.index()]
    }

    pub fn set(&mut self, team: Team, slot: Slot, enabled: bool) {
        self.flags[team.code() as usize][slot.index()] = enabled;
    }

    /// Flip a slot and return its new value.
    pub fn toggle(&mut self, team: Team, slot: Slot) -> bool {
        let flag = &mut self.flags[team.code() as usize][slot.index()];
        *flag = !*flag;
        *flag
    }

    /// Enabled slots of a team in roster order.
    pub fn enabled(&self, team: Team) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL
            .into_iter()
            .filter(move |slot| self.is_enabled(team, *slot))
    }

    pub fn enabled_count(&self, team: Team) -> usize {
        self.enabled(team).count()
    }
}

impl Default for EnabledSlots {
    fn default() -> Self {
        Self::all()
    }
}
