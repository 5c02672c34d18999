use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::line::Line;
use crate::components::slots::EnabledSlots;
use crate::components::token::{Ball, Token};
use crate::core::scene::SceneState;

/// A partial capture of the board. Only the fields that are present are
/// written back on undo/redo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tokens: Option<Vec<Token>>,
    pub ball: Option<Ball>,
    pub lines: Option<Vec<Line>>,
    pub enabled: Option<EnabledSlots>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything undoable.
    pub fn full(scene: &SceneState) -> Self {
        Self::new()
            .with_tokens(scene)
            .with_ball(scene)
            .with_lines(scene)
            .with_enabled(scene)
    }

    pub fn with_tokens(mut self, scene: &SceneState) -> Self {
        self.tokens = Some(scene.tokens().to_vec());
        self
    }

    pub fn with_ball(mut self, scene: &SceneState) -> Self {
        self.ball = Some(*scene.ball());
        self
    }

    pub fn with_lines(mut self, scene: &SceneState) -> Self {
        self.lines = Some(scene.lines().to_vec());
        self
    }

    pub fn with_enabled(mut self, scene: &SceneState) -> Self {
        self.enabled = Some(*scene.enabled());
        self
    }

    /// Merge the captured fields into the scene.
    pub fn apply(self, scene: &mut SceneState) {
        if let Some(tokens) = self.tokens {
            scene.set_tokens(tokens);
        }
        if let Some(ball) = self.ball {
            scene.set_ball(ball);
        }
        if let Some(lines) = self.lines {
            scene.set_lines(lines);
        }
        if let Some(enabled) = self.enabled {
            scene.set_enabled(enabled);
        }
        scene.sync_ball_flags();
    }
}

/// Linear undo/redo over sparse snapshots.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    past: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    max: usize,
}

impl HistoryStack {
    pub fn new(max: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(max.min(128)),
            future: Vec::new(),
            max: max.max(1),
        }
    }

    /// Push a pre-mutation snapshot. Any redo branch is discarded.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.max {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Step back one entry. Returns false when there is nothing to undo or
    /// a flight owns the ball.
    pub fn undo(&mut self, scene: &mut SceneState, flight_active: bool) -> bool {
        if flight_active {
            return false;
        }
        let Some(entry) = self.past.pop_back() else {
            return false;
        };
        self.future.push(Snapshot::full(scene));
        entry.apply(scene);
        true
    }

    /// Re-apply the last undone entry.
    pub fn redo(&mut self, scene: &mut SceneState, flight_active: bool) -> bool {
        if flight_active {
            return false;
        }
        let Some(entry) = self.future.pop() else {
            return false;
        };
        self.past.push_back(Snapshot::full(scene));
        entry.apply(scene);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn len(&self) -> usize {
        self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{LineId, Team, TokenId};
    use glam::Vec2;

    fn scene() -> SceneState {
        let mut scene = SceneState::default();
        scene.spawn(Token::new(TokenId(1), Team::A).with_pos(Vec2::new(10.0, 10.0)));
        scene.give_ball(TokenId(1));
        scene
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut scene = scene();
        let mut history = HistoryStack::default();

        history.record(Snapshot::new().with_tokens(&scene).with_ball(&scene));
        scene.move_token(TokenId(1), Vec2::new(40.0, 40.0));
        let moved = scene.clone();

        assert!(history.undo(&mut scene, false));
        assert_eq!(scene.get(TokenId(1)).unwrap().pos, Vec2::new(10.0, 10.0));
        assert_eq!(scene.ball().pos, Vec2::new(10.0, 12.0));
        assert!(history.can_redo());

        assert!(history.redo(&mut scene, false));
        assert_eq!(scene, moved);
    }

    #[test]
    fn sparse_snapshot_leaves_other_fields() {
        let mut scene = scene();
        let mut history = HistoryStack::default();
        history.record(Snapshot::new().with_lines(&scene));
        scene.commit_line(Line::sealed(LineId(1), vec![Vec2::ZERO, Vec2::ONE]));
        scene.move_token(TokenId(1), Vec2::new(50.0, 50.0));

        history.undo(&mut scene, false);
        assert!(scene.lines().is_empty());
        assert_eq!(scene.get(TokenId(1)).unwrap().pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn record_clears_future() {
        let mut scene = scene();
        let mut history = HistoryStack::default();
        history.record(Snapshot::full(&scene));
        history.undo(&mut scene, false);
        assert!(history.can_redo());
        history.record(Snapshot::full(&scene));
        assert!(!history.can_redo());
    }

    #[test]
    fn blocked_during_flight_and_when_empty() {
        let mut scene = scene();
        let mut history = HistoryStack::default();
        assert!(!history.undo(&mut scene, false));
        history.record(Snapshot::full(&scene));
        assert!(!history.undo(&mut scene, true));
        assert!(history.can_undo());
    }

    #[test]
    fn trims_oldest_entries() {
        let scene = scene();
        let mut history = HistoryStack::new(3);
        for _ in 0..5 {
            history.record(Snapshot::full(&scene));
        }
        assert_eq!(history.len(), 3);
    }
}
