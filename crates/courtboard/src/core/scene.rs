use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{LineId, Slot, Team, TokenId};
use crate::components::line::Line;
use crate::components::slots::EnabledSlots;
use crate::components::token::{Ball, PassLine, Token};

/// The authoritative board state: tokens, ball, lines and enabled slots.
///
/// Every other component mutates the board through this type. Tokens are
/// stored in a flat Vec in insertion order; boards hold a dozen tokens, not
/// thousands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    tokens: Vec<Token>,
    ball: Ball,
    lines: Vec<Line>,
    current_line: Option<Line>,
    pass_line: Option<PassLine>,
    enabled: EnabledSlots,
    /// Where the ball sits relative to its holder.
    ball_offset: Vec2,
}

impl SceneState {
    pub fn new(ball_offset: Vec2) -> Self {
        Self {
            tokens: Vec::with_capacity(16),
            ball: Ball::default(),
            lines: Vec::new(),
            current_line: None,
            pass_line: None,
            enabled: EnabledSlots::all(),
            ball_offset,
        }
    }

    // -- Tokens --

    /// Add a token to the scene.
    pub fn spawn(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Remove a token by ID, keeping the order of the rest.
    /// If it held the ball, the ball is left loose where it was.
    pub fn despawn(&mut self, id: TokenId) -> Option<Token> {
        let idx = self.tokens.iter().position(|t| t.id == id)?;
        let token = self.tokens.remove(idx);
        if self.ball.holder == Some(id) {
            self.ball.holder = None;
        }
        Some(token)
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.get(id).is_some()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Tokens of one team in insertion order.
    pub fn team(&self, team: Team) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(move |t| t.team == team)
    }

    /// The token currently sitting in a roster slot.
    pub fn occupant(&self, team: Team, slot: Slot) -> Option<&Token> {
        self.tokens.iter().find(|t| t.occupies(team, slot))
    }

    /// Replace the whole token set (undo/redo, reset).
    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
    }

    /// Move a token. If it holds the ball, the ball follows in the same call.
    pub fn move_token(&mut self, id: TokenId, pos: Vec2) -> bool {
        let Some(token) = self.get_mut(id) else {
            return false;
        };
        token.pos = pos;
        if self.ball.holder == Some(id) {
            self.ball.pos = pos + self.ball_offset;
        }
        true
    }

    /// Next jersey number for a free token of `team`.
    pub fn next_number(&self, team: Team) -> u8 {
        self.team(team).map(|t| t.number).max().unwrap_or(0).saturating_add(1)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    // -- Ball --

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_offset(&self) -> Vec2 {
        self.ball_offset
    }

    pub fn set_ball(&mut self, ball: Ball) {
        self.ball = ball;
    }

    /// The token holding the ball, if any.
    pub fn holder(&self) -> Option<&Token> {
        self.ball.holder.and_then(|id| self.get(id))
    }

    /// Hand the ball to a token: holder, position and every `holds_ball`
    /// flag are updated together.
    pub fn give_ball(&mut self, id: TokenId) -> bool {
        let Some(pos) = self.get(id).map(|t| t.pos) else {
            return false;
        };
        self.ball = Ball {
            pos: pos + self.ball_offset,
            holder: Some(id),
        };
        for token in self.tokens.iter_mut() {
            token.holds_ball = token.id == id;
        }
        true
    }

    /// Detach the ball from everyone. It stays where it is.
    pub fn release_ball(&mut self) {
        self.ball.holder = None;
        for token in self.tokens.iter_mut() {
            token.holds_ball = false;
        }
    }

    /// Move a loose ball (flight steps).
    pub fn place_ball(&mut self, pos: Vec2) {
        self.ball.pos = pos;
    }

    /// Re-derive every `holds_ball` flag from `ball.holder`. A holder that
    /// is no longer in the scene leaves the ball loose where it is.
    pub fn sync_ball_flags(&mut self) {
        if let Some(id) = self.ball.holder {
            if !self.contains(id) {
                log::debug!("ball holder {id:?} left the scene, ball is loose");
                self.ball.holder = None;
            }
        }
        let holder = self.ball.holder;
        for token in self.tokens.iter_mut() {
            token.holds_ball = Some(token.id) == holder;
        }
    }

    /// Number of tokens flagged as holding the ball.
    pub fn holder_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.holds_ball).count()
    }

    // -- Pass indicator --

    pub fn pass_line(&self) -> Option<&PassLine> {
        self.pass_line.as_ref()
    }

    /// Returns whether the indicator changed.
    pub fn set_pass_line(&mut self, pass_line: Option<PassLine>) -> bool {
        let changed = self.pass_line != pass_line;
        self.pass_line = pass_line;
        changed
    }

    // -- Lines --

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = lines;
    }

    pub fn current_line(&self) -> Option<&Line> {
        self.current_line.as_ref()
    }

    pub fn current_line_mut(&mut self) -> Option<&mut Line> {
        self.current_line.as_mut()
    }

    pub fn begin_line(&mut self, line: Line) {
        self.current_line = Some(line);
    }

    pub fn take_current_line(&mut self) -> Option<Line> {
        self.current_line.take()
    }

    pub fn commit_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn delete_line(&mut self, id: LineId) -> Option<Line> {
        let idx = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(idx))
    }

    /// Remove every committed line. Returns false if there were none.
    pub fn clear_lines(&mut self) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        self.lines.clear();
        true
    }

    // -- Slots --

    pub fn enabled(&self) -> &EnabledSlots {
        &self.enabled
    }

    pub fn enabled_mut(&mut self) -> &mut EnabledSlots {
        &mut self.enabled
    }

    pub fn set_enabled(&mut self, enabled: EnabledSlots) {
        self.enabled = enabled;
    }

    /// Whether a token counts as on the court: free tokens always do,
    /// roster tokens only while their slot is enabled.
    pub fn is_active(&self, token: &Token) -> bool {
        match token.slot {
            Some(slot) => self.enabled.is_enabled(token.team, slot),
            None => true,
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, 2.0))
    }
}
