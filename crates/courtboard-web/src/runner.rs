use courtboard::{
    BoardCommand, BoardConfig, BoardError, BoardEvent, FrameBuffer, InputEvent, InputQueue, LineId,
    ProtocolLayout, SurfaceProvider, Whiteboard,
};

/// Wires the whiteboard to the browser frame loop.
///
/// Input is queued as it arrives and applied at the start of the next
/// `tick`, followed by the flight frame and watchdog callbacks. The frame
/// buffer is rebuilt once per tick for JavaScript to read.
pub struct BoardRunner {
    board: Whiteboard,
    input: InputQueue,
    frame: FrameBuffer,
    lines_json: String,
    lines_dirty: bool,
}

impl BoardRunner {
    pub fn new(config: BoardConfig, surface: impl SurfaceProvider + 'static) -> Self {
        let mut runner = Self {
            board: Whiteboard::new(config, surface),
            input: InputQueue::new(),
            frame: FrameBuffer::new(ProtocolLayout::default()),
            lines_json: String::from("[]"),
            lines_dirty: true,
        };
        runner.publish(&[]);
        runner
    }

    /// Parse a JSON config. An empty string means defaults.
    pub fn from_json(json: &str, surface: impl SurfaceProvider + 'static) -> Result<Self, BoardError> {
        let config = if json.trim().is_empty() {
            BoardConfig::default()
        } else {
            BoardConfig::from_json(json)?
        };
        Ok(Self::new(config, surface))
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn push_command(&mut self, command: BoardCommand) {
        self.input.push(InputEvent::Command(command));
    }

    /// Run one frame: apply queued input, advance the flight, fire due
    /// timers, publish the frame buffer.
    pub fn tick(&mut self, now_ms: f64) {
        self.board.process(&mut self.input);
        self.board.frame(now_ms);
        self.board.poll_timers(now_ms);

        let events = self.board.drain_events();
        self.publish(&events);
    }

    fn publish(&mut self, events: &[BoardEvent]) {
        if events.iter().any(|e| {
            matches!(e, BoardEvent::LinesChanged | BoardEvent::PassLineChanged)
        }) {
            self.lines_dirty = true;
        }
        self.frame.rebuild(&self.board, events);
    }

    pub fn teardown(&mut self) {
        self.input.drain();
        self.board.teardown();
        let events = self.board.drain_events();
        self.publish(&events);
    }

    pub fn board(&self) -> &Whiteboard {
        &self.board
    }

    // ---- Frame buffer accessors ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.frame.len() as u32
    }

    pub fn max_tokens(&self) -> u32 {
        self.frame.layout().max_tokens as u32
    }

    pub fn max_events(&self) -> u32 {
        self.frame.layout().max_events as u32
    }

    // ---- JSON views ----

    /// Committed lines plus the line being drawn, re-serialized only after
    /// they changed.
    pub fn lines_json(&mut self) -> &str {
        if self.lines_dirty {
            let scene = self.board.scene();
            let view = serde_json::json!({
                "lines": scene.lines(),
                "current": scene.current_line(),
                "pass": scene.pass_line(),
            });
            self.lines_json = view.to_string();
            self.lines_dirty = false;
        }
        &self.lines_json
    }

    /// A committed line flattened into a smooth polyline, as `[[x, y], ...]`.
    #[cfg(feature = "vectors")]
    pub fn line_outline_json(&self, id: LineId, tolerance: f32) -> Option<String> {
        let outline = self.board.line_outline(id, tolerance)?;
        serde_json::to_string(&outline).ok()
    }

    /// A committed line's cubic segments as `[[x0, y0, c1x, c1y, c2x, c2y, x1, y1], ...]`.
    pub fn line_segments_json(&self, id: LineId) -> Option<String> {
        let segments: Vec<[f32; 8]> = self
            .board
            .line_segments(id)?
            .iter()
            .map(|s| {
                [
                    s.from.x, s.from.y, s.ctrl1.x, s.ctrl1.y, s.ctrl2.x, s.ctrl2.y, s.to.x, s.to.y,
                ]
            })
            .collect();
        serde_json::to_string(&segments).ok()
    }

    pub fn tokens_json(&self) -> String {
        serde_json::to_string(self.board.scene().tokens()).unwrap_or_else(|_| String::from("[]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtboard::{FixedSurface, HitTarget, PointerId, Slot, Team};
    use glam::Vec2;

    fn runner() -> BoardRunner {
        BoardRunner::new(BoardConfig::default(), FixedSurface::unit())
    }

    #[test]
    fn commands_apply_on_tick() {
        let mut r = runner();
        r.push_command(BoardCommand::AddToken { team: Team::A });
        assert_eq!(r.board().scene().len(), 10);
        r.tick(16.0);
        assert_eq!(r.board().scene().len(), 11);
    }

    #[test]
    fn empty_config_json_uses_defaults() {
        let r = BoardRunner::from_json("", FixedSurface::unit()).unwrap();
        assert_eq!(r.board().config(), &BoardConfig::default());
        assert!(BoardRunner::from_json("{ nope", FixedSurface::unit()).is_err());
    }

    #[test]
    fn lines_json_tracks_drawing() {
        let mut r = runner();
        assert!(r.lines_json().contains("\"lines\":[]"));
        r.push_input(InputEvent::PointerDown {
            pointer: PointerId(1),
            client: Vec2::new(60.0, 90.0),
            hit: HitTarget::Surface,
            time_ms: 0.0,
        });
        r.tick(1.0);
        assert!(r.lines_json().contains("\"current\":{"));
    }

    #[test]
    fn lines_json_shows_the_pass_indicator() {
        let mut r = runner();
        assert!(r.lines_json().contains("\"pass\":null"));
        r.push_input(InputEvent::PointerDown {
            pointer: PointerId(1),
            client: Vec2::new(42.0, 52.0),
            hit: HitTarget::Ball,
            time_ms: 0.0,
        });
        r.push_input(InputEvent::PointerMove {
            pointer: PointerId(1),
            client: Vec2::new(70.0, 30.0),
            time_ms: 16.0,
        });
        r.tick(16.0);
        assert!(r.board().scene().pass_line().is_some());
        assert!(!r.lines_json().contains("\"pass\":null"));

        r.push_input(InputEvent::PointerUp {
            pointer: PointerId(1),
            client: Vec2::new(70.0, 30.0),
            time_ms: 32.0,
        });
        r.tick(32.0);
        assert!(r.lines_json().contains("\"pass\":null"));
    }

    #[test]
    fn refused_command_does_not_stop_the_queue() {
        let mut r = runner();
        r.push_command(BoardCommand::ToggleSlot { team: Team::B, slot: Slot::C });
        r.push_command(BoardCommand::DeleteLine { line: LineId(77) });
        r.tick(2.0);
        assert_eq!(r.board().scene().len(), 9);
        assert!(r.board().can_undo());
    }
}
