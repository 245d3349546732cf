//! The metro map controller: simulation, constraints, modes, interaction and persistence.

use crate::config::{Tunables, validate_size};
use crate::constraints::{self, Constraints, Strengths};
use crate::directions::DirectionSet;
use crate::error::{ConfigError, Error, Result, StateError};
use crate::event::{PointerEvent, Target};
use crate::geom::Point;
use crate::render::{NullRenderer, Renderer, Scene};
use crate::scale::{StrengthScale, TimeScale};
use crate::state::MetroState;
use crate::topology::Topology;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use narwhal::{Force, Pausable, Simulation};
use serde::{Deserialize, Serialize};

/// Interaction mode.
///
/// EDIT lets the layout run and the graph be dragged and bent; VIEW freezes the layout and
/// turns clicks into node selection. Persisted as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mode {
    #[default]
    Edit = 0,
    View = 1,
}

impl TryFrom<u8> for Mode {
    type Error = StateError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Edit),
            1 => Ok(Mode::View),
            other => Err(StateError::UnknownMode(other)),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode as u8
    }
}

/// Passed to tick listeners after each completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub alpha: f64,
    pub strengths: Strengths,
}

type TickListener = Box<dyn FnMut(&Tick, &Topology)>;

/// An interactive metro map.
///
/// Owns the topology, a pausable force layout driving it, the constraint passes applied after
/// every force tick, and a renderer. Nothing runs on its own: an external scheduler calls
/// [`MetroMap::step`] until it returns `false`.
pub struct MetroMap<R: Renderer = NullRenderer> {
    topology: Topology,
    force: Pausable<Force>,
    tunables: Tunables,
    constraints: Constraints,
    mode: Mode,
    paused_before_view: bool,
    time_domain: Option<(DateTime<Utc>, DateTime<Utc>)>,
    listeners: IndexMap<String, TickListener>,
    renderer: R,
}

impl MetroMap<NullRenderer> {
    pub fn new(topology: Topology) -> Self {
        Self::with_renderer(topology, NullRenderer)
    }

    /// Restores a headless map from persisted JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: MetroState = serde_json::from_str(json)?;
        Self::from_state(state, NullRenderer)
    }
}

impl<R: Renderer> MetroMap<R> {
    pub fn with_renderer(topology: Topology, renderer: R) -> Self {
        let mut map = Self {
            topology,
            force: Pausable::new(Force::new()),
            tunables: Tunables::default(),
            constraints: Constraints::default(),
            mode: Mode::Edit,
            paused_before_view: false,
            time_domain: None,
            listeners: IndexMap::new(),
            renderer,
        };
        map.configure_force();
        map.renderer.resize(map.tunables.size);
        map.rebuild();
        map
    }

    pub fn from_state(state: MetroState, renderer: R) -> Result<Self> {
        let mut map = Self::with_renderer(Topology::default(), renderer);
        map.set_state_with_selection(state, std::iter::empty::<&str>())?;
        Ok(map)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Validates and applies every tunable at once.
    pub fn set_tunables(&mut self, tunables: Tunables) -> std::result::Result<(), ConfigError> {
        tunables.validate()?;
        let constraints = Constraints::from_tunables(&tunables)?;
        self.install_tunables(tunables, constraints);
        Ok(())
    }

    pub fn charge(&self) -> f64 {
        self.tunables.charge
    }

    pub fn set_charge(&mut self, charge: f64) -> std::result::Result<(), ConfigError> {
        self.tunables.charge = crate::config::finite("charge", charge)?;
        self.configure_force();
        Ok(())
    }

    pub fn gravity(&self) -> f64 {
        self.tunables.gravity
    }

    pub fn set_gravity(&mut self, gravity: f64) -> std::result::Result<(), ConfigError> {
        self.tunables.gravity = crate::config::finite("gravity", gravity)?;
        self.configure_force();
        Ok(())
    }

    pub fn friction(&self) -> f64 {
        self.tunables.friction
    }

    pub fn set_friction(&mut self, friction: f64) -> std::result::Result<(), ConfigError> {
        self.tunables.friction = crate::config::within("friction", friction, 0.0, 1.0)?;
        self.configure_force();
        Ok(())
    }

    pub fn link_strength(&self) -> f64 {
        self.tunables.link_strength
    }

    /// Takes effect on the next [`MetroMap::start`].
    pub fn set_link_strength(&mut self, strength: f64) -> std::result::Result<(), ConfigError> {
        self.tunables.link_strength = crate::config::within("linkStrength", strength, 0.0, 1.0)?;
        self.configure_force();
        Ok(())
    }

    pub fn link_distance(&self) -> f64 {
        self.tunables.link_distance
    }

    /// Takes effect on the next [`MetroMap::start`].
    pub fn set_link_distance(&mut self, distance: f64) -> std::result::Result<(), ConfigError> {
        self.tunables.link_distance =
            crate::config::within("linkDistance", distance, 0.0, f64::MAX)?;
        self.configure_force();
        Ok(())
    }

    pub fn size(&self) -> [f64; 2] {
        self.tunables.size
    }

    pub fn set_size(&mut self, size: [f64; 2]) -> std::result::Result<(), ConfigError> {
        self.tunables.size = validate_size(size)?;
        self.configure_force();
        self.renderer.resize(size);
        self.redraw();
        Ok(())
    }

    pub fn octoforce(&self) -> [f64; 2] {
        self.constraints.octo.range()
    }

    pub fn set_octoforce(&mut self, range: [f64; 2]) -> std::result::Result<(), ConfigError> {
        self.constraints.octo = StrengthScale::new(range)?;
        self.tunables.octoforce = range;
        Ok(())
    }

    pub fn monoforce(&self) -> [f64; 2] {
        self.constraints.mono.range()
    }

    pub fn set_monoforce(&mut self, range: [f64; 2]) -> std::result::Result<(), ConfigError> {
        self.constraints.mono = StrengthScale::new(range)?;
        self.tunables.monoforce = range;
        Ok(())
    }

    pub fn timeforce(&self) -> [f64; 2] {
        self.constraints.time.range()
    }

    pub fn set_timeforce(&mut self, range: [f64; 2]) -> std::result::Result<(), ConfigError> {
        self.constraints.time = StrengthScale::new(range)?;
        self.tunables.timeforce = range;
        Ok(())
    }

    pub fn directions(&self) -> DirectionSet {
        self.constraints.directions
    }

    pub fn set_directions(&mut self, directions: DirectionSet) {
        self.constraints.directions = directions;
        self.tunables.directions = directions;
    }

    /// Overrides the date extent mapped onto `[0, width]`; `None` returns to the extent of the
    /// dated nodes.
    pub fn set_time_domain(&mut self, domain: Option<(DateTime<Utc>, DateTime<Utc>)>) {
        self.time_domain = domain;
    }

    /// The time scale the time pass would use right now, if any node is dated.
    pub fn time_scale(&self) -> Option<TimeScale> {
        let range = [0.0, self.tunables.size[0]];
        match self.time_domain {
            Some((from, to)) => Some(TimeScale::new(from, to, range)),
            None => TimeScale::spanning(
                self.topology
                    .nodes()
                    .filter(|n| !n.is_dummy())
                    .filter_map(|n| n.date),
                range,
            ),
        }
    }

    /// The buffered value while paused, the live one otherwise.
    pub fn alpha(&self) -> f64 {
        self.force.alpha()
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.force.set_alpha(alpha);
    }

    pub fn is_running(&self) -> bool {
        !self.force.is_paused() && self.force.inner().is_running()
    }

    /// Re-prepares the layout and heats it up. Buffered while paused.
    pub fn start(&mut self) {
        self.force.start();
        if self.force.is_paused() {
            // A paused map still shows what the caller just changed.
            self.redraw();
        }
    }

    pub fn resume(&mut self) {
        self.force.resume();
        if self.force.is_paused() {
            self.redraw();
        }
    }

    pub fn stop(&mut self) {
        self.force.stop();
    }

    /// Unpauses and starts from scratch.
    pub fn restart(&mut self) -> bool {
        let unpaused = self.set_paused(false);
        self.start();
        unpaused
    }

    pub fn is_paused(&self) -> bool {
        self.force.is_paused()
    }

    /// Pauses or unpauses the layout. Ignored in VIEW, which keeps the layout paused; returns
    /// whether the request was honoured.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if self.mode != Mode::Edit {
            tracing::debug!(paused, "pause change ignored outside edit mode");
            return false;
        }
        self.force.set_paused(paused);
        true
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.switch_mode(mode) {
            self.redraw();
        }
    }

    fn switch_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        match mode {
            Mode::View => {
                self.paused_before_view = self.force.is_paused();
                self.force.set_paused(true);
                self.mode = Mode::View;
            }
            Mode::Edit => {
                self.mode = Mode::Edit;
                self.force.set_paused(self.paused_before_view);
            }
        }
        tracing::debug!(?mode, paused = self.force.is_paused(), "mode changed");
        true
    }

    /// Registers `listener` under `name`, replacing any listener already registered under it.
    pub fn on_tick<F>(&mut self, name: impl Into<String>, listener: F)
    where
        F: FnMut(&Tick, &Topology) + 'static,
    {
        self.listeners.insert(name.into(), Box::new(listener));
    }

    pub fn remove_tick_listener(&mut self, name: &str) -> bool {
        self.listeners.shift_remove(name).is_some()
    }

    /// One scheduler step: a force tick, the constraint passes, a redraw and the tick
    /// listeners. Returns `false` once the layout is stopped, paused or cooled.
    pub fn step(&mut self) -> Result<bool> {
        let Some(event) = self.force.tick(&mut self.topology)? else {
            return Ok(false);
        };
        let time_scale = if self.constraints.time.is_disabled() {
            None
        } else {
            self.time_scale()
        };
        let strengths = constraints::apply(
            &mut self.topology,
            event.alpha,
            &self.constraints,
            time_scale.as_ref(),
        );
        self.redraw();

        let tick = Tick {
            alpha: event.alpha,
            strengths,
        };
        for listener in self.listeners.values_mut() {
            listener(&tick, &self.topology);
        }
        Ok(true)
    }

    /// Steps until the layout stops or `max_steps` steps ran; returns the number of steps.
    pub fn run(&mut self, max_steps: usize) -> Result<usize> {
        let mut steps = 0;
        while steps < max_steps && self.step()? {
            steps += 1;
        }
        Ok(steps)
    }

    /// Dispatches pointer input according to the current mode. Returns whether it changed
    /// anything; rejected edits are logged and ignored.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match self.mode {
            Mode::Edit => self.handle_edit(event),
            Mode::View => self.handle_view(event),
        }
    }

    fn handle_edit(&mut self, event: PointerEvent) -> bool {
        let outcome: Result<()> = match event {
            PointerEvent::Click {
                target: Target::Link(link),
                at,
                ..
            } => self.insert_bend(&link, at).map(drop),
            PointerEvent::Click {
                target: Target::Node(node),
                shift: true,
                ..
            } => self.remove_bend(&node),
            PointerEvent::Click { .. } => return false,
            PointerEvent::DoubleClick { node } => self.toggle_fixed(&node).map(drop),
            PointerEvent::DragStart { node } => self
                .topology
                .set_dragging(&node, true)
                .map_err(Error::from),
            PointerEvent::Drag { node, to } => self.drag(&node, to),
            PointerEvent::DragEnd { node } => self
                .topology
                .set_dragging(&node, false)
                .map_err(Error::from),
            PointerEvent::HoverEnter { node } => {
                self.topology.set_hover(&node, true).map_err(Error::from)
            }
            PointerEvent::HoverLeave { node } => {
                self.topology.set_hover(&node, false).map_err(Error::from)
            }
        };
        match outcome {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "edit rejected");
                false
            }
        }
    }

    fn handle_view(&mut self, event: PointerEvent) -> bool {
        let PointerEvent::Click { target, .. } = event else {
            return false;
        };
        match target {
            Target::Node(id) => {
                if let Err(err) = self.topology.select_only(&id) {
                    tracing::debug!(%err, "selection rejected");
                    return false;
                }
            }
            Target::Background | Target::Link(_) => self.topology.clear_selection(),
        }
        self.redraw();
        true
    }

    /// Splits a link with a bend point and restarts the layout. Returns the new dummy's id.
    ///
    /// Graph edits below are rejected with [`Error::WrongMode`] outside EDIT.
    pub fn insert_bend(&mut self, link: &str, at: Point) -> Result<String> {
        self.require_edit("insert_bend")?;
        let dummy = self.topology.insert_bend(link, at)?;
        self.rebuild();
        self.start();
        Ok(dummy)
    }

    /// Removes a bend point and restarts the layout.
    pub fn remove_bend(&mut self, node: &str) -> Result<()> {
        self.require_edit("remove_bend")?;
        self.topology.remove_bend(node)?;
        self.rebuild();
        self.start();
        Ok(())
    }

    /// Drags a node (or the whole pinned group) and resumes the layout.
    pub fn drag(&mut self, node: &str, to: Point) -> Result<()> {
        self.require_edit("drag")?;
        self.topology.drag_to(node, to)?;
        self.resume();
        Ok(())
    }

    pub fn toggle_fixed(&mut self, node: &str) -> Result<bool> {
        self.require_edit("toggle_fixed")?;
        let fixed = self.topology.toggle_fixed(node)?;
        self.redraw();
        Ok(fixed)
    }

    /// Unpins every node; returns how many were pinned.
    pub fn clear_fixed(&mut self) -> usize {
        let cleared = self.topology.clear_fixed();
        self.redraw();
        cleared
    }

    pub fn select(&mut self, node: &str) -> Result<()> {
        self.topology.select_only(node)?;
        self.redraw();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.topology.clear_selection();
        self.redraw();
    }

    pub fn state(&self) -> MetroState {
        MetroState::capture(&self.topology, &self.tunables, self.mode)
    }

    /// Replaces graph, tunables and mode. Nodes that were selected stay selected if a node
    /// with the same id exists in the new graph.
    pub fn set_state(&mut self, state: MetroState) -> Result<()> {
        let selected = self.topology.selected_ids();
        self.set_state_with_selection(state, selected)
    }

    /// Replaces graph, tunables and mode and selects `selection` in one update: the renderer
    /// sees a single rebuild with both applied.
    ///
    /// Nothing changes unless the whole state resolves and validates.
    pub fn set_state_with_selection<I, S>(&mut self, state: MetroState, selection: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (mut topology, tunables, mode) = state.into_parts()?;
        tunables.validate()?;
        let constraints = Constraints::from_tunables(&tunables)?;
        topology.set_selection(selection);

        self.topology = topology;
        self.install_tunables(tunables, constraints);
        self.switch_mode(mode);
        self.force.start();
        self.rebuild();
        tracing::debug!(
            nodes = self.topology.node_count(),
            links = self.topology.link_count(),
            lines = self.topology.line_count(),
            ?mode,
            "state restored"
        );
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state())?)
    }

    /// Loads persisted JSON into this map, like [`MetroMap::set_state`].
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let state: MetroState = serde_json::from_str(json)?;
        self.set_state(state)
    }

    fn require_edit(&self, operation: &'static str) -> Result<()> {
        if self.mode == Mode::Edit {
            Ok(())
        } else {
            Err(Error::WrongMode {
                operation,
                mode: self.mode,
            })
        }
    }

    fn install_tunables(&mut self, tunables: Tunables, constraints: Constraints) {
        let resized = tunables.size != self.tunables.size;
        self.constraints = constraints;
        self.tunables = tunables;
        self.configure_force();
        if resized {
            self.renderer.resize(self.tunables.size);
        }
    }

    fn configure_force(&mut self) {
        let t = &self.tunables;
        self.force
            .inner_mut()
            .set_charge(t.charge)
            .set_gravity(t.gravity)
            .set_friction(t.friction)
            .set_link_strength(t.link_strength)
            .set_link_distance(t.link_distance)
            .set_size(t.size);
    }

    fn rebuild(&mut self) {
        let scene = Scene {
            topology: &self.topology,
            mode: self.mode,
            size: self.tunables.size,
        };
        self.renderer.rebuild(&scene);
    }

    fn redraw(&mut self) {
        let scene = Scene {
            topology: &self.topology,
            mode: self.mode,
            size: self.tunables.size,
        };
        self.renderer.redraw(&scene);
    }
}
