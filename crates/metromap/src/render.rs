use crate::map::Mode;
use crate::topology::Topology;

/// What a renderer gets to look at: the current graph plus display state.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub topology: &'a Topology,
    pub mode: Mode,
    pub size: [f64; 2],
}

/// The drawing surface a metro map pushes its state to.
///
/// `rebuild` runs after the node, link or line sets change (load, bend edits); `redraw` runs
/// after every tick and interaction and should only move existing elements.
pub trait Renderer {
    fn rebuild(&mut self, scene: &Scene<'_>);

    fn redraw(&mut self, scene: &Scene<'_>);

    fn resize(&mut self, _size: [f64; 2]) {}
}

/// Draws nothing. Used for headless layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn rebuild(&mut self, _scene: &Scene<'_>) {}

    fn redraw(&mut self, _scene: &Scene<'_>) {}
}
