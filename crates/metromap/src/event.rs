use crate::geom::Point;

/// What a pointer event landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Background,
    Node(String),
    Link(String),
}

/// Pointer input delivered by the rendering surface, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Click {
        target: Target,
        at: Point,
        shift: bool,
    },
    DoubleClick {
        node: String,
    },
    DragStart {
        node: String,
    },
    /// `to` is where the dragged node should now be.
    Drag {
        node: String,
        to: Point,
    },
    DragEnd {
        node: String,
    },
    HoverEnter {
        node: String,
    },
    HoverLeave {
        node: String,
    },
}
