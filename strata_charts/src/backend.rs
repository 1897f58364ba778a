// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering backend boundary.
//!
//! The chart only ever asks a backend to create class-tagged containers, list children by
//! class, toggle visibility, remove nodes, draw a [`Primitive`], and apply an animation
//! [`PropertyUpdate`]. Handles are opaque: a backend decides what they refer to.
//!
//! [`SceneTree`] is an in-memory retained implementation usable with either engine tag.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use strata_core::{Engine, Handle, Property, PropertyUpdate};
use tracing::trace;

/// A drawable shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A filled rectangle.
    Rect {
        /// Geometry.
        rect: Rect,
        /// Fill color.
        fill: Color,
    },
    /// A stroked path.
    Path {
        /// Geometry.
        path: BezPath,
        /// Stroke color.
        stroke: Color,
        /// Stroke width.
        width: f64,
    },
    /// A filled path.
    Area {
        /// Geometry.
        path: BezPath,
        /// Fill color.
        fill: Color,
    },
    /// A filled circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill color.
        fill: Color,
    },
    /// Unshaped text anchored at its start.
    Text {
        /// Anchor point.
        origin: Point,
        /// The text.
        text: String,
        /// Font size.
        size: f64,
        /// Fill color.
        fill: Color,
    },
}

/// What the chart needs from a renderer.
pub trait Backend {
    /// The engine family, used to pick animation support.
    fn engine(&self) -> Engine;
    /// The root container.
    fn root(&self) -> Handle;
    /// Creates an empty container under `parent`.
    fn create_subcontainer(&mut self, parent: Handle, class: &str) -> Handle;
    /// Direct children of `parent` tagged with `class`, in creation order.
    fn children(&self, parent: Handle, class: &str) -> Vec<Handle>;
    /// Shows or hides a node and its subtree.
    fn set_visible(&mut self, handle: Handle, visible: bool);
    /// Removes a node and its subtree.
    fn remove(&mut self, handle: Handle);
    /// Draws `primitive` as a new child of `parent`.
    fn draw(&mut self, parent: Handle, class: &str, primitive: Primitive) -> Handle;
    /// Applies an animated property value.
    fn apply(&mut self, update: &PropertyUpdate);
}

/// Animated properties of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Offset from the resting position.
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
            translate: Vec2::ZERO,
        }
    }
}

/// A node of a [`SceneTree`].
#[derive(Clone, Debug)]
pub struct Node {
    /// Parent node; `None` for the root.
    pub parent: Option<Handle>,
    /// Class tag.
    pub class: String,
    /// Children in creation order.
    pub children: Vec<Handle>,
    /// Own visibility flag.
    pub visible: bool,
    /// Drawn shape, if this node is not a container.
    pub primitive: Option<Primitive>,
    /// Animated properties.
    pub transform: Transform,
}

/// An in-memory retained scene.
#[derive(Clone, Debug)]
pub struct SceneTree {
    engine: Engine,
    nodes: HashMap<Handle, Node>,
    next: u64,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new(Engine::default())
    }
}

impl SceneTree {
    const ROOT: Handle = Handle(0);

    /// Creates a scene holding only the root container.
    pub fn new(engine: Engine) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            Self::ROOT,
            Node {
                parent: None,
                class: String::from("root"),
                children: Vec::new(),
                visible: true,
                primitive: None,
                transform: Transform::default(),
            },
        );
        Self {
            engine,
            nodes,
            next: 1,
        }
    }

    /// Returns a node.
    pub fn node(&self, handle: Handle) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Returns `true` if the node and all its ancestors are visible.
    pub fn is_visible(&self, handle: Handle) -> bool {
        let mut cur = Some(handle);
        while let Some(h) = cur {
            match self.nodes.get(&h) {
                Some(node) if node.visible => cur = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// All primitive nodes below `parent` (depth first) tagged with `class`.
    pub fn descendants(&self, parent: Handle, class: &str) -> Vec<Handle> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![parent];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(&h) else {
                continue;
            };
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
            if h != parent && node.class == class {
                out.push(h);
            }
        }
        out
    }

    fn insert(&mut self, parent: Handle, class: &str, primitive: Option<Primitive>) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        self.nodes.insert(
            handle,
            Node {
                parent: Some(parent),
                class: String::from(class),
                children: Vec::new(),
                visible: true,
                primitive,
                transform: Transform::default(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(handle);
        }
        handle
    }
}

impl Backend for SceneTree {
    fn engine(&self) -> Engine {
        self.engine
    }

    fn root(&self) -> Handle {
        Self::ROOT
    }

    fn create_subcontainer(&mut self, parent: Handle, class: &str) -> Handle {
        self.insert(parent, class, None)
    }

    fn children(&self, parent: Handle, class: &str) -> Vec<Handle> {
        self.nodes.get(&parent).map_or_else(Vec::new, |node| {
            node.children
                .iter()
                .copied()
                .filter(|c| self.nodes.get(c).is_some_and(|n| n.class == class))
                .collect()
        })
    }

    fn set_visible(&mut self, handle: Handle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    fn remove(&mut self, handle: Handle) {
        if handle == Self::ROOT {
            return;
        }
        let Some(node) = self.nodes.remove(&handle) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != handle);
        }
        let mut stack = node.children;
        while let Some(h) = stack.pop() {
            if let Some(child) = self.nodes.remove(&h) {
                stack.extend(child.children);
            }
        }
    }

    fn draw(&mut self, parent: Handle, class: &str, primitive: Primitive) -> Handle {
        self.insert(parent, class, Some(primitive))
    }

    fn apply(&mut self, update: &PropertyUpdate) {
        let Some(node) = self.nodes.get_mut(&update.target) else {
            trace!(target = ?update.target, "update for a removed node");
            return;
        };
        let t = &mut node.transform;
        match update.property {
            Property::Opacity(v) => t.opacity = v,
            Property::Scale(v) => t.scale = v,
            Property::Rotation(v) => t.rotation = v,
            Property::Translate(v) => t.translate = v,
        }
    }
}
