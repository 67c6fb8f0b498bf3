//! The target scene graph.
//!
//! A [`SceneNode`] is a shared, mutable node: cloning it yields another
//! reference to the same node. The loader keeps converted nodes in its caches
//! and rewires their children on every reconversion, so a node handed out
//! earlier reflects later updates.

use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use glam::Mat4;

use crate::geom::Geom;
use crate::state::RenderState;

/// A geom together with the render state it is drawn with.
#[derive(Debug, Clone)]
pub struct GeomEntry {
    pub geom: Rc<Geom>,
    pub state: Rc<RenderState>,
}

#[derive(Debug)]
enum NodeKind {
    Plain,
    Geom(Vec<GeomEntry>),
    ModelRoot {
        fullpath: Option<PathBuf>,
        timestamp: Option<SystemTime>,
    },
}

#[derive(Debug)]
struct NodeData {
    name: String,
    transform: Mat4,
    kind: NodeKind,
    children: Vec<SceneNode>,
}

#[derive(Clone)]
pub struct SceneNode(Rc<RefCell<NodeData>>);

impl SceneNode {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        SceneNode(Rc::new(RefCell::new(NodeData {
            name: name.into(),
            transform: Mat4::IDENTITY,
            kind,
            children: Vec::new(),
        })))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Plain)
    }

    /// A node that holds geometry.
    pub fn geom_node(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Geom(Vec::new()))
    }

    /// The top of a loaded model, remembering where it came from.
    pub fn model_root(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            NodeKind::ModelRoot {
                fullpath: None,
                timestamp: None,
            },
        )
    }

    fn data(&self) -> Ref<'_, NodeData> {
        self.0.borrow()
    }

    pub fn name(&self) -> String {
        self.data().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().name = name.into();
    }

    pub fn transform(&self) -> Mat4 {
        self.data().transform
    }

    pub fn set_transform(&self, transform: Mat4) {
        self.0.borrow_mut().transform = transform;
    }

    pub fn is_geom_node(&self) -> bool {
        matches!(self.data().kind, NodeKind::Geom(_))
    }

    pub fn is_model_root(&self) -> bool {
        matches!(self.data().kind, NodeKind::ModelRoot { .. })
    }

    /// Whether both values refer to the same node.
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    pub fn add_child(&self, child: SceneNode) {
        self.0.borrow_mut().children.push(child);
    }

    pub fn remove_all_children(&self) {
        self.0.borrow_mut().children.clear();
    }

    pub fn num_children(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<SceneNode> {
        self.data().children.get(index).cloned()
    }

    pub fn children(&self) -> Vec<SceneNode> {
        self.data().children.clone()
    }

    /// Depth-first search of the subtree, including this node.
    pub fn find(&self, name: &str) -> Option<SceneNode> {
        if self.data().name == name {
            return Some(self.clone());
        }
        self.children().iter().find_map(|child| child.find(name))
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Adds a geom. Does nothing unless this is a geom node.
    pub fn add_geom(&self, geom: Rc<Geom>, state: Rc<RenderState>) {
        if let NodeKind::Geom(geoms) = &mut self.0.borrow_mut().kind {
            geoms.push(GeomEntry { geom, state });
        }
    }

    pub fn remove_all_geoms(&self) {
        if let NodeKind::Geom(geoms) = &mut self.0.borrow_mut().kind {
            geoms.clear();
        }
    }

    pub fn geoms(&self) -> Vec<GeomEntry> {
        match &self.data().kind {
            NodeKind::Geom(geoms) => geoms.clone(),
            _ => Vec::new(),
        }
    }

    pub fn num_geoms(&self) -> usize {
        match &self.data().kind {
            NodeKind::Geom(geoms) => geoms.len(),
            _ => 0,
        }
    }

    /// Geoms in the whole subtree; a node reached along several paths is
    /// counted once per path.
    pub fn count_geoms(&self) -> usize {
        self.num_geoms() + self.children().iter().map(SceneNode::count_geoms).sum::<usize>()
    }

    // -------------------------------------------------------------------------
    // Model root
    // -------------------------------------------------------------------------

    pub fn fullpath(&self) -> Option<PathBuf> {
        match &self.data().kind {
            NodeKind::ModelRoot { fullpath, .. } => fullpath.clone(),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<SystemTime> {
        match &self.data().kind {
            NodeKind::ModelRoot { timestamp, .. } => *timestamp,
            _ => None,
        }
    }

    /// Records the source file on a model root.
    pub fn set_source(&self, path: Option<&Path>, time: Option<SystemTime>) {
        if let NodeKind::ModelRoot {
            fullpath,
            timestamp,
        } = &mut self.0.borrow_mut().kind
        {
            *fullpath = path.map(Path::to_path_buf);
            *timestamp = time;
        }
    }

    /// Renders the subtree one node per line, indented by depth.
    pub fn ls(&self) -> String {
        let mut out = String::new();
        self.ls_into(&mut out, 0);
        out
    }

    fn ls_into(&self, out: &mut String, depth: usize) {
        let _ = writeln!(out, "{:indent$}{}", "", self, indent = depth * 2);
        for child in self.children() {
            child.ls_into(out, depth + 1);
        }
    }
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        let kind = match &data.kind {
            NodeKind::Plain => "Node",
            NodeKind::Geom(_) => "GeomNode",
            NodeKind::ModelRoot { .. } => "ModelRoot",
        };
        write!(f, "{} {}", kind, data.name)?;
        if let NodeKind::Geom(geoms) = &data.kind {
            write!(f, " ({} geoms)", geoms.len())?;
        }
        if data.transform != Mat4::IDENTITY {
            f.write_str(" T")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        f.debug_struct("SceneNode")
            .field("name", &data.name)
            .field("kind", &data.kind)
            .field("children", &data.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_node() {
        let a = SceneNode::new("a");
        let alias = a.clone();
        alias.add_child(SceneNode::new("b"));
        assert_eq!(a.num_children(), 1);
        assert!(a.ptr_eq(&alias));
        assert!(!a.ptr_eq(&SceneNode::new("a")));
    }

    #[test]
    fn test_geoms_only_on_geom_nodes() {
        use crate::geom::{GeomPrimitive, PrimitiveType, VertexData, VertexFormat};

        let geom = Rc::new(Geom::new(
            VertexData::new(VertexFormat::new(), 0),
            GeomPrimitive::consecutive(PrimitiveType::Points, 0, 0),
        ));
        let state = Rc::new(RenderState::default());

        let plain = SceneNode::new("plain");
        plain.add_geom(geom.clone(), state.clone());
        assert_eq!(plain.num_geoms(), 0);

        let geom_node = SceneNode::geom_node("mesh");
        geom_node.add_geom(geom, state);
        assert_eq!(geom_node.num_geoms(), 1);
        plain.add_child(geom_node.clone());
        assert_eq!(plain.count_geoms(), 1);

        geom_node.remove_all_geoms();
        assert_eq!(plain.count_geoms(), 0);
    }

    #[test]
    fn test_ls() {
        let root = SceneNode::model_root("scene.gltf");
        let child = SceneNode::new("child");
        child.set_transform(Mat4::from_scale(glam::Vec3::splat(2.0)));
        child.add_child(SceneNode::geom_node("mesh"));
        root.add_child(child);
        assert_eq!(
            root.ls(),
            "ModelRoot scene.gltf\n  Node child T\n    GeomNode mesh (0 geoms)\n"
        );
        assert!(root.find("mesh").is_some_and(|n| n.is_geom_node()));
    }

    #[test]
    fn test_model_root_source() {
        let root = SceneNode::model_root("m");
        root.set_source(Some(Path::new("/tmp/m.gltf")), None);
        assert_eq!(root.fullpath(), Some(PathBuf::from("/tmp/m.gltf")));
        SceneNode::new("n").set_source(Some(Path::new("x")), None);
    }
}
