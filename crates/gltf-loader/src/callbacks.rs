//! Hooks for customizing conversion.
//!
//! A [`Loader`] owns an ordered chain of [`LoaderCallbacks`] objects. Each
//! conversion step enters the chain at its first link; a link either produces
//! the result itself or hands the call on through [`Next`], and the loader's
//! built-in conversion runs once the chain is exhausted. Every method has a
//! default that simply passes the call on, so an implementation overrides only
//! the steps it cares about.
//!
//! ```
//! use std::rc::Rc;
//! use gltf_loader::{LoaderCallbacks, Next, SceneNode};
//!
//! struct Prefix;
//!
//! impl LoaderCallbacks for Prefix {
//!     fn update_node(&self, next: Next<'_>, node: Option<SceneNode>, source: &gltf_core::Node) -> SceneNode {
//!         let node = next.update_node(node, source);
//!         node.set_name(format!("gltf:{}", source.name));
//!         node
//!     }
//! }
//!
//! let mut loader = gltf_loader::Loader::default();
//! loader.register_callbacks(0, Rc::new(Prefix));
//! ```

use std::rc::Rc;

use gltf_core::GltfRoot;

use crate::geom::Geom;
use crate::loader::Loader;
use crate::material::Material;
use crate::scene::SceneNode;
use crate::state::RenderState;
use crate::texture::Texture;

pub trait LoaderCallbacks {
    /// Converts a node. `node` is the previously converted node, already
    /// stripped of its children, or `None` on first conversion.
    fn update_node(&self, next: Next<'_>, node: Option<SceneNode>, source: &gltf_core::Node) -> SceneNode {
        next.update_node(node, source)
    }

    fn update_material(
        &self,
        next: Next<'_>,
        material: Option<Rc<Material>>,
        source: &gltf_core::Material,
    ) -> Rc<Material> {
        next.update_material(material, source)
    }

    fn update_texture(
        &self,
        next: Next<'_>,
        texture: Option<Rc<Texture>>,
        source: &gltf_core::Texture,
    ) -> Rc<Texture> {
        next.update_texture(texture, source)
    }

    /// Builds the geometry of one primitive; `None` leaves it out.
    fn make_geom(&self, next: Next<'_>, mesh: &gltf_core::Mesh, primitive: &gltf_core::Primitive) -> Option<Geom> {
        next.make_geom(mesh, primitive)
    }

    fn make_geom_state(
        &self,
        next: Next<'_>,
        mesh: &gltf_core::Mesh,
        primitive: &gltf_core::Primitive,
    ) -> RenderState {
        next.make_geom_state(mesh, primitive)
    }
}

/// The rest of the chain, handed to each link.
pub struct Next<'a> {
    loader: &'a mut Loader,
    root: &'a GltfRoot,
    chain: &'a [Rc<dyn LoaderCallbacks>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(loader: &'a mut Loader, root: &'a GltfRoot, chain: &'a [Rc<dyn LoaderCallbacks>]) -> Self {
        Next {
            loader,
            root,
            chain,
        }
    }

    /// The document being converted.
    pub fn root(&self) -> &GltfRoot {
        self.root
    }

    /// The loader, for converting other entities from within a link.
    pub fn loader(&mut self) -> &mut Loader {
        self.loader
    }

    pub fn update_node(self, node: Option<SceneNode>, source: &gltf_core::Node) -> SceneNode {
        let Next {
            loader,
            root,
            chain,
        } = self;
        match chain.split_first() {
            Some((link, rest)) => link.update_node(Next::new(loader, root, rest), node, source),
            None => loader.do_update_node(root, node, source),
        }
    }

    pub fn update_material(self, material: Option<Rc<Material>>, source: &gltf_core::Material) -> Rc<Material> {
        let Next {
            loader,
            root,
            chain,
        } = self;
        match chain.split_first() {
            Some((link, rest)) => link.update_material(Next::new(loader, root, rest), material, source),
            None => loader.do_update_material(material, source),
        }
    }

    pub fn update_texture(self, texture: Option<Rc<Texture>>, source: &gltf_core::Texture) -> Rc<Texture> {
        let Next {
            loader,
            root,
            chain,
        } = self;
        match chain.split_first() {
            Some((link, rest)) => link.update_texture(Next::new(loader, root, rest), texture, source),
            None => loader.do_update_texture(root, texture, source),
        }
    }

    pub fn make_geom(self, mesh: &gltf_core::Mesh, primitive: &gltf_core::Primitive) -> Option<Geom> {
        let Next {
            loader,
            root,
            chain,
        } = self;
        match chain.split_first() {
            Some((link, rest)) => link.make_geom(Next::new(loader, root, rest), mesh, primitive),
            None => loader.make_geom(root, mesh, primitive),
        }
    }

    pub fn make_geom_state(self, mesh: &gltf_core::Mesh, primitive: &gltf_core::Primitive) -> RenderState {
        let Next {
            loader,
            root,
            chain,
        } = self;
        match chain.split_first() {
            Some((link, rest)) => link.make_geom_state(Next::new(loader, root, rest), mesh, primitive),
            None => loader.make_geom_state(root, mesh, primitive),
        }
    }
}
