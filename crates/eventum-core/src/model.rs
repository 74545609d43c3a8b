//! Hierarchical model base
//!
//! A model is a node in a tree: it owns named children and holds non-owning
//! back-references to its parent and to the simulator context. Ownership
//! flows strictly downward (children are strong handles, parent and context
//! links are weak), so the tree's root keeps the graph alive and drops it
//! whole.

use crate::children::Children;
use crate::connection::Connections;
use crate::error::SimResult;
use crate::sim::{Simulator, WeakSim};
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Message payload delivered through connections; receivers downcast
pub type Message = Box<dyn Any>;

/// Shared handle to a model node
pub type ModelRef = Rc<RefCell<dyn Model>>;

/// Non-owning handle; parents and senders are referenced this way
pub type WeakModel = Weak<RefCell<dyn Model>>;

/// Coerce a typed model handle into the shared dynamic form
pub fn as_model<M: Model>(model: &Rc<RefCell<M>>) -> ModelRef {
    model.clone()
}

/// A node in the model tree.
///
/// Implementors embed a [`ModelBase`] and expose it through `base` /
/// `base_mut`; the remaining methods have workable defaults. Mutation
/// happens only from handler bodies, synchronously on the dispatch thread.
pub trait Model: Any {
    fn base(&self) -> &ModelBase;
    fn base_mut(&mut self) -> &mut ModelBase;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Invoked once on the root model before the dispatch loop starts
    fn initialize(&mut self, _sim: &Simulator) -> SimResult<()> {
        Ok(())
    }

    /// Receive a message sent over a connection. Message-receiving models
    /// override this; the default only logs.
    fn handle_message(
        &mut self,
        sim: &Simulator,
        _msg: Message,
        _sender: Option<ModelRef>,
    ) -> SimResult<()> {
        sim.logger().warning(self.label(), "unhandled message");
        Ok(())
    }

    /// Source tag used in log records
    fn label(&self) -> &str {
        self.base().label()
    }

    /// The owning simulator context
    fn sim(&self) -> Simulator {
        self.base().sim()
    }

    /// The parent model, if any
    fn parent(&self) -> Option<ModelRef> {
        self.base().parent()
    }
}

/// State shared by every model: context handle, parent link, the children
/// and connection managers, and the logging label.
pub struct ModelBase {
    sim: WeakSim,
    me: Option<WeakModel>,
    parent: Option<WeakModel>,
    label: String,
    children: Children,
    connections: Connections,
}

impl ModelBase {
    pub fn new(sim: &Simulator, label: impl Into<String>) -> Self {
        Self {
            sim: sim.downgrade(),
            me: None,
            parent: None,
            label: label.into(),
            children: Children::new(),
            connections: Connections::new(),
        }
    }

    /// A base with no context yet; the context is stamped when the model is
    /// adopted as a run's root (or a descendant of one).
    pub fn detached(label: impl Into<String>) -> Self {
        Self {
            sim: WeakSim::detached(),
            me: None,
            parent: None,
            label: label.into(),
            children: Children::new(),
            connections: Connections::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sim(&self) -> Simulator {
        self.sim.upgrade().expect("simulator context dropped")
    }

    pub fn parent(&self) -> Option<ModelRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Strong handle to this model; available once `into_ref` has bound it
    pub fn me(&self) -> ModelRef {
        self.me
            .as_ref()
            .and_then(Weak::upgrade)
            .expect("model not bound; wrap it with into_ref first")
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut Connections {
        &mut self.connections
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WeakModel>) {
        self.parent = parent;
    }

    pub(crate) fn set_sim(&mut self, sim: WeakSim) {
        self.connections.set_sim(sim.clone());
        self.sim = sim;
    }

    pub(crate) fn bind(&mut self, me: WeakModel) {
        self.children.bind(me.clone());
        self.connections.bind(self.sim.clone(), me.clone());
        self.me = Some(me);
    }
}

/// Wraps a model into the shared handle form and binds its self-reference.
/// Models must be wrapped this way before they can own children or
/// connections.
pub trait ModelExt: Model + Sized {
    fn into_ref(self) -> Rc<RefCell<Self>> {
        let strong = Rc::new(RefCell::new(self));
        let dynamic: ModelRef = strong.clone();
        strong.borrow_mut().base_mut().bind(Rc::downgrade(&dynamic));
        strong
    }
}

impl<M: Model> ModelExt for M {}
