//! Named children manager
//!
//! A parent owns its children through this insertion-ordered mapping. A
//! slot holds either a single model or an ordered tuple of models; parent
//! links are maintained on every mutation, so after any sequence of
//! operations a model's parent is P iff it sits in P's children mapping.

use crate::model::{Model, ModelRef, WeakModel};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A named child slot
#[derive(Clone)]
pub enum ChildSlot {
    One(ModelRef),
    Many(Vec<ModelRef>),
}

impl ChildSlot {
    fn for_each(&self, mut f: impl FnMut(&ModelRef)) {
        match self {
            ChildSlot::One(model) => f(model),
            ChildSlot::Many(models) => {
                for model in models {
                    f(model);
                }
            }
        }
    }

    /// The slot's models, in order
    pub fn models(&self) -> Vec<ModelRef> {
        let mut out = Vec::new();
        self.for_each(|m| out.push(m.clone()));
        out
    }

    pub fn as_one(&self) -> Option<&ModelRef> {
        match self {
            ChildSlot::One(model) => Some(model),
            ChildSlot::Many(_) => None,
        }
    }
}

impl fmt::Debug for ChildSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSlot::One(m) => write!(f, "One({})", m.borrow().label()),
            ChildSlot::Many(ms) => write!(f, "Many(x{})", ms.len()),
        }
    }
}

impl From<ModelRef> for ChildSlot {
    fn from(model: ModelRef) -> Self {
        ChildSlot::One(model)
    }
}

impl From<Vec<ModelRef>> for ChildSlot {
    fn from(models: Vec<ModelRef>) -> Self {
        ChildSlot::Many(models)
    }
}

impl<M: Model> From<Rc<RefCell<M>>> for ChildSlot {
    fn from(model: Rc<RefCell<M>>) -> Self {
        ChildSlot::One(model)
    }
}

#[derive(Default)]
pub struct Children {
    owner: Option<WeakModel>,
    slots: IndexMap<String, ChildSlot>,
}

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, owner: WeakModel) {
        self.owner = Some(owner);
    }

    fn notify(slot: &ChildSlot, parent: Option<&WeakModel>) {
        slot.for_each(|model| model.borrow_mut().base_mut().set_parent(parent.cloned()));
    }

    /// Insert or replace. Every model in the new slot is told its parent is
    /// this manager's owner; a displaced slot is told it has none.
    pub fn insert(&mut self, name: impl Into<String>, child: impl Into<ChildSlot>) {
        let owner = self
            .owner
            .clone()
            .expect("children manager not bound; wrap the model with into_ref first");
        let slot = child.into();
        if let Some(displaced) = self.slots.insert(name.into(), slot.clone()) {
            Self::notify(&displaced, None);
        }
        Self::notify(&slot, Some(&owner));
    }

    /// Bulk insert
    pub fn update<I, K, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<ChildSlot>,
    {
        for (name, slot) in entries {
            self.insert(name, slot);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ChildSlot> {
        self.slots.get(name)
    }

    /// Single-model accessor for the common case
    pub fn get_one(&self, name: &str) -> Option<ModelRef> {
        self.get(name).and_then(|slot| slot.as_one().cloned())
    }

    /// Remove a slot, clearing the parent link of every model in it
    pub fn remove(&mut self, name: &str) -> Option<ChildSlot> {
        let slot = self.slots.shift_remove(name)?;
        Self::notify(&slot, None);
        Some(slot)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// The name → slot mapping
    pub fn slots(&self) -> &IndexMap<String, ChildSlot> {
        &self.slots
    }

    /// Flattened distinct model instances, in insertion order
    pub fn models(&self) -> Vec<ModelRef> {
        let mut out: Vec<ModelRef> = Vec::new();
        for slot in self.slots.values() {
            slot.for_each(|model| {
                if !out.iter().any(|seen| Rc::ptr_eq(seen, model)) {
                    out.push(model.clone());
                }
            });
        }
        out
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.slots.iter()).finish()
    }
}
