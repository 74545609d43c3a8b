//! Named-handler registry
//!
//! A convenience map of named callables that user models look up by string.
//! Registration is allowed at any point, including from handler bodies, so
//! the map sits behind a `RefCell`.

use crate::error::{SimError, SimResult};
use crate::sim::Simulator;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A reusable named callable
pub type NamedHandler = Rc<dyn Fn(&Simulator) -> SimResult<()>>;

#[derive(Default)]
pub struct HandlerRegistry {
    map: RefCell<IndexMap<String, NamedHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        name: impl Into<String>,
        handler: impl Fn(&Simulator) -> SimResult<()> + 'static,
    ) {
        self.insert_shared(name, Rc::new(handler));
    }

    pub fn insert_shared(&self, name: impl Into<String>, handler: NamedHandler) {
        self.map.borrow_mut().insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<NamedHandler> {
        self.map.borrow().get(name).cloned()
    }

    /// Lookup that surfaces absence as `UnknownName`
    pub fn lookup(&self, name: &str) -> SimResult<NamedHandler> {
        self.get(name)
            .ok_or_else(|| SimError::UnknownName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.borrow().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.map.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRegistry")
            .field(&self.names())
            .finish()
    }
}
