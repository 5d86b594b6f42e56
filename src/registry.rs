//! External command registry
//!
//! The bridge only reads root command descriptors from the registry and
//! listens for change notifications; the registry owns everything else.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Callback fired after the registry's command set changes
pub type RegistryObserver = Arc<dyn Fn() + Send + Sync>;

/// One registration of a root command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandHolder {
    /// Whether later registrations under the same name are also honored
    pub allow_duplicates: bool,

    /// Literal children declared directly under the root
    pub children: Vec<String>,
}

impl CommandHolder {
    pub fn new(children: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allow_duplicates: false,
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }
}

/// A root command as the registry exposes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDescriptor {
    pub name: String,

    /// Runnable without further arguments
    pub executable: bool,

    /// Registrations in registration order
    pub holders: Vec<CommandHolder>,
}

impl RootDescriptor {
    pub fn new(name: impl Into<String>, executable: bool) -> Self {
        Self {
            name: name.into(),
            executable,
            holders: Vec::new(),
        }
    }

    pub fn with_holder(mut self, holder: CommandHolder) -> Self {
        self.holders.push(holder);
        self
    }

    /// Holders that take effect
    ///
    /// If the first holder does not allow duplicates, the later ones are
    /// ignored; otherwise every holder counts.
    pub fn effective_holders(&self) -> &[CommandHolder] {
        match self.holders.first() {
            Some(first) if !first.allow_duplicates => &self.holders[..1],
            _ => &self.holders,
        }
    }

    /// Declared child literals of the effective holders, first occurrence wins
    pub fn declared_children(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for holder in self.effective_holders() {
            for child in &holder.children {
                if !names.contains(&child.as_str()) {
                    names.push(child);
                }
            }
        }
        names
    }
}

/// Read access to the external command registry
pub trait CommandRegistry: Send + Sync {
    /// Current root commands, in registration order
    fn roots(&self) -> Vec<RootDescriptor>;

    /// Register a change observer
    fn subscribe(&self, observer: RegistryObserver);
}

/// Registry kept in memory
///
/// Serves as the registry for embedders that own their command set and as
/// the test double for the bridge. Observers run after the write lock is
/// released.
#[derive(Default)]
pub struct InMemoryRegistry {
    roots: RwLock<Vec<RootDescriptor>>,
    observers: Mutex<Vec<RegistryObserver>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root, or add its holders to an existing root of the same name
    pub fn register(&self, descriptor: RootDescriptor) {
        {
            let mut roots = self.roots.write();
            match roots.iter_mut().find(|root| root.name == descriptor.name) {
                Some(existing) => existing.holders.extend(descriptor.holders),
                None => roots.push(descriptor),
            }
        }
        self.notify();
    }

    /// Remove a root; returns whether it existed
    pub fn unregister(&self, name: &str) -> bool {
        let removed = {
            let mut roots = self.roots.write();
            let before = roots.len();
            roots.retain(|root| root.name != name);
            roots.len() != before
        };
        if removed {
            self.notify();
        }
        removed
    }

    /// Swap the whole command set in one step
    pub fn replace_all(&self, descriptors: Vec<RootDescriptor>) {
        *self.roots.write() = descriptors;
        self.notify();
    }

    fn notify(&self) {
        let observers = self.observers.lock().clone();
        tracing::debug!("Command registry changed, notifying {} observers", observers.len());
        for observer in observers {
            observer();
        }
    }
}

impl CommandRegistry for InMemoryRegistry {
    fn roots(&self) -> Vec<RootDescriptor> {
        self.roots.read().clone()
    }

    fn subscribe(&self, observer: RegistryObserver) {
        self.observers.lock().push(observer);
    }
}
