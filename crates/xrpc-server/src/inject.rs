//! # Service Injection
//!
//! A type-keyed service locator shared by every procedure of an [`App`].
//! Services are registered once, either as ready values or as lazy
//! constructors that run on first use and are cached afterwards.
//!
//! [`App`]: crate::App

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

type Instance = Arc<dyn Any + Send + Sync>;
type Constructor = Arc<dyn Fn(&Injector) -> Result<Instance, InjectError> + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Lazy(Constructor),
    Ready(Instance),
}

/// Failure resolving a service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("no service of type {type_name} was provided")]
    NotProvided { type_name: &'static str },

    #[error("failed to construct service {type_name}: {message}")]
    Construction {
        type_name: &'static str,
        message: String,
    },

    #[error("service registered for {type_name} has a different type")]
    TypeMismatch { type_name: &'static str },
}

/// Type-keyed service container.
#[derive(Default)]
pub struct Injector {
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("services", &self.slots.read().len())
            .finish()
    }
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lazy constructor for `T`. Replaces any earlier provider.
    pub fn provide<T, F>(&self, constructor: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Injector) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(move |injector: &Injector| {
            constructor(injector)
                .map(|value| Arc::new(value) as Instance)
                .map_err(|err| InjectError::Construction {
                    type_name: type_name::<T>(),
                    message: format!("{err:#}"),
                })
        });
        self.slots
            .write()
            .insert(TypeId::of::<T>(), Slot::Lazy(constructor));
    }

    /// Register an already built `T`.
    pub fn provide_value<T: Send + Sync + 'static>(&self, value: T) {
        self.slots
            .write()
            .insert(TypeId::of::<T>(), Slot::Ready(Arc::new(value)));
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.slots.read().contains_key(&TypeId::of::<T>())
    }

    /// Resolve `T`, constructing and caching it on first use.
    pub fn invoke<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectError> {
        let key = TypeId::of::<T>();
        let constructor = match self.slots.read().get(&key).cloned() {
            None => {
                return Err(InjectError::NotProvided {
                    type_name: type_name::<T>(),
                })
            }
            Some(Slot::Ready(instance)) => return downcast(instance),
            Some(Slot::Lazy(constructor)) => constructor,
        };

        // Constructors may resolve their own dependencies, so the lock is
        // released while they run.
        let built = constructor(self)?;

        let instance = {
            let mut slots = self.slots.write();
            match slots.get(&key) {
                Some(Slot::Ready(existing)) => Arc::clone(existing),
                _ => {
                    slots.insert(key, Slot::Ready(Arc::clone(&built)));
                    built
                }
            }
        };
        downcast(instance)
    }
}

fn downcast<T: Send + Sync + 'static>(instance: Instance) -> Result<Arc<T>, InjectError> {
    instance.downcast::<T>().map_err(|_| InjectError::TypeMismatch {
        type_name: type_name::<T>(),
    })
}
