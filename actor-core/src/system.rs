use std::any::type_name;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use tracing::{error, info};

use crate::actor_ref::ActorRef;
use crate::addressable::{Addressable, AddressableReference, DeactivationReason};
use crate::config::core_config::CoreConfig;
use crate::directory::{AnyDirectory, Directory};
use crate::error::Error;
use crate::key::Key;
use crate::props::Props;

/// Hosts the activations of every registered addressable kind.
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

pub struct SystemInner {
    name: String,
    config: CoreConfig,
    directories: DashMap<&'static str, Arc<dyn AnyDirectory>, ahash::RandomState>,
    shutting_down: AtomicBool,
}

impl Debug for ActorSystem {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kinds = self.directories.iter().map(|e| e.kind()).collect::<Vec<_>>();
        f.debug_struct("ActorSystem")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("kinds", &kinds)
            .field("shutting_down", &self.shutting_down)
            .finish()
    }
}

impl Deref for ActorSystem {
    type Target = Arc<SystemInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl ActorSystem {
    pub fn new(name: impl Into<String>, config: CoreConfig) -> Self {
        let inner = SystemInner {
            name: name.into(),
            config,
            directories: DashMap::default(),
            shutting_down: AtomicBool::new(false),
        };
        Self {
            inner: inner.into(),
        }
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn register<A>(&self, props: Props<A>) -> anyhow::Result<()> where A: Addressable {
        match self.directories.entry(A::KIND) {
            Entry::Occupied(_) => {
                Err(Error::DuplicateAddressable(A::KIND).into())
            }
            Entry::Vacant(entry) => {
                let directory = Directory::new(self.downgrade(), props, &self.config);
                entry.insert(Arc::new(directory));
                info!("{} register addressable {} as {}", self.name, type_name::<A>(), A::KIND);
                Ok(())
            }
        }
    }

    pub(crate) fn directory<A>(&self) -> anyhow::Result<Arc<Directory<A>>> where A: Addressable {
        let directory = self.directories
            .get(A::KIND)
            .map(|directory| directory.value().clone())
            .ok_or(Error::AddressableNotRegistered(A::KIND))?;
        directory.into_any().downcast::<Directory<A>>().map_err(|_| {
            anyhow!("addressable kind {} is registered by another type than {}", A::KIND, type_name::<A>())
        })
    }

    /// Resolves a reference by kind and key. Nothing is activated until the
    /// first message is sent through it.
    pub fn actor_ref<A>(&self, key: impl Into<Key>) -> anyhow::Result<ActorRef<A>> where A: Addressable {
        let directory = self.directory::<A>()?;
        let reference = AddressableReference::new(A::KIND, key.into());
        let timeout = self.config.message_timeout.map(|timeout| timeout.into());
        Ok(ActorRef::new(reference, directory, timeout))
    }

    pub fn active_count<A>(&self) -> anyhow::Result<usize> where A: Addressable {
        Ok(self.directory::<A>()?.active_count())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Refuses new activations and deactivates every live one with
    /// [DeactivationReason::NodeShuttingDown].
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("{} shutting down", self.name);
        let directories = self.directories.iter().map(|e| e.value().clone()).collect::<Vec<_>>();
        let results = join_all(directories.iter().map(|directory| {
            directory.deactivate_all(DeactivationReason::NodeShuttingDown)
        })).await;
        let errors = results.into_iter().flatten().collect::<Vec<_>>();
        for error in &errors {
            error!("{} deactivation on shutdown failed: {:?}", self.name, error);
        }
        if errors.is_empty() {
            info!("{} shutdown complete", self.name);
            Ok(())
        } else {
            Err(anyhow!("{} addressables failed to deactivate on shutdown of {}", errors.len(), self.name))
        }
    }

    pub fn downgrade(&self) -> WeakActorSystem {
        WeakActorSystem {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

#[derive(Clone)]
pub struct WeakActorSystem {
    inner: Weak<SystemInner>,
}

impl Debug for WeakActorSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakActorSystem")
            .finish_non_exhaustive()
    }
}

impl WeakActorSystem {
    pub fn upgrade(&self) -> anyhow::Result<ActorSystem> {
        match self.inner.upgrade() {
            None => Err(Error::ActorSystemDestroyed.into()),
            Some(inner) => Ok(ActorSystem { inner }),
        }
    }
}
