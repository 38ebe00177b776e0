use std::any::type_name;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::addressable::Addressable;
use crate::key::Key;
use crate::system::ActorSystem;

/// Creates a fresh addressable instance for a key, invoked once per activation.
pub struct Props<A> where A: Addressable {
    spawner: Arc<dyn Fn(&Key, &ActorSystem) -> anyhow::Result<A> + Send + Sync>,
}

impl<A> Props<A> where A: Addressable {
    pub fn new<F>(spawner: F) -> Self where F: Fn(&Key, &ActorSystem) -> anyhow::Result<A> + Send + Sync + 'static {
        Self {
            spawner: Arc::new(spawner),
        }
    }

    pub(crate) fn new_addressable(&self, key: &Key, system: &ActorSystem) -> anyhow::Result<A> {
        (self.spawner)(key, system)
    }
}

impl<A> Clone for Props<A> where A: Addressable {
    fn clone(&self) -> Self {
        Self {
            spawner: self.spawner.clone(),
        }
    }
}

impl<A> Debug for Props<A> where A: Addressable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Props")
            .field("addressable", &type_name::<A>())
            .field("kind", &A::KIND)
            .finish_non_exhaustive()
    }
}
