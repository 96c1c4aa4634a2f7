// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node handle.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};
use understory_affinity::{AffineContext, Unavailable, run_sync};
use understory_property::{ErasedValue, Property, PropertyRegistry};

use crate::backing::Slot;
use crate::dispatch::Dispatcher;
use crate::error::BoxError;
use crate::flush::flush;
use crate::gate::{CreationGate, GateError, Lifecycle};
use crate::shadow::{ShadowRead, ShadowState};
use crate::types::Signals;
use crate::{Backing, BackingKind, BackingRef, CreateError, NodeConfig, NodeId};

type Live<B> = Arc<Slot<B>>;
type Factory<B> = Box<dyn Fn() -> Result<B, BoxError> + Send + Sync>;

/// A thread-safe handle to a display node.
///
/// Until its backing object exists, a node stores every write in a shadow
/// store and answers reads from it. The first call that needs the object
/// ([`ensure_created`](Self::ensure_created) or
/// [`with_backing`](Self::with_backing)) runs the factory on the affine
/// context, applies the shadow state in flush order and seals it. From then
/// on reads and writes go to the object, marshaled onto the affine context
/// when made from elsewhere.
///
/// Clones share the same node.
///
/// A node must not be used from inside a call running on its own backing
/// object: a [`with_backing`](Self::with_backing) closure, a
/// [`BackingRef`] closure, or the object's own [`Backing`] methods. Such a
/// call panics instead of deadlocking.
///
/// ```rust
/// use std::sync::Arc;
/// use understory_affinity::AffineThread;
/// use understory_node::{HeadlessLayer, Node, props};
///
/// let main = AffineThread::spawn("main").unwrap();
/// let node = Node::new(Arc::new(main.handle()), || {
///     Ok::<_, std::convert::Infallible>(HeadlessLayer::new())
/// });
///
/// node.set(props::ALPHA, 0.3);
/// node.set(props::HIDDEN, true);
/// assert!(!node.is_created());
///
/// node.ensure_created().unwrap();
/// assert_eq!(node.get(props::ALPHA), 0.3);
/// assert_eq!(node.with_backing(|layer| layer.get(props::HIDDEN)).unwrap(), true);
/// ```
pub struct Node<B: Backing> {
    inner: Arc<NodeInner<B>>,
}

struct NodeInner<B: Backing> {
    id: NodeId,
    config: NodeConfig,
    shadow: ShadowState<Live<B>>,
    gate: CreationGate<Live<B>>,
    dispatcher: Dispatcher,
    factory: Factory<B>,
}

impl<B: Backing> Node<B> {
    /// Creates a node with the default [`NodeConfig`].
    ///
    /// `factory` runs on `context` when the backing object is first needed,
    /// and again on a later attempt if it fails.
    pub fn new<F, E>(context: Arc<dyn AffineContext>, factory: F) -> Self
    where
        F: Fn() -> Result<B, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::with_config(NodeConfig::default(), context, factory)
    }

    /// Creates a node with an explicit configuration.
    pub fn with_config<F, E>(config: NodeConfig, context: Arc<dyn AffineContext>, factory: F) -> Self
    where
        F: Fn() -> Result<B, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let id = NodeId::next();
        Self {
            inner: Arc::new(NodeInner {
                id,
                shadow: ShadowState::new(id),
                gate: CreationGate::new(),
                dispatcher: Dispatcher::new(id, context, config.write_policy),
                factory: Box::new(move || factory().map_err(Into::<BoxError>::into)),
                config,
            }),
        }
    }

    /// Returns this node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Returns the kind of backing object.
    #[must_use]
    pub fn kind(&self) -> BackingKind {
        B::KIND
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.inner.config
    }

    /// Returns the descriptor table for this node's kind.
    #[must_use]
    pub fn properties(&self) -> &'static PropertyRegistry {
        B::KIND.properties()
    }

    /// Returns the affine context the backing object is bound to.
    #[must_use]
    pub fn context(&self) -> &Arc<dyn AffineContext> {
        self.inner.dispatcher.context()
    }

    /// Returns where the node is in its creation.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.gate.lifecycle()
    }

    /// Returns `true` once the backing object exists.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.lifecycle() == Lifecycle::Created
    }

    /// Returns the number of writes waiting in the shadow store.
    ///
    /// Always zero once created.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.inner.shadow.pending_len()
    }

    /// Writes a property.
    ///
    /// Never fails. If the affine context has shut down the write is
    /// dropped and a warning is logged; use [`try_set`](Self::try_set) to
    /// observe that.
    pub fn set<T: Clone + Send + Sync + 'static>(&self, property: Property<T>, value: T) {
        if self.try_set(property, value).is_err() {
            warn!(
                node = %self.inner.id,
                property = self.property_name(property),
                "write dropped: affine context unavailable"
            );
        }
    }

    /// Writes a property, reporting a shut-down affine context.
    ///
    /// The value is coerced by the descriptor first. Before creation the
    /// write is recorded in the shadow store under the next sequence, and
    /// the last write to land is the one flushed. After creation it goes to
    /// the backing object according to the node's [`WritePolicy`].
    ///
    /// `Unavailable` is the only error. A `property` that is not in this
    /// node's table with type `T` is a programming error, not a runtime
    /// condition: the write is dropped with a warning and `Ok(())` is
    /// returned, while [`get`](Self::get) of the same property panics.
    ///
    /// [`WritePolicy`]: crate::WritePolicy
    pub fn try_set<T: Clone + Send + Sync + 'static>(
        &self,
        property: Property<T>,
        value: T,
    ) -> Result<(), Unavailable> {
        let id = property.id();
        let Some(metadata) = self.properties().get_metadata(property) else {
            warn!(
                node = %self.inner.id,
                property = %id,
                kind = ?B::KIND,
                "write dropped: not a property of this kind or of another type"
            );
            return Ok(());
        };
        let value = ErasedValue::new(metadata.coerce(value));
        match self.inner.shadow.write(id, value) {
            Ok(_) => Ok(()),
            Err((backing, value)) => self.inner.dispatcher.write(&backing, id, value),
        }
    }

    /// Reads a property.
    ///
    /// Falls back to the table default when the property was never written,
    /// when the backing object does not report it, and when the affine
    /// context has shut down (logged).
    ///
    /// # Panics
    ///
    /// Panics if `property` is not in this node's table with type `T`, and
    /// when called from inside a call running on this node's backing object.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, property: Property<T>) -> T {
        self.try_get(property).unwrap_or_else(|Unavailable| {
            warn!(
                node = %self.inner.id,
                property = self.property_name(property),
                "read fell back to default: affine context unavailable"
            );
            self.default_of(property)
        })
    }

    /// Reads a property, reporting a shut-down affine context.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not in this node's table with type `T`, and
    /// when called from inside a call running on this node's backing object.
    pub fn try_get<T: Clone + Send + Sync + 'static>(
        &self,
        property: Property<T>,
    ) -> Result<T, Unavailable> {
        let id = property.id();
        let value = match self.inner.shadow.read(id) {
            ShadowRead::Pending(value) => Some(value),
            ShadowRead::Unset => None,
            ShadowRead::Live(backing) => self.inner.dispatcher.read(&backing, id)?,
        };
        Ok(value
            .and_then(|value| value.downcast::<T>().ok())
            .unwrap_or_else(|| self.default_of(property)))
    }

    /// Requests a redraw. Before creation the request is held and delivered
    /// right after the flush.
    pub fn set_needs_display(&self) {
        self.signal(Signals::NEEDS_DISPLAY);
    }

    /// Requests a layout pass. Before creation the request is held and
    /// delivered right after the flush.
    pub fn set_needs_layout(&self) {
        self.signal(Signals::NEEDS_LAYOUT);
    }

    fn signal(&self, signals: Signals) {
        if let Err(backing) = self.inner.shadow.signal(signals) {
            if self.inner.dispatcher.signal(&backing, signals).is_err() {
                warn!(node = %self.inner.id, ?signals, "signal dropped: affine context unavailable");
            }
        }
    }

    /// Creates the backing object if needed and returns a handle to it.
    ///
    /// The factory and flush always run on the affine context; from any
    /// other thread this blocks until they are done. Concurrent callers all
    /// receive the same object.
    pub fn ensure_created(&self) -> Result<BackingRef<B>, CreateError> {
        let backing = match self.inner.gate.get() {
            Some(backing) => backing,
            None if self.context().is_current() => self.inner.create()?,
            None => {
                let inner = Arc::clone(&self.inner);
                run_sync(&**self.context(), move || inner.create())??
            }
        };
        debug_assert!(self.inner.shadow.is_sealed(), "created node with open shadow");
        Ok(BackingRef::new(backing, Arc::clone(self.context())))
    }

    /// Returns the backing object if it already exists.
    #[must_use]
    pub fn backing(&self) -> Option<BackingRef<B>> {
        self.inner
            .gate
            .get()
            .map(|backing| BackingRef::new(backing, Arc::clone(self.context())))
    }

    /// Runs `f` on the backing object on the affine context, creating the
    /// object first if needed.
    ///
    /// `f` must not use this node; see [`BackingRef::with`].
    pub fn with_backing<R, F>(&self, f: F) -> Result<R, CreateError>
    where
        F: FnOnce(&mut B) -> R + Send + 'static,
        R: Send + 'static,
    {
        Ok(self.ensure_created()?.run(f)?)
    }

    fn default_of<T: Clone + 'static>(&self, property: Property<T>) -> T {
        match self.properties().get_metadata(property) {
            Some(metadata) => metadata.default_value().clone(),
            None => panic!(
                "{} is not a {:?} property of type {}",
                property.id(),
                B::KIND,
                core::any::type_name::<T>()
            ),
        }
    }

    fn property_name<T>(&self, property: Property<T>) -> &'static str {
        self.properties().name(property.id()).unwrap_or("<unknown>")
    }
}

impl<B: Backing> NodeInner<B> {
    /// Runs the factory and flush under the gate. Called on the affine
    /// context only.
    ///
    /// A panic in either is caught here, so the caller gets
    /// [`CreateError::Panicked`] and the gate and shadow are left as they
    /// were before the attempt.
    fn create(&self) -> Result<Live<B>, CreateError> {
        let registry = B::KIND.properties();
        let outcome = self.gate.ensure(|| {
            let started = Instant::now();
            let mut applied = 0;
            let live = catch_unwind(AssertUnwindSafe(|| -> Result<Live<B>, CreateError> {
                let mut backing = (self.factory)().map_err(CreateError::Factory)?;
                Ok(self.shadow.seal(registry, |pending, signals| {
                    applied = flush(&mut backing, registry, pending, signals);
                    Arc::new(Slot::new(backing))
                }))
            }))
            .unwrap_or_else(|payload| Err(CreateError::Panicked(panic_message(&*payload))))?;
            debug!(
                node = %self.id,
                label = self.config.label.as_deref(),
                kind = ?B::KIND,
                applied,
                elapsed = ?started.elapsed(),
                "backing object created"
            );
            Ok(live)
        });
        match outcome {
            Ok(live) => Ok(live),
            Err(GateError::Failed(err)) => {
                warn!(node = %self.id, error = %err, "backing creation failed");
                Err(err)
            }
            Err(GateError::Reentrant) => {
                error!(node = %self.id, "backing factory re-entered its own node");
                Err(CreateError::Reentrant)
            }
        }
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

impl<B: Backing> Clone for Node<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backing> core::fmt::Debug for Node<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("kind", &B::KIND)
            .field("label", &self.inner.config.label)
            .field("lifecycle", &self.lifecycle())
            .field("shadow", &self.inner.shadow)
            .field("dispatcher", &self.inner.dispatcher)
            .finish_non_exhaustive()
    }
}
