#![forbid(unsafe_code)]

//! The public entry point: one context per page.
//!
//! [`ModalContext`] owns the [`Document`], the scroll lock, the registry of
//! live instances, and the host services (content loader, announcer, clock).
//! Nothing here is process-global except id allocation, so independent
//! contexts never interfere.
//!
//! Hosts drive a context with three calls besides the API: forward input to
//! [`ModalContext::handle_event`], call [`ModalContext::tick`] from the frame
//! or timer loop, and report loads with [`ModalContext::complete_load`].
//!
//! # Example
//!
//! ```ignore
//! let mut ctx = ModalContext::new(MemoryDocument::new());
//! let id = ctx.open(
//!     vec![Item::new("a.jpg"), Item::new("b.jpg"), Item::new("c.jpg")],
//!     ModalOptions::default().start_index(1),
//! )?;
//! ctx.instance(id).map(|mut m| m.next());
//! ctx.close();
//! ctx.tick();
//! ```

use std::fmt;

use lmodal_core::{Document, Event};
use lmodal_runtime::{Announcer, Clock, HandlerId, Instant, SystemClock, TracingAnnouncer};

use super::error::{NavigationError, OpenError};
use super::events::{ModalEvent, ModalEventKind};
use super::gallery::Gallery;
use super::item::ItemList;
use super::lifecycle::{Env, Modal, ModalPhase};
use super::loader::{ContentLoader, ImmediateLoader, LoadError, LoadTicket, LoadedContent, TicketSource};
use super::options::ModalOptions;
use super::registry::{ModalId, Registry};
use super::inline::InlineLedger;
use super::scroll_lock::ScrollLock;

pub struct ModalContext<D: Document> {
    document: D,
    scroll_lock: ScrollLock,
    inline: InlineLedger,
    registry: Registry,
    loader: Box<dyn ContentLoader>,
    announcer: Box<dyn Announcer>,
    clock: Box<dyn Clock>,
    tickets: TicketSource,
}

impl<D: Document> fmt::Debug for ModalContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("instances", &self.registry.ids())
            .field("current", &self.registry.current())
            .field("scroll_locked", &self.scroll_lock.is_locked())
            .field("relocated", &self.inline.len())
            .finish_non_exhaustive()
    }
}

impl<D: Document> ModalContext<D> {
    /// A context with synchronous loads, logged announcements, and the
    /// system clock.
    pub fn new(document: D) -> Self {
        Self {
            document,
            scroll_lock: ScrollLock::new(),
            inline: InlineLedger::new(),
            registry: Registry::new(),
            loader: Box::new(ImmediateLoader),
            announcer: Box::new(TracingAnnouncer),
            clock: Box::new(SystemClock),
            tickets: TicketSource::default(),
        }
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl ContentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    #[must_use]
    pub fn with_announcer(mut self, announcer: impl Announcer + 'static) -> Self {
        self.announcer = Box::new(announcer);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of live (not yet destroyed) instances.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The instance that receives input.
    pub fn current(&self) -> Option<ModalId> {
        self.registry.current()
    }

    /// Open an overlay on `items`.
    ///
    /// The instance is registered, its first item resolved, and it becomes
    /// `Ready` before this returns.
    pub fn open(
        &mut self,
        items: impl Into<ItemList>,
        options: ModalOptions,
    ) -> Result<ModalId, OpenError> {
        let gallery =
            Gallery::new(items.into().into_vec(), options.start_index).ok_or(OpenError::NoItems)?;
        if options.close_existing {
            self.close_all();
        }
        let id = ModalId::new();
        let z_index = self.registry.next_z_index();
        let (registry, mut env) = self.split();
        let modal = Modal::create(id, gallery, options, z_index, &mut env);
        registry.insert(modal);
        self.with_modal(id, |modal, env| {
            modal.show_current(env);
            modal.open(env);
        });
        Ok(id)
    }

    /// Close the current instance.
    pub fn close(&mut self) -> bool {
        self.current().is_some_and(|id| self.close_instance(id))
    }

    pub fn close_instance(&mut self, id: ModalId) -> bool {
        self.with_modal(id, |modal, env| modal.close(env))
            .unwrap_or(false)
    }

    /// Close every open instance. Returns how many started closing.
    pub fn close_all(&mut self) -> usize {
        self.registry
            .ids_in(ModalPhase::Ready)
            .into_iter()
            .filter(|&id| self.close_instance(id))
            .count()
    }

    /// Tear an instance down immediately, skipping the close animation.
    pub fn destroy(&mut self, id: ModalId) -> bool {
        self.with_modal(id, |modal, env| modal.destroy(env))
            .unwrap_or(false)
    }

    /// Tear every instance down immediately, topmost first.
    pub fn destroy_all(&mut self) -> usize {
        self.registry
            .ids()
            .into_iter()
            .rev()
            .filter(|&id| self.destroy(id))
            .count()
    }

    /// The instance `id`, or the current one when `id` is `None`.
    pub fn get_instance(&self, id: Option<ModalId>) -> Option<&Modal> {
        let id = id.or(self.registry.current())?;
        self.registry.get(id)
    }

    /// A handle for driving instance `id`.
    pub fn instance(&mut self, id: ModalId) -> Option<Instance<'_, D>> {
        self.registry
            .contains(id)
            .then_some(Instance { ctx: self, id })
    }

    pub fn current_instance(&mut self) -> Option<Instance<'_, D>> {
        let id = self.registry.current()?;
        self.instance(id)
    }

    /// Route input to the current instance. Returns `true` when consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Some(id) = self.registry.current() else {
            return false;
        };
        self.with_modal(id, |modal, env| modal.handle_event(env, event))
            .unwrap_or(false)
    }

    /// Fire every due timer. Returns how many instances were destroyed.
    pub fn tick(&mut self) -> usize {
        let before = self.registry.len();
        for id in self.registry.ids() {
            self.with_modal(id, |modal, env| modal.tick(env));
        }
        before.saturating_sub(self.registry.len())
    }

    /// Earliest timer deadline across all instances.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry.iter().filter_map(Modal::next_deadline).min()
    }

    /// Report the outcome of a load started through the [`ContentLoader`].
    ///
    /// Returns `false` when no live instance is waiting for `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedContent, LoadError>,
    ) -> bool {
        let owner = self
            .registry
            .iter()
            .find(|m| m.pending_load() == Some(ticket))
            .map(Modal::id);
        let Some(id) = owner else {
            tracing::debug!(%ticket, "modal.load_stale");
            return false;
        };
        self.with_modal(id, |modal, env| modal.complete_load(env.doc, ticket, result))
            .unwrap_or(false)
    }

    /// Browser history moved back: close the current instance when it
    /// shows inline page content.
    pub fn handle_history_navigation(&mut self) -> bool {
        let Some(id) = self.registry.current() else {
            return false;
        };
        let inline = self.registry.get(id).is_some_and(Modal::shows_inline);
        inline && self.close_instance(id)
    }

    fn split(&mut self) -> (&mut Registry, Env<'_, D>) {
        let now = self.clock.now();
        let env = Env {
            doc: &mut self.document,
            scroll: &mut self.scroll_lock,
            inline: &mut self.inline,
            loader: self.loader.as_mut(),
            announcer: self.announcer.as_mut(),
            tickets: &mut self.tickets,
            now,
        };
        (&mut self.registry, env)
    }

    fn with_modal<R>(
        &mut self,
        id: ModalId,
        f: impl FnOnce(&mut Modal, &mut Env<'_, D>) -> R,
    ) -> Option<R> {
        let (registry, mut env) = self.split();
        let modal = registry.get_mut(id)?;
        let out = f(modal, &mut env);
        self.reap();
        Some(out)
    }

    /// Unregister destroyed instances, then emit their `Destroy`.
    fn reap(&mut self) {
        for id in self.registry.ids_in(ModalPhase::Destroyed) {
            if let Some(mut modal) = self.registry.remove(id) {
                modal.finish();
            }
        }
    }
}

/// Borrowed handle to one live instance.
pub struct Instance<'a, D: Document> {
    ctx: &'a mut ModalContext<D>,
    id: ModalId,
}

impl<D: Document> Instance<'_, D> {
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// The instance, until it is destroyed.
    pub fn modal(&self) -> Option<&Modal> {
        self.ctx.registry.get(self.id)
    }

    pub fn phase(&self) -> ModalPhase {
        self.modal().map_or(ModalPhase::Destroyed, Modal::phase)
    }

    pub fn index(&self) -> Option<usize> {
        self.modal().map(Modal::index)
    }

    pub fn next(&mut self) -> bool {
        self.ctx
            .with_modal(self.id, |modal, env| modal.next(env))
            .unwrap_or(false)
    }

    pub fn prev(&mut self) -> bool {
        self.ctx
            .with_modal(self.id, |modal, env| modal.prev(env))
            .unwrap_or(false)
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        self.ctx
            .with_modal(self.id, |modal, env| modal.go_to(env, index))
            .unwrap_or(false)
    }

    /// Checked jump. `Ok(false)` when `index` is already current.
    pub fn try_go_to(&mut self, index: usize) -> Result<bool, NavigationError> {
        self.ctx
            .with_modal(self.id, |modal, env| modal.try_go_to(env, index))
            .unwrap_or(Err(NavigationError::NotReady))
    }

    /// Subscribe to `kind`. `None` once the instance is destroyed.
    pub fn on(
        &mut self,
        kind: ModalEventKind,
        handler: impl Fn(&ModalEvent) + 'static,
    ) -> Option<HandlerId> {
        let modal = self.ctx.registry.get_mut(self.id)?;
        modal.on(kind, handler)
    }

    pub fn off(&mut self, handler: HandlerId) -> bool {
        self.ctx
            .registry
            .get_mut(self.id)
            .is_some_and(|modal| modal.off(handler))
    }

    pub fn close(&mut self) -> bool {
        self.ctx.close_instance(self.id)
    }

    pub fn destroy(&mut self) -> bool {
        self.ctx.destroy(self.id)
    }
}
