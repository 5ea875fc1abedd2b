#![forbid(unsafe_code)]

//! Per-instance overlay state machine.
//!
//! ```text
//! Init ──open──▶ Ready ──close──▶ Closing ──close timer──▶ Destroyed
//!                  │                                          ▲
//!                  └──────────────destroy─────────────────────┘
//! ```
//!
//! A [`Modal`] never touches the page directly; every operation receives the
//! context's services (document, scroll lock, loader, announcer, clock
//! reading) for the duration of the call.
//!
//! # Invariants
//!
//! - Transitions only move forward. `open` fires only from `Init`, `close`
//!   only from `Ready`; everything else is a no-op returning `false`.
//! - Focus is restored when closing starts, not when teardown finishes.
//! - Teardown runs once: close the native surface, detach, release the
//!   scroll lock, restore relocated inline content. Registry removal and the
//!   `Destroy` event follow in the context.
//! - At most one load is pending. Its completion is applied only while the
//!   instance is `Init` or `Ready` and the ticket still matches.
//! - The loading indicator is shown once per resolution and hidden exactly
//!   once, by content, by an error, or by abandoning the load.
//! - Idle tracking runs only while `Ready`.

use std::rc::Rc;

use lmodal_core::{
    Document, ElementId, Event, HitTarget, KeyCode, KeyEvent, PointerEvent, PointerEventKind,
    PointerKind,
};
use lmodal_runtime::{Announcer, Dispatcher, HandlerId, Instant, Timer};

use super::error::NavigationError;
use super::events::{ModalEvent, ModalEventKind};
use super::focus::FocusTrap;
use super::gallery::Gallery;
use super::gesture::{GestureEngine, GestureOutcome};
use super::inline::InlineLedger;
use super::item::Item;
use super::loader::{
    ContentLoader, LoadError, LoadKind, LoadRequest, LoadTicket, LoadedContent, TicketSource,
};
use super::options::ModalOptions;
use super::registry::ModalId;
use super::resolver::{Classification, classify};
use super::scroll_lock::ScrollLock;
use super::surface::Surface;

/// Announced when an overlay becomes visible.
pub const OPENED_ANNOUNCEMENT: &str = "Modal opened";
/// Announced when an overlay starts closing.
pub const CLOSED_ANNOUNCEMENT: &str = "Modal closed";

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModalPhase {
    /// Built, not yet visible.
    Init,
    /// Visible and interactive.
    Ready,
    /// Animating out.
    Closing,
    /// Torn down. Terminal.
    Destroyed,
}

/// Services an instance borrows from its context for one operation.
pub(crate) struct Env<'a, D: Document + ?Sized> {
    pub(crate) doc: &'a mut D,
    pub(crate) scroll: &'a mut ScrollLock,
    pub(crate) inline: &'a mut InlineLedger,
    pub(crate) loader: &'a mut dyn ContentLoader,
    pub(crate) announcer: &'a mut dyn Announcer,
    pub(crate) tickets: &'a mut TicketSource,
    pub(crate) now: Instant,
}

#[derive(Debug, Default)]
struct Timers {
    focus: Timer,
    idle: Timer,
    settle: Timer,
    close: Timer,
}

impl Timers {
    fn cancel_interactive(&mut self) {
        self.focus.cancel();
        self.idle.cancel();
        self.settle.cancel();
    }

    fn cancel_all(&mut self) {
        self.cancel_interactive();
        self.close.cancel();
    }
}

#[derive(Debug)]
struct PendingLoad {
    ticket: LoadTicket,
    kind: LoadKind,
}

/// One overlay instance.
#[derive(Debug)]
pub struct Modal {
    id: ModalId,
    z_index: u32,
    options: ModalOptions,
    gallery: Gallery,
    phase: ModalPhase,
    surface: Surface,
    handlers: Dispatcher<ModalEvent>,
    gesture: GestureEngine,
    trap: Option<FocusTrap>,
    previous_focus: Option<ElementId>,
    inline: Option<ElementId>,
    pending: Option<PendingLoad>,
    idle: bool,
    timers: Timers,
    backdrop_pressed: bool,
    close_pressed: bool,
}

impl Modal {
    /// Build the hidden surface, attach option callbacks, and emit `Init`.
    pub(crate) fn create<D: Document + ?Sized>(
        id: ModalId,
        gallery: Gallery,
        options: ModalOptions,
        z_index: u32,
        env: &mut Env<'_, D>,
    ) -> Self {
        let surface = Surface::build(env.doc, id, &options, z_index);
        let mut handlers = Dispatcher::new();
        for (kind, handler) in options.callbacks.iter() {
            handlers.on_shared(*kind, Rc::clone(handler));
        }
        let modal = Self {
            id,
            z_index,
            gesture: GestureEngine::new(options.gesture),
            options,
            gallery,
            phase: ModalPhase::Init,
            surface,
            handlers,
            trap: None,
            previous_focus: None,
            inline: None,
            pending: None,
            idle: false,
            timers: Timers::default(),
            backdrop_pressed: false,
            close_pressed: false,
        };
        tracing::debug!(
            modal = id.id(),
            items = modal.gallery.len(),
            index = modal.gallery.index(),
            z_index,
            "modal.init"
        );
        modal.emit(&ModalEvent::Init);
        modal
    }

    // --- Accessors ---

    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn index(&self) -> usize {
        self.gallery.index()
    }

    pub fn len(&self) -> usize {
        self.gallery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gallery.is_empty()
    }

    pub fn current_item(&self) -> &Item {
        self.gallery.current()
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn focus_trap(&self) -> Option<&FocusTrap> {
        self.trap.as_ref()
    }

    pub fn is_focus_trapped(&self) -> bool {
        self.trap.as_ref().is_some_and(FocusTrap::is_active)
    }

    pub fn gesture(&self) -> &GestureEngine {
        &self.gesture
    }

    /// Ticket of the load this instance is waiting for.
    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Whether a page element is currently relocated into this overlay.
    pub fn shows_inline(&self) -> bool {
        self.inline.is_some()
    }

    pub fn container(&self) -> ElementId {
        self.surface.container()
    }

    pub fn backdrop(&self) -> ElementId {
        self.surface.backdrop()
    }

    pub fn wrapper(&self) -> ElementId {
        self.surface.wrapper()
    }

    pub fn content(&self) -> ElementId {
        self.surface.content()
    }

    pub fn close_button(&self) -> Option<ElementId> {
        self.surface.close_button()
    }

    pub fn drag_indicator(&self) -> Option<ElementId> {
        self.surface.drag_indicator()
    }

    pub fn caption(&self) -> Option<ElementId> {
        self.surface.caption()
    }

    pub fn loader(&self) -> Option<ElementId> {
        self.surface.loader()
    }

    pub fn handler_count(&self, kind: ModalEventKind) -> usize {
        self.handlers.count(kind)
    }

    // --- Handlers ---

    pub(crate) fn on(
        &mut self,
        kind: ModalEventKind,
        handler: impl Fn(&ModalEvent) + 'static,
    ) -> Option<HandlerId> {
        (self.phase != ModalPhase::Destroyed).then(|| self.handlers.on(kind, handler))
    }

    pub(crate) fn off(&mut self, id: HandlerId) -> bool {
        self.handlers.off(id)
    }

    fn emit(&self, event: &ModalEvent) {
        let delivered = self.handlers.emit(event);
        tracing::trace!(modal = self.id.id(), event = ?event, delivered, "modal.emit");
    }

    // --- Transitions ---

    /// `Init -> Ready`.
    pub(crate) fn open<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        if self.phase != ModalPhase::Init {
            return false;
        }
        if self.options.restore_focus {
            self.previous_focus = env.doc.active_element();
        }
        if self.options.hide_scrollbar {
            env.scroll.acquire(env.doc, self.id);
        }
        self.surface.reveal(env.doc);
        self.phase = ModalPhase::Ready;
        if self.options.trap_focus || self.options.auto_focus {
            self.timers
                .focus
                .arm(env.now, self.options.auto_focus_delay);
        }
        if let Some(timeout) = self.options.idle_timeout {
            self.timers.idle.arm(env.now, timeout);
        }
        tracing::debug!(modal = self.id.id(), "modal.open");
        env.announcer.announce(OPENED_ANNOUNCEMENT);
        self.emit(&ModalEvent::Open);
        true
    }

    /// `Ready -> Closing`.
    pub(crate) fn close<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        if self.phase != ModalPhase::Ready {
            return false;
        }
        self.phase = ModalPhase::Closing;
        self.timers.cancel_interactive();
        self.end_pointer_tracking(env.doc);
        self.abandon_load(env);
        if let Some(trap) = self.trap.as_mut() {
            trap.release();
        }
        if let Some(previous) = self.previous_focus.take() {
            env.doc.focus(previous);
        }
        if self.idle {
            self.idle = false;
            self.surface.set_idle(env.doc, false);
        }
        self.surface.begin_closing(env.doc, self.options.close_speed);
        self.timers.close.arm(env.now, self.options.close_speed);
        tracing::debug!(
            modal = self.id.id(),
            close_ms = self.options.close_speed.as_millis() as u64,
            "modal.close"
        );
        env.announcer.announce(CLOSED_ANNOUNCEMENT);
        self.emit(&ModalEvent::Close);
        true
    }

    /// Close if needed and tear down immediately, skipping the animation.
    pub(crate) fn destroy<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        if self.phase == ModalPhase::Destroyed {
            return false;
        }
        self.close(env);
        self.teardown(env);
        true
    }

    /// `-> Destroyed`: release everything this instance holds on the page.
    fn teardown<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) {
        if self.phase == ModalPhase::Destroyed {
            return;
        }
        self.phase = ModalPhase::Destroyed;
        self.timers.cancel_all();
        self.abandon_load(env);
        if let Some(trap) = self.trap.as_mut() {
            trap.release();
        }
        self.gesture.reset();
        self.surface.teardown(env.doc);
        env.scroll.release(env.doc, self.id);
        if let Some(element) = self.inline.take() {
            env.inline.release(env.doc, element, self.id);
        }
        tracing::debug!(modal = self.id.id(), "modal.destroy");
    }

    /// Emit `Destroy` and drop every handler. Called by the context once the
    /// instance has left the registry.
    pub(crate) fn finish(&mut self) {
        if self.phase == ModalPhase::Destroyed {
            self.emit(&ModalEvent::Destroy);
            self.handlers.clear();
        }
    }

    /// Fire due timers. Returns `true` when the instance reached `Destroyed`.
    pub(crate) fn tick<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        if self.timers.focus.fire(env.now) {
            self.engage_focus(env.doc);
        }
        if self.timers.idle.fire(env.now) && self.phase == ModalPhase::Ready && !self.idle {
            self.idle = true;
            self.surface.set_idle(env.doc, true);
            tracing::trace!(modal = self.id.id(), "modal.idle");
        }
        if self.timers.settle.fire(env.now) {
            self.surface.set_returning(env.doc, false);
        }
        if self.timers.close.fire(env.now) {
            self.teardown(env);
        }
        self.phase == ModalPhase::Destroyed
    }

    /// Earliest armed deadline, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            &self.timers.focus,
            &self.timers.idle,
            &self.timers.settle,
            &self.timers.close,
        ]
        .into_iter()
        .filter_map(Timer::deadline)
        .min()
    }

    fn engage_focus<D: Document + ?Sized>(&mut self, doc: &mut D) {
        if self.phase != ModalPhase::Ready {
            return;
        }
        if self.options.trap_focus {
            self.trap = Some(FocusTrap::install(doc, self.surface.container()));
        }
        if self.options.auto_focus {
            let target = doc
                .focusable_descendants(self.surface.content())
                .first()
                .copied()
                .or(self.surface.close_button());
            if let Some(target) = target {
                doc.focus(target);
            }
        }
    }

    // --- Content ---

    /// Resolve and render the current item, replacing what was shown.
    pub(crate) fn show_current<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) {
        self.abandon_load(env);
        if let Some(element) = self.inline.take() {
            env.inline.release(env.doc, element, self.id);
        }
        self.surface.clear_content(env.doc);
        let item = self.gallery.current().clone();
        self.surface.set_item(env.doc, &item);
        self.surface.show_loader(env.doc);

        let classification = classify(&item);
        tracing::debug!(
            modal = self.id.id(),
            index = self.gallery.index(),
            kind = classification.label(),
            locator = %item.locator,
            "modal.resolve"
        );
        let autoplay = self.options.autoplay;
        match classification {
            Classification::Inline { id } => match env.doc.find_by_id(&id) {
                Some(el) => {
                    env.inline
                        .acquire(env.doc, el, self.id, self.surface.content());
                    self.inline = Some(el);
                    self.surface.mark_inline(env.doc);
                    self.content_ready(env.doc, item);
                }
                None => self.fail(
                    env.doc,
                    LoadError::NotFound {
                        locator: item.locator.clone(),
                    },
                ),
            },
            Classification::Image { src } => self.request(env, LoadKind::Image { src }),
            Classification::Ajax { url } => {
                let kind = LoadKind::Fetch {
                    url,
                    credentials: self.options.fetch.credentials,
                    headers: self.options.fetch.headers.clone(),
                };
                self.request(env, kind);
            }
            Classification::Video { src } => {
                self.surface.render_video(env.doc, &src, autoplay);
                self.content_ready(env.doc, item);
            }
            Classification::Service { service, id } => {
                let url = service.embed_url(&id, &item.locator, autoplay);
                self.surface.render_frame(env.doc, &url, &self.options.iframe);
                self.content_ready(env.doc, item);
            }
            Classification::Document { url } => {
                self.surface.render_frame(env.doc, &url, &self.options.iframe);
                self.content_ready(env.doc, item);
            }
        }
    }

    fn request<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>, kind: LoadKind) {
        let ticket = env.tickets.next();
        self.pending = Some(PendingLoad {
            ticket,
            kind: kind.clone(),
        });
        let request = LoadRequest {
            ticket,
            modal: self.id,
            kind,
        };
        match env.loader.begin(request) {
            Some(result) => {
                self.complete_load(env.doc, ticket, result);
            }
            None => {
                tracing::debug!(modal = self.id.id(), %ticket, "modal.load_pending");
            }
        }
    }

    /// Apply a load outcome. Returns `false` for stale tickets.
    pub(crate) fn complete_load<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        ticket: LoadTicket,
        result: Result<LoadedContent, LoadError>,
    ) -> bool {
        let live = matches!(self.phase, ModalPhase::Init | ModalPhase::Ready);
        let pending = if live {
            self.pending.take_if(|p| p.ticket == ticket)
        } else {
            None
        };
        let Some(pending) = pending else {
            tracing::debug!(modal = self.id.id(), %ticket, phase = ?self.phase, "modal.load_stale");
            return false;
        };
        match result {
            Ok(LoadedContent::Image { .. }) => {
                let alt = self.gallery.current().alt_or_caption().to_owned();
                self.surface.render_image(doc, pending.kind.locator(), &alt);
                self.content_ready(doc, self.gallery.current().clone());
            }
            Ok(LoadedContent::Markup(markup)) => {
                self.surface.render_markup(doc, &markup);
                self.content_ready(doc, self.gallery.current().clone());
            }
            Err(err) => self.fail(doc, err),
        }
        true
    }

    fn content_ready<D: Document + ?Sized>(&mut self, doc: &mut D, item: Item) {
        self.surface.hide_loader(doc);
        self.emit(&ModalEvent::ContentReady(item));
    }

    fn fail<D: Document + ?Sized>(&mut self, doc: &mut D, err: LoadError) {
        tracing::warn!(modal = self.id.id(), %err, "modal.load_failed");
        self.surface.hide_loader(doc);
        self.surface.render_error(doc, &err);
    }

    /// Forget the pending load, if any, and take the indicator down.
    fn abandon_load<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) {
        if let Some(pending) = self.pending.take() {
            env.loader.cancel(pending.ticket);
            tracing::debug!(modal = self.id.id(), ticket = %pending.ticket, "modal.load_abandoned");
        }
        self.surface.hide_loader(env.doc);
    }

    // --- Navigation ---

    pub(crate) fn next<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        self.navigate(env, Gallery::next)
    }

    pub(crate) fn prev<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) -> bool {
        self.navigate(env, Gallery::prev)
    }

    pub(crate) fn go_to<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>, index: usize) -> bool {
        self.navigate(env, |g| g.go_to(index))
    }

    /// Checked jump. `Ok(false)` when `index` is already current.
    pub(crate) fn try_go_to<D: Document + ?Sized>(
        &mut self,
        env: &mut Env<'_, D>,
        index: usize,
    ) -> Result<bool, NavigationError> {
        if self.phase != ModalPhase::Ready {
            return Err(NavigationError::NotReady);
        }
        let mut candidate = self.gallery.clone();
        candidate.try_go_to(index)?;
        Ok(self.go_to(env, index))
    }

    fn navigate<D: Document + ?Sized>(
        &mut self,
        env: &mut Env<'_, D>,
        step: impl FnOnce(&mut Gallery) -> Option<usize>,
    ) -> bool {
        if self.phase != ModalPhase::Ready {
            return false;
        }
        let Some(index) = step(&mut self.gallery) else {
            return false;
        };
        tracing::debug!(modal = self.id.id(), index, "modal.change");
        self.emit(&ModalEvent::Change(index));
        self.show_current(env);
        true
    }

    // --- Input ---

    /// Route one input event. Returns `true` when it was consumed.
    pub(crate) fn handle_event<D: Document + ?Sized>(
        &mut self,
        env: &mut Env<'_, D>,
        event: &Event,
    ) -> bool {
        if self.phase != ModalPhase::Ready {
            return false;
        }
        match event {
            Event::Key(key) => self.handle_key(env, key),
            Event::Pointer(pointer) => self.handle_pointer(env, pointer),
        }
    }

    fn handle_key<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>, key: &KeyEvent) -> bool {
        if !key.is_press() {
            return false;
        }
        if key.is_tab() {
            return self
                .trap
                .as_ref()
                .is_some_and(|trap| trap.handle_key(env.doc, key));
        }
        if !self.options.keyboard {
            return false;
        }
        if self.is_close_key(key.code) {
            return self.close(env);
        }
        match key.code {
            KeyCode::Left if self.gallery.has_multiple() => {
                self.prev(env);
                true
            }
            KeyCode::Right if self.gallery.has_multiple() => {
                self.next(env);
                true
            }
            _ => false,
        }
    }

    fn is_close_key(&self, code: KeyCode) -> bool {
        if code == KeyCode::Escape && !self.options.close_on_esc {
            return false;
        }
        self.options.close_keys.contains(&code)
    }

    fn handle_pointer<D: Document + ?Sized>(
        &mut self,
        env: &mut Env<'_, D>,
        event: &PointerEvent,
    ) -> bool {
        if event.kind == PointerEventKind::Move {
            self.note_activity(env);
        }
        match (event.kind, event.target) {
            (PointerEventKind::Down, HitTarget::Backdrop) => {
                self.backdrop_pressed = true;
                return true;
            }
            (PointerEventKind::Down, HitTarget::CloseButton) => {
                self.close_pressed = true;
                return true;
            }
            (PointerEventKind::Up, HitTarget::Backdrop)
                if self.backdrop_pressed && !self.gesture.is_active() =>
            {
                self.backdrop_pressed = false;
                return self.options.close_on_backdrop && self.close(env);
            }
            (PointerEventKind::Up, HitTarget::CloseButton) if self.close_pressed => {
                self.close_pressed = false;
                return self.close(env);
            }
            _ => {}
        }
        if event.ends_gesture() {
            self.backdrop_pressed = false;
            self.close_pressed = false;
        }
        if !self.accepts_drag(event) {
            return false;
        }
        self.apply_gesture(env, event)
    }

    fn accepts_drag(&self, event: &PointerEvent) -> bool {
        self.options.drag_to_close && (event.pointer != PointerKind::Touch || self.options.touch)
    }

    fn apply_gesture<D: Document + ?Sized>(
        &mut self,
        env: &mut Env<'_, D>,
        event: &PointerEvent,
    ) -> bool {
        match self.gesture.handle(event, env.now) {
            GestureOutcome::Ignored | GestureOutcome::Armed | GestureOutcome::Discarded => false,
            GestureOutcome::Feedback(feedback) => {
                self.timers.settle.cancel();
                self.surface.set_returning(env.doc, false);
                self.surface.set_dragging(env.doc, true);
                self.surface.apply_drag(env.doc, &feedback);
                true
            }
            GestureOutcome::Dismiss { .. } => {
                self.surface.set_dragging(env.doc, false);
                self.close(env)
            }
            GestureOutcome::Settle => {
                self.surface.set_dragging(env.doc, false);
                self.surface.clear_drag(env.doc);
                self.surface.set_returning(env.doc, true);
                self.timers
                    .settle
                    .arm(env.now, self.options.gesture.return_duration);
                true
            }
        }
    }

    fn end_pointer_tracking<D: Document + ?Sized>(&mut self, doc: &mut D) {
        self.backdrop_pressed = false;
        self.close_pressed = false;
        if self.gesture.is_dragging() {
            self.surface.set_dragging(doc, false);
            self.surface.clear_drag(doc);
        }
        self.gesture.reset();
    }

    fn note_activity<D: Document + ?Sized>(&mut self, env: &mut Env<'_, D>) {
        let Some(timeout) = self.options.idle_timeout else {
            return;
        };
        if self.idle {
            self.idle = false;
            self.surface.set_idle(env.doc, false);
        }
        self.timers.idle.arm(env.now, timeout);
    }
}
