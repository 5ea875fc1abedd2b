#![forbid(unsafe_code)]

//! Scenario fixtures for end-to-end LightModal tests.
//!
//! A [`Scenario`] wires a [`ModalContext`] to a [`MemoryDocument`], a
//! [`ManualClock`], a recording announcer, and either synchronous or deferred
//! content loads. Every event from instances opened through the scenario is
//! logged in order, so tests can assert whole lifecycles.
//!
//! Page state is compared by [`Scenario::fingerprint`], a BLAKE3 digest of
//! the document outline: equal fingerprints before open and after destroy
//! mean the overlay left the page exactly as it found it.

use std::cell::RefCell;
use std::rc::Rc;

use lmodal_core::{
    Document, ElementId, Event, HitTarget, KeyCode, KeyEvent, MemoryDocument, Point,
    PointerEvent, PointerEventKind,
};
use lmodal_runtime::{Clock, Duration, Instant, Keyed, ManualClock};
use lmodal_widgets::modal::{
    ItemList, LoadError, LoadRequest, LoadedContent, ModalContext, ModalEvent, ModalEventKind,
    ModalId, ModalOptions, OpenError, RecordingLoader,
};

pub mod strategies;

/// How content loads complete in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Images load before `open` returns; fetches fail with no loader.
    Immediate,
    /// Loads stay pending until [`Scenario::resolve`] is called.
    Deferred,
}

type EventLog = Rc<RefCell<Vec<ModalEvent>>>;

pub struct Scenario {
    ctx: ModalContext<MemoryDocument>,
    clock: ManualClock,
    loader: Option<RecordingLoader>,
    events: EventLog,
    announcements: Rc<RefCell<Vec<String>>>,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("ctx", &self.ctx)
            .field("events", &self.events.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self::with_mode(LoadMode::Immediate)
    }

    pub fn deferred() -> Self {
        Self::with_mode(LoadMode::Deferred)
    }

    pub fn with_mode(mode: LoadMode) -> Self {
        let clock = ManualClock::new();
        let announcements: Rc<RefCell<Vec<String>>> = Rc::default();
        let ctx = ModalContext::new(MemoryDocument::new())
            .with_clock(clock.clone())
            .with_announcer(Rc::clone(&announcements));
        let (ctx, loader) = match mode {
            LoadMode::Immediate => (ctx, None),
            LoadMode::Deferred => {
                let loader = RecordingLoader::new();
                (ctx.with_loader(loader.clone()), Some(loader))
            }
        };
        Self {
            ctx,
            clock,
            loader,
            events: Rc::default(),
            announcements,
        }
    }

    pub fn ctx(&self) -> &ModalContext<MemoryDocument> {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut ModalContext<MemoryDocument> {
        &mut self.ctx
    }

    pub fn page(&self) -> &MemoryDocument {
        self.ctx.document()
    }

    pub fn page_mut(&mut self) -> &mut MemoryDocument {
        self.ctx.document_mut()
    }

    /// Append a `tag#id` element to the body.
    pub fn add_element(&mut self, tag: &str, id: &str) -> ElementId {
        let page = self.ctx.document_mut();
        let body = page.body();
        page.append_with_id(body, tag, id)
    }

    /// BLAKE3 hex digest of the page outline.
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.page().outline().as_bytes())
            .to_hex()
            .to_string()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Default options with every event routed to the scenario log.
    pub fn options(&self) -> ModalOptions {
        self.record(ModalOptions::default())
    }

    /// Add logging callbacks to `options`.
    pub fn record(&self, options: ModalOptions) -> ModalOptions {
        ModalEventKind::ALL
            .into_iter()
            .fold(options, |options, kind| {
                let log = Rc::clone(&self.events);
                options.on(kind, move |event| log.borrow_mut().push(event.clone()))
            })
    }

    pub fn open(&mut self, items: impl Into<ItemList>) -> Result<ModalId, OpenError> {
        let options = self.options();
        self.ctx.open(items, options)
    }

    /// Open with `options`, recording events.
    pub fn open_with(
        &mut self,
        items: impl Into<ItemList>,
        options: ModalOptions,
    ) -> Result<ModalId, OpenError> {
        let options = self.record(options);
        self.ctx.open(items, options)
    }

    /// Move the clock forward and fire due timers. Returns how many
    /// instances were destroyed.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms));
        self.ctx.tick()
    }

    /// Jump to each pending deadline in turn until no timer is armed.
    pub fn run_timers(&mut self) -> usize {
        let mut destroyed = 0;
        while let Some(deadline) = self.ctx.next_deadline() {
            let now = self.clock.now();
            if deadline > now {
                self.clock.advance(deadline - now);
            }
            destroyed += self.ctx.tick();
        }
        destroyed
    }

    pub fn key(&mut self, code: KeyCode) -> bool {
        self.ctx.handle_event(&Event::Key(KeyEvent::new(code)))
    }

    pub fn pointer(&mut self, kind: PointerEventKind, target: HitTarget, at: Point) -> bool {
        self.ctx
            .handle_event(&Event::Pointer(PointerEvent::new(kind, at.x, at.y).target(target)))
    }

    /// Click on `target`: press and release at the origin.
    pub fn click(&mut self, target: HitTarget) -> bool {
        self.pointer(PointerEventKind::Down, target, Point::default());
        self.pointer(PointerEventKind::Up, target, Point::default())
    }

    /// Drag on content from `from` to `to` over `ms` milliseconds, moving in
    /// `steps` equal increments, then release.
    pub fn drag(&mut self, from: Point, to: Point, steps: u32, ms: u64) -> bool {
        let steps = steps.max(1);
        self.pointer(PointerEventKind::Down, HitTarget::Content, from);
        let step_ms = ms / u64::from(steps);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let at = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self.clock.advance(Duration::from_millis(step_ms));
            self.pointer(PointerEventKind::Move, HitTarget::Content, at);
        }
        self.pointer(PointerEventKind::Up, HitTarget::Content, to)
    }

    /// Every recorded event, in emission order.
    pub fn events(&self) -> Vec<ModalEvent> {
        self.events.borrow().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.kind().as_str()).collect()
    }

    pub fn count(&self, kind: ModalEventKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.borrow().clone()
    }

    /// Load requests seen so far. Empty in [`LoadMode::Immediate`].
    pub fn requests(&self) -> Vec<LoadRequest> {
        self.loader
            .as_ref()
            .map(RecordingLoader::requests)
            .unwrap_or_default()
    }

    /// Tickets the context abandoned.
    pub fn cancelled(&self) -> usize {
        self.loader.as_ref().map_or(0, |l| l.cancelled().len())
    }

    /// Complete the most recent load request.
    pub fn resolve(&mut self, result: Result<LoadedContent, LoadError>) -> bool {
        let Some(request) = self.loader.as_ref().and_then(RecordingLoader::last) else {
            return false;
        };
        self.ctx.complete_load(request.ticket, result)
    }

    /// The event log as JSON lines, one object per event.
    pub fn event_log_jsonl(&self) -> String {
        self.events
            .borrow()
            .iter()
            .enumerate()
            .map(|(seq, event)| {
                let mut line = serde_json::json!({
                    "seq": seq,
                    "event": event.kind().as_str(),
                });
                match event {
                    ModalEvent::Change(index) => line["index"] = (*index).into(),
                    ModalEvent::ContentReady(item) => line["locator"] = item.locator.clone().into(),
                    _ => {}
                }
                line.to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_tracks_page_changes() {
        let mut scenario = Scenario::new();
        let before = scenario.fingerprint();
        assert_eq!(before, Scenario::new().fingerprint());
        scenario.add_element("div", "panel");
        assert_ne!(before, scenario.fingerprint());
    }

    #[test]
    fn deferred_scenario_records_requests() {
        let mut scenario = Scenario::deferred();
        scenario.open("photo.png").expect("open");
        assert_eq!(scenario.requests().len(), 1);
        assert!(scenario.resolve(Ok(LoadedContent::Image {
            width: Some(4),
            height: Some(3),
        })));
        assert!(!scenario.resolve(Ok(LoadedContent::Image {
            width: None,
            height: None,
        })));
    }

    #[test]
    fn event_log_serializes_one_line_per_event() {
        let mut scenario = Scenario::new();
        scenario.open("clip.mp4").expect("open");
        let log = scenario.event_log_jsonl();
        let lines: Vec<serde_json::Value> = log
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "init");
        assert_eq!(lines[1]["locator"], "clip.mp4");
        assert_eq!(lines[2]["seq"], 2);
    }

    #[test]
    fn run_timers_drains_close() {
        let mut scenario = Scenario::new();
        scenario.open("a.png").expect("open");
        scenario.ctx_mut().close();
        assert_eq!(scenario.run_timers(), 1);
        assert!(scenario.ctx().is_empty());
        assert_eq!(scenario.ctx().next_deadline(), None);
    }
}
