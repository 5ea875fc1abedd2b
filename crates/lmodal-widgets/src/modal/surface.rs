#![forbid(unsafe_code)]

//! The overlay's element tree.
//!
//! ```text
//! container (.lm-container, dialog or div)
//! ├── backdrop (.lm-backdrop)
//! └── wrapper (.lm-content-wrapper)
//!     ├── drag indicator (.lm-drag-indicator, with drag-to-close)
//!     ├── close button (.lm-close-btn, optional)
//!     ├── content (.lm-content)
//!     └── caption (.lm-caption, optional)
//! ```
//!
//! The surface owns every node it creates. Relocated inline elements are
//! appended to `content` but never owned; the lifecycle restores them.

use lmodal_core::{Document, ElementId};
use lmodal_runtime::Duration;

use super::gesture::DragFeedback;
use super::item::Item;
use super::loader::LoadError;
use super::options::{IframeOptions, ModalOptions};
use super::registry::ModalId;

pub(crate) const CONTAINER_CLASS: &str = "lm-container";
pub(crate) const BACKDROP_CLASS: &str = "lm-backdrop";
pub(crate) const WRAPPER_CLASS: &str = "lm-content-wrapper";
pub(crate) const CONTENT_CLASS: &str = "lm-content";
pub(crate) const CAPTION_CLASS: &str = "lm-caption";
pub(crate) const CLOSE_BUTTON_CLASS: &str = "lm-close-btn";
pub(crate) const DRAG_INDICATOR_CLASS: &str = "lm-drag-indicator";
pub(crate) const LOADER_CLASS: &str = "lm-spinner";
pub(crate) const ERROR_CLASS: &str = "lm-error";
pub(crate) const HTML_CLASS: &str = "lm-html";

pub(crate) const OPEN_CLASS: &str = "is-open";
pub(crate) const CLOSING_CLASS: &str = "is-closing";
pub(crate) const IDLE_CLASS: &str = "is-idle";
pub(crate) const DRAGGING_CLASS: &str = "is-dragging";
pub(crate) const RETURNING_CLASS: &str = "is-returning";

const HAS_INLINE: &str = "has-inline-content";
const HAS_FRAME: &str = "has-iframe";
const HAS_MEDIA: &str = "has-media";

const DURATION_VAR: &str = "--lm-duration";
const DRAG_OFFSET_VAR: &str = "--lm-drag-offset";
const DRAG_OPACITY_VAR: &str = "--lm-drag-opacity";

#[derive(Debug)]
pub(crate) struct Surface {
    container: ElementId,
    backdrop: ElementId,
    wrapper: ElementId,
    content: ElementId,
    caption: Option<ElementId>,
    close_button: Option<ElementId>,
    drag_indicator: Option<ElementId>,
    loader: Option<ElementId>,
    /// Nodes this surface rendered into `content`.
    rendered: Vec<ElementId>,
    item_class: Option<String>,
    native_dialog: bool,
}

impl Surface {
    /// Build the tree, hidden, at the end of `body`.
    pub(crate) fn build<D: Document + ?Sized>(
        doc: &mut D,
        id: ModalId,
        options: &ModalOptions,
        z_index: u32,
    ) -> Self {
        let tag = if options.native_dialog { "dialog" } else { "div" };
        let container = doc.create_element(tag);
        doc.set_attribute(container, "id", &format!("lm-{}", id.id()));
        doc.set_attribute(container, "role", "dialog");
        doc.set_attribute(container, "aria-modal", "true");
        doc.set_attribute(container, "aria-hidden", "true");
        doc.add_class(container, CONTAINER_CLASS);
        doc.add_class(container, options.theme.class_name());
        if options.compact {
            doc.add_class(container, "is-compact");
        }
        if options.drag_to_close {
            doc.add_class(container, "is-touch");
        }
        if let Some(class) = &options.main_class {
            doc.add_class(container, class);
        }
        doc.set_style(container, "display", Some("none"));
        doc.set_style(container, "z-index", Some(&z_index.to_string()));
        set_duration(doc, container, options.open_speed);

        let backdrop = doc.create_element("div");
        doc.add_class(backdrop, BACKDROP_CLASS);
        doc.append_child(container, backdrop);

        let wrapper = doc.create_element("div");
        doc.add_class(wrapper, WRAPPER_CLASS);
        if let Some(width) = &options.width {
            doc.set_style(wrapper, "width", Some(&width.css_value()));
        }
        if let Some(height) = &options.height {
            doc.set_style(wrapper, "height", Some(&height.css_value()));
        }
        doc.append_child(container, wrapper);

        let drag_indicator = options.drag_to_close.then(|| {
            let indicator = doc.create_element("div");
            doc.add_class(indicator, DRAG_INDICATOR_CLASS);
            doc.set_attribute(indicator, "aria-hidden", "true");
            doc.append_child(wrapper, indicator);
            indicator
        });

        let close_button = options.close_button.then(|| {
            let button = doc.create_element("button");
            doc.add_class(button, CLOSE_BUTTON_CLASS);
            doc.set_attribute(button, "type", "button");
            doc.set_attribute(button, "aria-label", "Close");
            doc.set_text(button, "\u{d7}");
            doc.append_child(wrapper, button);
            button
        });

        let content = doc.create_element("div");
        doc.add_class(content, CONTENT_CLASS);
        doc.append_child(wrapper, content);

        let body = doc.body();
        doc.append_child(body, container);

        Self {
            container,
            backdrop,
            wrapper,
            content,
            caption: None,
            close_button,
            drag_indicator,
            loader: None,
            rendered: Vec::new(),
            item_class: None,
            native_dialog: options.native_dialog,
        }
    }

    pub(crate) fn container(&self) -> ElementId {
        self.container
    }

    pub(crate) fn backdrop(&self) -> ElementId {
        self.backdrop
    }

    pub(crate) fn wrapper(&self) -> ElementId {
        self.wrapper
    }

    pub(crate) fn content(&self) -> ElementId {
        self.content
    }

    pub(crate) fn close_button(&self) -> Option<ElementId> {
        self.close_button
    }

    pub(crate) fn drag_indicator(&self) -> Option<ElementId> {
        self.drag_indicator
    }

    pub(crate) fn caption(&self) -> Option<ElementId> {
        self.caption
    }

    pub(crate) fn loader(&self) -> Option<ElementId> {
        self.loader
    }

    pub(crate) fn reveal<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.set_style(self.container, "display", None);
        doc.remove_attribute(self.container, "aria-hidden");
        if self.native_dialog {
            doc.set_attribute(self.container, "open", "");
        }
        doc.add_class(self.container, OPEN_CLASS);
    }

    pub(crate) fn begin_closing<D: Document + ?Sized>(&self, doc: &mut D, speed: Duration) {
        set_duration(doc, self.container, speed);
        doc.remove_class(self.container, OPEN_CLASS);
        doc.add_class(self.container, CLOSING_CLASS);
        doc.set_attribute(self.container, "aria-hidden", "true");
    }

    /// Close the native surface and detach the tree from the page.
    pub(crate) fn teardown<D: Document + ?Sized>(&self, doc: &mut D) {
        if self.native_dialog {
            doc.remove_attribute(self.container, "open");
        }
        doc.detach(self.container);
    }

    /// Show the loading indicator. Returns `false` if it is already shown.
    pub(crate) fn show_loader<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        if self.loader.is_some() {
            return false;
        }
        let spinner = doc.create_element("div");
        doc.add_class(spinner, LOADER_CLASS);
        doc.set_attribute(spinner, "role", "status");
        doc.set_attribute(spinner, "aria-label", "Loading");
        doc.append_child(self.content, spinner);
        self.loader = Some(spinner);
        true
    }

    /// Remove the loading indicator. Returns `false` if none was shown.
    pub(crate) fn hide_loader<D: Document + ?Sized>(&mut self, doc: &mut D) -> bool {
        match self.loader.take() {
            Some(spinner) => {
                doc.detach(spinner);
                true
            }
            None => false,
        }
    }

    /// Remove rendered content and content-type classes.
    pub(crate) fn clear_content<D: Document + ?Sized>(&mut self, doc: &mut D) {
        for node in self.rendered.drain(..) {
            doc.detach(node);
        }
        for class in [HAS_INLINE, HAS_FRAME, HAS_MEDIA] {
            doc.remove_class(self.content, class);
        }
    }

    /// Caption and per-item container class.
    pub(crate) fn set_item<D: Document + ?Sized>(&mut self, doc: &mut D, item: &Item) {
        if let Some(old) = self.item_class.take() {
            doc.remove_class(self.container, &old);
        }
        if let Some(class) = &item.extra_class {
            doc.add_class(self.container, class);
            self.item_class = Some(class.clone());
        }
        match (&item.caption, self.caption) {
            (Some(text), Some(el)) => doc.set_text(el, text),
            (Some(text), None) => {
                let el = doc.create_element("div");
                doc.add_class(el, CAPTION_CLASS);
                doc.set_text(el, text);
                doc.append_child(self.wrapper, el);
                self.caption = Some(el);
            }
            (None, Some(el)) => {
                doc.detach(el);
                self.caption = None;
            }
            (None, None) => {}
        }
    }

    pub(crate) fn mark_inline<D: Document + ?Sized>(&self, doc: &mut D) {
        doc.add_class(self.content, HAS_INLINE);
    }

    pub(crate) fn render_image<D: Document + ?Sized>(&mut self, doc: &mut D, src: &str, alt: &str) {
        let img = doc.create_element("img");
        doc.set_attribute(img, "src", src);
        doc.set_attribute(img, "alt", alt);
        doc.add_class(self.content, HAS_MEDIA);
        self.push(doc, img);
    }

    pub(crate) fn render_video<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        src: &str,
        autoplay: bool,
    ) {
        let video = doc.create_element("video");
        doc.set_attribute(video, "src", src);
        doc.set_attribute(video, "controls", "");
        doc.set_attribute(video, "playsinline", "");
        if autoplay {
            doc.set_attribute(video, "autoplay", "");
            doc.set_attribute(video, "muted", "");
        }
        doc.add_class(self.content, HAS_MEDIA);
        self.push(doc, video);
    }

    pub(crate) fn render_frame<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        url: &str,
        iframe: &IframeOptions,
    ) {
        let frame = doc.create_element("iframe");
        doc.set_attribute(frame, "src", url);
        doc.set_attribute(frame, "allowfullscreen", "");
        doc.set_attribute(frame, "allow", "autoplay; fullscreen; picture-in-picture");
        doc.set_attribute(frame, "frameborder", "0");
        doc.set_attribute(frame, "scrolling", &iframe.scrolling);
        if !iframe.sandbox.is_empty() {
            doc.set_attribute(frame, "sandbox", &iframe.sandbox);
        }
        doc.add_class(self.content, HAS_FRAME);
        self.push(doc, frame);
    }

    pub(crate) fn render_markup<D: Document + ?Sized>(&mut self, doc: &mut D, markup: &str) {
        let holder = doc.create_element("div");
        doc.add_class(holder, HTML_CLASS);
        doc.set_markup(holder, markup);
        doc.add_class(self.content, HAS_INLINE);
        self.push(doc, holder);
    }

    pub(crate) fn render_error<D: Document + ?Sized>(&mut self, doc: &mut D, error: &LoadError) {
        let node = doc.create_element("div");
        doc.add_class(node, ERROR_CLASS);
        doc.set_attribute(node, "role", "alert");
        doc.set_text(node, &error.to_string());
        doc.add_class(self.content, HAS_INLINE);
        self.push(doc, node);
    }

    fn push<D: Document + ?Sized>(&mut self, doc: &mut D, node: ElementId) {
        doc.append_child(self.content, node);
        self.rendered.push(node);
    }

    pub(crate) fn set_dragging<D: Document + ?Sized>(&self, doc: &mut D, dragging: bool) {
        toggle(doc, self.wrapper, DRAGGING_CLASS, dragging);
    }

    pub(crate) fn set_returning<D: Document + ?Sized>(&self, doc: &mut D, returning: bool) {
        toggle(doc, self.wrapper, RETURNING_CLASS, returning);
    }

    pub(crate) fn set_idle<D: Document + ?Sized>(&self, doc: &mut D, idle: bool) {
        toggle(doc, self.container, IDLE_CLASS, idle);
    }

    pub(crate) fn apply_drag<D: Document + ?Sized>(&self, doc: &mut D, feedback: &DragFeedback) {
        let offset = feedback.offset;
        doc.set_style(
            self.wrapper,
            "transform",
            Some(&format!("translate3d({}px, {}px, 0)", offset.x, offset.y)),
        );
        doc.set_style(
            self.wrapper,
            DRAG_OFFSET_VAR,
            Some(&format!("{}px", offset.x + offset.y)),
        );
        doc.set_style(
            self.wrapper,
            DRAG_OPACITY_VAR,
            Some(&feedback.content_opacity.to_string()),
        );
        doc.set_style(
            self.backdrop,
            "opacity",
            Some(&feedback.backdrop_opacity.to_string()),
        );
    }

    pub(crate) fn clear_drag<D: Document + ?Sized>(&self, doc: &mut D) {
        for property in ["transform", DRAG_OFFSET_VAR, DRAG_OPACITY_VAR] {
            doc.set_style(self.wrapper, property, None);
        }
        doc.set_style(self.backdrop, "opacity", None);
    }
}

fn set_duration<D: Document + ?Sized>(doc: &mut D, el: ElementId, speed: Duration) {
    doc.set_style(el, DURATION_VAR, Some(&format!("{}ms", speed.as_millis())));
}

fn toggle<D: Document + ?Sized>(doc: &mut D, el: ElementId, class: &str, on: bool) {
    if on {
        doc.add_class(el, class);
    } else {
        doc.remove_class(el, class);
    }
}
