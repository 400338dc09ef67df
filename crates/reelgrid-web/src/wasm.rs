#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the grid viewer.
//!
//! This module wraps [`super::runner_core::GridRunner`] over a DOM-backed
//! [`SceneHost`]. Only compiled on `wasm32` targets. The page owns the
//! event loop: it forwards wheel/touch/pointer deltas, clicks, resizes, and
//! `requestAnimationFrame` timestamps. Tile intersection, video readiness,
//! and content resizes are observed here and drained on the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, HtmlVideoElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ResizeObserver, Window,
};

use reelgrid_core::geometry::{Point, Rect, Size};
use reelgrid_core::grid::{GridLayout, TileId};
use reelgrid_core::media::{LoadStage, MediaItem, VisibilityPolicy};
use reelgrid_runtime::{CameraTransform, ClickOutcome, NavigatorConfig, SceneHost};

use super::runner_core::{GridRunner, HostSignal, RunnerError, TileUpdate, duration_from_ms};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn host_error(err: JsValue) -> RunnerError {
    RunnerError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn click_label(outcome: Option<ClickOutcome>) -> &'static str {
    match outcome {
        None => "suppressed",
        Some(ClickOutcome::ZoomIn(_)) => "zoom_in",
        Some(ClickOutcome::ZoomOut) => "zoom_out",
        Some(ClickOutcome::Ignored(_)) => "ignored",
    }
}

fn rect_of(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

// ---------------------------------------------------------------------------
// DOM scene
// ---------------------------------------------------------------------------

type SignalQueue = Rc<RefCell<Vec<HostSignal>>>;
type MediaListener = (HtmlVideoElement, &'static str, Closure<dyn FnMut()>);

/// Observers and listeners feeding [`HostSignal`]s into a shared queue.
///
/// The closures must outlive their registrations, so they are owned here
/// and only dropped with the scene, after [`DomWatchers::disconnect`].
struct DomWatchers {
    signals: SignalQueue,
    intersection: IntersectionObserver,
    resize: ResizeObserver,
    _on_intersect: Closure<dyn FnMut(js_sys::Array)>,
    _on_resize: Closure<dyn FnMut(js_sys::Array)>,
    media: Vec<MediaListener>,
}

impl DomWatchers {
    fn new(policy: VisibilityPolicy) -> Result<Self, JsValue> {
        let signals: SignalQueue = Rc::new(RefCell::new(Vec::new()));

        let queue = Rc::clone(&signals);
        let on_intersect = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            let mut queue = queue.borrow_mut();
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if let Some(tile) = parse_tile(&entry.target()) {
                    queue.push(HostSignal::TileVisibility {
                        tile,
                        visible: entry.is_intersecting(),
                    });
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let queue = Rc::clone(&signals);
        let on_resize = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            queue.borrow_mut().push(HostSignal::ContentResized);
        }) as Box<dyn FnMut(js_sys::Array)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&policy.root_margin_css());
        init.set_threshold(&JsValue::from_f64(policy.threshold));
        let intersection =
            IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init)?;
        let resize = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;

        Ok(Self {
            signals,
            intersection,
            resize,
            _on_intersect: on_intersect,
            _on_resize: on_resize,
            media: Vec::new(),
        })
    }

    fn watch_tile(
        &mut self,
        tile: TileId,
        el: &Element,
        video: HtmlVideoElement,
    ) -> Result<(), JsValue> {
        self.intersection.observe(el);

        let queue = Rc::clone(&self.signals);
        let source = video.clone();
        let on_metadata = Closure::wrap(Box::new(move || {
            queue.borrow_mut().push(HostSignal::TileMetadata {
                tile,
                width: source.video_width(),
                height: source.video_height(),
            });
        }) as Box<dyn FnMut()>);
        self.listen(video.clone(), "loadedmetadata", on_metadata)?;

        let queue = Rc::clone(&self.signals);
        let on_data = Closure::wrap(Box::new(move || {
            queue.borrow_mut().push(HostSignal::TileFirstFrame(tile));
        }) as Box<dyn FnMut()>);
        self.listen(video, "loadeddata", on_data)
    }

    fn listen(
        &mut self,
        video: HtmlVideoElement,
        event: &'static str,
        callback: Closure<dyn FnMut()>,
    ) -> Result<(), JsValue> {
        video.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.media.push((video, event, callback));
        Ok(())
    }

    fn take(&self) -> Vec<HostSignal> {
        std::mem::take(&mut *self.signals.borrow_mut())
    }

    fn disconnect(&self) {
        self.intersection.disconnect();
        self.resize.disconnect();
        for (video, event, callback) in &self.media {
            let _ = video
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
        self.signals.borrow_mut().clear();
    }
}

/// [`SceneHost`] over the rendered grid markup.
///
/// Handles are resolved once at construction; each query checks
/// `isConnected` so a node removed by the page reads as detached.
struct DomScene {
    window: Window,
    document: Document,
    root: HtmlElement,
    container: HtmlElement,
    primary: HtmlElement,
    /// Tiles in block-major order.
    tiles: Vec<Element>,
    item_count: usize,
    watchers: DomWatchers,
}

impl DomScene {
    /// Build `.container` → `.content` × blocks → `.media` under `root` and
    /// start observing it.
    fn build(
        window: Window,
        document: Document,
        root: HtmlElement,
        layout: &GridLayout,
        items: &[MediaItem],
        policy: VisibilityPolicy,
    ) -> Result<Self, JsValue> {
        let mut watchers = DomWatchers::new(policy)?;
        root.set_inner_html("");
        root.style().set_property("position", "relative")?;
        let container = document.create_element("div")?.dyn_into::<HtmlElement>()?;
        container.set_class_name("container");
        container
            .style()
            .set_property("--grid-cols", &layout.cols().to_string())?;
        root.append_child(&container)?;

        let mut primary = None;
        let mut tiles = Vec::with_capacity(layout.block_count() * items.len());
        for block in layout.blocks() {
            let content = document.create_element("div")?.dyn_into::<HtmlElement>()?;
            content.set_class_name("content");
            content.set_attribute("data-block", &block.id.to_string())?;
            if block.aria_hidden() {
                content.set_attribute("aria-hidden", "true")?;
            }
            for (index, item) in items.iter().enumerate() {
                let (tile, video) = build_tile(&document, block.id, index, item)?;
                content.append_child(&tile)?;
                watchers.watch_tile(TileId::new(block.id, index), &tile, video)?;
                tiles.push(tile);
            }
            container.append_child(&content)?;
            if block.is_primary() {
                primary = Some(content);
            }
        }
        let primary = primary.ok_or_else(|| JsValue::from_str("layout has no primary block"))?;
        watchers.resize.observe(&primary);

        Ok(Self {
            window,
            document,
            root,
            container,
            primary,
            tiles,
            item_count: items.len(),
            watchers,
        })
    }

    fn tile_element(&self, tile: TileId) -> Option<&Element> {
        if tile.index >= self.item_count {
            return None;
        }
        self.tiles.get(tile.block * self.item_count + tile.index)
    }

    /// Attach the heavy source of every copy of `index`.
    fn attach_source(&self, index: usize, src: &str) {
        for block in 0..self.tiles.len() / self.item_count.max(1) {
            let Some(tile) = self.tile_element(TileId::new(block, index)) else {
                continue;
            };
            if let Ok(Some(video)) = tile.query_selector("video")
                && video.get_attribute("src").is_none()
            {
                let _ = video.set_attribute("src", src);
            }
        }
    }

    fn mark_tile(&self, tile: TileId, class: &str, on: bool) {
        if let Some(el) = self.tile_element(tile) {
            let list = el.class_list();
            let _ = if on { list.add_1(class) } else { list.remove_1(class) };
        }
    }

    fn set_aspect(&self, index: usize, (w, h): (u32, u32)) {
        for block in 0..self.tiles.len() / self.item_count.max(1) {
            if let Some(el) = self.tile_element(TileId::new(block, index))
                && let Ok(el) = el.clone().dyn_into::<HtmlElement>()
            {
                let _ = el.style().set_property("aspect-ratio", &format!("{w} / {h}"));
            }
        }
    }

    fn apply_update(&self, update: &TileUpdate) {
        match update {
            TileUpdate::Visibility {
                tile,
                visible,
                source,
            } => {
                self.mark_tile(*tile, "media--visible", *visible);
                if let Some(src) = source {
                    self.attach_source(tile.index, src);
                }
            }
            TileUpdate::Aspect {
                index,
                width,
                height,
            } => self.set_aspect(*index, (*width, *height)),
            TileUpdate::Stage { tile, stage } => {
                self.mark_tile(*tile, "media--playing", *stage == LoadStage::Playing);
            }
        }
    }

    fn remove(&self) {
        self.watchers.disconnect();
        self.container.remove();
    }
}

fn build_tile(
    document: &Document,
    block: usize,
    index: usize,
    item: &MediaItem,
) -> Result<(Element, HtmlVideoElement), JsValue> {
    let tile = document.create_element("div")?;
    tile.set_class_name("media");
    tile.set_attribute("data-block", &block.to_string())?;
    tile.set_attribute("data-index", &index.to_string())?;

    let video = document.create_element("video")?.dyn_into::<HtmlVideoElement>()?;
    for flag in ["muted", "loop", "playsinline", "autoplay"] {
        video.set_attribute(flag, "")?;
    }
    video.set_attribute("preload", "none")?;
    if let Some(poster) = &item.poster_url {
        video.set_attribute("poster", poster)?;
        let img = document.create_element("img")?;
        img.set_class_name("media__poster");
        img.set_attribute("src", poster)?;
        img.set_attribute("alt", "")?;
        tile.append_child(&img)?;
    }
    tile.append_child(&video)?;
    Ok((tile, video))
}

fn parse_tile(el: &Element) -> Option<TileId> {
    let block = el.get_attribute("data-block")?.parse().ok()?;
    let index = el.get_attribute("data-index")?.parse().ok()?;
    Some(TileId::new(block, index))
}

impl SceneHost for DomScene {
    fn viewport(&self) -> Size {
        let w = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let h = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Size::new(w.unwrap_or(0.0), h.unwrap_or(0.0))
    }

    fn container_origin(&self) -> Option<Point> {
        if !self.container.is_connected() {
            return None;
        }
        let root = self.root.get_bounding_client_rect();
        Some(Point::new(
            root.left() + f64::from(self.container.offset_left()),
            root.top() + f64::from(self.container.offset_top()),
        ))
    }

    fn content_size(&self) -> Option<Size> {
        if !self.primary.is_connected() {
            return None;
        }
        Some(Size::new(
            f64::from(self.primary.offset_width()),
            f64::from(self.primary.offset_height()),
        ))
    }

    fn tile_client_rect(&self, tile: TileId) -> Option<Rect> {
        let el = self.tile_element(tile)?;
        el.is_connected().then(|| rect_of(el))
    }

    fn tile_at(&self, point: Point) -> Option<TileId> {
        let hit = self
            .document
            .element_from_point(point.x as f32, point.y as f32)?;
        let media = hit.closest(".media").ok()??;
        if !self.container.contains(Some(media.as_ref())) {
            return None;
        }
        parse_tile(&media)
    }

    fn apply_transform(&mut self, transform: &CameraTransform) {
        let style = self.container.style();
        let _ = style.set_property("transform", &transform.css());
        let _ = style.set_property("transform-origin", &transform.origin_css());
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// Infinite media grid bound to one page section.
///
/// Host-driven: JavaScript forwards input and calls `frame` from
/// `requestAnimationFrame`.
#[wasm_bindgen]
pub struct GridViewer {
    inner: GridRunner<DomScene>,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl GridViewer {
    /// Render the grid for `items_json` (`[{src, thumb}]`) into the element
    /// with id `section_id`. `config_json` overrides navigator defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        section_id: &str,
        items_json: &str,
        config_json: Option<String>,
        now_ms: f64,
    ) -> Result<GridViewer, JsValue> {
        install_panic_hook();
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let root = document
            .get_element_by_id(section_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{section_id}")))?
            .dyn_into::<HtmlElement>()?;
        let config = match config_json {
            Some(json) => NavigatorConfig::from_json_str(&json).map_err(js_error)?,
            None => NavigatorConfig::default(),
        };

        let now = duration_from_ms(now_ms);
        let policy = config.grid.visibility;
        let inner = GridRunner::from_json(items_json, config, now, |layout, items| {
            DomScene::build(
                window.clone(),
                document.clone(),
                root.clone(),
                layout,
                items,
                policy,
            )
            .map_err(host_error)
        })
        .map_err(js_error)?;

        if inner.is_empty() {
            render_empty(&document, &root)?;
        }
        Ok(Self { inner })
    }

    /// Column count of the rendered grid.
    pub fn cols(&self) -> u32 {
        self.inner.cols() as u32
    }

    /// Wheel delta in CSS pixels. Returns `true` if it moved the pan target.
    pub fn wheel(&mut self, dx: f64, dy: f64) -> bool {
        self.inner.wheel(dx, dy).is_accepted()
    }

    /// Touch drag delta since the previous touch move.
    pub fn touch(&mut self, dx: f64, dy: f64) -> bool {
        self.inner.touch(dx, dy).is_accepted()
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> bool {
        self.inner
            .pointer_move(Point::new(x, y), dx, dy)
            .is_accepted()
    }

    /// Returns `true` if the press was a tap.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.inner.pointer_up(Point::new(x, y))
    }

    /// Click at client coordinates. Returns `"zoom_in"`, `"zoom_out"`,
    /// `"ignored"`, or `"suppressed"` (the click ended a drag).
    pub fn click(&mut self, x: f64, y: f64) -> String {
        click_label(self.inner.click(Point::new(x, y))).to_owned()
    }

    pub fn resize(&mut self, now_ms: f64) {
        self.inner.resize(duration_from_ms(now_ms));
    }

    /// One animation frame at `requestAnimationFrame` time `ts_ms`. Observer
    /// notifications queued since the last frame are applied first.
    pub fn frame(&mut self, ts_ms: f64) {
        self.flush_signals();
        self.inner.frame(duration_from_ms(ts_ms));
    }

    /// The page replaced the grid content mid-transition.
    pub fn interrupt(&mut self) {
        self.inner.interrupt();
    }

    /// Debug snapshot as JSON.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.inner.snapshot_json().map_err(js_error)
    }

    /// Unmount: stop all work and remove the grid markup.
    pub fn destroy(&mut self) {
        self.inner.teardown();
        if let Some(scene) = self.scene() {
            scene.remove();
        }
    }
}

impl GridViewer {
    fn scene(&self) -> Option<&DomScene> {
        self.inner.navigator().map(|nav| nav.host())
    }

    fn flush_signals(&mut self) {
        let Some(signals) = self.scene().map(|scene| scene.watchers.take()) else {
            return;
        };
        for signal in signals {
            if let Some(update) = self.inner.apply_signal(signal)
                && let Some(scene) = self.scene()
            {
                scene.apply_update(&update);
            }
        }
    }
}

fn render_empty(document: &Document, root: &HtmlElement) -> Result<(), JsValue> {
    root.set_inner_html("");
    let container = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    container.set_class_name("container");
    container.style().set_property("--grid-cols", "1")?;
    let empty = document.create_element("div")?;
    empty.set_class_name("content content--empty");
    empty.set_text_content(Some("No media"));
    container.append_child(&empty)?;
    root.append_child(&container)?;
    Ok(())
}
