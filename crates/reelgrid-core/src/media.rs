#![forbid(unsafe_code)]

//! Media items and per-tile lazy loading.
//!
//! Items arrive from the content source as an ordered list and are immutable
//! for the session; an item's identity is its index. Each rendered tile
//! decides independently when to attach its heavy video source.
//!
//! # Tile loading lifecycle
//!
//! ```text
//!   Deferred ──(intersecting)──▶ Loading ──(first frame decoded)──▶ Playing
//!     poster                       poster                          video
//! ```
//!
//! Visibility latches: a tile that has been seen keeps its source even after
//! scrolling away, so panning back never re-downloads.

/// One media entry from the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    /// URL of the primary (heavy) media resource.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "sourceUrl", alias = "src", alias = "source_url")
    )]
    pub source_url: String,
    /// Lightweight still shown until the primary resource decodes.
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "posterUrl",
            alias = "thumb",
            alias = "poster_url",
            default,
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub poster_url: Option<String>,
}

impl MediaItem {
    pub fn new(source_url: impl Into<String>, poster_url: Option<String>) -> Self {
        Self {
            source_url: source_url.into(),
            poster_url,
        }
    }
}

/// Intersection settings used to decide when a tile is "in view".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VisibilityPolicy {
    /// Margin around the viewport that still counts as visible.
    pub root_margin_px: f64,
    /// Fraction of the tile that must intersect.
    pub threshold: f64,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            root_margin_px: 50.0,
            threshold: 0.01,
        }
    }
}

impl VisibilityPolicy {
    /// `rootMargin` value for an intersection observer.
    pub fn root_margin_css(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// Coarse loading stage of a tile, derived from [`TileMedia`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Never intersected; no source attached.
    Deferred,
    /// Source attached, first frame not yet decoded.
    Loading,
    /// First frame decoded.
    Playing,
}

/// Lazy-load state for a single tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileMedia {
    has_poster: bool,
    in_view: bool,
    decoded: bool,
    aspect: Option<(u32, u32)>,
}

impl TileMedia {
    /// Fresh state for an item; only the presence of a poster matters here.
    #[must_use]
    pub fn for_item(item: &MediaItem) -> Self {
        Self {
            has_poster: item.poster_url.is_some(),
            ..Self::default()
        }
    }

    /// Intersection callback. Visibility latches on the first `true`.
    pub fn on_visibility(&mut self, intersecting: bool) {
        if intersecting {
            self.in_view = true;
        }
    }

    /// Metadata callback with intrinsic video dimensions. Zero sizes are
    /// ignored (some containers report 0×0 before the first frame).
    pub fn on_metadata(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = Some((width, height));
        }
    }

    /// The primary resource reported a decoded frame.
    pub fn on_first_frame(&mut self) {
        self.decoded = true;
    }

    /// Whether the heavy source should be attached.
    #[inline]
    pub fn should_load(&self) -> bool {
        self.in_view
    }

    /// Whether the poster overlay should be shown.
    #[inline]
    pub fn show_poster(&self) -> bool {
        self.has_poster && (!self.decoded || !self.in_view)
    }

    /// Intrinsic aspect ratio once known, used to size the tile.
    #[inline]
    pub fn aspect_ratio(&self) -> Option<(u32, u32)> {
        self.aspect
    }

    pub fn stage(&self) -> LoadStage {
        match (self.in_view, self.decoded) {
            (false, _) => LoadStage::Deferred,
            (true, false) => LoadStage::Loading,
            (true, true) => LoadStage::Playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_poster() -> TileMedia {
        TileMedia::for_item(&MediaItem::new("a.mp4", Some("a.jpg".into())))
    }

    #[test]
    fn deferred_until_visible() {
        let mut m = with_poster();
        assert_eq!(m.stage(), LoadStage::Deferred);
        assert!(!m.should_load());
        assert!(m.show_poster());

        m.on_visibility(false);
        assert!(!m.should_load());

        m.on_visibility(true);
        assert!(m.should_load());
        assert_eq!(m.stage(), LoadStage::Loading);
    }

    #[test]
    fn visibility_latches() {
        let mut m = with_poster();
        m.on_visibility(true);
        m.on_visibility(false);
        assert!(m.should_load());
    }

    #[test]
    fn poster_hidden_after_first_frame() {
        let mut m = with_poster();
        m.on_visibility(true);
        assert!(m.show_poster());
        m.on_first_frame();
        assert!(!m.show_poster());
        assert_eq!(m.stage(), LoadStage::Playing);
    }

    #[test]
    fn no_poster_never_shows_overlay() {
        let m = TileMedia::for_item(&MediaItem::new("b.mp4", None));
        assert!(!m.show_poster());
    }

    #[test]
    fn metadata_ignores_zero_dimensions() {
        let mut m = with_poster();
        m.on_metadata(0, 720);
        assert_eq!(m.aspect_ratio(), None);
        m.on_metadata(1920, 1080);
        assert_eq!(m.aspect_ratio(), Some((1920, 1080)));
    }

    #[test]
    fn default_visibility_policy() {
        let p = VisibilityPolicy::default();
        assert_eq!(p.root_margin_px, 50.0);
        assert_eq!(p.threshold, 0.01);
        assert_eq!(p.root_margin_css(), "50px");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_cms_field_names() {
        let items: Vec<MediaItem> = serde_json::from_str(
            r#"[{"src":"a.mp4","thumb":"a.jpg"},{"sourceUrl":"b.mp4","posterUrl":null},{"src":"c.mp4"}]"#,
        )
        .unwrap();
        assert_eq!(items[0], MediaItem::new("a.mp4", Some("a.jpg".into())));
        assert_eq!(items[1], MediaItem::new("b.mp4", None));
        assert_eq!(items[2].poster_url, None);
    }
}
