//! Transforms between model space and viewport space.
//!
//! Model space is the document's own coordinate system: integer positions
//! with the origin at the document center. Viewport space is on-screen
//! pixels. Both spaces use the same axis directions (x grows right, y grows
//! down), so the mapping is a uniform scale about the viewport center plus a
//! pan offset:
//!
//! ```text
//! viewport = center + model * zoom + pan
//! ```

use serde::{Deserialize, Serialize};

use crate::{ArtError, ArtResult, Position};

/// A point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Self {
            x: f64::from(position.x),
            y: f64::from(position.y),
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The center of a rectangle of this size anchored at the origin.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Map a model-space point into viewport space.
#[must_use]
pub fn to_viewport(model: Point, viewport_center: Point, zoom: f64, pan: Point) -> Point {
    Point {
        x: viewport_center.x + model.x * zoom + pan.x,
        y: viewport_center.y + model.y * zoom + pan.y,
    }
}

/// Map a viewport-space point back into model space.
///
/// # Errors
///
/// Returns [`ArtError::DivisionByZero`] if `zoom` is zero.
pub fn to_model(viewport: Point, viewport_center: Point, zoom: f64, pan: Point) -> ArtResult<Point> {
    if zoom == 0.0 {
        return Err(ArtError::DivisionByZero);
    }
    Ok(Point {
        x: (viewport.x - pan.x - viewport_center.x) / zoom,
        y: (viewport.y - pan.y - viewport_center.y) / zoom,
    })
}

/// The pan/zoom state of a viewport looking at a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Zoom scale, `1.0` = one model unit per pixel. Always positive.
    pub zoom: f64,
    /// Pan offset in viewport pixels.
    pub pan: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::ZERO,
        }
    }
}

impl ViewTransform {
    /// Map a model position to the viewport of the given size.
    #[must_use]
    pub fn to_viewport(&self, model: Point, viewport: Size) -> Point {
        to_viewport(model, viewport.center(), self.zoom, self.pan)
    }

    /// Map a viewport point to model space.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::DivisionByZero`] if the zoom is zero.
    pub fn to_model(&self, point: Point, viewport: Size) -> ArtResult<Point> {
        to_model(point, viewport.center(), self.zoom, self.pan)
    }

    /// Map a viewport point to an integer model position, truncating toward
    /// zero. This is how dropped emojis get their location.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::DivisionByZero`] if the zoom is zero.
    pub fn to_model_position(&self, point: Point, viewport: Size) -> ArtResult<Position> {
        let model = self.to_model(point, viewport)?;
        Ok(Position::new(truncate(model.x), truncate(model.y)))
    }

    /// Convert a viewport length (such as a default font size) to model units.
    ///
    /// # Errors
    ///
    /// Returns [`ArtError::DivisionByZero`] if the zoom is zero.
    pub fn model_length(&self, viewport_length: f64) -> ArtResult<f64> {
        if self.zoom == 0.0 {
            return Err(ArtError::DivisionByZero);
        }
        Ok(viewport_length / self.zoom)
    }

    /// Zoom so an image of `image` size fits entirely inside `viewport`, and
    /// reset the pan.
    ///
    /// Returns `None` (leave the transform alone) if either size has a zero
    /// dimension.
    #[must_use]
    pub fn zoom_to_fit(image: Size, viewport: Size) -> Option<Self> {
        if image.is_degenerate() || viewport.is_degenerate() {
            return None;
        }
        let horizontal = viewport.width / image.width;
        let vertical = viewport.height / image.height;
        Some(Self {
            zoom: horizontal.min(vertical),
            pan: Point::ZERO,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i32 {
    // `as` saturates at the i32 bounds and maps NaN to zero.
    value.trunc() as i32
}
