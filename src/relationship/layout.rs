//! Radial layout engine.
//!
//! Places each contact on the ring of its effective layer. Angles and
//! in-band radii come from [`seeded_unit`], a string hash folded into
//! `[0, 1)`, so positions are stable across calls without being stored.
//! Drifting contacts are pinned to the outer edge of their effective ring.

use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::TAU;

use super::drift::effective_layer;
use super::types::{ContactView, Layer};

/// Explicit angles (radians) keyed by contact id, usually from dragging.
pub type AngleOverrides = HashMap<String, f64>;

/// Ring radii for the five layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    /// Outer radius of each ring, vip first.
    pub outer_radii: [f64; 5],
    /// Space between one ring's outer bound and the next ring's inner bound.
    pub ring_gap: f64,
    /// Radius reserved for the centre node.
    pub center_radius: f64,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            outer_radii: [80.0, 160.0, 240.0, 320.0, 400.0],
            ring_gap: 0.0,
            center_radius: 0.0,
        }
    }
}

impl RingGeometry {
    pub fn outer(&self, layer: Layer) -> f64 {
        self.outer_radii[layer.index()]
    }

    pub fn inner(&self, layer: Layer) -> f64 {
        let base = match layer.index() {
            0 => self.center_radius,
            i => self.outer_radii[i - 1],
        };
        (base + self.ring_gap).min(self.outer(layer))
    }
}

/// What the layout needs to know about one contact.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSubject {
    pub contact_id: String,
    pub layer: Layer,
    pub needs_attention: bool,
}

impl From<&ContactView> for LayoutSubject {
    fn from(view: &ContactView) -> Self {
        Self {
            contact_id: view.contact.id.clone(),
            layer: view.contact.layer,
            needs_attention: view.needs_attention,
        }
    }
}

/// A positioned contact. Coordinates are relative to the centre node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub contact_id: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub radius: f64,
    pub nominal_layer: Layer,
    pub effective_layer: Layer,
    pub drifting: bool,
}

/// Hash `key` into `[0, 1)`.
///
/// Folds UTF-16 code units through a wrapping 32-bit `h * 31 + c`, then
/// takes `|sin(h)|`. The empty key maps to 0.
pub fn seeded_unit(key: &str) -> f64 {
    let hash = key
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
    let unit = f64::from(hash).sin().abs();
    if unit >= 1.0 {
        0.0
    } else {
        unit
    }
}

/// Default angle for a contact, in `[0, 2π)`.
pub fn seeded_angle(contact_id: &str) -> f64 {
    seeded_unit(contact_id) * TAU
}

fn radius_seed(contact_id: &str) -> f64 {
    seeded_unit(&format!("{contact_id}:radius"))
}

/// Lay out `subjects` with the default ring geometry and no overrides.
pub fn layout(subjects: &[LayoutSubject]) -> Vec<LayoutNode> {
    layout_with(subjects, &AngleOverrides::new(), &RingGeometry::default())
}

/// Lay out `subjects`, preferring any angle in `overrides`.
pub fn layout_with(
    subjects: &[LayoutSubject],
    overrides: &AngleOverrides,
    geometry: &RingGeometry,
) -> Vec<LayoutNode> {
    subjects
        .iter()
        .map(|s| place(s, overrides, geometry))
        .collect()
}

fn place(subject: &LayoutSubject, overrides: &AngleOverrides, geometry: &RingGeometry) -> LayoutNode {
    let effective = effective_layer(subject.layer, subject.needs_attention);
    // Overdue distant contacts cannot move out a ring but still sit on the edge.
    let drifting = subject.needs_attention;

    let angle = overrides
        .get(&subject.contact_id)
        .copied()
        .unwrap_or_else(|| seeded_angle(&subject.contact_id));

    let outer = geometry.outer(effective);
    let radius = if drifting {
        outer
    } else {
        let inner = geometry.inner(effective);
        inner + (outer - inner) * (0.3 + radius_seed(&subject.contact_id) * 0.5)
    };

    LayoutNode {
        contact_id: subject.contact_id.clone(),
        x: radius * angle.cos(),
        y: radius * angle.sin(),
        angle,
        radius,
        nominal_layer: subject.layer,
        effective_layer: effective,
        drifting,
    }
}
