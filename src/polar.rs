// Polar position with a rebasable origin.
//
// Layout strategies keep per-vertex positions as (radius, angle) relative to
// an explicit reference point, usually the viewport center or a group-cell
// center. Rebasing the origin preserves the absolute Cartesian location and
// only recomputes the polar pair.
//
// Invariants:
// - radius >= 0 (a negative radius is normalized by flipping the angle by pi)
// - angle lies in [0, 2*pi)

use serde::Serialize;
use std::f64::consts::{PI, TAU};

/// Absolute Cartesian point, used for origins and published snapshots.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D position stored as (radius, angle) against an explicit origin.
#[derive(Debug, Copy, Clone)]
pub struct PolarPoint {
    origin: Point,
    radius: f64,
    angle: f64,
}

impl PolarPoint {
    /// Point sitting on `origin` with zero radius.
    pub fn with_origin(origin: Point) -> Self {
        Self {
            origin,
            radius: 0.0,
            angle: 0.0,
        }
    }

    /// Point at absolute `(x, y)`, origin at (0, 0).
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        let mut p = Self::with_origin(Point::default());
        p.set_cartesian(x, y);
        p
    }

    /// Set radius/angle directly, normalizing into the invariant ranges.
    pub fn set_polar(&mut self, radius: f64, angle: f64) {
        let (radius, angle) = normalize(radius, angle);
        self.radius = radius;
        self.angle = angle;
    }

    /// Set the absolute Cartesian location, recomputing the polar pair
    /// against the current origin.
    pub fn set_cartesian(&mut self, x: f64, y: f64) {
        let dx = x - self.origin.x;
        let dy = y - self.origin.y;
        self.radius = dx.hypot(dy);
        self.angle = if self.radius == 0.0 {
            0.0
        } else {
            dy.atan2(dx).rem_euclid(TAU)
        };
    }

    /// Change the reference point while preserving the absolute location.
    pub fn set_origin(&mut self, origin: Point) {
        let x = self.x();
        let y = self.y();
        self.origin = origin;
        self.set_cartesian(x, y);
    }

    /// Apply a relative Cartesian offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let x = self.x() + dx;
        let y = self.y() + dy;
        self.set_cartesian(x, y);
    }

    /// Apply a relative polar offset.
    pub fn move_polar(&mut self, dr: f64, dtheta: f64) {
        self.set_polar(self.radius + dr, self.angle + dtheta);
    }

    /// Absolute x, derived from origin + polar form.
    pub fn x(&self) -> f64 {
        self.origin.x + self.radius * self.angle.cos()
    }

    /// Absolute y, derived from origin + polar form.
    pub fn y(&self) -> f64 {
        self.origin.y + self.radius * self.angle.sin()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Absolute location as a plain point.
    pub fn point(&self) -> Point {
        Point::new(self.x(), self.y())
    }
}

fn normalize(radius: f64, angle: f64) -> (f64, f64) {
    let (radius, angle) = if radius < 0.0 {
        (-radius, angle + PI)
    } else {
        (radius, angle)
    };
    (radius, angle.rem_euclid(TAU))
}
