/*
 * Sigil Recognizer: path normalization
 *
 * Builds on the $-family recognizers ($P, $P+, $Q), rust version by
 * Ferran Pujol Camins.
 *
 * Original authors:
 * 
 * 	    Radu-Daniel Vatavu, Ph.D.
 *	    University Stefan cel Mare of Suceava
 *	    Suceava 720229, Romania
 *	    vatavu@eed.usv.ro
 *
 *	    Lisa Anthony, Ph.D.
 *      UMBC
 *      Information Systems Department
 *      1000 Hilltop Circle
 *      Baltimore, MD 21250
 *      lanthony@umbc.edu
 *
 *	    Jacob O. Wobbrock, Ph.D.
 * 	    The Information School
 *	    University of Washington
 *	    Seattle, WA 98195-2840
 *	    wobbrock@uw.edu
 *
 * The academic publication for the $P recognizer, and what should be 
 * used to cite it, is:
 *
 *	Vatavu, R.-D., Anthony, L. and Wobbrock, J.O. (2012).  
 *	  Gestures as point clouds: A $P recognizer for user interface 
 *	  prototypes. Proceedings of the ACM Int'l Conference on  
 *	  Multimodal Interfaces (ICMI '12). Santa Monica, California  
 *	  (October 22-26, 2012). New York: ACM Press, pp. 273-280.
 *
 * This software is distributed under the "New BSD License" agreement:
 *
 * Copyright (c) 2012, Radu-Daniel Vatavu, Lisa Anthony, and 
 * Jacob O. Wobbrock. All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions are met:
 *    * Redistributions of source code must retain the above copyright
 *      notice, this list of conditions and the following disclaimer.
 *    * Redistributions in binary form must reproduce the above copyright
 *      notice, this list of conditions and the following disclaimer in the
 *      documentation and/or other materials provided with the distribution.
 *    * Neither the names of the University Stefan cel Mare of Suceava, 
 *	    University of Washington, nor UMBC, nor the names of its contributors 
 *	    may be used to endorse or promote products derived from this software 
 *	    without specific prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
 * IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
 * THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
 * PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL Radu-Daniel Vatavu OR Lisa Anthony
 * OR Jacob O. Wobbrock OR Ferran Pujol Camins BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, 
 * EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT 
 * OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS 
 * INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, 
 * STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY
 * OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF
 * SUCH DAMAGE.
**/

use std::ops::Deref;

use crate::{
    geometry::{self, BoundingBox, EPSILON},
    point::Point,
};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// How (and whether) a path is rotated to a canonical orientation before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RotationMode {
    /// Keep the orientation as drawn. Signs that differ only by rotation stay distinguishable.
    #[default]
    None,
    /// Rotate so that the first point lies at angle zero from the centroid.
    IndicativeAngle,
    /// Rotate so that the principal axis of the point spread lies along x.
    Pca,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NormalizeParameters {
    /// Number of points of every normalized sequence
    pub resample_count: usize,
    /// Width of the moving-average window; 0 or 1 disables smoothing
    pub smoothing_window: usize,
    pub rotation: RotationMode,
}

impl Default for NormalizeParameters {
    fn default() -> Self {
        NormalizeParameters {
            resample_count: 64,
            smoothing_window: 3,
            rotation: RotationMode::None,
        }
    }
}

/// A path resampled to a fixed number of points, unit-scaled and centered on the origin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSequence {
    points: Vec<Point>,
}

impl NormalizedSequence {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl Deref for NormalizedSequence {
    type Target = [Point];

    fn deref(&self) -> &[Point] {
        &self.points
    }
}

/// Normalizes a raw path: smoothing, resampling, optional rotation, scaling, and translation
/// to the origin, in that order.
///
/// The result has exactly `params.resample_count` points for any non-empty input, and is
/// empty for an empty input. A stationary path (zero length) becomes `resample_count` copies
/// of its first point, which the translation step then moves to the origin.
pub fn normalize(points: &[Point], params: &NormalizeParameters) -> NormalizedSequence {
    if points.is_empty() || params.resample_count == 0 {
        return NormalizedSequence::default();
    }
    let smoothed = smooth(points, params.smoothing_window);
    let resampled = resample(&smoothed, params.resample_count);
    let rotated = match params.rotation {
        RotationMode::None => resampled,
        RotationMode::IndicativeAngle => {
            let theta = indicative_angle(&resampled);
            geometry::rotate_by(&resampled, -theta, &geometry::centroid(&resampled))
        }
        RotationMode::Pca => {
            let theta = principal_angle(&resampled);
            geometry::rotate_by(&resampled, -theta, &geometry::centroid(&resampled))
        }
    };
    let scaled = scale(&rotated);
    let c = geometry::centroid(&scaled);
    NormalizedSequence {
        points: geometry::translate_by(&scaled, &c),
    }
}

/// Centered moving average. The window shrinks near both ends of the path.
fn smooth(points: &[Point], window: usize) -> Vec<Point> {
    if window <= 1 || points.len() < window {
        return points.to_vec();
    }
    let before = (window - 1) / 2;
    let after = window / 2;
    let last = points.len() - 1;
    (0..points.len())
        .map(|i| {
            let span = &points[i.saturating_sub(before)..=(i + after).min(last)];
            geometry::centroid(span)
        })
        .collect()
}

/// Resamples the array of points into n points equally spaced along the path
fn resample(points: &[Point], n: usize) -> Vec<Point> {
    let first = points[0];
    let length = geometry::path_length(points);
    if n == 1 || length < EPSILON {
        return vec![first; n];
    }

    let interval = length / (n as f32 - 1.0);
    let mut new_points = Vec::with_capacity(n);
    new_points.push(first);
    let mut d = 0.0;

    for i in 1..points.len() {
        let mut from = points[i - 1];
        let to = points[i];
        let mut dist = geometry::euclidean_distance(&from, &to);
        while d + dist >= interval && new_points.len() < n {
            let t = if dist > 0.0 {
                ((interval - d) / dist).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let q = Point::new(
                (1.0 - t) * from.x + t * to.x,
                (1.0 - t) * from.y + t * to.y,
            );
            new_points.push(q);
            // remaining distance from the inserted point to `to`
            dist = (d + dist - interval).max(0.0);
            d = 0.0;
            from = q;
        }
        d += dist;
    }

    // rounding can leave us one (rarely more) short of the end point
    let end = points[points.len() - 1];
    while new_points.len() < n {
        new_points.push(end);
    }
    new_points
}

/// Angle from the centroid to the first point
fn indicative_angle(points: &[Point]) -> f32 {
    let c = geometry::centroid(points);
    (points[0].y - c.y).atan2(points[0].x - c.x)
}

/// Orientation of the dominant axis of the 2x2 covariance of the centered points
fn principal_angle(points: &[Point]) -> f32 {
    let c = geometry::centroid(points);
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    0.5 * (2.0 * sxy).atan2(sxx - syy)
}

/// Uniform scaling by the larger side of the bounding box; degenerate boxes are left alone
fn scale(points: &[Point]) -> Vec<Point> {
    let Some(bb) = BoundingBox::of(points) else {
        return Vec::new();
    };
    if bb.is_degenerate() {
        return points.to_vec();
    }
    let size = bb.width().max(bb.height());
    points
        .iter()
        .map(|p| Point::new(p.x / size, p.y / size))
        .collect()
}
