/*
 * Sigil Recognizer: shape descriptors
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

use crate::{
    geometry::{self, BoundingBox, EPSILON},
    point::Point,
};

/// Scalar shape metrics of a normalized sequence, compared alongside the elastic distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeDescriptor {
    /// min(w, h) / max(w, h) of the bounding box, in [0..1]
    pub bounding_box_ratio: f32,
    /// 4π·area / perimeter², 1 for a perfect circle
    pub circularity: f32,
    /// Mean turning angle between consecutive edges, in degrees
    pub average_curvature: f32,
    /// Whether the path ends close to where it started
    pub closed: bool,
}

impl ShapeDescriptor {
    pub fn compute(points: &[Point], closed_threshold: f32) -> Self {
        Self {
            bounding_box_ratio: bounding_box_ratio(points),
            circularity: circularity(points),
            average_curvature: average_curvature(points),
            closed: is_closed(points, closed_threshold),
        }
    }
}

fn bounding_box_ratio(points: &[Point]) -> f32 {
    let Some(bb) = BoundingBox::of(points) else {
        return 0.0;
    };
    let (w, h) = (bb.width(), bb.height());
    let longest = w.max(h);
    if longest < EPSILON {
        return 0.0;
    }
    w.min(h) / longest
}

fn circularity(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let perimeter =
        geometry::path_length(points) + geometry::euclidean_distance(&points[n - 1], &points[0]);
    if perimeter < EPSILON {
        return 0.0;
    }
    // shoelace over the implicitly closed polygon
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }
    let area = (twice_area * 0.5).abs();
    4.0 * std::f32::consts::PI * area / (perimeter * perimeter)
}

fn average_curvature(points: &[Point]) -> f32 {
    let edges: Vec<(f32, f32)> = points
        .windows(2)
        .map(|w| (w[1].x - w[0].x, w[1].y - w[0].y))
        .filter(|(dx, dy)| (dx * dx + dy * dy).sqrt() >= EPSILON)
        .collect();
    if edges.len() < 2 {
        return 0.0;
    }
    let total: f32 = edges
        .windows(2)
        .map(|w| turning_angle(w[0], w[1]).to_degrees())
        .sum();
    total / (edges.len() - 1) as f32
}

/// Computes the angle between two edge vectors in radians in the interval [0..PI].
fn turning_angle(u: (f32, f32), v: (f32, f32)) -> f32 {
    let length_u = (u.0 * u.0 + u.1 * u.1).sqrt();
    let length_v = (v.0 * v.0 + v.1 * v.1).sqrt();
    let cos_angle = (u.0 * v.0 + u.1 * v.1) / (length_u * length_v);
    // deal with special cases near limits of the [-1,1] interval
    if cos_angle <= -1.0 {
        std::f32::consts::PI
    } else if cos_angle >= 1.0 {
        0.0
    } else {
        cos_angle.acos()
    }
}

fn is_closed(points: &[Point], closed_threshold: f32) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => geometry::euclidean_distance(first, last) < closed_threshold,
        _ => false,
    }
}
