/*
 * Sigil Recognizer: template matching
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

use std::sync::Arc;

use crate::{
    descriptor::ShapeDescriptor,
    geometry,
    normalizer::{normalize, NormalizeParameters, NormalizedSequence},
    point::Point,
    template::{ShapeKind, Template, TemplateLibrary},
};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// Elastic distance between the normalized input and a normalized template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DistanceMode {
    /// Dynamic time warping over the full (N+1)x(N+1) table
    #[default]
    Dtw,
    /// Mean point-to-point distance; only defined for sequences of equal length
    Average,
}

/// What happens to a candidate whose closure differs from the input's
/// (an open stroke against a closed template, or the reverse).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MismatchPolicy {
    /// Multiply the composite score by `closed_mismatch_penalty`
    #[default]
    Multiply,
    /// Add a fixed amount to the composite score
    Add(f32),
    /// Disqualify the candidate
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchParameters {
    pub distance: DistanceMode,
    pub dtw_weight: f32,
    pub aspect_weight: f32,
    pub circularity_weight: f32,
    /// Applied to a curvature difference expressed in degrees
    pub curvature_weight: f32,
    /// First-to-last distance (in normalized units) under which a path counts as closed
    pub closed_threshold: f32,
    pub closed_mismatch_penalty: f32,
    pub mismatch_policy: MismatchPolicy,
    /// Scores must be strictly below this to be reported as a match
    pub recognition_threshold: f32,
    pub normalize: NormalizeParameters,
}

impl Default for MatchParameters {
    fn default() -> Self {
        MatchParameters {
            distance: DistanceMode::Dtw,
            dtw_weight: 1.0,
            aspect_weight: 2.0,
            circularity_weight: 2.0,
            curvature_weight: 0.05,
            closed_threshold: 0.2,
            closed_mismatch_penalty: 1.5,
            mismatch_policy: MismatchPolicy::Multiply,
            recognition_threshold: 6.0,
            normalize: NormalizeParameters::default(),
        }
    }
}

/// A template the input was matched against, with its composite score (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub id: String,
    pub kind: ShapeKind,
    pub cost: f32,
    pub score: f32,
}

impl Recognition {
    fn of(template: &Template, score: f32) -> Self {
        Self {
            id: template.id.clone(),
            kind: template.kind,
            cost: template.cost,
            score,
        }
    }
}

/// A template normalized once, ready to be compared against many inputs
#[derive(Debug, Clone)]
struct PreparedTemplate {
    /// Position in the library
    index: usize,
    points: NormalizedSequence,
    descriptor: ShapeDescriptor,
}

impl PreparedTemplate {
    fn prepare(index: usize, template: &Template, params: &MatchParameters) -> Option<Self> {
        if template.is_malformed() {
            log::warn!("template {:?} has no points, skipping it", template.id);
            return None;
        }
        let points = normalize(&template.points, &params.normalize);
        let descriptor = ShapeDescriptor::compute(&points, params.closed_threshold);
        Some(Self {
            index,
            points,
            descriptor,
        })
    }
}

/// Recognizes a raw path against a list of templates.
/// Templates are normalized on every call; use a [`Matcher`] to prepare them once.
pub fn recognize(
    points: &[Point],
    templates: &[Template],
    params: &MatchParameters,
) -> Option<Recognition> {
    let prepared: Vec<PreparedTemplate> = templates
        .iter()
        .enumerate()
        .filter_map(|(i, t)| PreparedTemplate::prepare(i, t, params))
        .collect();
    let (index, score) = best_match(points, &prepared, params)?;
    Some(Recognition::of(&templates[index], score))
}

/// Immutable snapshot of a template library, normalized for one set of match parameters.
/// Cheap to share between sessions through an `Arc`.
#[derive(Debug, Clone)]
pub struct Matcher {
    library: Arc<TemplateLibrary>,
    prepared: Vec<PreparedTemplate>,
    params: MatchParameters,
}

impl Matcher {
    pub fn new(library: Arc<TemplateLibrary>, params: MatchParameters) -> Self {
        let prepared = library
            .iter()
            .enumerate()
            .filter_map(|(i, t)| PreparedTemplate::prepare(i, t, &params))
            .collect();
        Self {
            library,
            prepared,
            params,
        }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn params(&self) -> &MatchParameters {
        &self.params
    }

    /// Returns the best template if its score is below the recognition threshold
    pub fn recognize(&self, points: &[Point]) -> Option<Recognition> {
        let (index, score) = best_match(points, &self.prepared, &self.params)?;
        Some(Recognition::of(&self.library.templates()[index], score))
    }

    /// Scores the path against every well-formed template, best first, ignoring the threshold
    pub fn rank(&self, points: &[Point]) -> Vec<Recognition> {
        let input = normalize(points, &self.params.normalize);
        if input.is_empty() {
            return Vec::new();
        }
        let descriptor = ShapeDescriptor::compute(&input, self.params.closed_threshold);
        let templates = self.library.templates();
        let mut ranked: Vec<Recognition> = self
            .prepared
            .iter()
            .map(|t| {
                let score = composite_score(&input, &descriptor, t, &self.params);
                Recognition::of(&templates[t.index], score)
            })
            .collect();
        ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
        ranked
    }
}

/// Index and score of the lowest-scoring template, if that score is under the threshold
fn best_match(
    points: &[Point],
    prepared: &[PreparedTemplate],
    params: &MatchParameters,
) -> Option<(usize, f32)> {
    let input = normalize(points, &params.normalize);
    if input.is_empty() {
        return None;
    }
    let descriptor = ShapeDescriptor::compute(&input, params.closed_threshold);

    let mut best: Option<(usize, f32)> = None;
    for template in prepared {
        let score = composite_score(&input, &descriptor, template, params);
        log::trace!("template #{} scored {score}", template.index);
        if best.map_or(true, |(_, min)| score < min) {
            best = Some((template.index, score));
        }
    }
    best.filter(|&(_, score)| score < params.recognition_threshold)
}

fn composite_score(
    input: &NormalizedSequence,
    descriptor: &ShapeDescriptor,
    template: &PreparedTemplate,
    params: &MatchParameters,
) -> f32 {
    let dist = match params.distance {
        DistanceMode::Dtw => dtw_distance(input, &template.points),
        DistanceMode::Average => average_distance(input, &template.points),
    };
    let other = &template.descriptor;
    let score = params.dtw_weight * dist
        + params.aspect_weight * (descriptor.bounding_box_ratio - other.bounding_box_ratio).abs()
        + params.circularity_weight * (descriptor.circularity - other.circularity).abs()
        + params.curvature_weight * (descriptor.average_curvature - other.average_curvature).abs();

    if descriptor.closed == other.closed {
        return score;
    }
    match params.mismatch_policy {
        MismatchPolicy::Multiply => score * params.closed_mismatch_penalty,
        MismatchPolicy::Add(amount) => score + amount,
        MismatchPolicy::Reject => f32::INFINITY,
    }
}

/// Dynamic time warping distance, keeping only two rows of the table.
/// Sequences may differ in length; an empty sequence is infinitely far from a non-empty one.
pub fn dtw_distance(a: &[Point], b: &[Point]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return if a.len() == b.len() { 0.0 } else { f32::INFINITY };
    }
    let m = b.len();
    let mut prev = vec![f32::INFINITY; m + 1];
    let mut curr = vec![f32::INFINITY; m + 1];
    prev[0] = 0.0;
    for p in a {
        curr[0] = f32::INFINITY;
        for j in 1..=m {
            let cost = geometry::euclidean_distance(p, &b[j - 1]);
            curr[j] = cost + prev[j].min(curr[j - 1]).min(prev[j - 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}

/// Mean of the per-index distances. Infinite when the lengths differ.
pub fn average_distance(a: &[Point], b: &[Point]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    if a.is_empty() {
        return 0.0;
    }
    let sum: f32 = a
        .iter()
        .zip(b)
        .map(|(p, q)| geometry::euclidean_distance(p, q))
        .sum();
    sum / a.len() as f32
}
