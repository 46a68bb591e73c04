/*
 * Sigil Recognizer: template library
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

use std::collections::HashSet;

use crate::point::Point;
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// Authoring-time tag telling effect code what a sign is, independent of its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    Line,
    Circle,
    Triangle,
    Square,
    Zigzag,
    Spiral,
    Star,
    #[default]
    Other,
}

/// A named reference shape ("spell sign").
/// Points are kept raw, as authored; normalization happens when a matcher is prepared.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Template {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    /// Resource cost of casting this sign
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: f32,
}

impl Template {
    pub fn new(id: &str, kind: ShapeKind, points: Vec<Point>, cost: f32) -> Self {
        Self {
            id: id.into(),
            kind,
            points,
            cost,
        }
    }

    /// Templates without points never take part in matching
    pub fn is_malformed(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    #[error("template id must not be empty")]
    EmptyId,

    #[error("duplicate template id: {0}")]
    DuplicateId(String),

    #[error("template {id} has invalid cost {cost}")]
    InvalidCost { id: String, cost: f32 },
}

/// Immutable collection of templates with unique ids.
/// Build one with [`TemplateLibrary::builder`] and share it (e.g. behind an `Arc`) between sessions.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    pub fn builder() -> TemplateLibraryBuilder {
        TemplateLibraryBuilder::default()
    }

    /// Validates a list of templates, e.g. one deserialized by the host
    pub fn from_templates(templates: Vec<Template>) -> Result<Self, LibraryError> {
        let mut seen = HashSet::new();
        for t in &templates {
            if t.id.is_empty() {
                return Err(LibraryError::EmptyId);
            }
            if !seen.insert(t.id.as_str()) {
                return Err(LibraryError::DuplicateId(t.id.clone()));
            }
            if !t.cost.is_finite() || t.cost < 0.0 {
                return Err(LibraryError::InvalidCost {
                    id: t.id.clone(),
                    cost: t.cost,
                });
            }
        }
        Ok(Self { templates })
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<'a> IntoIterator for &'a TemplateLibrary {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}

#[derive(Debug, Default)]
pub struct TemplateLibraryBuilder {
    templates: Vec<Template>,
}

impl TemplateLibraryBuilder {
    pub fn template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    pub fn sign(self, id: &str, kind: ShapeKind, points: Vec<Point>, cost: f32) -> Self {
        self.template(Template::new(id, kind, points, cost))
    }

    pub fn build(self) -> Result<TemplateLibrary, LibraryError> {
        TemplateLibrary::from_templates(self.templates)
    }
}
