/*
 * Sigil Recognizer: drawing session
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
    geometry,
    matcher::{Matcher, Recognition},
    point::Point,
};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

/// Thresholds and timers of a drawing session. Distances are in input units, times in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionParameters {
    /// Samples closer than this to the last recorded point count as "not moving"
    pub movement_threshold: f32,
    /// Time without movement that ends a segment
    pub stop_time_threshold: f32,
    pub min_points_for_recognition: usize,
    pub min_total_path_length: f32,
    /// When disabled, the first segment boundary finalizes the session
    pub combo_enabled: bool,
    /// Time allowed after the last recognized segment before the combo is cast,
    /// whether or not the pen is still moving
    pub combo_time_window: f32,
    pub max_drawing_time: f32,
}

impl Default for SessionParameters {
    fn default() -> Self {
        SessionParameters {
            movement_threshold: 2.0,
            stop_time_threshold: 0.3,
            min_points_for_recognition: 10,
            min_total_path_length: 40.0,
            combo_enabled: true,
            combo_time_window: 1.5,
            max_drawing_time: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    /// Only held while a finished segment is matched, inside a single `sample` call
    Recognizing,
    /// A segment was just recognized and the pen is at rest; the combo window keeps running
    ComboWait,
}

/// Signs recognized during one session, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    pub signs: Vec<Recognition>,
    pub is_combo: bool,
}

impl Cast {
    pub fn ids(&self) -> Vec<&str> {
        self.signs.iter().map(|s| s.id.as_str()).collect()
    }

    /// Sum of the declared costs of every sign
    pub fn total_cost(&self) -> f32 {
        self.signs.iter().map(|s| s.cost).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    NoMatch,
    Cast(Cast),
}

impl SessionOutcome {
    pub fn cast(&self) -> Option<&Cast> {
        match self {
            SessionOutcome::Cast(cast) => Some(cast),
            SessionOutcome::NoMatch => None,
        }
    }

    pub fn is_combo(&self) -> bool {
        self.cast().is_some_and(|c| c.is_combo)
    }
}

/// Drives one actor's drawing session: buffers samples, cuts them into segments on pauses,
/// matches each segment and collects the recognized signs until the session is finalized.
///
/// Everything happens synchronously inside [`SessionController::sample`], which the host calls
/// once per tick while the session is active.
#[derive(Debug)]
pub struct SessionController {
    params: SessionParameters,
    matcher: Option<Arc<Matcher>>,
    state: SessionState,
    buffer: Vec<Point>,
    last_point: Point,
    has_moved: bool,
    elapsed: f32,
    no_movement: f32,
    combo_timer: f32,
    recognized: Vec<Recognition>,
}

impl SessionController {
    pub fn new(params: SessionParameters) -> Self {
        Self {
            params,
            matcher: None,
            state: SessionState::Idle,
            buffer: Vec::with_capacity(256),
            last_point: Point::ORIGIN,
            has_moved: false,
            elapsed: 0.0,
            no_movement: 0.0,
            combo_timer: 0.0,
            recognized: Vec::new(),
        }
    }

    pub fn params(&self) -> &SessionParameters {
        &self.params
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Signs recognized so far in this session
    pub fn recognized(&self) -> &[Recognition] {
        &self.recognized
    }

    /// Points of the segment being drawn
    pub fn buffer(&self) -> &[Point] {
        &self.buffer
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Starts a session against an immutable template snapshot. Restarts if one is already active.
    pub fn start(&mut self, matcher: Arc<Matcher>, first: Point) {
        self.reset();
        self.matcher = Some(matcher);
        self.buffer.push(first);
        self.last_point = first;
        self.state = SessionState::Capturing;
        log::debug!("session started at ({}, {})", first.x, first.y);
    }

    /// Feeds one tick of input. Returns the outcome on the tick that ends the session.
    pub fn sample(&mut self, point: Point, dt: f32) -> Option<SessionOutcome> {
        if !self.is_active() {
            return None;
        }

        if geometry::euclidean_distance(&self.last_point, &point) >= self.params.movement_threshold {
            if self.state == SessionState::ComboWait {
                self.state = SessionState::Capturing;
            }
            if self.buffer.is_empty() {
                // a new segment starts where the pen rested
                self.buffer.push(self.last_point);
            }
            self.buffer.push(point);
            self.last_point = point;
            self.has_moved = true;
            self.no_movement = 0.0;
        } else {
            self.no_movement += dt;
        }
        self.elapsed += dt;
        // runs from the first recognized sign on, drawing or not
        if !self.recognized.is_empty() {
            self.combo_timer += dt;
        }

        if self.elapsed >= self.params.max_drawing_time {
            log::debug!("drawing time exhausted after {}s", self.elapsed);
            return self.finalize();
        }

        if self.has_moved && self.no_movement >= self.params.stop_time_threshold {
            if !self.params.combo_enabled {
                return self.finalize();
            }
            self.close_segment();
        }

        if !self.recognized.is_empty() && self.combo_timer >= self.params.combo_time_window {
            log::debug!("combo window closed after {}s", self.combo_timer);
            return self.finalize();
        }
        None
    }

    /// Ends the session, matching whatever remains in the buffer.
    /// Returns `None` when no session is active.
    pub fn finalize(&mut self) -> Option<SessionOutcome> {
        if !self.is_active() {
            return None;
        }
        let residual = std::mem::take(&mut self.buffer);
        if let Some(found) = self.recognize_segment(&residual) {
            self.recognized.push(found);
        }

        let signs = std::mem::take(&mut self.recognized);
        let outcome = if signs.is_empty() {
            SessionOutcome::NoMatch
        } else {
            let is_combo = signs.len() >= 2;
            SessionOutcome::Cast(Cast { signs, is_combo })
        };
        log::info!("session finalized: {outcome:?}");
        self.reset();
        Some(outcome)
    }

    /// Drops the session without producing an outcome
    pub fn abort(&mut self) {
        if self.is_active() {
            log::debug!("session aborted");
        }
        self.reset();
    }

    fn close_segment(&mut self) {
        self.state = SessionState::Recognizing;
        let segment = std::mem::take(&mut self.buffer);
        if let Some(found) = self.recognize_segment(&segment) {
            self.recognized.push(found);
            self.combo_timer = 0.0;
        }
        self.has_moved = false;
        self.no_movement = 0.0;
        self.state = if self.recognized.is_empty() {
            SessionState::Capturing
        } else {
            SessionState::ComboWait
        };
    }

    /// Matches a segment if it is long enough; short or unrecognized segments are dropped
    fn recognize_segment(&self, segment: &[Point]) -> Option<Recognition> {
        if segment.is_empty() {
            return None;
        }
        let length = geometry::path_length(segment);
        if segment.len() < self.params.min_points_for_recognition
            || length < self.params.min_total_path_length
        {
            log::debug!(
                "dropping segment of {} points and length {length}",
                segment.len()
            );
            return None;
        }
        let found = self.matcher.as_ref()?.recognize(segment);
        match &found {
            Some(r) => log::debug!("segment recognized as {:?} (score {})", r.id, r.score),
            None => log::debug!("segment of {} points not recognized", segment.len()),
        }
        found
    }

    fn reset(&mut self) {
        self.matcher = None;
        self.state = SessionState::Idle;
        self.buffer.clear();
        self.last_point = Point::ORIGIN;
        self.has_moved = false;
        self.elapsed = 0.0;
        self.no_movement = 0.0;
        self.combo_timer = 0.0;
        self.recognized.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matcher::MatchParameters,
        template::{ShapeKind, TemplateLibrary},
    };

    const DT: f32 = 1.0 / 60.0;

    fn line(from: Point, to: Point, n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                Point::new(from.x + t * (to.x - from.x), from.y + t * (to.y - from.y))
            })
            .collect()
    }

    fn matcher() -> Arc<Matcher> {
        let library = TemplateLibrary::builder()
            .sign("Slash", ShapeKind::Line, line(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 10), 3.0)
            .build()
            .unwrap();
        Arc::new(Matcher::new(Arc::new(library), MatchParameters::default()))
    }

    /// Feeds every point but the first, then holds still for `rest` seconds
    fn draw(session: &mut SessionController, points: &[Point], rest: f32) -> Option<SessionOutcome> {
        for p in &points[1..] {
            if let Some(outcome) = session.sample(*p, DT) {
                return Some(outcome);
            }
        }
        let last = *points.last().unwrap();
        let ticks = (rest / DT).ceil() as usize;
        for _ in 0..ticks {
            if let Some(outcome) = session.sample(last, DT) {
                return Some(outcome);
            }
        }
        None
    }

    #[test]
    fn sample_while_idle_is_ignored() {
        let mut session = SessionController::new(SessionParameters::default());
        assert_eq!(session.sample(Point::new(5.0, 5.0), DT), None);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.finalize(), None);
    }

    #[test]
    fn start_records_first_point() {
        let mut session = SessionController::new(SessionParameters::default());
        session.start(matcher(), Point::new(1.0, 2.0));
        assert_eq!(session.state(), SessionState::Capturing);
        assert_eq!(session.buffer(), &[Point::new(1.0, 2.0)]);
    }

    #[test]
    fn small_moves_are_not_recorded() {
        let mut session = SessionController::new(SessionParameters::default());
        session.start(matcher(), Point::new(0.0, 0.0));
        session.sample(Point::new(1.0, 0.0), DT);
        assert_eq!(session.buffer().len(), 1);
        session.sample(Point::new(3.0, 0.0), DT);
        assert_eq!(session.buffer().len(), 2);
        assert!((session.elapsed() - 2.0 * DT).abs() < 1e-6);
    }

    #[test]
    fn recognized_segment_waits_for_combo() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        assert_eq!(draw(&mut session, &stroke, 0.4), None);
        assert_eq!(session.state(), SessionState::ComboWait);
        assert_eq!(session.recognized().len(), 1);
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn combo_window_expiry_casts() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        let outcome = draw(&mut session, &stroke, 3.0).expect("combo window should expire");
        let cast = outcome.cast().unwrap();
        assert_eq!(cast.ids(), ["Slash"]);
        assert!(!cast.is_combo);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn movement_resumes_capturing_from_rest_point() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        draw(&mut session, &stroke, 0.4);
        session.sample(Point::new(200.0, 10.0), DT);
        assert_eq!(session.state(), SessionState::Capturing);
        assert_eq!(session.buffer(), &[Point::new(200.0, 0.0), Point::new(200.0, 10.0)]);
    }

    #[test]
    fn combo_timer_keeps_running_while_drawing() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        draw(&mut session, &stroke, 0.4);
        let mut outcome = None;
        for i in 1..=200 {
            outcome = session.sample(Point::new(200.0, 3.0 * i as f32), DT);
            if outcome.is_some() {
                break;
            }
        }
        assert!(outcome.is_some(), "combo window never closed while drawing");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn abort_discards_everything() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        draw(&mut session, &stroke, 0.4);
        session.abort();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.recognized().is_empty());
        assert!(session.buffer().is_empty());
        assert_eq!(session.finalize(), None);
    }

    #[test]
    fn finalize_matches_residual_buffer() {
        let mut session = SessionController::new(SessionParameters::default());
        let stroke = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
        session.start(matcher(), stroke[0]);
        for p in &stroke[1..] {
            session.sample(*p, DT);
        }
        let outcome = session.finalize().unwrap();
        assert_eq!(outcome.cast().unwrap().ids(), ["Slash"]);
    }

    #[test]
    fn short_path_is_dropped() {
        let mut session = SessionController::new(SessionParameters::default());
        // 15 points but only 35 units long
        let stroke = line(Point::new(0.0, 0.0), Point::new(35.0, 0.0), 15);
        session.start(matcher(), stroke[0]);
        assert_eq!(draw(&mut session, &stroke, 0.4), None);
        assert!(session.recognized().is_empty());
        assert_eq!(session.state(), SessionState::Capturing);
        assert_eq!(session.finalize(), Some(SessionOutcome::NoMatch));
    }
}
