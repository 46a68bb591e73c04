use std::{f32::consts::TAU, sync::Arc};

use sigil_recognizer::{
    matcher::MatchParameters,
    session::{SessionParameters, SessionState},
    Matcher, Point, RecognizerConfig, SessionController, SessionOutcome, ShapeKind,
    TemplateLibrary,
};

const DT: f32 = 1.0 / 60.0;

fn arc(center: Point, r: f32, n: usize, closed: bool) -> Vec<Point> {
    let steps = if closed { n - 1 } else { n };
    (0..n)
        .map(|i| {
            let a = i as f32 / steps as f32 * TAU;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect()
}

fn line(from: Point, to: Point, n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f32 / (n - 1) as f32;
            Point::new(from.x + t * (to.x - from.x), from.y + t * (to.y - from.y))
        })
        .collect()
}

/// Densifies a polyline to `per_edge` samples per edge, the way a drawn stroke is sampled
fn polyline(vertices: &[Point], per_edge: usize) -> Vec<Point> {
    std::iter::once(vertices[0])
        .chain(
            vertices
                .windows(2)
                .flat_map(|w| line(w[0], w[1], per_edge + 1).into_iter().skip(1)),
        )
        .collect()
}

fn library() -> Arc<TemplateLibrary> {
    let library = TemplateLibrary::builder()
        .sign("Circle", ShapeKind::Circle, arc(Point::ORIGIN, 50.0, 32, true), 8.0)
        .sign("Slash", ShapeKind::Line, line(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 10), 3.0)
        .sign(
            "Triangle",
            ShapeKind::Triangle,
            polyline(
                &[
                    Point::new(0.0, 100.0),
                    Point::new(50.0, 0.0),
                    Point::new(100.0, 100.0),
                    Point::new(0.0, 100.0),
                ],
                11,
            ),
            5.0,
        )
        .sign(
            "Zigzag",
            ShapeKind::Zigzag,
            polyline(
                &[
                    Point::new(0.0, 0.0),
                    Point::new(25.0, 60.0),
                    Point::new(50.0, 0.0),
                    Point::new(75.0, 60.0),
                    Point::new(100.0, 0.0),
                ],
                11,
            ),
            4.0,
        )
        .build()
        .unwrap();
    Arc::new(library)
}

fn session(params: SessionParameters) -> (SessionController, Arc<Matcher>) {
    let config = RecognizerConfig {
        session: params,
        ..Default::default()
    };
    (config.session(), config.matcher(library()))
}

/// Feeds every point after the first, then rests on the last one for `rest` seconds
fn draw(session: &mut SessionController, points: &[Point], rest: f32) -> Option<SessionOutcome> {
    for p in &points[1..] {
        if let Some(outcome) = session.sample(*p, DT) {
            return Some(outcome);
        }
    }
    let last = *points.last().unwrap();
    for _ in 0..(rest / DT).ceil() as usize {
        if let Some(outcome) = session.sample(last, DT) {
            return Some(outcome);
        }
    }
    None
}

#[test]
fn unit_circle_is_recognized() {
    let matcher = Matcher::new(library(), MatchParameters::default());
    let unit_circle = arc(Point::ORIGIN, 1.0, 64, false);
    let found = matcher.recognize(&unit_circle).expect("circle should match");
    assert_eq!(found.id, "Circle");
    assert!(found.score < MatchParameters::default().recognition_threshold);
}

#[test]
fn every_template_replays_onto_itself() {
    let lib = library();
    let matcher = Matcher::new(lib.clone(), MatchParameters::default());
    for template in lib.iter() {
        let found = matcher.recognize(&template.points).unwrap();
        assert_eq!(found.id, template.id);
        assert!(found.score < 1e-4);
    }
}

#[test]
fn two_segments_make_a_combo() {
    let (mut session, matcher) = session(SessionParameters::default());
    let ring = arc(Point::new(100.0, 100.0), 60.0, 48, true);
    let slash = line(Point::new(160.0, 100.0), Point::new(360.0, 100.0), 40);

    session.start(matcher, ring[0]);
    assert_eq!(draw(&mut session, &ring, 0.4), None);
    assert_eq!(session.state(), SessionState::ComboWait);
    assert_eq!(draw(&mut session, &slash, 0.4), None);
    assert_eq!(session.recognized().len(), 2);

    let outcome = draw(&mut session, &[*slash.last().unwrap()], 3.0).expect("combo window expires");
    let cast = outcome.cast().unwrap();
    assert!(cast.is_combo);
    assert_eq!(cast.ids(), ["Circle", "Slash"]);
    assert_eq!(cast.total_cost(), 11.0);
    assert!(!session.is_active());
}

#[test]
fn segment_with_too_few_points_is_dropped() {
    let (mut session, matcher) = session(SessionParameters::default());
    let sparse = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 5);
    session.start(matcher, sparse[0]);
    assert_eq!(draw(&mut session, &sparse, 0.4), None);
    assert!(session.recognized().is_empty());
    assert_eq!(session.state(), SessionState::Capturing);

    // the session carries on and still recognizes a proper segment
    let slash = line(Point::new(200.0, 0.0), Point::new(400.0, 0.0), 40);
    assert_eq!(draw(&mut session, &slash, 0.4), None);
    assert_eq!(session.recognized().len(), 1);
    let outcome = session.finalize().unwrap();
    assert_eq!(outcome.cast().unwrap().ids(), ["Slash"]);
}

#[test]
fn hard_timeout_without_drawing_is_no_match() {
    let (mut session, matcher) = session(SessionParameters {
        max_drawing_time: 1.0,
        ..Default::default()
    });
    session.start(matcher, Point::new(10.0, 10.0));
    let outcome = draw(&mut session, &[Point::new(10.0, 10.0)], 2.0);
    assert_eq!(outcome, Some(SessionOutcome::NoMatch));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn hard_timeout_keeps_what_was_recognized() {
    let (mut session, matcher) = session(SessionParameters {
        max_drawing_time: 3.0,
        combo_time_window: 100.0,
        ..Default::default()
    });
    let slash = line(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 40);
    session.start(matcher, slash[0]);
    let outcome = draw(&mut session, &slash, 5.0).expect("drawing time runs out");
    let cast = outcome.cast().unwrap();
    assert_eq!(cast.ids(), ["Slash"]);
    assert!(!cast.is_combo);
}

#[test]
fn single_segment_without_combo_finalizes_at_the_pause() {
    let (mut session, matcher) = session(SessionParameters {
        combo_enabled: false,
        ..Default::default()
    });
    let stroke = polyline(
        &[
            Point::new(0.0, 0.0),
            Point::new(50.0, 120.0),
            Point::new(100.0, 0.0),
            Point::new(150.0, 120.0),
            Point::new(200.0, 0.0),
        ],
        11,
    );
    session.start(matcher, stroke[0]);
    let outcome = draw(&mut session, &stroke, 0.4).expect("first pause finalizes");
    let cast = outcome.cast().unwrap();
    assert_eq!(cast.ids(), ["Zigzag"]);
    assert!(!cast.is_combo);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn combo_window_closes_during_a_long_stroke() {
    let (mut session, matcher) = session(SessionParameters::default());
    let ring = arc(Point::new(100.0, 100.0), 60.0, 48, true);
    session.start(matcher, ring[0]);
    assert_eq!(draw(&mut session, &ring, 0.4), None);
    assert_eq!(session.recognized().len(), 1);

    // four seconds of uninterrupted drawing, far longer than the combo window
    let mut outcome = None;
    let mut ticks = 0;
    for i in 1..=240 {
        ticks = i;
        outcome = session.sample(Point::new(160.0 + 3.0 * i as f32, 100.0), DT);
        if outcome.is_some() {
            break;
        }
    }
    let cast = outcome.expect("combo window should close mid-stroke").cast().cloned().unwrap();
    assert!(ticks < 120, "closed after {ticks} ticks");
    // the stroke in progress is matched by the forced finalize
    assert_eq!(cast.ids(), ["Circle", "Slash"]);
    assert!(cast.is_combo);
    assert!(!session.is_active());
}

#[test]
fn hard_timeout_mid_stroke_matches_the_stroke_in_progress() {
    let (mut session, matcher) = session(SessionParameters {
        max_drawing_time: 1.0,
        ..Default::default()
    });
    let slash = line(Point::new(0.0, 0.0), Point::new(357.0, 0.0), 120);
    session.start(matcher, slash[0]);

    let mut finished_at = None;
    for (i, p) in slash[1..].iter().enumerate() {
        if let Some(outcome) = session.sample(*p, DT) {
            finished_at = Some((i + 1, outcome));
            break;
        }
    }
    let (tick, outcome) = finished_at.expect("drawing time runs out");
    assert!((59..=61).contains(&tick), "finalized at tick {tick}");
    assert_eq!(outcome.cast().unwrap().ids(), ["Slash"]);
    assert_eq!(session.state(), SessionState::Idle);
}
