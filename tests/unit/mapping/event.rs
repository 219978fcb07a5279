use super::*;

fn pulse(time: f64) -> GraphicsEvent {
    GraphicsEvent {
        time,
        duration: 0.18,
        kind: EventKind::Pulse {
            target_scale: 1.6,
            easing: Ease::OutCubic,
        },
        targets: Targets::Cells(vec![CellCoord::new(0, 0)]),
    }
}

#[test]
fn active_window_is_half_open() {
    let e = pulse(2.0);
    let eps = 1e-6;
    assert!(!e.is_active(e.time - eps));
    assert!(e.is_active(e.time));
    assert!(e.is_active(e.time + e.duration / 2.0));
    assert!(e.is_active(e.time + e.duration - eps));
    assert!(!e.is_active(e.time + e.duration));
}

#[test]
fn progress_only_while_active() {
    let e = pulse(1.0);
    assert_eq!(e.progress(1.0), Some(0.0));
    assert!((e.progress(1.09).unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(e.progress(0.99), None);
    assert_eq!(e.progress(e.end()), None);
}

#[test]
fn targets_membership() {
    assert!(Targets::All.contains(CellCoord::new(7, 7)));
    assert!(Targets::Row(3).contains(CellCoord::new(3, 5)));
    assert!(!Targets::Row(3).contains(CellCoord::new(2, 5)));
    let cells = Targets::Cells(vec![CellCoord::new(1, 2)]);
    assert!(cells.contains(CellCoord::new(1, 2)));
    assert!(!cells.contains(CellCoord::new(2, 1)));
}

#[test]
fn active_at_uses_windows() {
    let list = EventList::new(vec![
        pulse(0.0),
        GraphicsEvent {
            time: 0.1,
            duration: 0.6,
            kind: EventKind::Wipe {
                direction: WipeDirection::LeftToRight,
            },
            targets: Targets::All,
        },
        pulse(0.5),
        pulse(1.0),
    ]);
    let names = |t: f64| -> Vec<f64> { list.active_at(t).map(|e| e.time).collect() };
    assert_eq!(names(0.0), vec![0.0]);
    assert_eq!(names(0.15), vec![0.0, 0.1]);
    assert_eq!(names(0.55), vec![0.1, 0.5]);
    assert_eq!(names(0.7), Vec::<f64>::new());
    assert_eq!(names(1.0), vec![1.0]);
}

#[test]
fn events_serialize_with_type_tag() {
    let json = serde_json::to_value(pulse(0.5)).unwrap();
    assert_eq!(json["type"], "pulse");
    assert_eq!(json["targetScale"], 1.6);
    assert_eq!(json["easing"], "outCubic");
    let back: GraphicsEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, pulse(0.5));

    let wipe = serde_json::to_value(EventKind::Wipe {
        direction: WipeDirection::TopToBottom,
    })
    .unwrap();
    assert_eq!(wipe["direction"], "tb");
}
