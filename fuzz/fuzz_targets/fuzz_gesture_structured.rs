#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lmodal_core::{HitTarget, PointerEvent, PointerEventKind};
use lmodal_runtime::{Duration, Instant};
use lmodal_widgets::modal::{GestureEngine, GestureOutcome};

#[derive(Debug, Arbitrary)]
enum Step {
    Down { x: i16, y: i16, on_content: bool },
    Move { x: i16, y: i16 },
    Up { x: i16, y: i16 },
    Cancel,
    Wait(u16),
}

fuzz_target!(|steps: Vec<Step>| {
    let mut engine = GestureEngine::default();
    let mut now = Instant::now();
    let mut last = (0.0f32, 0.0f32);
    for step in steps {
        let event = match step {
            Step::Down { x, y, on_content } => {
                let target = if on_content { HitTarget::Content } else { HitTarget::Interactive };
                PointerEvent::new(PointerEventKind::Down, x.into(), y.into()).target(target)
            }
            Step::Move { x, y } => PointerEvent::new(PointerEventKind::Move, x.into(), y.into()),
            Step::Up { x, y } => PointerEvent::new(PointerEventKind::Up, x.into(), y.into()),
            Step::Cancel => PointerEvent::new(PointerEventKind::Cancel, last.0, last.1),
            Step::Wait(ms) => {
                now += Duration::from_millis(ms.into());
                continue;
            }
        };
        last = (event.position.x, event.position.y);
        match engine.handle(&event, now) {
            GestureOutcome::Feedback(feedback) => {
                assert!((0.0..=1.0).contains(&feedback.progress));
                assert!(feedback.content_opacity <= 1.0);
            }
            GestureOutcome::Dismiss { distance, .. } => {
                assert!(distance >= 0.0);
                assert!(!engine.is_active());
            }
            GestureOutcome::Settle | GestureOutcome::Discarded => assert!(!engine.is_active()),
            GestureOutcome::Ignored | GestureOutcome::Armed => {}
        }
    }
});
