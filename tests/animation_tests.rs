//! Integration tests for Animation stepping

mod common;
use common::*;

use rgbww_animator::config::{HUE_WHEEL_MAX, MAX_VALUE};
use rgbww_animator::{
    AbsOrRelValue, Animation, AnimationType, CtrlChannel, HueDirection, RampTimeOrSpeed, Unit,
    ValueMode,
};

fn degrees(deg: f32) -> AbsOrRelValue {
    AbsOrRelValue::from_typed(ValueMode::Absolute, Unit::Hue, deg)
}

/// Runs `anim` to completion (bounded) and returns every emitted value
fn collect(anim: &mut Animation, source: &MockSource) -> heapless::Vec<i32, 4096> {
    let mut values = heapless::Vec::new();
    for _ in 0..4096 {
        let (value, finished) = anim.run(source);
        values.push(value).unwrap();
        if finished {
            break;
        }
    }
    values
}

#[test]
fn hue_half_turn_over_one_second_takes_fifty_ticks() {
    let source = MockSource::new(0);
    let mut anim = Animation::circular_hue(degrees(180.0), RampTimeOrSpeed::Time(1000), HueDirection::Shortest);

    for tick in 1..50 {
        let (_, finished) = anim.run(&source);
        assert!(!finished, "finished early on tick {}", tick);
    }
    let (value, finished) = anim.run(&source);
    assert!(finished);
    assert_eq!(value, HUE_WHEEL_MAX / 2);
    assert_eq!(anim.total_steps(), 50);
}

#[test]
fn transition_lands_exactly_on_final_value() {
    let cases = [
        (0, MAX_VALUE, 1000),
        (MAX_VALUE, 0, 1000),
        (100, 107, 2000),
        (900, 3, 60),
        (512, 513, 20),
        (0, MAX_VALUE, 40),
        (300, 299, 500),
    ];

    for (base, target, ms) in cases {
        let source = MockSource::new(base);
        let mut anim = Animation::transition(
            AbsOrRelValue::absolute(Unit::Raw, target),
            RampTimeOrSpeed::Time(ms),
            CtrlChannel::Val,
        );
        let values = collect(&mut anim, &source);

        assert_eq!(values.len() as u32, ms / 20, "{} -> {} over {} ms", base, target, ms);
        assert_eq!(*values.last().unwrap(), target);

        let (lo, hi) = (base.min(target), base.max(target));
        assert!(values.iter().all(|v| (lo..=hi).contains(v)));
        let monotonic = if target >= base {
            values.windows(2).all(|w| w[0] <= w[1])
        } else {
            values.windows(2).all(|w| w[0] >= w[1])
        };
        assert!(monotonic, "{} -> {} not monotonic", base, target);
    }
}

#[test]
fn shortest_hue_path_crosses_zero() {
    let from = degrees(350.0).value();
    let to = degrees(10.0).value();
    let source = MockSource::new(from);

    let mut anim = Animation::circular_hue(degrees(10.0), RampTimeOrSpeed::Time(1000), HueDirection::Shortest);
    let values = collect(&mut anim, &source);

    assert_eq!(*values.last().unwrap(), to);
    assert!(values.iter().all(|&v| v >= from || v <= to));
    assert!(values.iter().all(|&v| (0..HUE_WHEEL_MAX).contains(&v)));

    let mut travelled = wheel_distance(from, values[0]);
    travelled += values.windows(2).map(|w| wheel_distance(w[0], w[1])).sum::<i32>();
    // 20 degrees of the wheel
    assert_eq!(travelled, (HUE_WHEEL_MAX - from) + to);
}

#[test]
fn longest_hue_path_goes_the_other_way() {
    let from = degrees(350.0).value();
    let to = degrees(10.0).value();
    let source = MockSource::new(from);

    let mut anim = Animation::circular_hue(degrees(10.0), RampTimeOrSpeed::Time(1000), HueDirection::Longest);
    let values = collect(&mut anim, &source);

    assert_eq!(*values.last().unwrap(), to);
    assert!(values.iter().any(|&v| (2000..4000).contains(&v)));
    assert!(values.windows(2).all(|w| w[0] >= w[1]));

    let mut travelled = wheel_distance(from, values[0]);
    travelled += values.windows(2).map(|w| wheel_distance(w[0], w[1])).sum::<i32>();
    assert_eq!(travelled, from - to);
}

/// Runs `anim` until it finishes and returns the number of ticks taken
fn ticks_to_finish(anim: &mut Animation, source: &MockSource, limit: u32) -> u32 {
    for tick in 1..=limit {
        if anim.run(source).1 {
            return tick;
        }
    }
    panic!("not finished after {} ticks", limit);
}

#[test]
fn hue_speed_ramp_follows_the_chosen_arc() {
    let from = degrees(350.0).value();
    let source = MockSource::new(from);

    let mut shortest = Animation::circular_hue(degrees(10.0), RampTimeOrSpeed::Speed(10), HueDirection::Shortest);
    shortest.run(&source);
    assert_eq!(shortest.total_steps(), 6000);

    let mut longest = Animation::circular_hue(degrees(10.0), RampTimeOrSpeed::Speed(10), HueDirection::Longest);
    longest.run(&source);
    assert_eq!(longest.total_steps(), 102_000);

    shortest.reset();
    assert_eq!(ticks_to_finish(&mut shortest, &source, 10_000), 6000);
    assert_eq!(shortest.value(), degrees(10.0).value());

    longest.reset();
    assert_eq!(ticks_to_finish(&mut longest, &source, 200_000), 102_000);
    assert_eq!(longest.value(), degrees(10.0).value());
}

#[test]
fn relative_target_resolves_against_current_value() {
    let source = MockSource::new(500);
    let mut anim = Animation::transition(
        AbsOrRelValue::parse("-100", Unit::Raw).unwrap(),
        RampTimeOrSpeed::Time(200),
        CtrlChannel::Sat,
    );
    let values = collect(&mut anim, &source);
    assert_eq!(values.len(), 10);
    assert_eq!(*values.last().unwrap(), 400);
}

#[test]
fn raw_amount_on_hue_channel_wraps_the_wheel() {
    let source = MockSource::new(5000);
    let mut anim = Animation::set_and_stay(AbsOrRelValue::relative(Unit::Raw, 500), 0, CtrlChannel::Hue);
    assert_eq!(anim.run(&source), (5500, true));

    let source = MockSource::new(6000);
    let mut anim = Animation::transition(
        AbsOrRelValue::relative(Unit::Raw, 500),
        RampTimeOrSpeed::Time(100),
        CtrlChannel::Hue,
    );
    let values = collect(&mut anim, &source);
    assert_eq!(*values.last().unwrap(), 6500 - HUE_WHEEL_MAX);
}

#[test]
fn raw_amount_on_color_temp_is_not_capped_at_raw_max() {
    let source = MockSource::new(1000);
    let mut anim = Animation::transition(
        AbsOrRelValue::parse("+500", Unit::Raw).unwrap(),
        RampTimeOrSpeed::Time(200),
        CtrlChannel::ColorTemp,
    );
    let values = collect(&mut anim, &source);
    assert_eq!(values.len(), 10);
    assert_eq!(*values.last().unwrap(), 1500);
}

#[test]
fn explicit_start_ignores_current_value() {
    let source = MockSource::new(700);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, MAX_VALUE),
        RampTimeOrSpeed::Time(1000),
        CtrlChannel::Red,
    )
    .starting_at(AbsOrRelValue::absolute(Unit::Raw, 0));

    let values = collect(&mut anim, &source);
    assert!(values[0] < 50);
    assert_eq!(*values.last().unwrap(), MAX_VALUE);
}

#[test]
fn stay_holds_final_value_before_finishing() {
    let source = MockSource::new(0);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, 100),
        RampTimeOrSpeed::Time(100),
        CtrlChannel::Val,
    )
    .staying_for(100);

    let values = collect(&mut anim, &source);
    assert_eq!(values.len(), 10);
    assert!(values[4..].iter().all(|&v| v == 100));
    assert_eq!(anim.total_steps(), 10);
}

#[test]
fn speed_ramp_derives_steps_from_distance() {
    let source = MockSource::new(0);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, MAX_VALUE),
        RampTimeOrSpeed::Speed(100),
        CtrlChannel::Blue,
    );
    anim.run(&source);
    assert_eq!(anim.total_steps(), 3000);

    let source = MockSource::new(512);
    let mut half = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, MAX_VALUE),
        RampTimeOrSpeed::Speed(100),
        CtrlChannel::Blue,
    );
    half.run(&source);
    // 511 of 1023 at 100 %/min, rounded to the nearest tick
    assert_eq!(half.total_steps(), 1499);
}

#[test]
fn sub_tick_ramp_is_an_immediate_set() {
    let source = MockSource::new(10);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, 900),
        RampTimeOrSpeed::Time(0),
        CtrlChannel::Val,
    );
    assert_eq!(anim.run(&source), (900, true));
}

#[test]
fn zero_distance_transition_holds_value() {
    let source = MockSource::new(250);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, 250),
        RampTimeOrSpeed::Time(100),
        CtrlChannel::Val,
    );
    let values = collect(&mut anim, &source);
    assert_eq!(values.len(), 5);
    assert!(values.iter().all(|&v| v == 250));
}

#[test]
fn set_and_stay_with_zero_hold_finishes_immediately() {
    let source = MockSource::new(0);
    let mut anim = Animation::set_and_stay(AbsOrRelValue::absolute(Unit::Raw, 42), 0, CtrlChannel::Green);
    assert_eq!(anim.run(&source), (42, true));
    assert_eq!(anim.animation_type(), AnimationType::SetAndStay);
}

#[test]
fn blink_flips_and_restores_exactly() {
    let source = MockSource::new(300);
    let mut anim = Animation::blink(100, CtrlChannel::Val);

    for _ in 0..4 {
        assert_eq!(anim.run(&source), (MAX_VALUE, false));
    }
    assert_eq!(anim.run(&source), (300, true));
}

#[test]
fn blink_bright_channel_goes_dark() {
    let source = MockSource::new(900);
    let mut anim = Animation::blink(40, CtrlChannel::WarmWhite);
    assert_eq!(anim.run(&source), (0, false));
    assert_eq!(anim.run(&source), (900, true));
}

#[test]
fn hue_blink_jumps_half_the_wheel() {
    let source = MockSource::new(100);
    let mut anim = Animation::blink(40, CtrlChannel::Hue);
    assert_eq!(anim.run(&source), (100 + HUE_WHEEL_MAX / 2, false));
    assert_eq!(anim.run(&source), (100, true));
}

#[test]
fn reset_restarts_from_current_value() {
    let source = MockSource::new(0);
    let mut anim = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, 1000),
        RampTimeOrSpeed::Time(100),
        CtrlChannel::Val,
    );
    anim.run(&source);
    anim.run(&source);
    assert_eq!(anim.current_step(), 2);

    anim.reset();
    assert_eq!(anim.current_step(), 0);

    source.set(800);
    let (value, finished) = anim.run(&source);
    assert!(!finished);
    assert!((800..=1000).contains(&value));
}

#[test]
fn identity_is_kept() {
    let anim = Animation::circular_hue(degrees(90.0), RampTimeOrSpeed::Speed(10), HueDirection::Longest)
        .requeue(true)
        .named("sunrise");

    assert_eq!(anim.channel(), CtrlChannel::Hue);
    assert_eq!(anim.animation_type(), AnimationType::Transition);
    assert!(anim.should_requeue());
    assert_eq!(anim.name(), "sunrise");
    assert_eq!(anim.current_step(), 0);
}
