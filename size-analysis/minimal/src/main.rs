#![no_std]
#![no_main]

use cortex_m_rt::entry;
use palette::Srgb;
use panic_halt as _;
use rgbww_animator::colors::{srgb_to_output, to_srgb};
use rgbww_animator::{
    AbsOrRelValue, AnimatedChannel, Animation, ChannelOutput, ChannelRequest, CtrlChannel,
    HsvctRequest, Hsvct, HueDirection, LedOutput, QueuePolicy, RampTimeOrSpeed, RequestOptions,
    RgbwwController, Unit,
};

// ============================================================================
// Minimal LED Implementation
// ============================================================================

/// Zero-size output stage for measuring library overhead
pub struct MinimalLed;

impl LedOutput for MinimalLed {
    fn write_hsv(&mut self, color: Hsvct) -> ChannelOutput {
        let rgb: Srgb = to_srgb(color);
        core::hint::black_box(srgb_to_output(rgb))
    }

    fn write_raw(&mut self, output: ChannelOutput) {
        core::hint::black_box(output);
    }
}

// ============================================================================
// Test Animations
// ============================================================================

// This function uses the library to prevent optimizer from removing code
#[inline(never)]
fn test_controller() {
    // Small queues to fit the stack of small targets
    let mut controller: RgbwwController<MinimalLed, (), 4> = RgbwwController::new(MinimalLed);

    let target = HsvctRequest::new()
        .hue(AbsOrRelValue::absolute(Unit::Hue, 3069))
        .sat(AbsOrRelValue::absolute(Unit::Raw, 1023))
        .val(AbsOrRelValue::relative(Unit::Raw, 200));
    let _ = controller.fade_hsv(
        target,
        RampTimeOrSpeed::Time(1000),
        HueDirection::Longest,
        RequestOptions::new().requeue(true),
    );
    let _ = controller.blink(&[CtrlChannel::Val], 500, RequestOptions::new().policy(QueuePolicy::Front));

    for _ in 0..100 {
        core::hint::black_box(controller.show());
    }

    let raw = ChannelRequest::new()
        .warm_white(AbsOrRelValue::absolute(Unit::Raw, 800))
        .cold_white(AbsOrRelValue::absolute(Unit::Raw, 100));
    let _ = controller.fade_raw(raw, RampTimeOrSpeed::Speed(50), RequestOptions::new());
    let _ = controller.set_raw(raw, 2000, RequestOptions::new().policy(QueuePolicy::Back));

    for _ in 0..100 {
        core::hint::black_box(controller.show());
    }

    controller.pause_animation();
    controller.skip_animation();
    controller.continue_animation();
    controller.refresh();
    core::hint::black_box(controller);
}

#[inline(never)]
fn test_channel() {
    let mut channel: AnimatedChannel<8> = AnimatedChannel::new();
    let source = Hsvct::default();

    let fade = Animation::transition(
        AbsOrRelValue::absolute(Unit::Raw, 512),
        RampTimeOrSpeed::Time(400),
        CtrlChannel::Sat,
    )
    .staying_for(200);
    let _ = channel.push_animation(fade, QueuePolicy::Back);
    let _ = channel.push_animation(
        Animation::set_and_stay(AbsOrRelValue::absolute(Unit::Raw, 0), 100, CtrlChannel::Sat),
        QueuePolicy::FrontReset,
    );

    for _ in 0..40 {
        core::hint::black_box(channel.process(&source, &mut ()));
    }
    core::hint::black_box(channel);
}

#[entry]
fn main() -> ! {
    // Call test functions to ensure all code is included
    test_controller();
    test_channel();

    // Halt - this is a size analysis binary, not meant to run
    loop {
        cortex_m::asm::nop();
    }
}
