use ringmod::{
    CaptureConstraints, CarrierInput, ContextState, Error, OfflineBackend, RingMod, RingModConfig, TransportState,
};
use rtrb::Producer;

const SR: usize = 48_000;

fn effect(config: &RingModConfig) -> (Producer<f32>, RingMod<OfflineBackend>) {
    let (producer, carrier) = CarrierInput::channel(4 * SR);
    let fx = RingMod::offline(config, carrier).unwrap();
    (producer, fx)
}

/// Feed `len` samples of a constant carrier, then pull `len` samples out.
///
/// With a DC carrier of 1.0 the output is the modulator scaled by depth and level.
fn run(fx: &mut RingMod<OfflineBackend>, carrier: &mut Producer<f32>, len: usize) -> Vec<f32> {
    for _ in 0..len {
        carrier.push(1.0).unwrap();
    }
    let mut out = vec![0.0; len];
    fx.render(&mut out);
    out
}

fn upward_crossings(samples: &[f32]) -> usize {
    samples.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn starts_suspended_with_default_parameters() {
    let (_carrier, fx) = effect(&RingModConfig::default());

    assert_eq!(fx.transport_state(), TransportState::Off);
    assert_eq!(fx.state(), ContextState::Suspended);
    assert!(!fx.is_audible());
    assert_eq!(fx.rate_label(), "5.0 Hz");
    assert_eq!(fx.level_label(), "0 dBFS");
    assert_eq!(fx.depth(), 0.0);
    assert_eq!(fx.current_time(), 0.0);
}

#[test]
fn nothing_is_rendered_before_the_first_toggle() {
    let config = RingModConfig::default().with_depth(1.0);
    let (mut carrier, mut fx) = effect(&config);

    fx.on_rate_change(20.0).unwrap();
    fx.on_output_level_change(-6.0).unwrap();

    for _ in 0..1024 {
        carrier.push(1.0).unwrap();
    }
    let mut out = vec![1.0; 1024];
    assert!(!fx.render(&mut out));
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(fx.current_time(), 0.0);
    // the capture isn't drained while suspended
    assert_eq!(carrier.slots(), 4 * SR - 1024);
}

#[test]
fn default_depth_is_silent_while_running() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default());
    assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::On);
    assert!(fx.is_audible());

    let out = run(&mut fx, &mut carrier, 4096);
    assert_eq!(peak(&out), 0.0);
}

#[test]
fn full_depth_modulates_at_the_default_rate() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));
    fx.on_transport_toggle().unwrap();

    let out = run(&mut fx, &mut carrier, SR);
    let crossings = upward_crossings(&out);
    assert!((4..=6).contains(&crossings), "{crossings} crossings at 5 Hz");
    assert!(peak(&out) > 0.99);
    assert!(peak(&out) <= 1.0);
}

#[test]
fn rate_change_converges_to_the_new_rate() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));
    fx.on_transport_toggle().unwrap();
    run(&mut fx, &mut carrier, 480);

    assert_eq!(fx.on_rate_change(12.0).unwrap(), 12.0);
    assert_eq!(fx.rate_label(), "12.0 Hz");

    // ramp completes 10ms after the change
    run(&mut fx, &mut carrier, 960);
    let out = run(&mut fx, &mut carrier, SR);
    let crossings = upward_crossings(&out);
    assert!((11..=13).contains(&crossings), "{crossings} crossings at 12 Hz");
}

#[test]
fn later_rate_change_supersedes_an_earlier_one() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));
    fx.on_transport_toggle().unwrap();

    fx.on_rate_change(40.0).unwrap();
    fx.on_rate_change(12.0).unwrap();
    run(&mut fx, &mut carrier, 960);

    let out = run(&mut fx, &mut carrier, SR);
    let crossings = upward_crossings(&out);
    assert!((11..=13).contains(&crossings), "{crossings} crossings, expected 12 Hz");
}

#[test]
fn output_level_ramps_to_minus_20_dbfs() {
    let config = RingModConfig::default().with_depth(1.0);
    let (mut ref_carrier, mut reference) = effect(&config);
    let (mut carrier, mut fx) = effect(&config);

    assert_eq!(fx.on_output_level_change(-20.0).unwrap(), -20.0);
    assert_eq!(fx.level_label(), "-20 dBFS");

    reference.on_transport_toggle().unwrap();
    fx.on_transport_toggle().unwrap();
    let expected = run(&mut reference, &mut ref_carrier, 4800);
    let out = run(&mut fx, &mut carrier, 4800);

    let ratio = |i: usize| out[i] / expected[i];

    // halfway through the 10ms ramp
    assert!((ratio(240) - 0.55).abs() < 0.01, "ratio {}", ratio(240));

    // settled afterwards
    for i in 480..4800 {
        if expected[i].abs() > 0.01 {
            assert!((ratio(i) - 0.1).abs() < 1e-4, "ratio {} at {i}", ratio(i));
        }
    }
}

#[test]
fn toggling_off_and_on_keeps_parameters() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));

    fx.on_transport_toggle().unwrap();
    fx.on_rate_change(12.0).unwrap();
    fx.on_output_level_change(-20.0).unwrap();
    run(&mut fx, &mut carrier, 1024);

    assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::Off);
    assert!(!fx.is_audible());
    let frozen = fx.current_time();
    let mut out = vec![1.0; 512];
    assert!(!fx.render(&mut out));
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(fx.current_time(), frozen);

    assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::On);
    assert_eq!(fx.rate_label(), "12.0 Hz");
    assert_eq!(fx.level_label(), "-20 dBFS");

    let out = run(&mut fx, &mut carrier, SR);
    let p = peak(&out);
    assert!((p - 0.1).abs() < 1e-3, "peak {p}");
}

#[test]
fn toggle_pairs_between_blocks_do_not_disturb_audio() {
    let config = RingModConfig::default().with_depth(1.0);
    let (mut ref_carrier, mut reference) = effect(&config);
    let (mut carrier, mut fx) = effect(&config);

    for m in [&mut reference, &mut fx] {
        m.on_transport_toggle().unwrap();
        m.on_rate_change(12.0).unwrap();
        m.on_output_level_change(-20.0).unwrap();
    }

    let mut expected = run(&mut reference, &mut ref_carrier, 256);
    let mut out = run(&mut fx, &mut carrier, 256);

    // ramps are mid-flight; off and on again before the next block
    let time = fx.current_time();
    for _ in 0..2 {
        assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::Off);
        assert_eq!(fx.current_time(), time);
        assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::On);
    }
    assert_eq!(fx.current_time(), time);

    expected.extend(run(&mut reference, &mut ref_carrier, 2048));
    out.extend(run(&mut fx, &mut carrier, 2048));
    assert_eq!(out, expected);
}

#[test]
fn failed_toggle_keeps_state() {
    let (mut carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));
    fx.backend_mut().set_available(false);

    assert!(matches!(fx.on_transport_toggle(), Err(Error::DeviceUnavailable(_))));
    assert_eq!(fx.transport_state(), TransportState::Off);
    assert!(!fx.is_audible());

    fx.backend_mut().set_available(true);
    assert_eq!(fx.on_transport_toggle().unwrap(), TransportState::On);
    assert!(peak(&run(&mut fx, &mut carrier, SR / 4)) > 0.5);

    fx.backend_mut().set_available(false);
    assert!(fx.on_transport_toggle().is_err());
    assert_eq!(fx.transport_state(), TransportState::On);
    assert!(fx.is_audible());
}

#[test]
fn invalid_input_is_clamped_or_ignored() {
    let (_carrier, mut fx) = effect(&RingModConfig::default());

    assert_eq!(fx.on_rate_change(f32::NAN).unwrap(), 5.0);
    assert_eq!(fx.on_rate_change(-3.0).unwrap(), 0.0);
    assert_eq!(fx.on_rate_change(1000.0).unwrap(), 100.0);
    assert_eq!(fx.on_depth_change(2.0).unwrap(), 1.0);
    assert_eq!(fx.on_output_level_change(10.0).unwrap(), 0.0);
    assert_eq!(fx.on_output_level_change(-100.0).unwrap(), -60.0);
    assert_eq!(fx.on_output_level_change(f32::NAN).unwrap(), -60.0);
}

#[test]
fn missing_carrier_samples_are_silent_and_counted() {
    let (_carrier, mut fx) = effect(&RingModConfig::default().with_depth(1.0));
    fx.on_transport_toggle().unwrap();

    let mut out = vec![1.0; 256];
    assert!(fx.render(&mut out));
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(fx.carrier_dropouts(), 256);
}

#[test]
fn processed_capture_is_rejected() {
    let (_producer, carrier) = CarrierInput::channel(64);
    let config = RingModConfig::default().with_capture(CaptureConstraints {
        echo_cancellation: true,
        ..CaptureConstraints::RAW
    });
    assert!(matches!(
        RingMod::offline(&config, carrier),
        Err(Error::CaptureProcessing(_))
    ));
}

#[test]
fn inverted_level_range_is_rejected() {
    let (_producer, carrier) = CarrierInput::channel(64);
    let config = RingModConfig::default().with_output_range(0.0, -60.0);
    assert!(matches!(
        RingMod::offline(&config, carrier),
        Err(Error::InvalidConfig(_))
    ));
}
