use matforge_animation_core::{AnimValue, Animation, AnimationBase, KeyframeTrack, TrackKind};
use matforge_params_core::ParameterType;

fn float_track(keys: &[(i32, f32)]) -> KeyframeTrack {
    let mut t = KeyframeTrack::new(TrackKind::Float);
    for (frame, v) in keys {
        t.set_value_at(*frame, &AnimValue::Float(*v)).unwrap();
    }
    t
}

#[test]
fn interpolation_clamps_at_both_ends() {
    let t = float_track(&[(10, 0.0), (20, 10.0)]);
    assert_eq!(t.value_at(15), Some(AnimValue::Float(5.0)));
    assert_eq!(t.value_at(5), Some(AnimValue::Float(0.0)));
    assert_eq!(t.value_at(25), Some(AnimValue::Float(10.0)));
    assert_eq!(t.value_at(10), Some(AnimValue::Float(0.0)));
    assert_eq!(t.value_at(20), Some(AnimValue::Float(10.0)));
}

#[test]
fn keys_at_the_ends_of_the_frame_range_interpolate() {
    let t = float_track(&[(i32::MIN, 0.0), (i32::MAX, 1.0)]);
    assert_eq!(t.value_at(0), Some(AnimValue::Float(0.5)));
    assert_eq!(t.value_at(i32::MIN), Some(AnimValue::Float(0.0)));
    assert_eq!(t.value_at(i32::MAX), Some(AnimValue::Float(1.0)));

    let mut out = [0u8; 4];
    assert!(t.sample_into(0, &mut out));
    assert_eq!(f32::from_le_bytes(out), 0.5);

    let b = t.locate(i32::MAX - 1).unwrap();
    assert_eq!((b.previous_index, b.next_index), (0, 1));
    assert!(b.ratio > 0.99 && b.ratio <= 1.0);
}

#[test]
fn single_key_tracks_are_constant() {
    let t = float_track(&[(3, 2.5)]);
    for frame in [-100, 0, 3, 1000] {
        assert_eq!(t.value_at(frame), Some(AnimValue::Float(2.5)));
    }
}

/// Deterministic shuffle of 0..n with duplicates mixed in.
fn scrambled_frames(n: i32) -> Vec<i32> {
    let mut state = 0x2545_f491u32;
    let mut out = Vec::new();
    for _ in 0..(n * 2) {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        out.push((state % n as u32) as i32 - n / 2);
    }
    out
}

#[test]
fn arbitrary_insertion_order_keeps_frames_sorted_and_unique() {
    let frames = scrambled_frames(64);
    let mut t = Animation::<[f32; 2]>::new();
    for (i, f) in frames.iter().enumerate() {
        t.set_value_at(*f, [i as f32, *f as f32]);
    }
    assert!(t.frames().windows(2).all(|w| w[0] < w[1]));
    let mut distinct = frames.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(t.len(), distinct.len());
    assert_eq!(t.values().len(), t.frames().len());
    assert_eq!(t.frames(), distinct.as_slice());
}

#[test]
fn keying_the_same_value_twice_is_idempotent() {
    let mut once = float_track(&[(0, 1.0), (8, 2.0)]);
    once.set_value_at(4, &AnimValue::Float(7.0)).unwrap();
    let mut twice = once.clone();
    twice.set_value_at(4, &AnimValue::Float(7.0)).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.raw_bytes(), twice.raw_bytes());
}

#[test]
fn equality_ignores_insertion_order() {
    let pairs: [(i32, f32); 4] = [(4, 1.0), (-2, 3.0), (9, 0.5), (0, 2.0)];
    let forward = float_track(&pairs);
    let mut reversed_pairs = pairs;
    reversed_pairs.reverse();
    let backward = float_track(&reversed_pairs);
    assert_eq!(forward, backward);
}

#[test]
fn a_single_differing_byte_breaks_equality() {
    let a = float_track(&[(0, 1.0), (5, 2.0)]);
    let mut bytes = a.raw_bytes().to_vec();
    bytes[5] ^= 0x01;
    let b = KeyframeTrack::from_raw_parts(TrackKind::Float, a.frames().to_vec(), &bytes).unwrap();
    assert_ne!(a, b);
    assert_eq!(a.frames(), b.frames());
}

#[test]
fn tracks_of_different_kinds_never_compare_equal() {
    let a = KeyframeTrack::for_parameter(ParameterType::Int).unwrap();
    let b = KeyframeTrack::for_parameter(ParameterType::Float).unwrap();
    assert_ne!(a, b);
}

#[test]
fn angle_tracks_interpolate_in_stored_units() {
    let mut t = KeyframeTrack::for_parameter(ParameterType::Angle).unwrap();
    let quarter = std::f32::consts::FRAC_PI_2;
    t.set_value_at(0, &AnimValue::Float(0.0)).unwrap();
    t.set_value_at(10, &AnimValue::Float(quarter)).unwrap();
    let Some(AnimValue::Float(mid)) = t.value_at(5) else {
        panic!("expected a float sample");
    };
    let degrees = ParameterType::Angle.to_display(mid);
    assert!((degrees - 45.0).abs() < 1e-4, "{degrees}");
}

#[test]
fn removing_keys_shrinks_both_sequences() {
    let mut t = float_track(&[(0, 1.0), (5, 2.0), (9, 3.0)]);
    t.remove_key(1).unwrap();
    assert_eq!(t.frames(), &[0, 9]);
    assert_eq!(t.byte_length(), 8);
    assert!(t.remove_key(2).is_err());
    assert_eq!(t.frame_range(), Some((0, 9)));
}
