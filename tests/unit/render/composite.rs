use super::*;
use crate::foundation::core::Rgba8Premul;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [200, 150, 100, 255];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([10, 20, 30, 255], [1, 2, 3, 255], 1.0), [1, 2, 3, 255]);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    assert_eq!(over([0, 0, 0, 0], [100, 50, 0, 200], 0.5), [50, 25, 0, 100]);
}

#[test]
fn over_at_clips_to_destination() {
    let mut dst = Surface::new(4, 4).unwrap();
    let src = Surface::filled(3, 3, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)).unwrap();
    over_at(&mut dst, &src, 2, -1, 1.0).unwrap();

    assert_eq!(dst.pixel(2, 0), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(3, 1), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(3, 2), Some([0, 0, 0, 0]));
    assert_eq!(dst.pixel(1, 0), Some([0, 0, 0, 0]));
}

#[test]
fn over_at_fully_outside_is_noop() {
    let mut dst = Surface::new(4, 4).unwrap();
    let before = dst.clone();
    let src = Surface::filled(2, 2, Rgba8Premul::from_straight_rgba(1, 1, 1, 255)).unwrap();
    over_at(&mut dst, &src, 10, 10, 1.0).unwrap();
    over_at(&mut dst, &src, -2, 0, 1.0).unwrap();
    assert_eq!(dst, before);
}

#[test]
fn round_corners_clears_corners_and_keeps_center() {
    let mut s = Surface::filled(20, 20, Rgba8Premul::from_straight_rgba(255, 255, 255, 255)).unwrap();
    round_corners(&mut s, 8.0);
    assert_eq!(s.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(s.pixel(19, 19).unwrap()[3], 0);
    assert_eq!(s.pixel(10, 10).unwrap()[3], 255);
    assert_eq!(s.pixel(10, 0).unwrap()[3], 255);
}
