use retro_frame::geometry::{CameraPose, Transforms, VisibleRegion};
use retro_frame::source::TimingStandard;

#[test]
fn pal_region_is_the_expected_fixed_rectangle() {
    // 36 px horizontal / 34 px vertical of border kept visible around the
    // 320x200 canvas, normalized against the 512x512 backing store.
    let region = VisibleRegion::for_standard(TimingStandard::Pal);
    assert_eq!(region.x, 12.0 / 512.0);
    assert_eq!(region.y, 8.0 / 512.0);
    assert_eq!(region.width, 392.0 / 512.0);
    assert_eq!(region.height, 268.0 / 512.0);
}

#[test]
fn ntsc_region_is_the_expected_fixed_rectangle() {
    let region = VisibleRegion::for_standard(TimingStandard::Ntsc);
    assert_eq!(region.x, 7.0 / 512.0);
    assert_eq!(region.y, 5.0 / 512.0);
    assert_eq!(region.width, 404.0 / 512.0);
    assert_eq!(region.height, 218.0 / 512.0);
}

#[test]
fn regions_are_reproducible_bit_for_bit() {
    for standard in [TimingStandard::Pal, TimingStandard::Ntsc] {
        let a = VisibleRegion::for_standard(standard);
        let b = VisibleRegion::for_standard(standard);
        assert_eq!(a, b);
    }
}

#[test]
fn regions_stay_inside_the_unit_square() {
    for standard in [TimingStandard::Pal, TimingStandard::Ntsc] {
        let region = VisibleRegion::for_standard(standard);
        assert!(region.x >= 0.0 && region.y >= 0.0);
        assert!(region.max_x() <= 1.0, "{standard}: max_x {}", region.max_x());
        assert!(region.max_y() <= 1.0, "{standard}: max_y {}", region.max_y());
    }
}

#[test]
fn pal_border_is_wider_and_taller_than_ntsc() {
    let pal = VisibleRegion::for_standard(TimingStandard::Pal);
    let ntsc = VisibleRegion::for_standard(TimingStandard::Ntsc);
    assert!(pal.height > ntsc.height);
    assert!(pal.width < ntsc.width);
    assert!(pal.aspect() < ntsc.aspect());
}

#[test]
fn transforms_are_finite_for_degenerate_drawable_sizes() {
    let pose = CameraPose::default();
    for (w, h) in [(0, 0), (1, 1), (1920, 1080)] {
        let t = Transforms::build(w, h, &pose);
        for m in [t.flat_2d, t.cuboid, t.background] {
            assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn flat_mode_uses_an_identity_transform() {
    let t = Transforms::build(800, 600, &CameraPose::default());
    assert_eq!(t.flat_2d, glam::Mat4::IDENTITY);
}
