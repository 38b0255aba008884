use super::*;

#[test]
fn surface_size_rejects_zero() {
    assert!(SurfaceSize::new(0, 10).is_err());
    assert!(SurfaceSize::new(10, 0).is_err());
    let s = SurfaceSize::new(800, 600).unwrap();
    assert_eq!(s, SurfaceSize::default());
}

#[test]
fn rect_inset_and_contains() {
    let r = IRect::new(10, 20, 110, 70);
    assert_eq!(r.width(), 100);
    assert_eq!(r.height(), 50);

    let inner = r.inset(10);
    assert_eq!(inner, IRect::new(20, 30, 100, 60));
    assert!(inner.contains(20, 30));
    assert!(!inner.contains(100, 30));

    let collapsed = IRect::new(5, 5, 0, 0);
    assert_eq!(collapsed.width(), 0);
    assert_eq!(collapsed.height(), 0);
}
