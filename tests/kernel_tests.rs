use retro_frame::kernels::{FilterKind, KernelSet, UpscalerKind};

#[test]
fn unregistered_selector_falls_back_to_bypass() {
    // Only the mandatory bypass exists; every selector must still resolve.
    let set: KernelSet<UpscalerKind, &str> = KernelSet::new("bypass");
    for kind in UpscalerKind::ALL {
        assert_eq!(*set.resolve(*kind), "bypass");
    }
}

#[test]
fn registered_selector_resolves_to_its_kernel() {
    let mut set: KernelSet<FilterKind, &str> = KernelSet::new("bypass");
    set.register(FilterKind::Sepia, "sepia");
    set.register(FilterKind::Crt, "crt");
    assert_eq!(*set.resolve(FilterKind::Sepia), "sepia");
    assert_eq!(*set.resolve(FilterKind::Crt), "crt");
    // Unregistered kinds still fall back.
    assert_eq!(*set.resolve(FilterKind::Blur), "bypass");
    assert_eq!(*set.resolve(FilterKind::Bypass), "bypass");
}

#[test]
fn reregistering_replaces_the_kernel() {
    let mut set: KernelSet<FilterKind, &str> = KernelSet::new("bypass");
    set.register(FilterKind::Smooth, "old");
    set.register(FilterKind::Smooth, "new");
    assert_eq!(*set.resolve(FilterKind::Smooth), "new");
}

#[test]
fn selector_names_round_trip_through_yaml() {
    for kind in UpscalerKind::ALL {
        let parsed: UpscalerKind =
            serde_yaml::from_str(&format!("\"{kind}\"")).expect("known name parses");
        assert_eq!(parsed, *kind);
    }
    for kind in FilterKind::ALL {
        let parsed: FilterKind =
            serde_yaml::from_str(&format!("\"{kind}\"")).expect("known name parses");
        assert_eq!(parsed, *kind);
    }
    assert!(serde_yaml::from_str::<FilterKind>("\"vhs\"").is_err());
}
