use std::f64::consts::PI;

use azicorr::analysis::centrality::{class_label, rmax, CentralityClassifier};
use azicorr::core::domain::{CatalogMode, CentralityPolicy};
use azicorr::core::kinematics::WrapWindow;
use azicorr::core::species::{PairIndex, SpeciesCatalog, SpeciesPairKey};

#[test]
fn test_pair_key_is_canonical() {
    for &(a, b) in &[(211, -211), (321, 2212), (-3122, 3122), (5, 5), (-1, 3)] {
        assert_eq!(SpeciesPairKey::new(a, b), SpeciesPairKey::new(b, a));
    }
    let key = SpeciesPairKey::new(211, -211);
    assert_eq!(key.lo, -211);
    assert_eq!(key.hi, 211);
}

#[test]
fn test_catalog_sizes() {
    assert_eq!(SpeciesCatalog::new(CatalogMode::Hadron).len(), 11);
    assert_eq!(SpeciesCatalog::new(CatalogMode::Parton).len(), 6);
}

#[test]
fn test_pair_index_declaration_order() {
    let catalog = SpeciesCatalog::new(CatalogMode::Hadron);
    let pairs = PairIndex::new(&catalog);

    assert_eq!(pairs.n_pairs(), 11 * 12 / 2);

    // Bins follow the nested (i, j >= i) iteration over the declared list.
    assert_eq!(pairs.bin_of(211, 211), Some(1));
    assert_eq!(pairs.bin_of(211, -211), Some(2));
    assert_eq!(pairs.bin_of(211, 321), Some(3));
    assert_eq!(pairs.label(1), "pipos-pipos");
    assert_eq!(pairs.label(2), "pipos-pineg");
    assert_eq!(pairs.label(3), "pipos-Kpos");

    // Lookup is order-independent.
    assert_eq!(pairs.bin_of(321, 211), pairs.bin_of(211, 321));
    assert_eq!(pairs.bin_of(-3122, 3122), pairs.bin_of(3122, -3122));

    // Uncataloged codes have no bin.
    assert_eq!(pairs.bin_of(999, 211), None);
    assert_eq!(pairs.bin_of(211, 999), None);
}

#[test]
fn test_pair_index_key_lookup_matches() {
    let catalog = SpeciesCatalog::new(CatalogMode::Parton);
    let pairs = PairIndex::new(&catalog);

    assert_eq!(pairs.n_pairs(), 6 * 7 / 2);
    for bin in 1..=pairs.n_pairs() {
        let key = pairs.key(bin);
        assert_eq!(pairs.bin_of_key(key), Some(bin));
        assert_eq!(pairs.bin_of(key.lo, key.hi), Some(bin));
    }
}

#[test]
fn test_centrality_boundaries() {
    let strict = CentralityClassifier::new(CentralityPolicy::Strict);
    let saturating = CentralityClassifier::new(CentralityPolicy::Saturating);

    assert_eq!(strict.classify(0.0), Some(0));
    assert_eq!(saturating.classify(0.0), Some(0));

    // Just inside / beyond the outermost percentile edge.
    let edge = rmax(10);
    assert_eq!(strict.classify(edge), Some(9));
    assert_eq!(strict.classify(edge + 1e-6), None);
    assert_eq!(saturating.classify(edge + 1e-6), Some(9));
    assert_eq!(saturating.classify(50.0), Some(9));
}

#[test]
fn test_centrality_mid_range() {
    let strict = CentralityClassifier::new(CentralityPolicy::Strict);
    assert_eq!(strict.classify(5.0), Some(1));
    assert_eq!(strict.classify(8.0), Some(3));
    assert!(rmax(1) > 4.4 && rmax(1) < 4.5);
}

#[test]
fn test_class_labels() {
    assert_eq!(class_label(0), "cent0010");
    assert_eq!(class_label(3), "cent3040");
    assert_eq!(class_label(6), "cent6070");
}

#[test]
fn test_wrap_containment_and_idempotence() {
    let windows = [WrapWindow::symmetric(), WrapWindow::shifted()];
    let samples = [-9.7, -PI, -0.1, 0.0, 1.0, PI, 4.9, 12.3, 100.0];

    for w in windows {
        for &x in &samples {
            let wrapped = w.wrap(x);
            assert!(wrapped >= w.lo && wrapped < w.hi(), "{wrapped} outside window");
            assert!((w.wrap(wrapped) - wrapped).abs() < 1e-12);
            // Reduction preserves the angle modulo 2pi.
            let cycles = (x - wrapped) / (2.0 * PI);
            assert!((cycles - cycles.round()).abs() < 1e-9);
        }
    }
}

#[test]
fn test_wrap_windows_differ() {
    let sym = WrapWindow::symmetric();
    let shifted = WrapWindow::shifted();

    // pi is out of the symmetric half-open window but inside the shifted one.
    assert!((sym.wrap(PI) + PI).abs() < 1e-12);
    assert!((shifted.wrap(PI) - PI).abs() < 1e-12);
}
