//! Cross-module scenarios exercising the public dispersal API over full
//! simulated years.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sylva_dispersal::{
    DispersalSettings, DispersalTraits, ExternalSeeds, LandscapeGeometry, PropagationMode,
    SeedDispersal,
};
use sylva_grid::Rect;

fn traits() -> DispersalTraits {
    DispersalTraits {
        alpha1: 30.0,
        alpha2: 200.0,
        kappa: 0.2,
        fecundity_m2: 20.0,
        non_seed_year_fraction: 0.25,
        fecundity_serotiny: 0.0,
    }
}

fn geometry() -> LandscapeGeometry {
    LandscapeGeometry {
        extent: Rect::new(0.0, 0.0, 1200.0, 1200.0),
        buffer_cells: 5,
    }
}

fn dispersal(settings: DispersalSettings) -> SeedDispersal {
    SeedDispersal::new("piab", traits(), settings, &geometry(), ExternalSeeds::None).unwrap()
}

#[test]
fn non_seed_year_field_is_the_scaled_seed_year_field() {
    // LDD disabled (default thresholds) so the comparison is exact up to
    // float rounding.
    let run = |seed_year: bool| {
        let mut d = dispersal(DispersalSettings::default());
        d.start_year(seed_year);
        d.set_mature_tree((300, 300), 200.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        d.propagate(&mut rng).unwrap();
        d.seed_map().as_slice().to_vec()
    };

    let seed_year = run(true);
    let off_year = run(false);
    let q = traits().non_seed_year_fraction as f32;
    for (i, (&a, &b)) in seed_year.iter().zip(off_year.iter()).enumerate() {
        assert!(
            (b - a * q).abs() <= 1e-6,
            "cell {i}: off-year {b} != {q} * seed-year {a}"
        );
    }
}

#[test]
fn torus_mode_repeats_the_tile_pattern() {
    let settings = DispersalSettings {
        torus: true,
        ..DispersalSettings::default()
    };
    // Two sources at torus-equivalent positions one resource-unit apart.
    let run = |light: (i32, i32)| {
        let mut d = dispersal(settings.clone());
        d.start_year(true);
        d.set_mature_tree(light, 200.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        d.propagate(&mut rng).unwrap();
        d.seed_map().as_slice().to_vec()
    };

    // Light cell (300, 300) is seed cell (30, 30); one resource unit is 5
    // seed cells = 50 light cells.
    let base = run((300, 300));
    let shifted = run((350, 350));

    let cells_x = 60usize;
    let tile = 5usize;
    // The tile containing seed cell (30, 30) spans [30, 35) on both axes
    // (buffer 5 cells, so tile origins sit at 5 + 5k); the shifted run's
    // tile spans [35, 40).
    for y in 30..35usize {
        for x in 30..35usize {
            let a = base[y * cells_x + x];
            let b = shifted[(y + tile) * cells_x + (x + tile)];
            assert_eq!(a, b, "pattern differs at tile cell ({x}, {y})");
        }
    }
}

#[test]
fn probability_mode_stays_bounded_over_many_years() {
    let settings = DispersalSettings {
        mode: PropagationMode::Probability,
        ..DispersalSettings::default()
    };
    let mut d = dispersal(settings);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for year in 0..8 {
        d.start_year(year % 3 == 0);
        d.set_mature_tree((300, 300), 200.0).unwrap();
        d.set_mature_tree((420, 540), 150.0).unwrap();
        d.propagate(&mut rng).unwrap();
        assert!(
            d.seed_map().iter().all(|&v| (0.0..=1.0).contains(&v)),
            "year {year}: a cell left [0, 1]"
        );
    }
}

#[test]
fn background_probability_floors_the_field_each_year() {
    let mut d = SeedDispersal::new(
        "piab",
        traits(),
        DispersalSettings::default(),
        &geometry(),
        ExternalSeeds::Background(0.02),
    )
    .unwrap();

    for _ in 0..3 {
        d.start_year(true);
        assert!(
            d.seed_map().iter().all(|&v| v == 0.02),
            "year start must reset every cell to the background value"
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        d.propagate(&mut rng).unwrap();
    }
}

#[test]
fn growth_of_seed_shadow_tracks_the_source_count() {
    let mut d = dispersal(DispersalSettings::default());
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    d.start_year(true);
    d.set_mature_tree((300, 300), 200.0).unwrap();
    d.propagate(&mut rng).unwrap();
    let one_tree = d.occupied_cells();

    d.start_year(true);
    d.set_mature_tree((300, 300), 200.0).unwrap();
    d.set_mature_tree((480, 480), 200.0).unwrap();
    d.propagate(&mut rng).unwrap();
    let two_trees = d.occupied_cells();

    assert!(one_tree > 0);
    assert!(two_trees > one_tree, "a second distant source widens the shadow");
}
