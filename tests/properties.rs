use proptest::prelude::*;

use chain_planner::rate::compute_rates;
use chain_planner::{Planner, Recipe, RecipeCatalog, Target};

/// Linear chain P0 <- P1 <- ... <- P{depth}, with P{depth} made from raw Ore
fn linear_catalog(depth: usize, times: &[f64], qtys: &[f64]) -> RecipeCatalog {
    let recipes = (0..=depth)
        .map(|level| {
            let input = if level == depth {
                "Ore".to_string()
            } else {
                format!("P{}", level + 1)
            };
            Recipe::new(format!("r{}", level), "Assembler", times[level % times.len()])
                .with_input(input, qtys[level % qtys.len()])
                .with_output(format!("P{}", level), 1.0)
        })
        .collect();
    RecipeCatalog::from_recipes(recipes).unwrap()
}

proptest! {
    #[test]
    fn target_output_matches_requested_rate(
        time_sec in 0.1f64..120.0,
        out_qty in 0.1f64..50.0,
        side_qty in 0.0f64..10.0,
        rate in 0.01f64..10_000.0,
    ) {
        let recipe = Recipe::new("r", "Mixer", time_sec)
            .with_input("Water", 3.0)
            .with_output("Slurry", side_qty)
            .with_output("Paste", out_qty);
        let rates = compute_rates(&recipe, "paste", rate);

        let flagged: Vec<_> = rates.outputs.iter().filter(|o| o.is_target).collect();
        prop_assert_eq!(flagged.len(), 1);
        prop_assert!((flagged[0].rate_per_min - rate).abs() <= 1e-9 * rate.max(1.0));
    }

    #[test]
    fn build_is_idempotent(
        depth in 1usize..8,
        hops in 0u32..10,
        rate in 0.5f64..500.0,
    ) {
        let catalog = linear_catalog(depth, &[1.0, 2.5, 4.0], &[1.0, 2.0, 3.0]);
        let mut planner = Planner::new(&catalog);
        planner.set_target(Target::new("P0", rate).unwrap()).unwrap();
        if hops > 0 {
            planner.expand_branch_by("P0::r0", hops);
        }

        let first = serde_json::to_string(planner.snapshot()).unwrap();
        let second = serde_json::to_string(planner.build()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn expand_by_is_never_shallower_than_repeated_expand_once(
        depth in 1usize..10,
        hops in 1u32..6,
        start in 0usize..3,
    ) {
        let catalog = linear_catalog(depth, &[2.0], &[1.0]);
        let node = format!("P{}::r{}", start.min(1), start.min(1));

        let mut by = Planner::new(&catalog);
        by.set_target(Target::new("P0", 60.0).unwrap()).unwrap();
        let deep = by.expand_branch_by(&node, hops).max_depth();

        let mut once = Planner::new(&catalog);
        once.set_target(Target::new("P0", 60.0).unwrap()).unwrap();
        for _ in 0..hops {
            once.expand_node_once(&node);
        }
        prop_assert!(deep >= once.snapshot().max_depth());
    }
}
