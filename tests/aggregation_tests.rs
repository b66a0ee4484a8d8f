use chrono::NaiveDate;
use fraction::Fraction;
use std::collections::HashMap;

use pantry_list::aggregator::aggregate;
use pantry_list::errors::{Result, ShoppingError};
use pantry_list::ingredient_model::{
    AggregatedEntry, IngredientLine, Recipe, RecipeId, ScheduledServing,
};
use pantry_list::unit_table::{self, Dimension};

fn frac(n: u64, d: u64) -> Fraction {
    Fraction::new(n, d)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn aggregate_with(recipes: &[Recipe], scheduled: &[ScheduledServing]) -> Result<Vec<AggregatedEntry>> {
    let by_id: HashMap<RecipeId, Recipe> = recipes.iter().map(|r| (r.id, r.clone())).collect();
    aggregate(scheduled, |id| by_id.get(&id))
}

fn find<'a>(entries: &'a [AggregatedEntry], name: &str) -> Vec<&'a AggregatedEntry> {
    entries.iter().filter(|e| e.ingredient_name == name).collect()
}

fn weekly_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new(1, "Pancakes")
            .with_base_servings(4)
            .with_ingredient("1 cup flour")
            .with_ingredient("2 eggs")
            .with_ingredient("1 1/4 cups milk")
            .with_ingredient("1 pinch salt"),
        Recipe::new(2, "Roux")
            .with_base_servings(2)
            .with_ingredient("8 tbsp flour")
            .with_ingredient("4 tbsp butter")
            .with_ingredient("salt to taste"),
        Recipe::new(3, "Tacos")
            .with_base_servings(4)
            .with_ingredient("8 flour tortillas")
            .with_ingredient("500 g ground beef")
            .with_line(
                IngredientLine::new("1 can black beans", "black beans")
                    .with_amount(frac(1, 1), Some("can")),
            ),
    ]
}

#[test]
fn test_cup_plus_tablespoons_is_one_and_a_half_cups() {
    let recipes = vec![
        Recipe::new(1, "A").with_ingredient("1 cup flour"),
        Recipe::new(2, "B").with_ingredient("8 tbsp flour"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 1),
        ScheduledServing::new(2, date(5), 1),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ingredient_name, "flour");
    assert_eq!(entries[0].total_amount, Some(frac(3, 2)));
    assert_eq!(entries[0].unit.as_deref(), Some("cup"));
    assert_eq!(entries[0].display_amount().as_deref(), Some("1 1/2"));
}

#[test]
fn test_flour_and_flour_tortillas_are_separate() {
    let recipes = vec![
        Recipe::new(1, "Bread").with_ingredient("2 cups flour"),
        Recipe::new(2, "Tacos").with_ingredient("8 flour tortillas"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 1),
        ScheduledServing::new(2, date(4), 1),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.ingredient_name.as_str()).collect();
    assert_eq!(names, vec!["flour", "flour tortillas"]);
}

#[test]
fn test_salt_to_taste_twice_is_one_unspecified_entry() {
    let recipes = vec![
        Recipe::new(1, "Soup").with_ingredient("Salt to taste"),
        Recipe::new(2, "Stew").with_ingredient("salt, to taste"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 2),
        ScheduledServing::new(2, date(5), 3),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].ingredient_name, "salt");
    assert_eq!(entries[0].total_amount, None);
    assert_eq!(entries[0].recipe_count(), 2);
    assert_eq!(entries[0].contributing_recipe_ids.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_unspecified_entry_follows_quantified_entry() {
    let recipes = vec![
        Recipe::new(1, "Soup").with_ingredient("1 tsp salt"),
        Recipe::new(2, "Stew").with_ingredient("salt to taste"),
        Recipe::new(3, "Salad").with_ingredient("2 tbsp olive oil"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 1),
        ScheduledServing::new(2, date(4), 1),
        ScheduledServing::new(3, date(4), 1),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].ingredient_name, "olive oil");
    assert_eq!(entries[1].ingredient_name, "salt");
    assert_eq!(entries[1].total_amount, Some(frac(1, 1)));
    assert_eq!(entries[2].ingredient_name, "salt");
    assert_eq!(entries[2].total_amount, None);
}

#[test]
fn test_scaling_is_linear() {
    let recipes = weekly_recipes();
    let once: Vec<ScheduledServing> = recipes
        .iter()
        .map(|r| ScheduledServing::new(r.id, date(4), 2))
        .collect();
    let twice: Vec<ScheduledServing> = recipes
        .iter()
        .map(|r| ScheduledServing::new(r.id, date(4), 4))
        .collect();

    let single = aggregate_with(&recipes, &once).unwrap();
    let double = aggregate_with(&recipes, &twice).unwrap();
    assert_eq!(single.len(), double.len());

    for (a, b) in single.iter().zip(&double) {
        assert_eq!(a.ingredient_name, b.ingredient_name);
        assert_eq!(a.contributing_recipe_ids, b.contributing_recipe_ids);

        match (a.total_amount, b.total_amount, a.unit.as_deref(), b.unit.as_deref()) {
            (Some(x), Some(y), Some(ux), Some(uy)) if unit_table::lookup(ux).is_some() => {
                let x = unit_table::convert(x, ux, uy).unwrap();
                assert_eq!(x * frac(2, 1), y, "{}", a.ingredient_name);
            }
            (None, None, _, _) => {}
            other => panic!("mismatched entries for {}: {other:?}", a.ingredient_name),
        }
    }
}

#[test]
fn test_aggregation_is_idempotent() {
    let recipes = weekly_recipes();
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 4),
        ScheduledServing::new(2, date(5), 2),
        ScheduledServing::new(3, date(6), 6),
        ScheduledServing::new(1, date(7), 2),
    ];

    let first = aggregate_with(&recipes, &scheduled).unwrap();
    let second = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_weekly_plan_totals() {
    let recipes = weekly_recipes();
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 4),
        ScheduledServing::new(2, date(5), 2),
        ScheduledServing::new(3, date(6), 6),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();

    let flour = find(&entries, "flour");
    assert_eq!(flour.len(), 1);
    assert_eq!(flour[0].total_amount, Some(frac(3, 2)));
    assert_eq!(flour[0].unit.as_deref(), Some("cup"));

    let tortillas = find(&entries, "flour tortillas");
    assert_eq!(tortillas[0].total_amount, Some(frac(12, 1)));
    assert_eq!(tortillas[0].unit.as_deref(), Some("each"));

    let beef = find(&entries, "ground beef");
    assert_eq!(beef[0].unit.as_deref(), Some("lb"));
    assert_eq!(
        beef[0].total_amount,
        Some(unit_table::convert(frac(750, 1), "g", "lb").unwrap())
    );

    let beans = find(&entries, "black beans");
    assert_eq!(beans[0].total_amount, None);
    assert_eq!(beans[0].unit.as_deref(), Some("can"));
    assert_eq!(beans[0].annotations, vec!["1 1/2 can".to_string()]);

    let salt = find(&entries, "salt");
    assert_eq!(salt.len(), 1);
    assert_eq!(salt[0].recipe_count(), 2);

    let sorted: Vec<&str> = entries.iter().map(|e| e.ingredient_name.as_str()).collect();
    let mut expected = sorted.clone();
    expected.sort();
    assert_eq!(sorted, expected);
}

#[test]
fn test_milliliters_present_in_the_largest_whole_unit() {
    let recipes = vec![
        Recipe::new(1, "Custard").with_ingredient("480 ml milk"),
        Recipe::new(2, "Stock").with_ingredient("750 ml water"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 1),
        ScheduledServing::new(2, date(4), 2),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();

    let milk = find(&entries, "milk");
    assert_eq!(milk[0].total_amount, Some(frac(2, 1)));
    assert_eq!(milk[0].unit.as_deref(), Some("cup"));

    let water = find(&entries, "water");
    assert_eq!(water[0].total_amount, Some(frac(3, 2)));
    assert_eq!(water[0].unit.as_deref(), Some("l"));
}

#[test]
fn test_tiny_amount_that_overflows_degrades_to_annotation() {
    let recipes = vec![Recipe::new(1, "Mole")
        .with_ingredient("0.0000000000000000001 oz chocolate")
        .with_ingredient("2 tbsp cocoa")];
    let scheduled = vec![ScheduledServing::new(1, date(4), 1)];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(entries.len(), 2);

    let chocolate = find(&entries, "chocolate");
    assert_eq!(chocolate[0].total_amount, None);
    assert_eq!(chocolate[0].annotations.len(), 1);
    assert!(chocolate[0].annotations[0].ends_with(" oz"));
    assert_eq!(chocolate[0].recipe_count(), 1);

    let cocoa = find(&entries, "cocoa");
    assert_eq!(cocoa[0].total_amount, Some(frac(2, 1)));
    assert_eq!(cocoa[0].unit.as_deref(), Some("tbsp"));
}

#[test]
fn test_mass_and_volume_of_one_ingredient_stay_apart() {
    let recipes = vec![
        Recipe::new(1, "Cake").with_ingredient("200 g sugar"),
        Recipe::new(2, "Tea").with_ingredient("1 tbsp sugar"),
    ];
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 1),
        ScheduledServing::new(2, date(4), 1),
    ];

    let entries = aggregate_with(&recipes, &scheduled).unwrap();
    assert_eq!(entries.len(), 2);
    let dimensions: Vec<Dimension> = entries
        .iter()
        .filter_map(|e| e.unit.as_deref().and_then(unit_table::lookup))
        .map(|unit| unit.dimension)
        .collect();
    assert_eq!(dimensions, vec![Dimension::Volume, Dimension::Mass]);
}

#[test]
fn test_missing_recipe_aborts_without_partial_list() {
    let recipes = weekly_recipes();
    let scheduled = vec![
        ScheduledServing::new(1, date(4), 4),
        ScheduledServing::new(42, date(5), 2),
    ];

    let result = aggregate_with(&recipes, &scheduled);
    assert!(matches!(result, Err(ShoppingError::RecipeNotFound(42))));
}

#[test]
fn test_non_positive_servings_are_invalid() {
    let recipes = weekly_recipes();

    let zero = vec![ScheduledServing::new(1, date(4), 0)];
    assert!(matches!(aggregate_with(&recipes, &zero), Err(ShoppingError::InvalidInput(_))));

    let negative = vec![ScheduledServing::new(1, date(4), -2)];
    assert!(matches!(aggregate_with(&recipes, &negative), Err(ShoppingError::InvalidInput(_))));

    let broken = vec![Recipe::new(7, "Broken").with_base_servings(0).with_ingredient("1 egg")];
    let scheduled = vec![ScheduledServing::new(7, date(4), 1)];
    assert!(matches!(aggregate_with(&broken, &scheduled), Err(ShoppingError::InvalidInput(_))));
}
