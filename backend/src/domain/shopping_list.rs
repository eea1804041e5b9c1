//! Shopping-list aggregation.
//!
//! Folds every ingredient line of the recipes in a user's shopping cart
//! into one entry per (ingredient name, measurement unit) pair and renders
//! the result as a line-delimited text document. Kept as pure functions so
//! the merge semantics are testable without a database.

use std::collections::BTreeMap;

/// One raw ingredient line pulled from a cart recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Ingredient name.
    pub name: String,
    /// Unit the amount is expressed in.
    pub measurement_unit: String,
    /// Line amount.
    pub amount: i32,
}

/// One aggregated shopping-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    /// Ingredient name.
    pub name: String,
    /// Unit shared by all merged lines.
    pub measurement_unit: String,
    /// Sum of amounts across the merged lines.
    pub total_amount: i64,
}

/// Merge cart lines by (name, unit), summing amounts, ordered by name.
///
/// The same ingredient under two different units stays as two entries;
/// units are not converted.
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += i64::from(line.amount);
    }
    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

/// Render aggregated items as the downloadable document.
///
/// One line per item, `"<name> (<unit>) - <summed amount>"`.
pub fn render(items: &[ShoppingListItem]) -> String {
    let mut document = String::new();
    for item in items {
        if !document.is_empty() {
            document.push('\n');
        }
        document.push_str(&format!(
            "{} ({}) - {}",
            item.name, item.measurement_unit, item.total_amount
        ));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[rstest]
    fn sums_amounts_per_ingredient_and_unit() {
        let items = aggregate(vec![
            line("flour", "g", 200),
            line("sugar", "g", 100),
            line("flour", "g", 50),
        ]);

        assert_eq!(
            items,
            vec![
                ShoppingListItem {
                    name: "flour".into(),
                    measurement_unit: "g".into(),
                    total_amount: 250,
                },
                ShoppingListItem {
                    name: "sugar".into(),
                    measurement_unit: "g".into(),
                    total_amount: 100,
                },
            ]
        );
    }

    #[rstest]
    fn keeps_different_units_apart() {
        let items = aggregate(vec![line("milk", "ml", 200), line("milk", "l", 1)]);
        assert_eq!(items.len(), 2);
    }

    #[rstest]
    fn orders_entries_by_ingredient_name() {
        let items = aggregate(vec![
            line("sugar", "g", 1),
            line("butter", "g", 1),
            line("flour", "g", 1),
        ]);
        let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["butter", "flour", "sugar"]);
    }

    #[rstest]
    fn renders_the_documented_line_format() {
        let items = aggregate(vec![
            line("flour", "g", 200),
            line("sugar", "g", 100),
            line("flour", "g", 50),
        ]);
        assert_eq!(render(&items), "flour (g) - 250\nsugar (g) - 100");
    }

    #[rstest]
    fn renders_an_empty_cart_as_an_empty_document() {
        assert_eq!(render(&aggregate(vec![])), "");
    }
}
